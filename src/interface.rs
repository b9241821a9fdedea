use embedded_hal::serial;
use heapless::Vec;

use crate::command::Command;
use crate::protocol::{
    Encodable, Frame, FrameError, Hex, PollRequest, StatusDelta, WriteRequest,
    POLL_FRAME_LEN, STATUS_FRAME_LEN,
};
use crate::scheduler::{Outbound, Scheduler};
use crate::state::DeviceState;

/// Room for a couple of frames plus line noise.
const RX_BUFFER_SIZE: usize = 64;

/// Drives one air conditioner over its UART: sends polls and commands on the
/// scheduler's tick, assembles inbound frames and keeps the reported state.
///
/// All serial I/O goes through the non-blocking `nb` API. Nothing here waits on
/// the line; call `tick` often (every few milliseconds) from the main loop.
pub struct DaewooDevice<S> where S: serial::Read<u8> + serial::Write<u8> {
    serial: S,
    rx_buffer: Vec<u8, RX_BUFFER_SIZE>,
    tx_buffer: Vec<u8, STATUS_FRAME_LEN>,
    tx_pos: usize,
    scheduler: Scheduler,
    state: DeviceState,
}

impl<S> DaewooDevice<S> where S: serial::Read<u8> + serial::Write<u8> {
    pub fn new(serial: S, update_interval_ms: u32, response_timeout_ms: u32) -> Self {
        DaewooDevice {
            serial,
            rx_buffer: Vec::new(),
            tx_buffer: Vec::new(),
            tx_pos: 0,
            scheduler: Scheduler::new(update_interval_ms, response_timeout_ms),
            state: DeviceState::default(),
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn enqueue(&mut self, command: Command) {
        self.scheduler.enqueue(command);
    }

    /// Gives the serial port back.
    pub fn release(self) -> S {
        self.serial
    }

    /// One pass of the main loop. Returns a snapshot of the state when a status
    /// frame changed it.
    pub fn tick(&mut self, now: u32) -> Option<DeviceState> {
        self.read_available();
        let changed = self.process_rx();

        if let Some(outbound) = self.scheduler.check_timeout(now) {
            warn!("no response to {:?}, retrying on the next tick", outbound);
        }
        if let Some(outbound) = self.scheduler.poll(now, self.state.is_known()) {
            self.send(outbound);
        }
        self.flush();

        if changed { Some(self.state.snapshot()) } else { None }
    }

    fn read_available(&mut self) {
        while self.rx_buffer.len() < self.rx_buffer.capacity() {
            match self.serial.read() {
                Ok(byte) => {
                    // not full, checked above
                    let _ = self.rx_buffer.push(byte);
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    error!("uart read error");
                    break;
                }
            }
        }
    }

    fn process_rx(&mut self) -> bool {
        let mut changed = false;
        loop {
            match StatusDelta::decode(&self.rx_buffer) {
                Ok((delta, consumed)) => {
                    info!("received frame: {}", Hex(&self.rx_buffer[..consumed]));
                    self.consume(consumed);
                    if let Some(command) = self.scheduler.on_status() {
                        debug!("{:?} acknowledged", command);
                    }
                    changed |= self.state.apply(&delta);
                }
                Err(FrameError::Incomplete(_)) => break,
                Err(FrameError::Invalid(reason)) => {
                    let skip = Frame::discard_len(&self.rx_buffer);
                    warn!("discarding {} bytes: {}", skip, reason);
                    self.consume(skip);
                    if reason.is_garbled_reply() {
                        self.scheduler.on_invalid();
                    }
                }
            }
        }
        changed
    }

    fn consume(&mut self, count: usize) {
        let len = self.rx_buffer.len();
        let count = count.min(len);
        self.rx_buffer.copy_within(count..len, 0);
        self.rx_buffer.truncate(len - count);
    }

    fn send(&mut self, outbound: Outbound) {
        if self.tx_pos < self.tx_buffer.len() {
            warn!("dropping {} unsent bytes of the previous frame", self.tx_buffer.len() - self.tx_pos);
        }
        self.tx_buffer.clear();
        self.tx_pos = 0;

        let base = self.state.payload;
        let mut frame = [0u8; STATUS_FRAME_LEN];
        let encoded = match (outbound, base.as_ref()) {
            (Outbound::Command(command), Some(base)) => {
                WriteRequest { base, command: &command }.encode(&mut frame)
            }
            _ => PollRequest.encode(&mut frame[..POLL_FRAME_LEN]),
        };

        match encoded {
            Ok(bytes) => {
                info!("sending frame: {}", Hex(bytes));
                if self.tx_buffer.extend_from_slice(bytes).is_err() {
                    error!("frame does not fit the transmit buffer");
                }
            }
            Err(e) => error!("could not encode {:?}: {}", outbound, e),
        }
    }

    fn flush(&mut self) {
        while self.tx_pos < self.tx_buffer.len() {
            match self.serial.write(self.tx_buffer[self.tx_pos]) {
                Ok(()) => self.tx_pos += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    error!("uart write error, dropping the rest of the frame");
                    self.tx_pos = self.tx_buffer.len();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSerial;
    use crate::protocol::types::Mode;
    use crate::protocol::{status_frame, COOL_24};
    use crate::scheduler::Phase;

    const POLL: [u8; 4] = [0xaa, 0x02, 0x01, 0xad];

    fn device() -> (DaewooDevice<MockSerial>, MockSerial) {
        let serial = MockSerial::new();
        (DaewooDevice::new(serial.clone(), 5000, 1000), serial)
    }

    #[test]
    fn polls_and_applies_status() {
        let (mut device, serial) = device();
        assert_eq!(device.tick(0), None);
        assert_eq!(serial.take_sent(), POLL);

        serial.reply(&COOL_24);
        let state = device.tick(100).expect("state should change");
        assert_eq!(state.mode, Mode::Cool);
        assert_eq!(device.scheduler().phase(), Phase::Idle);
        assert!(serial.take_sent().is_empty());
    }

    #[test]
    fn status_split_across_ticks() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&COOL_24[..9]);
        assert_eq!(device.tick(10), None);
        serial.reply(&COOL_24[9..]);
        assert!(device.tick(20).is_some());
    }

    #[test]
    fn corrupted_status_leaves_state_untouched() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&COOL_24);
        device.tick(10);
        let before = device.state().snapshot();

        device.tick(5000);
        let mut corrupted = status_frame(|p| p[8] = 0x1a);
        corrupted[21] = corrupted[21].wrapping_add(1);
        serial.reply(&corrupted);
        assert_eq!(device.tick(5010), None);
        assert_eq!(device.state().snapshot(), before);
        assert_eq!(device.scheduler().phase(), Phase::Idle);
    }

    #[test]
    fn junk_before_frame_is_skipped() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&[0x13, 0x37, 0xaa, 0x00]);
        serial.reply(&COOL_24);
        assert!(device.tick(10).is_some());
        assert_eq!(device.state().target_temperature, 24);
    }

    #[test]
    fn timeout_returns_to_idle_without_state_change() {
        let (mut device, serial) = device();
        device.tick(0);
        assert_eq!(device.tick(1000), None);
        assert_eq!(device.scheduler().phase(), Phase::Idle);
        assert!(!device.state().is_known());
        serial.take_sent();
        device.tick(5000);
        assert_eq!(serial.take_sent(), POLL);
    }

    #[test]
    fn command_is_sent_as_write_frame() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&COOL_24);
        device.tick(10);
        serial.take_sent();

        device.enqueue(Command::SetTargetTemperature(22));
        device.tick(5000);
        let sent = serial.take_sent();
        assert_eq!(sent.len(), STATUS_FRAME_LEN);
        assert_eq!(&sent[..3], &[0xaa, 0x14, 0x02]);
        assert_eq!(sent[10], 22);
        // nothing changes until the unit reports it
        assert_eq!(device.state().target_temperature, 24);
    }

    #[test]
    fn echoed_write_frame_is_not_an_acknowledgement() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&COOL_24);
        device.tick(10);
        serial.take_sent();

        device.enqueue(Command::SetTargetTemperature(30));
        device.tick(5000);
        let sent = serial.take_sent();
        serial.reply(&sent);
        assert_eq!(device.tick(5010), None);
        assert_eq!(device.state().target_temperature, 24);
        assert_eq!(device.scheduler().pending(), 1);
        assert!(matches!(device.scheduler().phase(), Phase::AwaitingResponse { .. }));

        serial.reply(&status_frame(|p| p[8] = 30));
        assert!(device.tick(5020).is_some());
        assert_eq!(device.state().target_temperature, 30);
        assert_eq!(device.scheduler().pending(), 0);
    }

    #[test]
    fn rejected_status_is_skipped_whole() {
        let (mut device, serial) = device();
        device.tick(0);
        serial.reply(&COOL_24);
        device.tick(10);

        // out of range target, with a start byte hidden in the reserved bytes
        device.tick(5000);
        serial.reply(&status_frame(|p| {
            p[8] = 40;
            p[12..16].copy_from_slice(&[0xaa, 0x02, 0x05, 0x00]);
        }));
        assert_eq!(device.tick(5010), None);
        assert_eq!(device.scheduler().phase(), Phase::Idle);

        device.enqueue(Command::SetDisplay(false));
        device.tick(10_000);
        serial.reply(&status_frame(|p| p[6] = 0x00));
        device.tick(10_010);
        assert!(!device.state().display);
        assert_eq!(device.scheduler().pending(), 0);
    }

    #[test]
    fn slow_uart_is_flushed_over_several_ticks() {
        let (mut device, serial) = device();
        serial.limit_tx(Some(1));
        device.tick(0);
        assert_eq!(serial.take_sent(), [0xaa]);
        serial.limit_tx(Some(2));
        device.tick(1);
        assert_eq!(serial.take_sent(), [0x02, 0x01]);
        serial.limit_tx(None);
        device.tick(2);
        assert_eq!(serial.take_sent(), [0xad]);
    }
}
