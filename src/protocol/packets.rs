use super::encoding::*;
use super::frame::{Frame, FrameError, InvalidFrame, STATUS_DATA_LEN, STATUS_FRAME_LEN};
use super::types::*;
use crate::command::Command;

/// Bytes between the length byte and the checksum of a status or write frame.
pub const PAYLOAD_LEN: usize = STATUS_DATA_LEN as usize - 1;

pub const POLL_FRAME_LEN: usize = 4;

pub const OPERATION_READ: u8 = 0x01;
pub const OPERATION_WRITE: u8 = 0x02;

// flags0
pub const HORIZONTAL_SWING_FLAG: u8 = 0x02;
// flags1
pub const QUIET_FLAG: u8 = 0x01;
pub const UV_LIGHT_FLAG: u8 = 0x02;
pub const DISPLAY_FLAG: u8 = 0x10;

// 19 bytes:
//
//  0   1   2   3   4   5   6   7   8   9  10 .. 18
// OP  PW  HV  VV  F0  MO  F1  FA  TT  CT  xx .. xx
//
// OP: Operation, 0x01 read / 0x02 write
// PW: Power
// HV: Horizontal vane position
// VV: Vertical vane position
// F0: Flag byte 0, horizontal swing
// MO: Mode
// F1: Flag byte 1, quiet / UV light / display
// FA: Fan
// TT: Target temperature, degrees C
// CT: Current temperature, degrees C
// xx: Unknown, echoed back unchanged in write frames
const OPERATION: usize = 0;
const POWER: usize = 1;
const HORIZONTAL_VANE: usize = 2;
const VERTICAL_VANE: usize = 3;
const FLAGS0: usize = 4;
const MODE: usize = 5;
const FLAGS1: usize = 6;
const FAN: usize = 7;
const TARGET_TEMPERATURE: usize = 8;
const CURRENT_TEMPERATURE: usize = 9;

/// Raw payload of the last status frame, kept as the base for write frames so that
/// bytes this crate does not understand are sent back untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusPayload([u8; PAYLOAD_LEN]);

impl StatusPayload {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut payload = [0u8; PAYLOAD_LEN];
        if bytes.len() != PAYLOAD_LEN {
            return None;
        }
        payload.copy_from_slice(bytes);
        Some(StatusPayload(payload))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn flag(&self, index: usize, mask: u8) -> bool {
        self.0[index] & mask != 0
    }

    fn set_flag(&mut self, index: usize, mask: u8, on: bool) {
        if on {
            self.0[index] |= mask;
        } else {
            self.0[index] &= !mask;
        }
    }

    fn set_vertical_vane(&mut self, vane: VerticalVane) {
        self.0[VERTICAL_VANE] = vane.encoded_as_byte();
    }

    /// Applies `command` on top of this payload.
    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::SetMode(mode) => match mode.mode_byte() {
                None => self.0[POWER] = 0x00,
                Some(byte) => {
                    self.0[POWER] = 0x01;
                    self.0[MODE] = byte;
                }
            },
            Command::SetTargetTemperature(temp) => {
                self.0[TARGET_TEMPERATURE] = temp.clamp(MIN_TARGET_TEMPERATURE, MAX_TARGET_TEMPERATURE);
            }
            Command::SetFanMode(fan) => {
                self.0[FAN] = fan.encoded_as_byte();
                self.set_flag(FLAGS1, QUIET_FLAG, fan == FanMode::Quiet);
            }
            Command::SetSwingMode(swing) => {
                let vertical_swinging = self.0[VERTICAL_VANE] == VerticalVane::Swing as u8;
                let (vertical, horizontal) = match swing {
                    SwingMode::Both => (Some(VerticalVane::Swing), true),
                    SwingMode::Vertical => (Some(VerticalVane::Swing), false),
                    SwingMode::Horizontal | SwingMode::Off => {
                        (vertical_swinging.then(|| VerticalVane::Static), swing == SwingMode::Horizontal)
                    }
                };
                if let Some(vertical) = vertical {
                    self.set_vertical_vane(vertical);
                }
                self.set_flag(FLAGS0, HORIZONTAL_SWING_FLAG, horizontal);
            }
            Command::SetVerticalVane(vane) => self.set_vertical_vane(vane),
            Command::SetHorizontalVane(vane) => self.0[HORIZONTAL_VANE] = vane.encoded_as_byte(),
            Command::SetDisplay(on) => self.set_flag(FLAGS1, DISPLAY_FLAG, on),
            Command::SetUvLight(on) => self.set_flag(FLAGS1, UV_LIGHT_FLAG, on),
            Command::SetHorizontalSwing(on) => self.set_flag(FLAGS0, HORIZONTAL_SWING_FLAG, on),
        }
    }
}

/// Asks the unit to report its status.
#[derive(Debug, Eq, PartialEq)]
pub struct PollRequest;

impl Encodable for PollRequest {
    fn encode<'a>(&self, into: &'a mut [u8]) -> Result<&'a [u8], EncodingError> {
        Frame::encode(&[OPERATION_READ], into)
    }
}

/// Full-state write frame: the last known payload with one command applied.
#[derive(Debug, Eq, PartialEq)]
pub struct WriteRequest<'a> {
    pub base: &'a StatusPayload,
    pub command: &'a Command,
}

impl Encodable for WriteRequest<'_> {
    fn encode<'a>(&self, into: &'a mut [u8]) -> Result<&'a [u8], EncodingError> {
        let mut payload = *self.base;
        payload.apply(self.command);
        payload.0[OPERATION] = OPERATION_WRITE;
        Frame::encode(payload.as_bytes(), into)
    }
}

/// Everything a status frame reports. Status frames always carry every field;
/// `DeviceState::apply` works out which of them actually changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusDelta {
    pub mode: Mode,
    pub fan_mode: FanMode,
    pub target_temperature: u8,
    pub current_temperature: u8,
    pub vertical_vane: VerticalVane,
    pub horizontal_vane: HorizontalVane,
    pub horizontal_swing: bool,
    pub display: bool,
    pub uv_light: bool,
    pub payload: StatusPayload,
}

impl StatusDelta {
    /// Decodes one status frame from the front of `data`, returning the delta and
    /// the number of bytes the frame occupied.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), FrameError> {
        if data.len() < STATUS_FRAME_LEN {
            return Err(FrameError::Incomplete(Some(STATUS_FRAME_LEN - data.len())));
        }

        let (frame, consumed) = Frame::parse(data)?;
        if frame.data_len != STATUS_DATA_LEN {
            return Err(InvalidFrame::NotStatus(frame.data_len).into());
        }
        let payload = StatusPayload::from_bytes(frame.payload)
            .ok_or(InvalidFrame::NotStatus(frame.data_len))?;
        // an echoed write frame must never pass for the unit's answer
        if payload.0[OPERATION] != OPERATION_READ {
            return Err(InvalidFrame::Operation(payload.0[OPERATION]).into());
        }

        Ok((Self::from_payload(payload)?, consumed))
    }

    fn from_payload(payload: StatusPayload) -> Result<Self, InvalidFrame> {
        let bytes = &payload.0;

        let mode = Mode::from_bytes(bytes[POWER], bytes[MODE])
            .ok_or(InvalidFrame::Mode { power: bytes[POWER], mode: bytes[MODE] })?;

        let fan_mode = if payload.flag(FLAGS1, QUIET_FLAG) {
            FanMode::Quiet
        } else {
            FanMode::from_byte(bytes[FAN]).ok_or(InvalidFrame::Fan(bytes[FAN]))?
        };

        let vertical_vane = VerticalVane::from_byte(bytes[VERTICAL_VANE])
            .ok_or(InvalidFrame::VerticalVane(bytes[VERTICAL_VANE]))?;
        let horizontal_vane = HorizontalVane::from_byte(bytes[HORIZONTAL_VANE])
            .ok_or(InvalidFrame::HorizontalVane(bytes[HORIZONTAL_VANE]))?;

        let target_temperature = bytes[TARGET_TEMPERATURE];
        if !(MIN_TARGET_TEMPERATURE..=MAX_TARGET_TEMPERATURE).contains(&target_temperature) {
            return Err(InvalidFrame::TargetTemperature(target_temperature));
        }

        Ok(StatusDelta {
            mode,
            fan_mode,
            target_temperature,
            current_temperature: bytes[CURRENT_TEMPERATURE],
            vertical_vane,
            horizontal_vane,
            horizontal_swing: payload.flag(FLAGS0, HORIZONTAL_SWING_FLAG),
            display: payload.flag(FLAGS1, DISPLAY_FLAG),
            uv_light: payload.flag(FLAGS1, UV_LIGHT_FLAG),
            payload,
        })
    }
}
