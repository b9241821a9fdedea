use heapless::spsc::Queue;

use crate::command::Command;

/// Backing size of the command queue; it holds one less than this.
const QUEUE_SIZE: usize = 17;

pub const QUEUE_CAPACITY: usize = QUEUE_SIZE - 1;

/// What a cycle put on the link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outbound {
    Poll,
    Command(Command),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    AwaitingResponse { sent_at: u32, outbound: Outbound },
}

/// Poll/command cycle. Each tick sends exactly one frame, the oldest pending
/// command if there is one and a status poll otherwise, then waits for a status
/// frame or the response timeout before going back to idle.
///
/// A command stays in flight until a status frame arrives for its cycle, so a
/// timed out or garbled exchange is retried on the next tick.
pub struct Scheduler {
    update_interval_ms: u32,
    response_timeout_ms: u32,
    phase: Phase,
    last_tick: Option<u32>,
    queue: Queue<Command, QUEUE_SIZE>,
    in_flight: Option<Command>,
}

impl Scheduler {
    pub fn new(update_interval_ms: u32, response_timeout_ms: u32) -> Self {
        Scheduler {
            update_interval_ms,
            response_timeout_ms,
            phase: Phase::Idle,
            last_tick: None,
            queue: Queue::new(),
            in_flight: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Commands not yet acknowledged, including the one in flight.
    pub fn pending(&self) -> usize {
        self.queue.len() + self.in_flight.is_some() as usize
    }

    /// Queues `command` behind those already pending. When the queue is full the
    /// oldest queued command is dropped and returned.
    pub fn enqueue(&mut self, command: Command) -> Option<Command> {
        let dropped = if self.queue.is_full() { self.queue.dequeue() } else { None };
        if let Some(dropped) = dropped {
            warn!("command queue full, dropping {:?}", dropped);
        }
        if self.queue.enqueue(command).is_err() {
            // Only reachable with a zero sized queue.
            warn!("could not queue {:?}", command);
        }
        debug!("queued {:?} ({} pending)", command, self.pending());
        dropped
    }

    fn tick_due(&self, now: u32) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.update_interval_ms,
        }
    }

    /// Starts a cycle if one is due and the link is idle, returning what to send.
    /// Commands are held back until `commands_ready`, i.e. until the unit has
    /// reported a state the write frame can be based on.
    pub fn poll(&mut self, now: u32, commands_ready: bool) -> Option<Outbound> {
        if self.phase != Phase::Idle || !self.tick_due(now) {
            return None;
        }
        self.last_tick = Some(now);

        if commands_ready && self.in_flight.is_none() {
            self.in_flight = self.queue.dequeue();
        }
        let outbound = match self.in_flight {
            Some(command) if commands_ready => Outbound::Command(command),
            _ => Outbound::Poll,
        };

        trace!("idle -> awaiting response ({:?})", outbound);
        self.phase = Phase::AwaitingResponse { sent_at: now, outbound };
        Some(outbound)
    }

    /// Ends the current cycle if it has waited longer than the response timeout.
    pub fn check_timeout(&mut self, now: u32) -> Option<Outbound> {
        match self.phase {
            Phase::AwaitingResponse { sent_at, outbound }
                if now.wrapping_sub(sent_at) >= self.response_timeout_ms =>
            {
                trace!("awaiting response -> idle (timeout)");
                self.phase = Phase::Idle;
                Some(outbound)
            }
            _ => None,
        }
    }

    /// A valid status frame arrived. Ends the cycle and returns the command it
    /// acknowledged, if the cycle carried one.
    pub fn on_status(&mut self) -> Option<Command> {
        match self.phase {
            Phase::AwaitingResponse { outbound, .. } => {
                trace!("awaiting response -> idle (status)");
                self.phase = Phase::Idle;
                match outbound {
                    Outbound::Command(_) => self.in_flight.take(),
                    Outbound::Poll => None,
                }
            }
            Phase::Idle => None,
        }
    }

    /// An invalid frame arrived. Ends the cycle without acknowledging anything.
    pub fn on_invalid(&mut self) -> Option<Outbound> {
        match self.phase {
            Phase::AwaitingResponse { outbound, .. } => {
                trace!("awaiting response -> idle (invalid frame)");
                self.phase = Phase::Idle;
                Some(outbound)
            }
            Phase::Idle => None,
        }
    }
}
