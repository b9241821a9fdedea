//! In-memory UART and host used by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::serial;

use crate::entity::{ClimateState, EntityInfo, Host, SelectHandle, SwitchHandle};

#[derive(Default)]
struct Link {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    /// Bytes the UART accepts before reporting `WouldBlock`, per `write` burst.
    tx_room: Option<usize>,
}

/// Cloneable handle on a fake serial line. The driver owns one clone, the test
/// keeps another to feed replies and inspect what was written.
#[derive(Clone, Default)]
pub struct MockSerial(Rc<RefCell<Link>>);

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn take_sent(&self) -> Vec<u8> {
        core::mem::take(&mut self.0.borrow_mut().tx)
    }

    pub fn limit_tx(&self, room: Option<usize>) {
        self.0.borrow_mut().tx_room = room;
    }
}

impl serial::Read<u8> for MockSerial {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.0.borrow_mut().rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for MockSerial {
    type Error = ();

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        let mut link = self.0.borrow_mut();
        match link.tx_room {
            Some(0) => return Err(nb::Error::WouldBlock),
            Some(ref mut room) => *room -= 1,
            None => {}
        }
        link.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Published {
    Climate(ClimateState),
    Select(SelectHandle, String),
    Switch(SwitchHandle, bool),
}

/// Host that records every registration and publication.
#[derive(Default)]
pub struct RecordingHost {
    pub registered: Vec<String>,
    pub published: Vec<Published>,
}

impl RecordingHost {
    pub fn take_published(&mut self) -> Vec<Published> {
        core::mem::take(&mut self.published)
    }

    pub fn last_climate(&self) -> Option<ClimateState> {
        self.published.iter().rev().find_map(|p| match p {
            Published::Climate(state) => Some(*state),
            _ => None,
        })
    }
}

impl Host for RecordingHost {
    fn register(&mut self, entity: &EntityInfo<'_>) {
        self.registered.push(String::from(entity.name));
    }

    fn publish_climate(&mut self, state: &ClimateState) {
        self.published.push(Published::Climate(*state));
    }

    fn publish_select(&mut self, select: SelectHandle, option: &str) {
        self.published.push(Published::Select(select, String::from(option)));
    }

    fn publish_switch(&mut self, switch: SwitchHandle, on: bool) {
        self.published.push(Published::Switch(switch, on));
    }
}
