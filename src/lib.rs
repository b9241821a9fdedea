#![cfg_attr(not(test), no_std)]

//! daewoo_ac
//!
//! Driver for Daewoo air conditioners that expose a UART on the indoor unit's
//! mainboard. The unit answers a status poll with a 22 byte frame describing
//! its complete state, and accepts the same frame back (with the operation byte
//! flipped) to change it.
//!
//! It is intended for use on embedded hardware, and as such is `no_std`. Any
//! `embedded_hal::serial::Read<u8> + Write<u8>` implementation can serve as the
//! link. There is no code to configure the serial peripheral here.
//!
//! The crate is split in layers:
//!
//! - [`protocol`]: frame codec, no I/O;
//! - [`DaewooDevice`]: owns the UART, polls the unit and keeps its [`DeviceState`];
//! - [`DaewooAc`]: the device plus the climate, select and switch entities a home
//!   automation host registers, reported through the [`Host`] trait.
//!
//! ## General Usage
//!
//! Decode a status frame:
//!
//! ```
//! use daewoo_ac::protocol::{FrameError, StatusDelta};
//! use daewoo_ac::protocol::types::{FanMode, Mode};
//!
//! let buf: &[u8] = &[
//!     0xaa, 0x14,
//!     0x01, 0x01, 0x03, 0x06, 0x00, 0x01, 0x10, 0x00, 0x18, 0x17,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x09,
//! ];
//!
//! // Partial frames ask for more bytes instead of failing.
//! assert_eq!(StatusDelta::decode(&buf[..10]), Err(FrameError::Incomplete(Some(12))));
//!
//! let (status, consumed) = StatusDelta::decode(buf).unwrap();
//! assert_eq!(consumed, 22);
//! assert_eq!(status.mode, Mode::Cool);
//! assert_eq!(status.fan_mode, FanMode::Auto);
//! assert_eq!(status.target_temperature, 24);
//! assert_eq!(status.current_temperature, 23);
//! ```
//!
//! Encode frames for writing to the serial line:
//!
//! ```
//! use daewoo_ac::Command;
//! use daewoo_ac::protocol::{Encodable, PollRequest, StatusDelta, WriteRequest};
//!
//! let mut buf = [0u8; 22];
//!
//! let poll = PollRequest.encode(&mut buf[..4]).unwrap();
//! assert_eq!(poll, &[0xaa, 0x02, 0x01, 0xad]);
//!
//! // Writes always carry the full state, so they start from the last status.
//! let status: &[u8] = &[
//!     0xaa, 0x14,
//!     0x01, 0x01, 0x03, 0x06, 0x00, 0x01, 0x10, 0x00, 0x18, 0x17,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x09,
//! ];
//! let (status, _) = StatusDelta::decode(status).unwrap();
//!
//! let write = WriteRequest { base: &status.payload, command: &Command::SetTargetTemperature(22) };
//! assert_eq!(
//!     write.encode(&mut buf).unwrap(),
//!     &[
//!         0xaa, 0x14,
//!         // write operation, then the status bytes with 22 degrees in place of 24
//!         0x02, 0x01, 0x03, 0x06, 0x00, 0x01, 0x10, 0x00, 0x16, 0x17,
//!         0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!         // checksum: sum of all previous bytes, mod 256
//!         0x08,
//!     ][..]
//! );
//! ```

#[macro_use]
extern crate log;

pub mod protocol;

mod command;
mod component;
mod config;
mod entity;
mod interface;
mod scheduler;
mod state;

#[cfg(test)]
mod mock;

pub use command::Command;
pub use component::DaewooAc;
pub use config::*;
pub use entity::*;
pub use interface::DaewooDevice;
pub use scheduler::{Outbound, Phase, Scheduler, QUEUE_CAPACITY};
pub use state::DeviceState;
