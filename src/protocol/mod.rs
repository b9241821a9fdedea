mod frame;
mod packets;

pub mod encoding;
pub mod types;

pub use frame::{Frame, FrameError, InvalidFrame, FRAME_START, MIN_FRAME_LEN, STATUS_FRAME_LEN};
pub use packets::{PollRequest, StatusDelta, StatusPayload, WriteRequest, PAYLOAD_LEN, POLL_FRAME_LEN};
pub use encoding::{Encodable, EncodingError, Hex};

#[cfg(test)]
pub(crate) use packets::tests::{status_frame, COOL_24};
