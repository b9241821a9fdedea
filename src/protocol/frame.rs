use nom::bytes::complete::take_till;
use nom::bytes::streaming::{tag, take};
use nom::combinator::verify;
use nom::number::streaming::be_u8;
use nom::IResult;
use thiserror::Error;

use super::encoding::EncodingError;

pub const FRAME_START: u8 = 0xaa;

/// Length byte of status and write frames (19 payload bytes plus the checksum).
pub const STATUS_DATA_LEN: u8 = 0x14;
pub const STATUS_FRAME_LEN: usize = STATUS_DATA_LEN as usize + 2;

/// Start, length, one payload byte, checksum.
pub const MIN_FRAME_LEN: usize = 4;

const START_TAG: &[u8] = &[FRAME_START];

#[derive(Debug, Eq, PartialEq)]
pub struct Frame<'a> {
    pub data_len: u8,
    pub payload: &'a [u8],
    checksum: u8,
}

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameError {
    /// More bytes are needed; the buffer should be kept. Carries the number of
    /// missing bytes when it is known.
    #[error("Incomplete frame")]
    Incomplete(Option<usize>),
    #[error("Invalid frame: {0}")]
    Invalid(InvalidFrame),
}

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvalidFrame {
    #[error("expected start byte 0xAA, got {0:#04x}")]
    Start(u8),
    #[error("length byte {0:#04x} is out of range")]
    Length(u8),
    #[error("expected a status frame, got length {0:#04x}")]
    NotStatus(u8),
    #[error("expected a read operation, got {0:#04x}")]
    Operation(u8),
    #[error("checksum mismatch: calculated {calculated:#04x}, received {received:#04x}")]
    Checksum { calculated: u8, received: u8 },
    #[error("unknown power/mode bytes {power:#04x}/{mode:#04x}")]
    Mode { power: u8, mode: u8 },
    #[error("unknown fan byte {0:#04x}")]
    Fan(u8),
    #[error("unknown vertical vane byte {0:#04x}")]
    VerticalVane(u8),
    #[error("unknown horizontal vane byte {0:#04x}")]
    HorizontalVane(u8),
    #[error("target temperature {0} out of range")]
    TargetTemperature(u8),
}

impl From<InvalidFrame> for FrameError {
    fn from(invalid: InvalidFrame) -> Self {
        FrameError::Invalid(invalid)
    }
}

impl InvalidFrame {
    /// Whether the bytes looked like a reply that got mangled, as opposed to
    /// line noise or a frame that was never meant as a status.
    pub fn is_garbled_reply(&self) -> bool {
        !matches!(
            self,
            InvalidFrame::Start(_) | InvalidFrame::Length(_) | InvalidFrame::NotStatus(_) | InvalidFrame::Operation(_)
        )
    }
}

fn frame(input: &[u8]) -> IResult<&[u8], Frame<'_>> {
    let (input, _) = tag(START_TAG)(input)?;
    let (input, data_len) = verify(be_u8, |len: &u8| (2..=STATUS_DATA_LEN).contains(len))(input)?;
    let (input, payload) = take(data_len as usize - 1)(input)?;
    let (input, checksum) = be_u8(input)?;
    Ok((input, Frame { data_len, payload, checksum }))
}

impl<'a> Frame<'a> {
    /// Sum of all bytes, modulo 256.
    pub fn checksum(bytes: &[u8]) -> u8 {
        bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
    }

    fn calculated_checksum(&self) -> u8 {
        FRAME_START
            .wrapping_add(self.data_len)
            .wrapping_add(Self::checksum(self.payload))
    }

    /// Parses one frame from the front of `data`, returning it with the number
    /// of bytes it occupied.
    pub fn parse(data: &'a [u8]) -> Result<(Self, usize), FrameError> {
        if data.len() < MIN_FRAME_LEN {
            return Err(FrameError::Incomplete(Some(MIN_FRAME_LEN - data.len())));
        }

        match frame(data) {
            Ok((remaining, frame)) => {
                let calculated = frame.calculated_checksum();
                if calculated != frame.checksum {
                    return Err(InvalidFrame::Checksum { calculated, received: frame.checksum }.into());
                }
                Ok((frame, data.len() - remaining.len()))
            }

            Err(nom::Err::Incomplete(needed)) => match needed {
                nom::Needed::Size(size) => Err(FrameError::Incomplete(Some(size.get()))),
                nom::Needed::Unknown => Err(FrameError::Incomplete(None)),
            },

            Err(nom::Err::Error(_)) | Err(nom::Err::Failure(_)) => {
                if data[0] != FRAME_START {
                    Err(InvalidFrame::Start(data[0]).into())
                } else {
                    Err(InvalidFrame::Length(data[1]).into())
                }
            }
        }
    }

    /// Offset of the next candidate start byte after the first byte of `data`.
    /// Everything before it can be discarded after an invalid frame.
    pub fn resync_offset(data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let skipped: IResult<&[u8], &[u8]> = take_till(|b| b == FRAME_START)(&data[1..]);
        match skipped {
            Ok((_, junk)) => 1 + junk.len(),
            Err(_) => data.len(),
        }
    }

    /// Number of bytes to drop from the front of `data` after it failed to
    /// decode. A well-formed frame is skipped whole, since its payload may hold
    /// stray start bytes; anything else is skipped up to the next start byte.
    pub fn discard_len(data: &[u8]) -> usize {
        match Frame::parse(data) {
            Ok((_, consumed)) => consumed,
            Err(_) => Self::resync_offset(data),
        }
    }

    /// Writes start byte, length, `payload` and checksum into `into`, which must be
    /// exactly `payload.len() + 3` bytes long.
    pub fn encode<'b>(payload: &[u8], into: &'b mut [u8]) -> Result<&'b [u8], EncodingError> {
        if payload.len() >= STATUS_DATA_LEN as usize {
            return Err(EncodingError::PayloadTooLong(payload.len()));
        }
        let expected = payload.len() + 3;
        if into.len() != expected {
            return Err(EncodingError::BufferSize { expected, actual: into.len() });
        }
        into[0] = FRAME_START;
        into[1] = (payload.len() + 1) as u8;
        into[2..expected - 1].copy_from_slice(payload);
        into[expected - 1] = Self::checksum(&into[..expected - 1]);
        Ok(into)
    }
}
