// Package runtime: decoder for the multiplexed log stream.
//
// Each frame is an 8-byte header followed by the payload: one stream byte
// (0 stdin, 1 stdout, 2 stderr), three padding bytes and a big-endian u32
// payload length.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl Stream {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Stream::Stdin),
            1 => Some(Stream::Stdout),
            2 => Some(Stream::Stderr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub stream: Stream,
    pub payload: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("unknown log stream {0} at offset {1}")]
    UnknownStream(u8, usize),
    #[error("truncated log frame at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Splits `data` into frames. A trailing partial header or payload is an error.
pub fn decode(data: &[u8]) -> Result<Vec<Frame<'_>>, FrameError> {
    let mut frames = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let rest = &data[offset..];
        if rest.len() < HEADER_LEN {
            return Err(FrameError::Truncated {
                offset,
                needed: HEADER_LEN,
                available: rest.len(),
            });
        }
        let stream = Stream::from_byte(rest[0]).ok_or(FrameError::UnknownStream(rest[0], offset))?;
        let len = BigEndian::read_u32(&rest[4..HEADER_LEN]) as usize;
        let body = &rest[HEADER_LEN..];
        if body.len() < len {
            return Err(FrameError::Truncated {
                offset,
                needed: HEADER_LEN + len,
                available: rest.len(),
            });
        }
        frames.push(Frame {
            stream,
            payload: &body[..len],
        });
        offset += HEADER_LEN + len;
    }

    Ok(frames)
}

/// Concatenated payloads of every frame, decoded lossily as UTF-8.
pub fn decode_text(data: &[u8]) -> Result<String, FrameError> {
    let frames = decode(data)?;
    let mut out = Vec::with_capacity(data.len());
    for frame in frames {
        out.extend_from_slice(frame.payload);
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Encodes one frame. Used by fakes and tests.
pub fn encode(stream: Stream, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_LEN];
    out[0] = match stream {
        Stream::Stdin => 0,
        Stream::Stdout => 1,
        Stream::Stderr => 2,
    };
    BigEndian::write_u32(&mut out[4..HEADER_LEN], payload.len() as u32);
    out.extend_from_slice(payload);
    out
}
