// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed ASCII framing: a 2-byte big-endian length followed by
//! exactly that many bytes of text, no terminator. One frame, one
//! `read_frame`/`write_frame` call — no internal buffering or pipelining.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtoError;

/// Frames larger than this are rejected per §5's resource bound.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Read one length-prefixed frame and decode it as ASCII text.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, ProtoError> {
    let mut len_buf = [0u8; 2];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtoError::ConnectionClosed)
        }
        Err(_) => return Err(ProtoError::ConnectionClosed),
    }
    let len = u16::from_be_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    if reader.read_exact(&mut payload).await.is_err() {
        return Err(ProtoError::ConnectionClosed);
    }

    String::from_utf8(payload).map_err(|_| ProtoError::MalformedFrame)
}

/// Write one length-prefixed frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    text: &str,
) -> Result<(), ProtoError> {
    if text.len() > MAX_FRAME_LEN {
        return Err(ProtoError::FrameTooLarge);
    }
    let len = text.len() as u16;
    writer.write_all(&len.to_be_bytes()).await.map_err(|_| ProtoError::ConnectionClosed)?;
    writer.write_all(text.as_bytes()).await.map_err(|_| ProtoError::ConnectionClosed)?;
    Ok(())
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
