// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Protocol-level error discriminant.
///
/// Mirrors the error-code-plus-message shape the dispatcher uses elsewhere
/// in the system: a small `Display`-implementing enum for errors that cross
/// a process boundary, with `anyhow` doing the rest of the propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoError {
    /// A floor string didn't parse per the §3 grammar.
    InvalidFloor,
    /// A frame's payload was not valid UTF-8, or was empty where a command was expected.
    MalformedFrame,
    /// A frame did not match any recognised message shape.
    UnknownCommand,
    /// A frame's length prefix declared more than the 65,535-byte limit.
    FrameTooLarge,
    /// The connection closed before a full frame could be read.
    ConnectionClosed,
}

impl ProtoError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFloor => "INVALID_FLOOR",
            Self::MalformedFrame => "MALFORMED_FRAME",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::FrameTooLarge => "FRAME_TOO_LARGE",
            Self::ConnectionClosed => "CONNECTION_CLOSED",
        }
    }
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ProtoError {}
