// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The frame vocabulary from `SPEC_FULL.md` §6, one enum variant per
//! recognised text. Every frame body is plain ASCII with single spaces;
//! [`Message::parse`] is the single entry point every role's reader uses,
//! the way `controller.c`'s `parse_car_info`/`parse_call_info`/
//! `parse_status_info` are the single entry points there — just merged
//! into one dispatch instead of one function per shape, since Rust's slice
//! patterns make that dispatch exhaustive and checked at compile time.

use std::fmt;

use crate::error::ProtoError;
use crate::floor::Floor;

/// Door/motion status, as reported in `STATUS` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Opening,
    Open,
    Closing,
    Closed,
    Between,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Open => "Open",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
            Self::Between => "Between",
        }
    }

    fn parse(s: &str) -> Result<Self, ProtoError> {
        match s {
            "Opening" => Ok(Self::Opening),
            "Open" => Ok(Self::Open),
            "Closing" => Ok(Self::Closing),
            "Closed" => Ok(Self::Closed),
            "Between" => Ok(Self::Between),
            _ => Err(ProtoError::MalformedFrame),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// `CAR <name> <low> <high>` — car registers with the dispatcher.
    CarRegister { name: String, low: Floor, high: Floor },
    /// `CALL <src> <dst>` — call-pad requests a pickup.
    Call { src: Floor, dst: Floor },
    /// `STATUS <status> <current> <destination>` — car reports state.
    Status { status: Status, current: Floor, destination: Floor },
    /// `FLOOR <floor>` — dispatcher assigns the car its next stop.
    Floor { floor: Floor },
    /// `CAR <name>` — dispatcher tells a call-pad which car is coming.
    CarAssigned { name: String },
    /// `UNAVAILABLE` — dispatcher has no car for this call.
    Unavailable,
    /// `INDIVIDUAL SERVICE` — car is leaving normal dispatch, terminal.
    IndividualService,
    /// `EMERGENCY` — car has entered emergency mode, terminal.
    Emergency,
}

impl Message {
    pub fn parse(text: &str) -> Result<Self, ProtoError> {
        if text.is_empty() {
            return Err(ProtoError::MalformedFrame);
        }
        let parts: Vec<&str> = text.split(' ').collect();
        match parts.as_slice() {
            ["CAR", name, low, high] => {
                let name = validate_name(name)?;
                let low = Floor::parse(low)?;
                let high = Floor::parse(high)?;
                Ok(Self::CarRegister { name, low, high })
            }
            ["CAR", name] => Ok(Self::CarAssigned { name: validate_name(name)? }),
            ["CALL", src, dst] => {
                Ok(Self::Call { src: Floor::parse(src)?, dst: Floor::parse(dst)? })
            }
            ["STATUS", status, current, destination] => Ok(Self::Status {
                status: Status::parse(status)?,
                current: Floor::parse(current)?,
                destination: Floor::parse(destination)?,
            }),
            ["FLOOR", floor] => Ok(Self::Floor { floor: Floor::parse(floor)? }),
            ["UNAVAILABLE"] => Ok(Self::Unavailable),
            ["INDIVIDUAL", "SERVICE"] => Ok(Self::IndividualService),
            ["EMERGENCY"] => Ok(Self::Emergency),
            _ => Err(ProtoError::UnknownCommand),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::CarRegister { name, low, high } => format!("CAR {name} {low} {high}"),
            Self::Call { src, dst } => format!("CALL {src} {dst}"),
            Self::Status { status, current, destination } => {
                format!("STATUS {status} {current} {destination}")
            }
            Self::Floor { floor } => format!("FLOOR {floor}"),
            Self::CarAssigned { name } => format!("CAR {name}"),
            Self::Unavailable => "UNAVAILABLE".to_owned(),
            Self::IndividualService => "INDIVIDUAL SERVICE".to_owned(),
            Self::Emergency => "EMERGENCY".to_owned(),
        }
    }
}

/// A car name must be non-empty and printable with no whitespace; the
/// caller already split on spaces, so this only needs to reject control
/// characters and non-ASCII bytes.
fn validate_name(name: &str) -> Result<String, ProtoError> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ProtoError::MalformedFrame);
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
