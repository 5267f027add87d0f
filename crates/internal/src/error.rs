// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Precondition failures, printed verbatim to stdout before exiting
/// non-zero -- the wording matches what the internal-service client has
/// always printed, since external tooling greps for it.
#[derive(Debug)]
pub enum InternalError {
    CarUnavailable { name: String },
    ServiceModeRequired,
    DoorsOpen,
    Moving,
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CarUnavailable { name } => write!(f, "Unable to access car {name}."),
            Self::ServiceModeRequired => write!(f, "Operation only allowed in service mode."),
            Self::DoorsOpen => write!(f, "Operation not allowed while doors are open."),
            Self::Moving => write!(f, "Operation not allowed while elevator is moving."),
        }
    }
}

impl std::error::Error for InternalError {}
