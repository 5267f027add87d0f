// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Fatal, startup-path errors for the car process.
#[derive(Debug)]
pub enum CarError {
    Shm(elevator_carshm::ShmError),
    InvalidFloorRange { low: String, high: String },
}

impl fmt::Display for CarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shm(e) => write!(f, "{e}"),
            Self::InvalidFloorRange { low, high } => {
                write!(f, "lowest floor {low} is not below highest floor {high}")
            }
        }
    }
}

impl std::error::Error for CarError {}

impl From<elevator_carshm::ShmError> for CarError {
    fn from(e: elevator_carshm::ShmError) -> Self {
        Self::Shm(e)
    }
}
