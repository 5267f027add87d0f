// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

#[derive(Debug)]
pub enum SafetyError {
    Shm(elevator_carshm::ShmError),
}

impl fmt::Display for SafetyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shm(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SafetyError {}

impl From<elevator_carshm::ShmError> for SafetyError {
    fn from(e: elevator_carshm::ShmError) -> Self {
        Self::Shm(e)
    }
}
