// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Fatal shared-memory errors. All of these are startup-path errors per
/// `SPEC_FULL.md` §7 ("fatal I/O during startup") — once a segment is
/// mapped, the only failure mode left is a poisoned lock, which this crate
/// does not allow to happen (the guard always releases on drop).
#[derive(Debug)]
pub enum ShmError {
    Open(std::io::Error),
    Truncate(std::io::Error),
    Map(std::io::Error),
    NameTooLong,
}

impl fmt::Display for ShmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(e) => write!(f, "shm_open failed: {e}"),
            Self::Truncate(e) => write!(f, "ftruncate failed: {e}"),
            Self::Map(e) => write!(f, "mmap failed: {e}"),
            Self::NameTooLong => write!(f, "car name produces an overlong shared memory name"),
        }
    }
}

impl std::error::Error for ShmError {}
