// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The raw, `repr(C)` layout mapped into the `"/car<name>"` shared-memory
//! object. Field order follows `SPEC_FULL.md` §3; every field past
//! `lock_word`/`generation` (our stand-ins for the process-shared mutex and
//! condvar, see the crate-level docs) is a plain atomic guarded entirely by
//! the spinlock — no field is ever read or written outside a held lock.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, AtomicU8};

use elevator_proto::Status;

pub(crate) const UNLOCKED: u32 = 0;
pub(crate) const LOCKED: u32 = 1;

#[repr(C)]
pub(crate) struct RawSegment {
    pub(crate) lock_word: AtomicU32,
    pub(crate) generation: AtomicU64,

    pub(crate) current_floor: AtomicI32,
    pub(crate) destination_floor: AtomicI32,
    pub(crate) status: AtomicU8,

    pub(crate) open_button: AtomicBool,
    pub(crate) close_button: AtomicBool,
    pub(crate) door_obstruction: AtomicBool,
    pub(crate) overload: AtomicBool,
    pub(crate) emergency_stop: AtomicBool,
    pub(crate) individual_service_mode: AtomicBool,
    pub(crate) emergency_mode: AtomicBool,

    pub(crate) safety_system: AtomicU8,
}

pub(crate) fn status_to_code(status: Status) -> u8 {
    match status {
        Status::Opening => 0,
        Status::Open => 1,
        Status::Closing => 2,
        Status::Closed => 3,
        Status::Between => 4,
    }
}

pub(crate) fn status_from_code(code: u8) -> Option<Status> {
    match code {
        0 => Some(Status::Opening),
        1 => Some(Status::Open),
        2 => Some(Status::Closing),
        3 => Some(Status::Closed),
        4 => Some(Status::Between),
        _ => None,
    }
}
