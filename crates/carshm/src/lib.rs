// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-shared car state, mapped as a POSIX shared-memory object named
//! `"/car<name>"`.
//!
//! There is no safe Rust binding for `pthread_mutex_t`/`pthread_cond_t` with
//! `PTHREAD_PROCESS_SHARED`, so this crate substitutes an atomic spinlock
//! (an `AtomicU32` lock word) for the mutex and a generation counter
//! (`AtomicU64`, bumped on every [`SegmentGuard`] release that changes
//! state) for the condvar. Callers that need to block until some condition
//! holds use [`CarSegment::wait_until`], which polls the generation counter
//! at a short fixed interval instead of truly parking.

mod error;
mod layout;
mod segment;

pub use error::ShmError;
pub use segment::{check_consistency, CarSegment, SegmentGuard};

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
