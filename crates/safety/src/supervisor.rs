// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One supervisory pass, run under a held lock on every wake. Order
//! matters: heartbeat first, then the obstruction edge case, then the two
//! latches, then a full consistency sweep -- matching the original
//! ordering so a single wake that trips more than one rule still leaves
//! the segment in the same state it would have under the source.

use elevator_carshm::{check_consistency, SegmentGuard};
use elevator_proto::Status;
use tracing::warn;

pub fn run_checks(guard: &SegmentGuard<'_>) {
    heartbeat(guard);
    door_obstruction(guard);
    emergency_stop(guard);
    overload(guard);
    consistency(guard);
}

fn heartbeat(guard: &SegmentGuard<'_>) {
    if guard.safety_system() != 1 {
        guard.set_safety_system(1);
    }
}

fn door_obstruction(guard: &SegmentGuard<'_>) {
    if guard.door_obstruction() && guard.status() == Status::Closing {
        guard.set_status(Status::Opening);
    }
}

fn emergency_stop(guard: &SegmentGuard<'_>) {
    if guard.emergency_stop() && !guard.emergency_mode() {
        warn!("emergency stop pressed");
        guard.set_emergency_mode(true);
        guard.set_emergency_stop(false);
    }
}

fn overload(guard: &SegmentGuard<'_>) {
    if guard.overload() && !guard.emergency_mode() {
        warn!("overload sensor tripped");
        guard.set_emergency_mode(true);
    }
}

fn consistency(guard: &SegmentGuard<'_>) {
    if guard.emergency_mode() {
        return;
    }
    if !check_consistency(guard) {
        warn!("data consistency error");
        guard.set_emergency_mode(true);
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
