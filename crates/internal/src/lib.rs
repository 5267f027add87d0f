// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot client mirroring `internal.c`: attach to a running car's
//! shared-memory segment, apply a single operation, signal the segment so
//! the car and safety processes notice, then exit.

pub mod config;
pub mod error;

use elevator_carshm::{CarSegment, SegmentGuard};
use elevator_proto::Status;

use config::{InternalConfig, Operation};
use error::InternalError;

pub async fn run(config: InternalConfig) -> Result<(), InternalError> {
    let segment = CarSegment::open_existing(&config.name)
        .map_err(|_| InternalError::CarUnavailable { name: config.name.clone() })?;

    {
        let guard = segment.lock().await;
        match config.op {
            Operation::Open => guard.set_open_button(true),
            Operation::Close => guard.set_close_button(true),
            Operation::Stop => guard.set_emergency_stop(true),
            Operation::ServiceOn => {
                guard.set_individual_service_mode(true);
            }
            Operation::ServiceOff => guard.set_individual_service_mode(false),
            Operation::Up => {
                require_stopped_in_service(&guard)?;
                let next = guard.current_floor().next_up();
                guard.set_destination_floor(next);
            }
            Operation::Down => {
                require_stopped_in_service(&guard)?;
                let next = guard.current_floor().next_down();
                guard.set_destination_floor(next);
            }
        }
    }

    segment.signal().await;
    Ok(())
}

/// `up`/`down` only move the car manually while it is parked out of normal
/// dispatch with its doors shut. Mirrors `internal.c`'s checks before
/// `get_next_floor_up`/`get_next_floor_down`.
fn require_stopped_in_service(guard: &SegmentGuard<'_>) -> Result<(), InternalError> {
    if !guard.individual_service_mode() {
        return Err(InternalError::ServiceModeRequired);
    }
    match guard.status() {
        Status::Open | Status::Opening | Status::Closing => Err(InternalError::DoorsOpen),
        Status::Between => Err(InternalError::Moving),
        Status::Closed => Ok(()),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
