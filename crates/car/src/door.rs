// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Door-phase timing. Deadlines are computed once at state entry and slept
//! to directly (`Instant` targets, not re-derived elapsed sums) so an early
//! close_button in the Open phase never perturbs the following Closing
//! deadline.

use std::time::Duration;

use elevator_carshm::CarSegment;
use elevator_proto::Status;
use tokio::time::Instant;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs the full scheduled cycle: Opening -> Open (button or timeout,
/// whichever first) -> Closing -> Closed. Restarts from Opening if the
/// safety supervisor overwrites `Closing` back to `Opening` on an
/// obstruction.
pub async fn run_scheduled_cycle(segment: &CarSegment, delay: Duration) {
    loop {
        // The Open phase's auto-close deadline is fixed here, at Opening
        // entry, not re-derived once the Opening -> Open transition lands --
        // two delays out from this instant either way, but computed once so
        // scheduling jitter across the transition can't accumulate.
        let open_deadline = Instant::now() + delay + delay;
        run_opening(segment, delay).await;
        run_open(segment, open_deadline).await;
        if run_closing(segment, delay).await {
            continue;
        }
        return;
    }
}

/// Individual-service open: no scheduling, no auto-close timeout.
pub async fn run_immediate_open(segment: &CarSegment, delay: Duration) {
    run_opening(segment, delay).await;
}

/// Individual-service close: no scheduling, no re-open polling.
pub async fn run_immediate_close(segment: &CarSegment, delay: Duration) {
    let deadline = Instant::now() + delay;
    {
        let guard = segment.lock().await;
        guard.set_close_button(false);
        guard.set_status(Status::Closing);
    }
    segment.signal().await;
    tokio::time::sleep_until(deadline).await;
    {
        let guard = segment.lock().await;
        if guard.status() == Status::Closing {
            guard.set_status(Status::Closed);
        }
    }
    segment.signal().await;
}

async fn run_opening(segment: &CarSegment, delay: Duration) {
    let deadline = Instant::now() + delay;
    {
        let guard = segment.lock().await;
        guard.set_open_button(false);
        guard.set_status(Status::Opening);
    }
    segment.signal().await;
    tokio::time::sleep_until(deadline).await;
    {
        let guard = segment.lock().await;
        if guard.status() == Status::Opening {
            guard.set_status(Status::Open);
        }
    }
    segment.signal().await;
}

async fn run_open(segment: &CarSegment, deadline: Instant) {
    loop {
        {
            let guard = segment.lock().await;
            if guard.status() != Status::Open {
                return;
            }
            if guard.close_button() {
                guard.set_close_button(false);
                guard.set_status(Status::Closing);
                drop(guard);
                segment.signal().await;
                return;
            }
        }
        if Instant::now() >= deadline {
            let guard = segment.lock().await;
            if guard.status() == Status::Open {
                guard.set_status(Status::Closing);
            }
            drop(guard);
            segment.signal().await;
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Returns `true` if an obstruction flipped the status back to `Opening`
/// and the cycle should restart.
async fn run_closing(segment: &CarSegment, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        {
            let guard = segment.lock().await;
            match guard.status() {
                Status::Closing => {}
                Status::Opening => {
                    debug!("door obstruction reopened mid-close");
                    return true;
                }
                _ => return false,
            }
        }
        if Instant::now() >= deadline {
            let guard = segment.lock().await;
            if guard.status() == Status::Closing {
                guard.set_status(Status::Closed);
            }
            drop(guard);
            segment.signal().await;
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
#[path = "door_tests.rs"]
mod tests;
