// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The motion/door worker: the single owner of `status` and `current_floor`.
//! Runs synchronously through a whole door cycle once one starts, exactly
//! as the controller-link worker keeps handling sockets concurrently on its
//! own task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use elevator_carshm::CarSegment;
use elevator_proto::{Floor, Status};
use tokio_util::sync::CancellationToken;

use crate::door;

const IDLE_POLL: Duration = Duration::from_millis(1);

pub async fn run(
    segment: Arc<CarSegment>,
    low: Floor,
    high: Floor,
    delay: Duration,
    destination_changed: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }

        let snapshot = {
            let guard = segment.lock().await;
            Snapshot {
                individual: guard.individual_service_mode(),
                emergency: guard.emergency_mode(),
                status: guard.status(),
                current: guard.current_floor(),
                destination: guard.destination_floor(),
                open_button: guard.open_button(),
            }
        };

        if snapshot.emergency {
            idle(&shutdown).await;
            continue;
        }

        match snapshot.status {
            Status::Closed => {
                run_closed(&segment, &snapshot, low, high, &destination_changed, delay, &shutdown)
                    .await;
            }
            Status::Open => {
                if snapshot.individual {
                    run_individual_open(&segment, delay).await;
                } else {
                    idle(&shutdown).await;
                }
            }
            Status::Between => {
                run_between(&segment, delay, &destination_changed, &shutdown).await;
            }
            Status::Opening | Status::Closing => idle(&shutdown).await,
        }
    }
}

struct Snapshot {
    individual: bool,
    emergency: bool,
    status: Status,
    current: Floor,
    destination: Floor,
    open_button: bool,
}

async fn idle(shutdown: &CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::time::sleep(IDLE_POLL) => {}
    }
}

async fn run_closed(
    segment: &CarSegment,
    snapshot: &Snapshot,
    low: Floor,
    high: Floor,
    destination_changed: &AtomicBool,
    delay: Duration,
    shutdown: &CancellationToken,
) {
    if snapshot.individual {
        if snapshot.open_button {
            {
                let guard = segment.lock().await;
                guard.set_open_button(false);
            }
            door::run_immediate_open(segment, delay).await;
            return;
        }
        if snapshot.current != snapshot.destination {
            if !snapshot.destination.in_range(low, high) {
                let guard = segment.lock().await;
                guard.set_destination_floor(snapshot.current);
                return;
            }
            let guard = segment.lock().await;
            guard.set_status(Status::Between);
            drop(guard);
            segment.signal().await;
            return;
        }
        idle(shutdown).await;
        return;
    }

    if snapshot.open_button && snapshot.current == snapshot.destination {
        {
            let guard = segment.lock().await;
            guard.set_open_button(false);
        }
        door::run_scheduled_cycle(segment, delay).await;
        return;
    }

    if destination_changed.swap(false, Ordering::AcqRel) && snapshot.current == snapshot.destination
    {
        door::run_scheduled_cycle(segment, delay).await;
        return;
    }

    if snapshot.current != snapshot.destination {
        let guard = segment.lock().await;
        guard.set_status(Status::Between);
        drop(guard);
        segment.signal().await;
        return;
    }

    idle(shutdown).await;
}

async fn run_individual_open(segment: &CarSegment, delay: Duration) {
    let close_button = {
        let guard = segment.lock().await;
        guard.close_button()
    };
    if close_button {
        {
            let guard = segment.lock().await;
            guard.set_close_button(false);
        }
        door::run_immediate_close(segment, delay).await;
    } else {
        tokio::time::sleep(IDLE_POLL).await;
    }
}

/// Move one floor per `delay` tick toward the destination. On arrival,
/// individual-service settles straight to `Closed` (manual moves never
/// auto-open the door); normal operation runs the full door cycle.
async fn run_between(
    segment: &CarSegment,
    delay: Duration,
    destination_changed: &AtomicBool,
    shutdown: &CancellationToken,
) {
    tokio::select! {
        _ = shutdown.cancelled() => return,
        _ = tokio::time::sleep(delay) => {}
    }

    let (arrived, individual) = {
        let guard = segment.lock().await;
        if guard.emergency_mode() || guard.status() != Status::Between {
            return;
        }
        let current = guard.current_floor();
        let destination = guard.destination_floor();
        let next = current.step_toward(destination);
        guard.set_current_floor(next);
        (next == destination, guard.individual_service_mode())
    };
    segment.signal().await;

    if !arrived {
        return;
    }

    destination_changed.store(false, Ordering::Release);
    if individual {
        let guard = segment.lock().await;
        if guard.status() == Status::Between {
            guard.set_status(Status::Closed);
        }
        drop(guard);
        segment.signal().await;
    } else {
        {
            let guard = segment.lock().await;
            if guard.status() == Status::Between {
                guard.set_status(Status::Closed);
            }
        }
        door::run_scheduled_cycle(segment, delay).await;
    }
}

#[cfg(test)]
#[path = "motion_tests.rs"]
mod tests;
