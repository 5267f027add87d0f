// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use elevator_carshm::CarSegment;
use elevator_proto::Floor;
use serial_test::serial;
use std::time::Duration;

fn segment(name: &str) -> CarSegment {
    CarSegment::create_or_open(name, Floor::parse("1").unwrap(), Floor::parse("9").unwrap())
        .unwrap()
}

#[tokio::test]
#[serial(shm)]
async fn scheduled_cycle_runs_opening_open_closing_closed() {
    let seg = segment("doortest1");
    run_scheduled_cycle(&seg, Duration::from_millis(20)).await;
    let guard = seg.lock().await;
    assert_eq!(guard.status(), Status::Closed);
}

#[tokio::test]
#[serial(shm)]
async fn close_button_shortens_open_phase() {
    let seg = segment("doortest2");
    let delay = Duration::from_millis(50);

    let press = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let guard = seg.lock().await;
        guard.set_close_button(true);
    };
    let cycle = run_scheduled_cycle(&seg, delay);

    let start = std::time::Instant::now();
    tokio::join!(press, cycle);
    let elapsed = start.elapsed();

    // Opening (50ms) + shortened Open (~10ms) + Closing (50ms), well under
    // the full two-delay Open phase.
    assert!(elapsed < Duration::from_millis(130), "elapsed = {elapsed:?}");
    let guard = seg.lock().await;
    assert_eq!(guard.status(), Status::Closed);
}

#[tokio::test]
#[serial(shm)]
async fn obstruction_during_closing_reopens() {
    let seg = segment("doortest3");
    let delay = Duration::from_millis(30);

    let obstruct = async {
        // Wait long enough to land inside the Closing phase, then flip the
        // status the way the safety supervisor would on an obstruction.
        tokio::time::sleep(Duration::from_millis(75)).await;
        let guard = seg.lock().await;
        if guard.status() == Status::Closing {
            guard.set_status(Status::Opening);
        }
    };
    let cycle = run_scheduled_cycle(&seg, delay);
    tokio::join!(obstruct, cycle);

    let guard = seg.lock().await;
    assert_eq!(guard.status(), Status::Closed);
}

#[tokio::test]
#[serial(shm)]
async fn immediate_open_and_close_skip_scheduling() {
    let seg = segment("doortest4");
    let delay = Duration::from_millis(15);

    run_immediate_open(&seg, delay).await;
    assert_eq!(seg.lock().await.status(), Status::Open);

    {
        let guard = seg.lock().await;
        guard.set_close_button(true);
    }
    run_immediate_close(&seg, delay).await;
    assert_eq!(seg.lock().await.status(), Status::Closed);
}
