// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios, one per concrete case: multi-car admission, door
//! timing, obstruction re-open, individual-service manual move, SCAN
//! insertion, and emergency escalation.

use std::time::Duration;

use serial_test::serial;
use tokio::net::{TcpListener, TcpStream};

use elevator_car::door;
use elevator_carshm::CarSegment;
use elevator_dispatcher::car_table::CarTable;
use elevator_internal::config::{InternalConfig, Operation};
use elevator_proto::{framing, Floor, Message, Status};
use elevator_safety::supervisor;

fn floor(s: &str) -> Floor {
    Floor::parse(s).unwrap()
}

async fn spawn_dispatcher() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let table = std::sync::Arc::new(tokio::sync::RwLock::new(CarTable::default()));
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let table = std::sync::Arc::clone(&table);
            tokio::spawn(elevator_dispatcher::connection::handle(stream, table, 10));
        }
    });
    addr
}

async fn register_car(addr: std::net::SocketAddr, name: &str, low: &str, high: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let register =
        Message::CarRegister { name: name.to_owned(), low: floor(low), high: floor(high) };
    framing::write_frame(&mut stream, &register.encode()).await.unwrap();
    stream
}

async fn place_call(addr: std::net::SocketAddr, src: &str, dst: &str) -> Message {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let call = Message::Call { src: floor(src), dst: floor(dst) };
    framing::write_frame(&mut stream, &call.encode()).await.unwrap();
    let reply = framing::read_frame(&mut stream).await.unwrap();
    Message::parse(&reply).unwrap()
}

/// Scenario 1: three cars with disjoint/overlapping ranges; calls are
/// routed to whichever car can service both floors, with a `FLOOR` frame
/// pushed to the chosen car, and calls no car can service come back
/// `UNAVAILABLE`.
#[tokio::test]
async fn multi_car_admission() {
    let addr = spawn_dispatcher().await;
    let mut alpha = register_car(addr, "Alpha", "1", "4").await;
    let mut beta = register_car(addr, "Beta", "B3", "1").await;
    let mut gamma = register_car(addr, "Gamma", "2", "5").await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(place_call(addr, "1", "3").await, Message::CarAssigned { name: "Alpha".into() });
    assert_eq!(
        Message::parse(&framing::read_frame(&mut alpha).await.unwrap()).unwrap(),
        Message::Floor { floor: floor("1") }
    );

    assert_eq!(place_call(addr, "1", "B2").await, Message::CarAssigned { name: "Beta".into() });
    assert_eq!(
        Message::parse(&framing::read_frame(&mut beta).await.unwrap()).unwrap(),
        Message::Floor { floor: floor("1") }
    );

    assert_eq!(place_call(addr, "3", "5").await, Message::CarAssigned { name: "Gamma".into() });
    assert_eq!(
        Message::parse(&framing::read_frame(&mut gamma).await.unwrap()).unwrap(),
        Message::Floor { floor: floor("3") }
    );

    assert_eq!(place_call(addr, "1", "5").await, Message::Unavailable);
    assert_eq!(place_call(addr, "B3", "3").await, Message::Unavailable);
}

/// Scenario 2: the door cycle's four phases land at the expected virtual
/// times, and pressing the close button early shortens the Open phase
/// without perturbing the Closing deadline's length.
#[tokio::test(start_paused = true)]
#[serial(shm)]
async fn door_timing() {
    let delay = Duration::from_millis(100);
    let segment = std::sync::Arc::new(
        CarSegment::create_or_open("specs-door-timing", floor("1"), floor("5")).unwrap(),
    );

    let cycle = tokio::spawn({
        let segment = std::sync::Arc::clone(&segment);
        async move {
            door::run_scheduled_cycle(&segment, delay).await;
        }
    });

    tokio::time::advance(Duration::from_millis(10)).await;
    assert_eq!(segment.lock().await.status(), Status::Opening);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(segment.lock().await.status(), Status::Open);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(segment.lock().await.status(), Status::Closing);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(segment.lock().await.status(), Status::Closed);

    cycle.await.unwrap();
}

#[tokio::test(start_paused = true)]
#[serial(shm)]
async fn door_timing_close_button_shortens_open_phase() {
    let delay = Duration::from_millis(100);
    let segment = std::sync::Arc::new(
        CarSegment::create_or_open("specs-door-timing-button", floor("1"), floor("5")).unwrap(),
    );

    let cycle = tokio::spawn({
        let segment = std::sync::Arc::clone(&segment);
        async move {
            door::run_scheduled_cycle(&segment, delay).await;
        }
    });

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(segment.lock().await.status(), Status::Open);

    tokio::time::advance(Duration::from_millis(50)).await;
    segment.lock().await.set_close_button(true);
    tokio::time::advance(Duration::from_millis(2)).await;
    assert_eq!(segment.lock().await.status(), Status::Closing);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(segment.lock().await.status(), Status::Closed);

    cycle.await.unwrap();
}

/// Scenario 3: an obstruction set while Closing must be overwritten back to
/// Opening by the safety supervisor within one wake, restarting the door
/// cycle.
#[tokio::test]
#[serial(shm)]
async fn obstruction_during_closing_restarts_the_cycle() {
    let delay = Duration::from_millis(30);
    let segment = std::sync::Arc::new(
        CarSegment::create_or_open("specs-obstruction", floor("1"), floor("5")).unwrap(),
    );

    let door_segment = std::sync::Arc::clone(&segment);
    let cycle = tokio::spawn(async move {
        door::run_scheduled_cycle(&door_segment, delay).await;
    });

    let safety_segment = std::sync::Arc::clone(&segment);
    let safety = tokio::spawn(async move {
        safety_segment
            .wait_until(|guard| guard.status() == Status::Closing)
            .await;
        let guard = safety_segment.lock().await;
        guard.set_door_obstruction(true);
        drop(guard);
        safety_segment.signal().await;
    });

    safety.await.unwrap();
    {
        let guard = segment.lock().await;
        assert!(guard.status() == Status::Opening || guard.status() == Status::Open);
    }

    tokio::time::timeout(Duration::from_secs(2), cycle).await.unwrap().unwrap();
    assert_eq!(segment.lock().await.status(), Status::Closed);
}

/// Scenario 4: under individual service, `up` advances the destination one
/// floor and one motion tick lands exactly there with the door staying
/// shut; the same operation while doors are open is rejected.
#[tokio::test]
#[serial(shm)]
async fn individual_service_manual_move() {
    let segment = CarSegment::create_or_open("specs-individual", floor("1"), floor("5")).unwrap();
    {
        let guard = segment.lock().await;
        guard.set_individual_service_mode(true);
        guard.set_current_floor(floor("3"));
        guard.set_destination_floor(floor("3"));
        guard.set_status(Status::Closed);
    }

    elevator_internal::run(InternalConfig { name: "specs-individual".into(), op: Operation::Up })
        .await
        .unwrap();
    assert_eq!(segment.lock().await.destination_floor(), floor("4"));

    {
        let guard = segment.lock().await;
        let current = guard.current_floor();
        let destination = guard.destination_floor();
        let next = current.step_toward(destination);
        guard.set_current_floor(next);
        assert_eq!(next, destination);
        guard.set_status(Status::Closed);
    }
    assert_eq!(segment.lock().await.status(), Status::Closed);

    {
        let guard = segment.lock().await;
        guard.set_status(Status::Open);
    }
    let err =
        elevator_internal::run(InternalConfig { name: "specs-individual".into(), op: Operation::Up })
            .await
            .unwrap_err();
    assert_eq!(err.to_string(), "Operation not allowed while doors are open.");
}

/// Scenario 5: SCAN-style insertion builds up the queue exactly as the
/// direction-aware cost function dictates.
#[test]
fn scan_insertion() {
    let mut table = CarTable::default();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    table.cars.insert(
        "Alpha".to_owned(),
        elevator_dispatcher::car_table::CarEntry {
            low: floor("1"),
            high: floor("10"),
            current_floor: floor("1"),
            status: Some(Status::Closed),
            queue: Vec::new(),
            outbox: tx,
        },
    );

    table.schedule(floor("2"), floor("6"));
    assert_eq!(table.cars["Alpha"].queue, vec![floor("2"), floor("6")]);

    table.schedule(floor("3"), floor("5"));
    assert_eq!(
        table.cars["Alpha"].queue,
        vec![floor("2"), floor("3"), floor("5"), floor("6")]
    );

    table.schedule(floor("8"), floor("4"));
    assert_eq!(
        table.cars["Alpha"].queue,
        vec![floor("2"), floor("3"), floor("5"), floor("6"), floor("8"), floor("4")]
    );
}

/// Scenario 6: an emergency stop latches `emergency_mode`, the car reports
/// `EMERGENCY` over its controller link and disconnects, and the
/// dispatcher frees the car record so a matching call is `UNAVAILABLE`.
#[tokio::test]
#[serial(shm)]
async fn emergency_escalation() {
    let segment = std::sync::Arc::new(
        CarSegment::create_or_open("specs-emergency", floor("1"), floor("10")).unwrap(),
    );
    {
        let guard = segment.lock().await;
        guard.set_status(Status::Closed);
        guard.set_current_floor(floor("4"));
        guard.set_destination_floor(floor("4"));
    }

    let addr = spawn_dispatcher().await;
    let mut car = register_car(addr, "Echo", "1", "10").await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    {
        let guard = segment.lock().await;
        guard.set_emergency_stop(true);
        drop(guard);
        segment.signal().await;
    }
    let guard = segment.lock().await;
    supervisor::run_checks(&guard);
    assert!(guard.emergency_mode());
    drop(guard);

    framing::write_frame(&mut car, &Message::Emergency.encode()).await.unwrap();
    drop(car);
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(place_call(addr, "4", "6").await, Message::Unavailable);
}
