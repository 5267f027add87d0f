// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_car_registration() {
    let msg = Message::parse("CAR Alpha 1 4").unwrap();
    assert_eq!(
        msg,
        Message::CarRegister {
            name: "Alpha".to_owned(),
            low: Floor::parse("1").unwrap(),
            high: Floor::parse("4").unwrap(),
        }
    );
}

#[test]
fn parses_call() {
    let msg = Message::parse("CALL 1 B2").unwrap();
    assert_eq!(
        msg,
        Message::Call { src: Floor::parse("1").unwrap(), dst: Floor::parse("B2").unwrap() }
    );
}

#[test]
fn parses_status() {
    let msg = Message::parse("STATUS Open 3 5").unwrap();
    assert_eq!(
        msg,
        Message::Status {
            status: Status::Open,
            current: Floor::parse("3").unwrap(),
            destination: Floor::parse("5").unwrap(),
        }
    );
}

#[test]
fn parses_floor_assignment() {
    assert_eq!(
        Message::parse("FLOOR 7").unwrap(),
        Message::Floor { floor: Floor::parse("7").unwrap() }
    );
}

#[test]
fn parses_car_assigned_reply_distinct_from_registration() {
    assert_eq!(
        Message::parse("CAR Alpha").unwrap(),
        Message::CarAssigned { name: "Alpha".to_owned() }
    );
}

#[test]
fn parses_terminal_frames() {
    assert_eq!(Message::parse("UNAVAILABLE").unwrap(), Message::Unavailable);
    assert_eq!(Message::parse("INDIVIDUAL SERVICE").unwrap(), Message::IndividualService);
    assert_eq!(Message::parse("EMERGENCY").unwrap(), Message::Emergency);
}

#[test]
fn rejects_unknown_command() {
    assert!(Message::parse("HELLO world").is_err());
    assert!(Message::parse("").is_err());
}

#[test]
fn rejects_invalid_floor_in_call() {
    assert!(Message::parse("CALL 0 5").is_err());
}

#[test]
fn encode_round_trips_through_parse() {
    let messages = [
        Message::CarRegister {
            name: "Beta".to_owned(),
            low: Floor::parse("B3").unwrap(),
            high: Floor::parse("1").unwrap(),
        },
        Message::Call { src: Floor::parse("1").unwrap(), dst: Floor::parse("5").unwrap() },
        Message::Status {
            status: Status::Closing,
            current: Floor::parse("2").unwrap(),
            destination: Floor::parse("2").unwrap(),
        },
        Message::Floor { floor: Floor::parse("B1").unwrap() },
        Message::CarAssigned { name: "Gamma".to_owned() },
        Message::Unavailable,
        Message::IndividualService,
        Message::Emergency,
    ];
    for msg in messages {
        let encoded = msg.encode();
        assert_eq!(Message::parse(&encoded).unwrap(), msg);
    }
}
