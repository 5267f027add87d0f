// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Cursor;

#[tokio::test]
async fn round_trips_a_payload() {
    let mut buf = Vec::new();
    write_frame(&mut buf, "CALL 1 5").await.unwrap();
    let mut cursor = Cursor::new(buf);
    let text = read_frame(&mut cursor).await.unwrap();
    assert_eq!(text, "CALL 1 5");
}

#[tokio::test]
async fn empty_payload_round_trips() {
    let mut buf = Vec::new();
    write_frame(&mut buf, "").await.unwrap();
    let mut cursor = Cursor::new(buf);
    assert_eq!(read_frame(&mut cursor).await.unwrap(), "");
}

#[tokio::test]
async fn rejects_oversized_payload() {
    let mut buf = Vec::new();
    let huge = "x".repeat(MAX_FRAME_LEN + 1);
    assert!(write_frame(&mut buf, &huge).await.is_err());
}

#[tokio::test]
async fn truncated_stream_reports_connection_closed() {
    let mut cursor = Cursor::new(vec![0u8, 5, b'h', b'i']);
    let err = read_frame(&mut cursor).await.unwrap_err();
    assert_eq!(err, ProtoError::ConnectionClosed);
}
