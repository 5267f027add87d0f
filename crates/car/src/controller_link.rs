// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The controller-link worker: owns the TCP connection to the dispatcher,
//! pushes STATUS frames on local state changes, applies inbound FLOOR
//! assignments, and ages the heartbeat counter while connected.
//!
//! Heartbeat aging lives here rather than on the motion worker because it
//! is gated on connection state (`controller_fd != -1` in the original),
//! and this worker is the one that knows whether it is connected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use elevator_carshm::CarSegment;
use elevator_proto::{Floor, Message, Status};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub async fn run(
    segment: Arc<CarSegment>,
    name: String,
    low: Floor,
    high: Floor,
    addr: String,
    delay: Duration,
    destination_changed: Arc<AtomicBool>,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = segment.wait_until(|g| {
                g.safety_system() >= 1 && !g.individual_service_mode() && !g.emergency_mode()
            }) => {}
        }
        if shutdown.is_cancelled() {
            return;
        }

        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(err = %e, "failed to connect to dispatcher, retrying");
                tokio::time::sleep(delay).await;
                continue;
            }
        };
        let (mut reader, mut writer) = stream.into_split();

        let register = Message::CarRegister { name: name.clone(), low, high };
        if elevator_proto::framing::write_frame(&mut writer, &register.encode()).await.is_err() {
            continue;
        }
        info!(car = %name, "registered with dispatcher");

        let mut last_sent: Option<(Status, Floor, Floor)> = None;
        last_sent = push_status_if_changed(&segment, &mut writer, last_sent).await;

        let mut heartbeat_tick = tokio::time::interval(delay);
        heartbeat_tick.tick().await;

        'connection: loop {
            if shutdown.is_cancelled() {
                return;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                _ = heartbeat_tick.tick() => {
                    if age_heartbeat_and_check_escalation(&segment).await {
                        let _ = elevator_proto::framing::write_frame(
                            &mut writer,
                            &Message::Emergency.encode(),
                        ).await;
                        break 'connection;
                    }
                }
                frame = tokio::time::timeout(delay, elevator_proto::framing::read_frame(&mut reader)) => {
                    match frame {
                        Ok(Ok(text)) => apply_inbound(&segment, &text, low, high, &destination_changed).await,
                        Ok(Err(_)) => break 'connection,
                        Err(_elapsed) => {}
                    }
                }
            }

            let (individual, emergency) = {
                let guard = segment.lock().await;
                (guard.individual_service_mode(), guard.emergency_mode())
            };
            if individual {
                let _ = elevator_proto::framing::write_frame(
                    &mut writer,
                    &Message::IndividualService.encode(),
                )
                .await;
                break 'connection;
            }
            if emergency {
                let _ =
                    elevator_proto::framing::write_frame(&mut writer, &Message::Emergency.encode())
                        .await;
                break 'connection;
            }

            last_sent = push_status_if_changed(&segment, &mut writer, last_sent).await;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn apply_inbound(
    segment: &CarSegment,
    text: &str,
    low: Floor,
    high: Floor,
    destination_changed: &AtomicBool,
) {
    let Ok(Message::Floor { floor }) = Message::parse(text) else { return };
    if !floor.in_range(low, high) {
        return;
    }
    {
        let guard = segment.lock().await;
        guard.set_destination_floor(floor);
    }
    destination_changed.store(true, Ordering::Release);
    segment.signal().await;
}

async fn push_status_if_changed(
    segment: &CarSegment,
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    last_sent: Option<(Status, Floor, Floor)>,
) -> Option<(Status, Floor, Floor)> {
    let current = {
        let guard = segment.lock().await;
        (guard.status(), guard.current_floor(), guard.destination_floor())
    };
    if last_sent == Some(current) {
        return last_sent;
    }
    let (status, floor, destination) = current;
    let message = Message::Status { status, current: floor, destination };
    if elevator_proto::framing::write_frame(writer, &message.encode()).await.is_err() {
        return last_sent;
    }
    Some(current)
}

/// Ages `safety_system` 1 -> 2 -> 3, and returns `true` once it escalates
/// to emergency on seeing a value already at or above 3.
async fn age_heartbeat_and_check_escalation(segment: &CarSegment) -> bool {
    let guard = segment.lock().await;
    if guard.individual_service_mode() || guard.emergency_mode() {
        return false;
    }
    let value = guard.safety_system();
    if value >= 3 {
        guard.set_emergency_mode(true);
        drop(guard);
        segment.signal().await;
        return true;
    }
    guard.set_safety_system(value + 1);
    drop(guard);
    segment.signal().await;
    false
}

#[cfg(test)]
#[path = "controller_link_tests.rs"]
mod tests;
