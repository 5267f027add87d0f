// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection handling: the first frame decides whether this socket is
//! a car registering itself or a call-pad placing one request, mirroring
//! `client_handler_thread`'s dispatch on the `"CAR"`/`"CALL"` prefix.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};

use elevator_proto::{framing, Floor, Message};

use crate::car_table::{CarEntry, CarTable};

pub async fn handle(mut stream: TcpStream, table: Arc<RwLock<CarTable>>, max_cars: usize) {
    let frame = match framing::read_frame(&mut stream).await {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(%e, "connection closed before an initial frame arrived");
            return;
        }
    };

    match Message::parse(&frame) {
        Ok(Message::CarRegister { name, low, high }) => {
            run_car(stream, name, low, high, table, max_cars).await
        }
        Ok(Message::Call { src, dst }) => run_call(stream, src, dst, table).await,
        _ => tracing::warn!(%frame, "failed to parse initial frame"),
    }
}

async fn run_call(mut stream: TcpStream, src: Floor, dst: Floor, table: Arc<RwLock<CarTable>>) {
    tracing::info!(%src, %dst, "received call");
    let assigned = table.write().await.schedule(src, dst);

    let reply = match assigned {
        Some(name) => {
            tracing::info!(car = %name, %src, %dst, "call assigned");
            Message::CarAssigned { name }
        }
        None => {
            tracing::info!(%src, %dst, "call is unavailable");
            Message::Unavailable
        }
    };

    let _ = framing::write_frame(&mut stream, &reply.encode()).await;
}

async fn run_car(
    stream: TcpStream,
    name: String,
    low: Floor,
    high: Floor,
    table: Arc<RwLock<CarTable>>,
    max_cars: usize,
) {
    let (mut read_half, mut write_half) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    {
        let mut guard = table.write().await;
        if guard.cars.len() >= max_cars {
            tracing::warn!(car = %name, "max cars reached, rejecting registration");
            return;
        }
        if guard.cars.contains_key(&name) {
            tracing::warn!(car = %name, "rejecting registration: name already in use");
            return;
        }
        guard.cars.insert(
            name.clone(),
            CarEntry { low, high, current_floor: low, status: None, queue: Vec::new(), outbox: tx },
        );
    }
    tracing::info!(car = %name, %low, %high, "car registered");

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if framing::write_frame(&mut write_half, &msg).await.is_err() {
                break;
            }
        }
    });

    loop {
        let frame = match framing::read_frame(&mut read_half).await {
            Ok(frame) => frame,
            Err(_) => break,
        };

        match Message::parse(&frame) {
            Ok(Message::IndividualService) => {
                tracing::info!(car = %name, "entered individual service mode");
                break;
            }
            Ok(Message::Emergency) => {
                tracing::warn!(car = %name, "entered emergency mode");
                break;
            }
            Ok(Message::Status { status, current, destination: _ }) => {
                table.write().await.apply_status(&name, status, current);
            }
            _ => tracing::warn!(car = %name, %frame, "unrecognised car frame"),
        }
    }

    tracing::info!(car = %name, "car disconnected");
    table.write().await.cars.remove(&name);
    let _ = writer.await;
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
