// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot client mirroring `call.c`: validate the two floors, send a
//! single `CALL` frame to the dispatcher, and print the one-line reply.

pub mod config;
pub mod error;

use tokio::net::TcpStream;

use elevator_proto::{framing, Floor, Message};

use config::CallpadConfig;
use error::CallpadError;

/// Runs the whole call-pad exchange and returns the line to print on
/// success. Connection failures are reported the same way the original
/// prints them for a refused request, but as an `Err` so `main` can set a
/// non-zero exit code.
pub async fn run(config: CallpadConfig) -> Result<String, CallpadError> {
    if config.source == config.destination {
        return Err(CallpadError::SameFloor);
    }

    let source = Floor::parse(&config.source).map_err(|_| CallpadError::InvalidFloor)?;
    let destination = Floor::parse(&config.destination).map_err(|_| CallpadError::InvalidFloor)?;

    let mut stream = TcpStream::connect(config.dispatcher_addr())
        .await
        .map_err(|_| CallpadError::Unreachable)?;

    let call = Message::Call { src: source, dst: destination };
    framing::write_frame(&mut stream, &call.encode())
        .await
        .map_err(|_| CallpadError::Unreachable)?;

    let reply = framing::read_frame(&mut stream).await.map_err(|_| CallpadError::Unreachable)?;

    Ok(match Message::parse(&reply) {
        Ok(Message::CarAssigned { name }) => format!("Car {name} is arriving."),
        Ok(Message::Unavailable) => "Sorry, no car is available to take this request.".to_owned(),
        _ => "Unable to connect to elevator system.".to_owned(),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
