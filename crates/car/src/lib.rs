// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car process: owns one shared-memory segment and runs two
//! concurrent workers against it -- the controller-link worker (dispatcher
//! socket) and the motion/door worker (status and floor).

pub mod config;
pub mod controller_link;
pub mod door;
pub mod error;
pub mod motion;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::CarConfig;
use crate::error::CarError;

pub async fn run(config: CarConfig) -> anyhow::Result<()> {
    let (low, high) = config.floor_range()?;
    let segment =
        Arc::new(elevator_carshm::CarSegment::create_or_open(&config.name, low, high)
            .map_err(CarError::from)?);

    let shutdown = CancellationToken::new();
    let destination_changed = Arc::new(AtomicBool::new(false));

    let motion_task = tokio::spawn(motion::run(
        Arc::clone(&segment),
        low,
        high,
        config.delay(),
        Arc::clone(&destination_changed),
        shutdown.clone(),
    ));
    let link_task = tokio::spawn(controller_link::run(
        Arc::clone(&segment),
        config.name.clone(),
        low,
        high,
        config.dispatcher_addr(),
        config.delay(),
        Arc::clone(&destination_changed),
        shutdown.clone(),
    ));

    info!(car = %config.name, low = %low, high = %high, "car started");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            shutdown.cancel();
        }
        _ = shutdown.cancelled() => {}
    }

    let _ = tokio::join!(motion_task, link_task);
    Ok(())
}
