// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The safety supervisor: attaches to an already-running car's segment and
//! re-validates it on every wake. Never makes a motion decision -- only
//! heartbeat, obstruction, the two hardware latches, and a consistency
//! sweep, in that order.

pub mod config;
pub mod error;
pub mod supervisor;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::SafetyConfig;
use crate::error::SafetyError;

pub async fn run(config: SafetyConfig) -> anyhow::Result<()> {
    let segment =
        elevator_carshm::CarSegment::open_existing(&config.name).map_err(SafetyError::from)?;
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        });
    }

    info!(car = %config.name, "safety supervisor attached");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            _ = segment.wait_for_signal() => {
                let guard = segment.lock().await;
                supervisor::run_checks(&guard);
            }
        }
    }
}
