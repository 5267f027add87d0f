// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: accepts connections from cars and call-pads, maintains the
//! car registry, and runs the insertion-cost scheduler that assigns calls
//! to queues.

pub mod car_table;
pub mod config;
pub mod connection;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use car_table::CarTable;
use config::DispatcherConfig;

pub async fn run(config: DispatcherConfig) -> anyhow::Result<()> {
    let table = Arc::new(RwLock::new(CarTable::default()));
    let listener = TcpListener::bind(config.addr()).await?;
    let semaphore = Arc::new(Semaphore::new(config.max_clients));
    let shutdown = CancellationToken::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        });
    }

    tracing::info!(addr = %config.addr(), max_cars = config.max_cars, "dispatcher listening");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(%e, "accept failed");
                        continue;
                    }
                };

                let permit = match Arc::clone(&semaphore).try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("max clients reached, rejecting new connection");
                        drop(stream);
                        continue;
                    }
                };

                let table = Arc::clone(&table);
                let max_cars = config.max_cars;
                tokio::spawn(async move {
                    let _permit = permit;
                    connection::handle(stream, table, max_cars).await;
                });
            }
        }
    }

    tracing::info!("shutdown signal received, closing listener");
    Ok(())
}
