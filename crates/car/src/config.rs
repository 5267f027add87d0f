// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use elevator_proto::Floor;

/// Configuration for a single car process.
#[derive(Debug, Clone, clap::Args)]
pub struct CarConfig {
    /// Car name, used to name its shared-memory segment and to register
    /// with the dispatcher.
    #[arg(env = "ELEVATOR_CAR_NAME")]
    pub name: String,

    /// Lowest floor this car services, e.g. "1" or "B2".
    #[arg(env = "ELEVATOR_CAR_LOW")]
    pub low: String,

    /// Highest floor this car services.
    #[arg(env = "ELEVATOR_CAR_HIGH")]
    pub high: String,

    /// Per-floor travel time and door-phase duration, in milliseconds.
    #[arg(default_value_t = 1000, env = "ELEVATOR_CAR_DELAY_MS")]
    pub delay_ms: u64,

    /// Dispatcher host to register with.
    #[arg(long, default_value = "127.0.0.1", env = "ELEVATOR_DISPATCHER_HOST")]
    pub dispatcher_host: String,

    /// Dispatcher port to register with.
    #[arg(long, default_value_t = 3000, env = "ELEVATOR_DISPATCHER_PORT")]
    pub dispatcher_port: u16,
}

impl CarConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn floor_range(&self) -> Result<(Floor, Floor), crate::error::CarError> {
        let low = Floor::parse(&self.low).map_err(|_| crate::error::CarError::InvalidFloorRange {
            low: self.low.clone(),
            high: self.high.clone(),
        })?;
        let high =
            Floor::parse(&self.high).map_err(|_| crate::error::CarError::InvalidFloorRange {
                low: self.low.clone(),
                high: self.high.clone(),
            })?;
        if low >= high {
            return Err(crate::error::CarError::InvalidFloorRange {
                low: self.low.clone(),
                high: self.high.clone(),
            });
        }
        Ok((low, high))
    }

    pub fn dispatcher_addr(&self) -> String {
        format!("{}:{}", self.dispatcher_host, self.dispatcher_port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
