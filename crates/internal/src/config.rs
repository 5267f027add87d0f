// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// The single operation this invocation performs, matching the original
/// `internal <car> <op>` command-line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Operation {
    Open,
    Close,
    Stop,
    ServiceOn,
    ServiceOff,
    Up,
    Down,
}

/// Configuration for a single internal-service invocation. Both arguments
/// are positional, matching the original `internal <car> <op>` shape; there
/// is no `env` fallback on the operation, since it's a one-shot choice made
/// once per run.
#[derive(Debug, Clone, clap::Args)]
pub struct InternalConfig {
    /// Car name whose shared-memory segment to open.
    #[arg(env = "ELEVATOR_CAR_NAME")]
    pub name: String,

    /// Operation to perform against that car.
    #[arg(value_enum)]
    pub op: Operation,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
