// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the safety supervisor process.
#[derive(Debug, Clone, clap::Args)]
pub struct SafetyConfig {
    /// Car name whose segment this process attaches to.
    #[arg(env = "ELEVATOR_CAR_NAME")]
    pub name: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
