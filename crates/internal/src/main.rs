// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use elevator_internal::config::InternalConfig;

#[derive(Parser)]
#[command(name = "elevator-internal", version, about = "Elevator internal-service client")]
struct Cli {
    #[command(flatten)]
    config: InternalConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = elevator_internal::run(cli.config).await {
        println!("{e}");
        std::process::exit(1);
    }
}
