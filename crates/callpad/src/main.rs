// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use elevator_callpad::config::CallpadConfig;

#[derive(Parser)]
#[command(name = "elevator-callpad", version, about = "Elevator call-pad client")]
struct Cli {
    #[command(flatten)]
    config: CallpadConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match elevator_callpad::run(cli.config).await {
        Ok(message) => println!("{message}"),
        Err(e) => {
            println!("{e}");
            std::process::exit(1);
        }
    }
}
