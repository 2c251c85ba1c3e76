// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

mod app;
mod args;
mod config;
mod controller;
mod error;
mod escape;
mod events;
mod helper;
mod hostfile;
mod layout;
mod logging;
mod prober;
mod rate_limiter;
mod render;
mod resolvers;
mod ring;
mod scheduler;
mod sequence_tracker;
mod snapshot;
mod tui;

use args::CliArgs;
use clap::Parser;

#[tokio::main(worker_threads = 8)]
async fn main() {
    let cli = CliArgs::parse();

    if let Err(err) = app::run(cli).await {
        eprintln!("paraping: {err}");
        std::process::exit(1);
    }
}
