//! Freshet - rebuild, restart and live-reload an app on every save.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod runner;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::RunnerConfig;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    let shutdown = core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if cli.is_init() {
        return cli::init::init_config(&cli);
    }

    let config = RunnerConfig::load(&cli)?;
    cli::run::run_loop(config, shutdown)
}
