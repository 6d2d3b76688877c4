//! `freshet run` - the dev loop.

use std::fs;

use anyhow::{Context, Result};

use crate::actor::Coordinator;
use crate::config::RunnerConfig;
use crate::core::{OPEN_FILE_LIMIT, ShutdownSignal, raise_open_file_limit};

/// Async workers: supervisors and output forwarding are light.
const WORKER_THREADS: usize = 2;

/// Handle `freshet run`. Blocks until shutdown or a fatal first failure.
pub fn run_loop(config: RunnerConfig, shutdown: ShutdownSignal) -> Result<()> {
    raise_open_file_limit(OPEN_FILE_LIMIT);
    prepare_tmp_dir(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(Coordinator::new(config, shutdown).run())
}

fn prepare_tmp_dir(config: &RunnerConfig) -> Result<()> {
    let dir = &config.build.tmp_dir;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create '{}'", dir.display()))
}
