//! Process boundary for the runner binaries.
//!
//! Reads the invocation arguments and the config-file environment variable
//! exactly once, installs logging, and turns every error into a non-zero
//! exit.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::CONFIG_ENV_VAR;
use crate::error::ConfigError;
use crate::runner::Runner;

pub fn run_mot_challenge() -> Result<()> {
    run(Runner::mot_challenge())
}

pub fn run_kitti() -> Result<()> {
    run(Runner::kitti())
}

fn run(mut runner: Runner) -> Result<()> {
    init_logging();

    let config_file = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    match runner.configure(std::env::args_os(), config_file.as_deref()) {
        // Help, version and usage errors print themselves with clap's exit code.
        Err(ConfigError::Cli(err)) => err.exit(),
        other => other?,
    }

    runner.run()?;
    Ok(())
}

/// RUST_LOG takes precedence; otherwise INFO, so PRINT_CONFIG output shows.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
