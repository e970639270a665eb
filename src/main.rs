//! Binary entry point for **tcpstat**.
//!
//! * Parses CLI arguments.
//! * Installs logging on stderr (`RUST_LOG`, default `warn`).
//! * Runs the probing engine.

use clap::Parser;
use std::{io, process::ExitCode};
use tcpstat::{cli::Args, engine, error::Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    // stdout carries the report stream, keep diagnostics off it
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<ExitCode> {
    init_logging();

    let args = Args::parse();
    let exit_code = engine::run(args)?;
    Ok(if exit_code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
