//! Argument parsing layer (clap).

use clap::{Parser, ValueEnum};

/// Global CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Target hostname or IP address
    pub host: String,

    /// Target TCP port
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Number of probes (`-c`)
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: u64,

    /// Keep probing until Ctrl-C (`-t`)
    #[arg(short = 't', long)]
    pub continuous: bool,

    /// Seconds to wait between probes (`-i`)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Output format (`-o`)
    #[arg(
        short = 'o',
        long,
        value_enum,
        default_value_t = OutputMode::Plain,
        help = "plain | json"
    )]
    pub output_mode: OutputMode,

    /// Disable ANSI colors in plain output
    #[arg(long)]
    pub no_color: bool,

    /// Re-resolve the hostname after this many consecutive failures, 0 = never (`-r`)
    #[arg(short = 'r', long, default_value_t = 0)]
    pub retry_resolve: u64,

    /// Only use IPv4 addresses (`-4`)
    #[arg(short = '4', long, conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Only use IPv6 addresses (`-6`)
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Exit after first success (`-e`)
    #[arg(short = 'e', long)]
    pub exit_on_success: bool,

    /// Timeout per probe (ms)
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,
}

/// Supported output modes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Plain, // human-readable, colored unless --no-color
    Json,  // one JSON event per line
}
