//! Pluggable output layer.
//!
//! Both printers expose the same operations and read [Stats] without
//! mutating it. The variant is picked once, at startup, by [from_mode].

mod json;
mod plain;

pub use json::Json;
pub use plain::{ansi, no_color, Color, Paint, Plain};

use crate::{
    cli::OutputMode,
    stats::{ProbeOutcome, Stats},
};
use chrono::{DateTime, Local};
use std::{io, time::Duration};

/// Marker used in replies for successful probes.
pub const REPLY: &str = "Reply";
/// Marker used in replies for failed probes, in place of a latency.
pub const NO_REPLY: &str = "No reply";

/// Timestamp layout for human-readable output.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print behaviour contract.
///
/// A failed write is returned to the caller; the statistics are untouched.
pub trait Formatter: Send {
    /// Announce the target before probing begins.
    fn start(&mut self, s: &Stats) -> io::Result<()>;
    /// Render one probe outcome, after it has been applied to `s`.
    fn reply(&mut self, s: &Stats, outcome: &ProbeOutcome) -> io::Result<()>;
    fn last_probes(&mut self, s: &Stats) -> io::Result<()>;
    fn retrying_to_resolve(&mut self, s: &Stats) -> io::Result<()>;
    fn retry_resolve_stats(&mut self, s: &Stats) -> io::Result<()>;
    /// Time since the current outage began. Only meaningful while down.
    fn total_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()>;
    fn longest_uptime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()>;
    fn longest_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()>;
    fn duration_stats(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()>;
    /// Full end-of-session report.
    fn summary(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()>;
}

/// Render a wall-clock timestamp.
pub fn fmt_time(t: &DateTime<Local>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// `HH:MM:SS`; hours keep counting past a day.
pub fn fmt_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

/// Whole seconds, rounded up.
pub fn ceil_secs(d: Duration) -> u64 {
    d.as_secs_f64().ceil() as u64
}

/// Spell out a number of seconds, e.g. `1 hour 2 minutes 5 seconds`.
pub fn human_duration(secs: u64) -> String {
    let parts = [
        (secs / 3600, "hour"),
        (secs % 3600 / 60, "minute"),
        (secs % 60, "second"),
    ];

    let words: Vec<String> = parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|&(n, unit)| match n {
            1 => format!("1 {unit}"),
            _ => format!("{n} {unit}s"),
        })
        .collect();

    if words.is_empty() {
        "0 seconds".into()
    } else {
        words.join(" ")
    }
}

/// `host (ip)` for hostname targets, bare `ip` for literal ones.
pub(crate) fn target_label(s: &Stats) -> String {
    if s.is_ip() {
        s.addr().to_string()
    } else {
        format!("{} ({})", s.hostname(), s.addr())
    }
}

/* ---------- Factory ---------- */

pub fn from_mode(mode: OutputMode, color: bool) -> Box<dyn Formatter> {
    match mode {
        OutputMode::Plain => {
            let paint: Paint = if color { ansi } else { no_color };
            Box::new(Plain::new(io::stdout(), paint))
        }
        OutputMode::Json => Box::new(Json::new(io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_duration_units() {
        assert_eq!(human_duration(0), "0 seconds");
        assert_eq!(human_duration(1), "1 second");
        assert_eq!(human_duration(125), "2 minutes 5 seconds");
        assert_eq!(human_duration(3600), "1 hour");
        assert_eq!(human_duration(7261), "2 hours 1 minute 1 second");
    }

    #[test]
    fn hms_does_not_wrap_days() {
        assert_eq!(fmt_hms(Duration::from_secs(59)), "00:00:59");
        assert_eq!(fmt_hms(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(fmt_hms(Duration::from_secs(90_000)), "25:00:00");
    }

    #[test]
    fn ceil_rounds_partial_seconds_up() {
        assert_eq!(ceil_secs(Duration::from_millis(124_001)), 125);
        assert_eq!(ceil_secs(Duration::from_secs(125)), 125);
    }
}
