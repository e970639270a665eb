//! Runtime statistics and data structures.
//!
//! [Stats] is the session-wide accumulator: every [ProbeOutcome] and every
//! hostname re-resolution is folded into it exactly once. Reporters only
//! ever read it, usually through the [Summary] snapshot.

use crate::{
    cli::Args,
    interval::{IntervalTracker, LongestInterval, Period},
    rtt::{self, RttSummary},
};
use chrono::{DateTime, Local};
use std::{net::IpAddr, time::Duration};

/// Result of a single probe. Ephemeral: consumed by [Stats::apply].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeOutcome {
    pub success: bool,
    /// Connect latency in ms; only meaningful when `success` is set.
    pub rtt_ms: f64,
    pub timestamp: DateTime<Local>,
}

/// Current side of the up/down state machine and when it was entered.
///
/// The session starts up, but an up period only begins with a successful
/// probe, so `since` stays `None` until the target first answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    Up { since: Option<DateTime<Local>> },
    Down { since: DateTime<Local> },
}

/// Point-in-time roll-up handed to the reporters for the final report.
#[derive(Clone, Debug)]
pub struct Summary {
    pub hostname: String,
    pub addr: IpAddr,
    pub port: u16,
    pub is_ip: bool,
    pub total_packets: u64,
    pub successful: u64,
    pub unsuccessful: u64,
    /// `None` when no probe has been sent yet.
    pub packet_loss: Option<f64>,
    pub last_successful: Option<DateTime<Local>>,
    pub last_unsuccessful: Option<DateTime<Local>>,
    pub total_uptime: Duration,
    pub total_downtime: Duration,
    pub longest_uptime: Option<LongestInterval>,
    pub longest_downtime: Option<LongestInterval>,
    /// `None` for literal-IP targets, which never re-resolve.
    pub retried_resolves: Option<u64>,
    pub rtt: RttSummary,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub duration: Duration,
}

/// Mutable accumulator used during a session.
#[derive(Clone, Debug)]
pub struct Stats {
    hostname: String,
    addr: IpAddr,
    port: u16,
    is_ip: bool,
    successful: u64,
    unsuccessful: u64,
    last_successful: Option<DateTime<Local>>,
    last_unsuccessful: Option<DateTime<Local>>,
    total_uptime: Duration,
    total_downtime: Duration,
    state: Connectivity,
    ongoing_unsuccessful: u64,
    retried_resolves: u64,
    rtt: Vec<f64>,
    intervals: IntervalTracker,
    start_time: DateTime<Local>,
    end_time: Option<DateTime<Local>>,
    last_observation: DateTime<Local>,
}

impl Stats {
    /// Create a new accumulator. The session starts in the up state.
    pub fn new(
        hostname: impl Into<String>,
        addr: IpAddr,
        port: u16,
        is_ip: bool,
        start_time: DateTime<Local>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            addr,
            port,
            is_ip,
            successful: 0,
            unsuccessful: 0,
            last_successful: None,
            last_unsuccessful: None,
            total_uptime: Duration::ZERO,
            total_downtime: Duration::ZERO,
            state: Connectivity::Up { since: None },
            ongoing_unsuccessful: 0,
            retried_resolves: 0,
            rtt: Vec::new(),
            intervals: IntervalTracker::new(),
            start_time,
            end_time: None,
            last_observation: start_time,
        }
    }

    /// Fold one probe outcome into the aggregates.
    ///
    /// Returns the period closed by this outcome, if it caused a transition.
    pub fn apply(&mut self, outcome: &ProbeOutcome) -> Option<Period> {
        let ts = outcome.timestamp;
        let elapsed = (ts - self.last_observation).to_std().unwrap_or_default();
        self.last_observation = ts;

        // time since the previous observation belongs to the state we were in
        match self.state {
            Connectivity::Up { .. } => self.total_uptime += elapsed,
            Connectivity::Down { .. } => self.total_downtime += elapsed,
        }

        if outcome.success {
            self.successful += 1;
            self.last_successful = Some(ts);
            self.ongoing_unsuccessful = 0;
            self.rtt.push(outcome.rtt_ms);

            match self.state {
                Connectivity::Down { since } => {
                    self.intervals.observe(Period::Down, since, ts);
                    self.state = Connectivity::Up { since: Some(ts) };
                    return Some(Period::Down);
                }
                Connectivity::Up { since: None } => {
                    self.state = Connectivity::Up { since: Some(ts) };
                }
                Connectivity::Up { since: Some(_) } => {}
            }
        } else {
            self.unsuccessful += 1;
            self.last_unsuccessful = Some(ts);
            self.ongoing_unsuccessful += 1;

            if let Connectivity::Up { since } = self.state {
                if let Some(since) = since {
                    self.intervals.observe(Period::Up, since, ts);
                }
                self.state = Connectivity::Down { since: ts };
                return Some(Period::Up);
            }
        }
        None
    }

    /// Count one hostname re-resolution attempt.
    ///
    /// Callers must only invoke this for hostname targets.
    pub fn apply_resolution_retry(&mut self) {
        self.retried_resolves += 1;
        self.ongoing_unsuccessful = 0;
    }

    /// Record the address a re-resolution produced.
    pub fn set_resolved_addr(&mut self, addr: IpAddr) {
        self.addr = addr;
    }

    /// Mark the session as terminated.
    pub fn finish(&mut self, end_time: DateTime<Local>) {
        self.end_time = Some(end_time);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_ip(&self) -> bool {
        self.is_ip
    }

    pub fn successful(&self) -> u64 {
        self.successful
    }

    pub fn unsuccessful(&self) -> u64 {
        self.unsuccessful
    }

    pub fn total_packets(&self) -> u64 {
        self.successful + self.unsuccessful
    }

    pub fn last_successful(&self) -> Option<DateTime<Local>> {
        self.last_successful
    }

    pub fn last_unsuccessful(&self) -> Option<DateTime<Local>> {
        self.last_unsuccessful
    }

    pub fn total_uptime(&self) -> Duration {
        self.total_uptime
    }

    pub fn total_downtime(&self) -> Duration {
        self.total_downtime
    }

    pub fn state(&self) -> Connectivity {
        self.state
    }

    pub fn is_down(&self) -> bool {
        matches!(self.state, Connectivity::Down { .. })
    }

    /// Start of the current downtime period; `Some` exactly while down.
    pub fn down_since(&self) -> Option<DateTime<Local>> {
        match self.state {
            Connectivity::Down { since } => Some(since),
            Connectivity::Up { .. } => None,
        }
    }

    fn up_since(&self) -> Option<DateTime<Local>> {
        match self.state {
            Connectivity::Up { since } => since,
            Connectivity::Down { .. } => None,
        }
    }

    pub fn ongoing_unsuccessful(&self) -> u64 {
        self.ongoing_unsuccessful
    }

    pub fn retried_resolves(&self) -> u64 {
        self.retried_resolves
    }

    pub fn rtt_samples(&self) -> &[f64] {
        &self.rtt
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end_time
    }

    /// Percentage of failed probes; `None` before the first probe.
    pub fn packet_loss(&self) -> Option<f64> {
        let total = self.total_packets();
        (total > 0).then(|| self.unsuccessful as f64 / total as f64 * 100.0)
    }

    /// End point for report-time figures: the end time once terminated,
    /// else `now`.
    fn reference(&self, now: DateTime<Local>) -> DateTime<Local> {
        self.end_time.unwrap_or(now)
    }

    /// Time between the last probe and the reference, owed to the current state.
    fn unattributed(&self, now: DateTime<Local>) -> Duration {
        (self.reference(now) - self.last_observation)
            .to_std()
            .unwrap_or_default()
    }

    /// Cumulative uptime, with the open stretch since the last probe counted.
    pub fn total_uptime_at(&self, now: DateTime<Local>) -> Duration {
        match self.state {
            Connectivity::Up { .. } => self.total_uptime + self.unattributed(now),
            Connectivity::Down { .. } => self.total_uptime,
        }
    }

    /// Cumulative downtime, with the open stretch since the last probe counted.
    pub fn total_downtime_at(&self, now: DateTime<Local>) -> Duration {
        match self.state {
            Connectivity::Down { .. } => self.total_downtime + self.unattributed(now),
            Connectivity::Up { .. } => self.total_downtime,
        }
    }

    /// Longest uptime including the still-open up period.
    pub fn longest_uptime(&self, now: DateTime<Local>) -> Option<LongestInterval> {
        self.intervals
            .longest_at(Period::Up, self.up_since(), self.reference(now))
    }

    /// Longest downtime including the still-open down period.
    pub fn longest_downtime(&self, now: DateTime<Local>) -> Option<LongestInterval> {
        self.intervals
            .longest_at(Period::Down, self.down_since(), self.reference(now))
    }

    /// Time spent in the current downtime period, if down.
    pub fn current_downtime(&self, now: DateTime<Local>) -> Option<Duration> {
        self.down_since()
            .map(|since| (now - since).to_std().unwrap_or_default())
    }

    /// Session length: up to the end time once terminated, else up to `now`.
    pub fn duration(&self, now: DateTime<Local>) -> Duration {
        (self.reference(now) - self.start_time).to_std().unwrap_or_default()
    }

    /// Produce the [Summary] as of `now`.
    pub fn summary(&self, now: DateTime<Local>) -> Summary {
        Summary {
            hostname: self.hostname.clone(),
            addr: self.addr,
            port: self.port,
            is_ip: self.is_ip,
            total_packets: self.total_packets(),
            successful: self.successful,
            unsuccessful: self.unsuccessful,
            packet_loss: self.packet_loss(),
            last_successful: self.last_successful,
            last_unsuccessful: self.last_unsuccessful,
            total_uptime: self.total_uptime_at(now),
            total_downtime: self.total_downtime_at(now),
            longest_uptime: self.longest_uptime(now),
            longest_downtime: self.longest_downtime(now),
            retried_resolves: (!self.is_ip).then_some(self.retried_resolves),
            rtt: rtt::summarize(&self.rtt),
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration(now),
        }
    }

    /// Should the main loop continue?
    pub fn should_continue(&self, args: &Args) -> bool {
        args.continuous || self.total_packets() < args.count
    }

    /// Should we break early because -e/--exit-on-success?
    pub fn should_break(&self, success: bool, args: &Args) -> bool {
        success && args.exit_on_success
    }

    /// Should a hostname target be re-resolved after this many failures?
    pub fn should_retry_resolve(&self, args: &Args) -> bool {
        !self.is_ip && args.retry_resolve > 0 && self.ongoing_unsuccessful >= args.retry_resolve
    }

    /// Map statistics to a conventional Unix exit code.
    pub fn exit_code(&self) -> i32 {
        if self.unsuccessful == 0 && self.successful > 0 {
            0
        } else {
            1
        }
    }
}
