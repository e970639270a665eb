//! Low-level asynchronous TCP probe utilities.
//!
//! This module provides [`probe_once`], a helper that performs a single
//! non-blocking TCP `connect()` with a configurable timeout.

use crate::stats::ProbeOutcome;
use chrono::Local;
use std::net::SocketAddr;
use tokio::{
    net::TcpStream,
    time::{timeout, Duration, Instant},
};
use tracing::debug;

/// Attempt one TCP connection and measure its round-trip time.
///
/// * `addr` – socket address to probe
/// * `to`   – timeout for the connection attempt
///
/// The outcome is stamped with the wall-clock time the attempt started.
/// Refused, unreachable and timed-out connects all count as failures.
pub async fn probe_once(addr: SocketAddr, to: Duration) -> ProbeOutcome {
    let timestamp = Local::now();
    let start = Instant::now();
    let res = timeout(to, TcpStream::connect(addr)).await;
    let rtt_ms = start.elapsed().as_secs_f64() * 1_000.0;

    let success = match res {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "connect failed");
            false
        }
        Err(_) => {
            debug!(%addr, timeout_ms = to.as_millis() as u64, "connect timed out");
            false
        }
    };

    ProbeOutcome {
        success,
        rtt_ms,
        timestamp,
    }
}
