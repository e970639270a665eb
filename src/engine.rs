//! High-level orchestrator: resolve → probe loop → output.
//!
//! The probe loop runs as its own task while the main task waits for
//! Ctrl-C. Statistics and printer live together in one [Session] behind a
//! mutex, so an outcome is applied and printed before anyone else can
//! observe the statistics.

use crate::{
    cli::Args,
    error::Result,
    formatter::{self, Formatter},
    interval::Period,
    probe::probe_once,
    resolve::{self, Family},
    stats::Stats,
};
use chrono::Local;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::{
    signal,
    time::{sleep, Duration},
};
use tracing::{info, warn};

/// Statistics plus the printer that renders them.
pub struct Session {
    pub stats: Stats,
    pub out: Box<dyn Formatter>,
}

/// Handle shared between the probe loop and the reporting side.
#[derive(Clone)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(stats: Stats, out: Box<dyn Formatter>) -> Self {
        Self(Arc::new(Mutex::new(Session { stats, out })))
    }

    /// Exclusive access. Every mutation completes before the guard drops,
    /// so a poisoned lock still holds consistent statistics.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn run(args: Args) -> Result<i32> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_async(args))
}

fn family(args: &Args) -> Family {
    match (args.ipv4, args.ipv6) {
        (true, _) => Family::V4,
        (_, true) => Family::V6,
        _ => Family::Any,
    }
}

async fn run_async(args: Args) -> Result<i32> {
    /* address resolution */
    let is_ip = resolve::is_literal_ip(&args.host);
    let ip = resolve::resolve(&args.host, args.port, family(&args)).await?;
    info!(host = %args.host, %ip, port = args.port, "target resolved");

    /* stats + formatter */
    let stats = Stats::new(args.host.clone(), ip, args.port, is_ip, Local::now());
    let fmt = formatter::from_mode(args.output_mode, !args.no_color);
    let session = SharedSession::new(stats, fmt);

    {
        let mut guard = session.lock();
        let Session { stats, out } = &mut *guard;
        out.start(stats)?;
    }

    /* probe loop */
    let mut worker = tokio::spawn(probe_loop(session.clone(), args));

    /* Ctrl-C future */
    let sigint = signal::ctrl_c();
    tokio::pin!(sigint);

    let looped = tokio::select! {
        res = &mut worker => Some(res),
        _ = &mut sigint => None,
    };
    match looped {
        Some(res) => res??,
        None => {
            info!("interrupted");
            worker.abort();
        }
    }

    /* summary & exit code */
    let mut guard = session.lock();
    let now = Local::now();
    guard.stats.finish(now);
    let Session { stats, out } = &mut *guard;
    out.summary(stats, now)?;
    Ok(stats.exit_code())
}

async fn probe_loop(session: SharedSession, args: Args) -> Result<()> {
    let timeout = Duration::from_millis(args.timeout_ms);
    let interval = Duration::from_secs(args.interval);
    let family = family(&args);

    loop {
        let addr = {
            let guard = session.lock();
            if !guard.stats.should_continue(&args) {
                break;
            }
            SocketAddr::new(guard.stats.addr(), guard.stats.port())
        };

        let outcome = probe_once(addr, timeout).await;

        let (stop, retry) = {
            let mut guard = session.lock();
            let Session { stats, out } = &mut *guard;

            // report the outage length before the recovery clears it
            if outcome.success && stats.is_down() {
                out.total_downtime(stats, outcome.timestamp)?;
            }
            match stats.apply(&outcome) {
                Some(Period::Up) => info!(%addr, "target went down"),
                Some(Period::Down) => info!(%addr, "target is up again"),
                None => {}
            }
            out.reply(stats, &outcome)?;

            let retry = stats.should_retry_resolve(&args);
            if retry {
                out.retrying_to_resolve(stats)?;
                stats.apply_resolution_retry();
            }
            (stats.should_break(outcome.success, &args), retry)
        };

        if stop {
            break;
        }

        if retry {
            match resolve::resolve(&args.host, args.port, family).await {
                Ok(ip) => {
                    info!(host = %args.host, %ip, "re-resolved");
                    session.lock().stats.set_resolved_addr(ip);
                }
                Err(e) => {
                    warn!(host = %args.host, error = %e, "re-resolve failed, keeping previous address")
                }
            }
        }

        let more = session.lock().stats.should_continue(&args);
        if more {
            sleep(interval).await;
        }
    }
    Ok(())
}
