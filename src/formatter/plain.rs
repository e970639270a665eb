//! Plain-text printer for interactive terminals.

use super::{
    ceil_secs, fmt_hms, fmt_time, human_duration, target_label, Formatter, NO_REPLY, REPLY,
};
use crate::{interval::LongestInterval, rtt::RttSummary, stats::ProbeOutcome, stats::Stats};
use chrono::{DateTime, Local};
use std::io::{self, Write};

/// Semantic colors used by the plain printer. Purely decorative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Yellow,
    Green,
    Red,
    Cyan,
    LightYellow,
    LightBlue,
    LightGreen,
    LightCyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Yellow => "\x1b[33m",
            Color::Green => "\x1b[32m",
            Color::Red => "\x1b[31m",
            Color::Cyan => "\x1b[36m",
            Color::LightYellow => "\x1b[93m",
            Color::LightBlue => "\x1b[94m",
            Color::LightGreen => "\x1b[92m",
            Color::LightCyan => "\x1b[96m",
        }
    }
}

/// Colorize function injected into [Plain].
pub type Paint = fn(Color, &str) -> String;

/// ANSI escape painter for terminals.
pub fn ansi(color: Color, text: &str) -> String {
    format!("{}{text}\x1b[0m", color.code())
}

/// Painter that leaves text untouched.
pub fn no_color(_: Color, text: &str) -> String {
    text.to_owned()
}

pub struct Plain<W> {
    out: W,
    paint: Paint,
}

impl<W: Write> Plain<W> {
    pub fn new(out: W, paint: Paint) -> Self {
        Self { out, paint }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn put(&mut self, color: Color, text: &str) -> io::Result<()> {
        let painted = (self.paint)(color, text);
        self.out.write_all(painted.as_bytes())
    }

    fn longest(
        &mut self,
        label: &str,
        interval: Option<LongestInterval>,
        color: Color,
    ) -> io::Result<()> {
        // zero-length means nothing recorded yet
        let Some(i) = interval else {
            return Ok(());
        };
        self.put(Color::Yellow, label)?;
        self.put(color, &format!("{} ", human_duration(ceil_secs(i.duration))))?;
        self.put(Color::Yellow, "from ")?;
        self.put(Color::LightBlue, &format!("{} ", fmt_time(&i.start)))?;
        self.put(Color::Yellow, "to ")?;
        self.put(Color::LightBlue, &format!("{}\n", fmt_time(&i.end)))
    }

    fn rtt(&mut self, rtt: &RttSummary) -> io::Result<()> {
        self.put(Color::Yellow, "rtt ")?;
        self.put(Color::Green, "min")?;
        self.put(Color::Yellow, "/")?;
        self.put(Color::Cyan, "avg")?;
        self.put(Color::Yellow, "/")?;
        self.put(Color::Red, "max: ")?;
        self.put(Color::Green, &format!("{:.3}", rtt.min))?;
        self.put(Color::Yellow, "/")?;
        self.put(Color::Cyan, &format!("{:.3}", rtt.average))?;
        self.put(Color::Yellow, "/")?;
        self.put(Color::Red, &format!("{:.3}", rtt.max))?;
        self.put(Color::Yellow, " ms\n")
    }
}

impl<W: Write + Send> Formatter for Plain<W> {
    fn start(&mut self, s: &Stats) -> io::Result<()> {
        self.put(
            Color::LightCyan,
            &format!("TCPinging {} on port {}\n", s.hostname(), s.port()),
        )
    }

    fn reply(&mut self, s: &Stats, outcome: &ProbeOutcome) -> io::Result<()> {
        let target = target_label(s);
        if outcome.success {
            self.put(
                Color::LightGreen,
                &format!(
                    "{REPLY} from {target} on port {} TCP_conn={} time={:.3} ms\n",
                    s.port(),
                    s.successful(),
                    outcome.rtt_ms
                ),
            )
        } else {
            self.put(
                Color::Red,
                &format!(
                    "{NO_REPLY} from {target} on port {} TCP_conn={}\n",
                    s.port(),
                    s.unsuccessful()
                ),
            )
        }
    }

    fn last_probes(&mut self, s: &Stats) -> io::Result<()> {
        self.put(Color::Yellow, "last successful probe:   ")?;
        match s.last_successful() {
            Some(t) => self.put(Color::Green, &format!("{}\n", fmt_time(&t)))?,
            None => self.put(Color::Red, "Never succeeded\n")?,
        }

        self.put(Color::Yellow, "last unsuccessful probe: ")?;
        match s.last_unsuccessful() {
            Some(t) => self.put(Color::Red, &format!("{}\n", fmt_time(&t))),
            None => self.put(Color::Green, "Never failed\n"),
        }
    }

    fn retrying_to_resolve(&mut self, s: &Stats) -> io::Result<()> {
        self.put(
            Color::LightYellow,
            &format!("retrying to resolve {}\n", s.hostname()),
        )
    }

    fn retry_resolve_stats(&mut self, s: &Stats) -> io::Result<()> {
        self.put(Color::Yellow, "retried to resolve hostname ")?;
        self.put(Color::Red, &format!("{} ", s.retried_resolves()))?;
        self.put(Color::Yellow, "times\n")
    }

    fn total_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let Some(down) = s.current_downtime(now) else {
            return Ok(());
        };
        self.put(
            Color::Yellow,
            &format!(
                "No response received for {}\n",
                human_duration(ceil_secs(down))
            ),
        )
    }

    fn longest_uptime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        self.longest(
            "longest consecutive uptime:   ",
            s.longest_uptime(now),
            Color::Green,
        )
    }

    fn longest_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        self.longest(
            "longest consecutive downtime: ",
            s.longest_downtime(now),
            Color::Red,
        )
    }

    fn duration_stats(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        self.put(Color::Yellow, "--------------------------------------\n")?;
        self.put(
            Color::Yellow,
            &format!("TCPing started at: {}\n", fmt_time(&s.start_time())),
        )?;
        // the end time is only known once the session was terminated
        if let Some(end) = s.end_time() {
            self.put(
                Color::Yellow,
                &format!("TCPing ended at:   {}\n", fmt_time(&end)),
            )?;
        }
        self.put(
            Color::Yellow,
            &format!("duration (HH:MM:SS): {}\n\n", fmt_hms(s.duration(now))),
        )
    }

    fn summary(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let sum = s.summary(now);

        self.put(
            Color::Yellow,
            &format!("\n--- {} TCPing statistics ---\n", target_label(s)),
        )?;
        self.put(
            Color::Yellow,
            &format!(
                "{} probes transmitted on port {} | {} received",
                sum.total_packets, sum.port, sum.successful
            ),
        )?;
        match sum.packet_loss {
            Some(loss) => {
                self.put(Color::Yellow, ", ")?;
                let color = if loss == 0.0 {
                    Color::Green
                } else if loss <= 30.0 {
                    Color::LightYellow
                } else {
                    Color::Red
                };
                self.put(color, &format!("{loss:.2}%"))?;
                self.put(Color::Yellow, " packet loss\n")?;
            }
            None => self.put(Color::Yellow, "\n")?,
        }

        self.put(Color::Yellow, "successful probes:   ")?;
        self.put(Color::Green, &format!("{}\n", sum.successful))?;
        self.put(Color::Yellow, "unsuccessful probes: ")?;
        self.put(Color::Red, &format!("{}\n", sum.unsuccessful))?;

        self.last_probes(s)?;

        self.put(Color::Yellow, "total uptime: ")?;
        self.put(
            Color::Green,
            &format!("  {}\n", human_duration(ceil_secs(sum.total_uptime))),
        )?;
        self.put(Color::Yellow, "total downtime: ")?;
        self.put(
            Color::Red,
            &format!("{}\n", human_duration(ceil_secs(sum.total_downtime))),
        )?;

        self.longest("longest consecutive uptime:   ", sum.longest_uptime, Color::Green)?;
        self.longest("longest consecutive downtime: ", sum.longest_downtime, Color::Red)?;

        if sum.retried_resolves.is_some() {
            self.retry_resolve_stats(s)?;
        }

        if sum.rtt.has_results {
            self.rtt(&sum.rtt)?;
        }

        self.duration_stats(s, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::{at, fail, hostname_stats, ok};

    fn render(f: impl FnOnce(&mut Plain<Vec<u8>>) -> io::Result<()>) -> String {
        let mut p = Plain::new(Vec::new(), no_color);
        f(&mut p).unwrap();
        String::from_utf8(p.into_inner()).unwrap()
    }

    #[test]
    fn start_names_host_and_port() {
        let s = hostname_stats();
        assert_eq!(
            render(|p| p.start(&s)),
            "TCPinging example.com on port 443\n"
        );
    }

    #[test]
    fn reply_lines() {
        let mut s = hostname_stats();
        let o = ok(1, 12.3456);
        s.apply(&o);
        assert_eq!(
            render(|p| p.reply(&s, &o)),
            "Reply from example.com (93.184.216.34) on port 443 TCP_conn=1 time=12.346 ms\n"
        );

        let o = fail(2);
        s.apply(&o);
        assert_eq!(
            render(|p| p.reply(&s, &o)),
            "No reply from example.com (93.184.216.34) on port 443 TCP_conn=1\n"
        );
    }

    #[test]
    fn reply_for_literal_ip_omits_hostname() {
        let mut s = Stats::new("10.0.0.1", "10.0.0.1".parse().unwrap(), 22, true, at(0));
        let o = fail(1);
        s.apply(&o);
        assert_eq!(
            render(|p| p.reply(&s, &o)),
            "No reply from 10.0.0.1 on port 22 TCP_conn=1\n"
        );
    }

    #[test]
    fn never_markers() {
        let s = hostname_stats();
        let out = render(|p| p.last_probes(&s));
        assert!(out.contains("Never succeeded"));
        assert!(out.contains("Never failed"));
    }

    #[test]
    fn total_downtime_rounds_up() {
        let mut s = hostname_stats();
        s.apply(&fail(10));
        let now = at(135) - chrono::TimeDelta::milliseconds(500);
        assert_eq!(
            render(|p| p.total_downtime(&s, now)),
            "No response received for 2 minutes 5 seconds\n"
        );
    }

    #[test]
    fn summary_suppresses_missing_downtime() {
        let mut s = hostname_stats();
        for t in 1..=5 {
            s.apply(&ok(t, 10.0));
        }
        let out = render(|p| p.summary(&s, at(6)));
        assert!(out.contains("5 probes transmitted on port 443 | 5 received, 0.00% packet loss"));
        assert!(out.contains("total uptime:   6 seconds"));
        assert!(out.contains("longest consecutive uptime:   5 seconds"));
        assert!(!out.contains("longest consecutive downtime"));
        assert!(out.contains("retried to resolve hostname 0 times"));
        assert!(out.contains("rtt min/avg/max: 10.000/10.000/10.000 ms"));
    }

    #[test]
    fn summary_with_loss_and_no_rtt() {
        let mut s = hostname_stats();
        for t in 1..=3 {
            s.apply(&fail(t));
        }
        let out = render(|p| p.summary(&s, at(4)));
        assert!(out.contains("100.00% packet loss"));
        assert!(!out.contains("rtt"));
        assert!(out.contains("total downtime: 3 seconds"));
        assert!(out.contains("longest consecutive downtime: 3 seconds"));
        assert!(!out.contains("longest consecutive uptime"));
    }

    #[test]
    fn failed_first_probe_reports_no_uptime_interval() {
        let mut s = hostname_stats();
        s.apply(&ProbeOutcome {
            success: false,
            rtt_ms: 2000.0,
            timestamp: at(0) + chrono::TimeDelta::milliseconds(5),
        });
        s.apply(&fail(1));
        s.apply(&fail(2));
        let out = render(|p| p.summary(&s, at(3)));
        assert!(!out.contains("longest consecutive uptime"));
        assert!(out.contains("longest consecutive downtime: 3 seconds"));
    }

    #[test]
    fn summary_without_probes_has_no_packet_loss() {
        let s = hostname_stats();
        let out = render(|p| p.summary(&s, at(1)));
        assert!(out.contains("0 probes transmitted on port 443 | 0 received\n"));
        assert!(!out.contains("packet loss"));
    }

    #[test]
    fn duration_shows_end_once_finished() {
        let mut s = hostname_stats();
        let running = render(|p| p.duration_stats(&s, at(65)));
        assert!(!running.contains("ended at"));
        assert!(running.contains("duration (HH:MM:SS): 00:01:05"));

        s.finish(at(3_600));
        let done = render(|p| p.duration_stats(&s, at(9_999)));
        assert!(done.contains("TCPing ended at:"));
        assert!(done.contains("duration (HH:MM:SS): 01:00:00"));
    }

    #[test]
    fn ansi_painter_wraps_text() {
        assert_eq!(ansi(Color::Red, "x"), "\x1b[31mx\x1b[0m");
    }
}
