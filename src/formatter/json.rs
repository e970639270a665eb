//! JSON-lines printer: one self-describing record per call.

use super::{ceil_secs, fmt_hms, fmt_time, human_duration, target_label, Formatter, NO_REPLY, REPLY};
use crate::{
    interval::LongestInterval,
    stats::{ProbeOutcome, Stats},
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::{
    io::{self, Write},
    net::IpAddr,
};

/// Kind tag carried by every record.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Start,
    Probe,
    Retry,
    Stats,
}

/// One output line.
#[derive(Serialize)]
struct Event<'a> {
    #[serde(rename = "type")]
    kind: EventType,
    message: String,
    timestamp: DateTime<Local>,
    #[serde(flatten)]
    fields: Fields<'a>,
}

/// Event-specific fields. Anything left `None` is omitted from the record,
/// so a zero value always means zero and never "not applicable".
#[derive(Serialize, Default)]
struct Fields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    addr: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_ip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_successful_probe: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_unsuccessful_probe: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_uptime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_uptime_start: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_uptime_end: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_downtime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_downtime_start: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_downtime_end: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_packet_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_successful_probes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_unsuccessful_probes: Option<u64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    total_uptime: Option<f64>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    total_downtime: Option<f64>,
    /// Whole seconds of the outage that just ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    downtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retried_hostname_resolves: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtt_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtt_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtt_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Local>>,
    /// Session length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

impl<'a> Fields<'a> {
    fn with_uptime(mut self, i: Option<LongestInterval>) -> Self {
        if let Some(i) = i {
            self.longest_uptime = Some(i.duration.as_secs_f64());
            self.longest_uptime_start = Some(i.start);
            self.longest_uptime_end = Some(i.end);
        }
        self
    }

    fn with_downtime(mut self, i: Option<LongestInterval>) -> Self {
        if let Some(i) = i {
            self.longest_downtime = Some(i.duration.as_secs_f64());
            self.longest_downtime_start = Some(i.start);
            self.longest_downtime_end = Some(i.end);
        }
        self
    }
}

pub struct Json<W> {
    out: W,
}

impl<W: Write> Json<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(
        &mut self,
        kind: EventType,
        message: String,
        timestamp: DateTime<Local>,
        fields: Fields<'_>,
    ) -> io::Result<()> {
        let event = Event {
            kind,
            message,
            timestamp,
            fields,
        };
        serde_json::to_writer(&mut self.out, &event)?;
        self.out.write_all(b"\n")
    }

    fn longest_message(label: &str, i: &LongestInterval) -> String {
        format!(
            "longest consecutive {label}: {} from {} to {}",
            human_duration(ceil_secs(i.duration)),
            fmt_time(&i.start),
            fmt_time(&i.end)
        )
    }
}

impl<W: Write + Send> Formatter for Json<W> {
    fn start(&mut self, s: &Stats) -> io::Result<()> {
        self.emit(
            EventType::Start,
            format!("TCPinging {} on port {}", s.hostname(), s.port()),
            s.start_time(),
            Fields {
                hostname: Some(s.hostname()),
                port: Some(s.port()),
                ..Default::default()
            },
        )
    }

    fn reply(&mut self, s: &Stats, outcome: &ProbeOutcome) -> io::Result<()> {
        let mut fields = Fields {
            success: Some(outcome.success),
            addr: Some(s.addr()),
            hostname: (!s.is_ip()).then(|| s.hostname()),
            is_ip: Some(s.is_ip()),
            port: Some(s.port()),
            ..Default::default()
        };
        let marker = if outcome.success {
            fields.latency = Some(outcome.rtt_ms);
            fields.total_successful_probes = Some(s.successful());
            REPLY
        } else {
            fields.total_unsuccessful_probes = Some(s.unsuccessful());
            NO_REPLY
        };

        self.emit(
            EventType::Probe,
            format!("{marker} from {} on port {}", target_label(s), s.port()),
            outcome.timestamp,
            fields,
        )
    }

    fn last_probes(&mut self, s: &Stats) -> io::Result<()> {
        let show = |t: Option<DateTime<Local>>, never: &str| {
            t.as_ref().map(fmt_time).unwrap_or_else(|| never.to_owned())
        };
        self.emit(
            EventType::Stats,
            format!(
                "last successful probe: {}, last unsuccessful probe: {}",
                show(s.last_successful(), "never succeeded"),
                show(s.last_unsuccessful(), "never failed")
            ),
            Local::now(),
            Fields {
                last_successful_probe: s.last_successful(),
                last_unsuccessful_probe: s.last_unsuccessful(),
                ..Default::default()
            },
        )
    }

    fn retrying_to_resolve(&mut self, s: &Stats) -> io::Result<()> {
        self.emit(
            EventType::Retry,
            format!("retrying to resolve {}", s.hostname()),
            Local::now(),
            Fields {
                hostname: Some(s.hostname()),
                ..Default::default()
            },
        )
    }

    fn retry_resolve_stats(&mut self, s: &Stats) -> io::Result<()> {
        self.emit(
            EventType::Stats,
            format!("retried to resolve hostname {} times", s.retried_resolves()),
            Local::now(),
            Fields {
                hostname: Some(s.hostname()),
                retried_hostname_resolves: Some(s.retried_resolves()),
                ..Default::default()
            },
        )
    }

    fn total_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let Some(down) = s.current_downtime(now) else {
            return Ok(());
        };
        let secs = ceil_secs(down);
        self.emit(
            EventType::Stats,
            format!("No response received for {}", human_duration(secs)),
            now,
            Fields {
                downtime: Some(secs),
                ..Default::default()
            },
        )
    }

    fn longest_uptime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let Some(i) = s.longest_uptime(now) else {
            return Ok(());
        };
        self.emit(
            EventType::Stats,
            Self::longest_message("uptime", &i),
            now,
            Fields::default().with_uptime(Some(i)),
        )
    }

    fn longest_downtime(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let Some(i) = s.longest_downtime(now) else {
            return Ok(());
        };
        self.emit(
            EventType::Stats,
            Self::longest_message("downtime", &i),
            now,
            Fields::default().with_downtime(Some(i)),
        )
    }

    fn duration_stats(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let end = match s.end_time() {
            Some(t) => format!("ended at: {}", fmt_time(&t)),
            None => "still running".to_owned(),
        };
        let duration = s.duration(now);
        self.emit(
            EventType::Stats,
            format!(
                "started at: {} {end} duration (HH:MM:SS): {}",
                fmt_time(&s.start_time()),
                fmt_hms(duration)
            ),
            now,
            Fields {
                start_time: Some(s.start_time()),
                end_time: s.end_time(),
                duration: Some(duration.as_secs_f64()),
                ..Default::default()
            },
        )
    }

    fn summary(&mut self, s: &Stats, now: DateTime<Local>) -> io::Result<()> {
        let sum = s.summary(now);
        let rtt = sum.rtt.has_results.then_some(sum.rtt);

        let fields = Fields {
            hostname: Some(s.hostname()),
            addr: Some(sum.addr),
            is_ip: Some(sum.is_ip),
            port: Some(sum.port),
            last_successful_probe: sum.last_successful,
            last_unsuccessful_probe: sum.last_unsuccessful,
            total_packet_loss: sum.packet_loss,
            total_packets: Some(sum.total_packets),
            total_successful_probes: Some(sum.successful),
            total_unsuccessful_probes: Some(sum.unsuccessful),
            total_uptime: Some(sum.total_uptime.as_secs_f64()),
            total_downtime: Some(sum.total_downtime.as_secs_f64()),
            retried_hostname_resolves: sum.retried_resolves,
            rtt_min: rtt.map(|r| r.min),
            rtt_avg: rtt.map(|r| r.average),
            rtt_max: rtt.map(|r| r.max),
            start_time: Some(sum.start_time),
            end_time: sum.end_time,
            duration: Some(sum.duration.as_secs_f64()),
            ..Default::default()
        }
        .with_uptime(sum.longest_uptime)
        .with_downtime(sum.longest_downtime);

        let mut message = format!(
            "{} TCPing statistics: {} probes transmitted on port {} | {} received",
            target_label(s),
            sum.total_packets,
            sum.port,
            sum.successful
        );
        if let Some(loss) = sum.packet_loss {
            message.push_str(&format!(", {loss:.2}% packet loss"));
        }

        self.emit(EventType::Stats, message, now, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::{at, fail, hostname_stats, ok};
    use serde_json::Value;

    fn records(f: impl FnOnce(&mut Json<Vec<u8>>) -> io::Result<()>) -> Vec<Value> {
        let mut j = Json::new(Vec::new());
        f(&mut j).unwrap();
        String::from_utf8(j.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn one(f: impl FnOnce(&mut Json<Vec<u8>>) -> io::Result<()>) -> Value {
        let mut all = records(f);
        assert_eq!(all.len(), 1);
        all.remove(0)
    }

    #[test]
    fn start_event() {
        let s = hostname_stats();
        let v = one(|j| j.start(&s));
        assert_eq!(v["type"], "start");
        assert_eq!(v["hostname"], "example.com");
        assert_eq!(v["port"], 443);
        assert_eq!(v["message"], "TCPinging example.com on port 443");
        assert!(v.get("timestamp").is_some());
        assert!(v.get("success").is_none());
    }

    #[test]
    fn failed_probe_event() {
        let mut s = hostname_stats();
        let o = fail(1);
        s.apply(&o);
        let first = one(|j| j.reply(&s, &o));

        let o = fail(2);
        s.apply(&o);
        let v = one(|j| j.reply(&s, &o));

        assert_eq!(v["type"], "probe");
        assert_eq!(v["success"], false);
        assert!(v.get("latency").is_none());
        assert_eq!(v["addr"], "93.184.216.34");
        assert_eq!(v["hostname"], "example.com");
        assert_eq!(v["is_ip"], false);
        assert_eq!(v["port"], 443);
        assert_eq!(
            v["total_unsuccessful_probes"].as_u64().unwrap(),
            first["total_unsuccessful_probes"].as_u64().unwrap() + 1
        );
        assert_eq!(
            v["message"],
            "No reply from example.com (93.184.216.34) on port 443"
        );
    }

    #[test]
    fn successful_probe_event_for_literal_ip() {
        let mut s = Stats::new("10.0.0.1", "10.0.0.1".parse().unwrap(), 22, true, at(0));
        let o = ok(1, 4.5);
        s.apply(&o);
        let v = one(|j| j.reply(&s, &o));
        assert_eq!(v["success"], true);
        assert_eq!(v["latency"], 4.5);
        assert_eq!(v["is_ip"], true);
        assert_eq!(v["total_successful_probes"], 1);
        assert!(v.get("hostname").is_none());
        assert!(v.get("total_unsuccessful_probes").is_none());
    }

    #[test]
    fn last_probes_omit_never() {
        let mut s = hostname_stats();
        s.apply(&ok(1, 1.0));
        let v = one(|j| j.last_probes(&s));
        assert_eq!(v["type"], "stats");
        assert!(v.get("last_successful_probe").is_some());
        assert!(v.get("last_unsuccessful_probe").is_none());
    }

    #[test]
    fn retry_event() {
        let s = hostname_stats();
        let v = one(|j| j.retrying_to_resolve(&s));
        assert_eq!(v["type"], "retry");
        assert_eq!(v["message"], "retrying to resolve example.com");
    }

    #[test]
    fn total_downtime_event() {
        let mut s = hostname_stats();
        s.apply(&fail(10));
        let v = one(|j| j.total_downtime(&s, at(135)));
        assert_eq!(v["downtime"], 125);
        assert_eq!(v["message"], "No response received for 2 minutes 5 seconds");

        s.apply(&ok(140, 1.0));
        assert!(records(|j| j.total_downtime(&s, at(150))).is_empty());
    }

    #[test]
    fn longest_downtime_suppressed_when_never_down() {
        let mut s = hostname_stats();
        s.apply(&ok(1, 1.0));
        assert!(records(|j| j.longest_downtime(&s, at(2))).is_empty());
        let v = one(|j| j.longest_uptime(&s, at(2)));
        assert_eq!(v["longest_uptime"], 1.0);
    }

    #[test]
    fn summary_event() {
        let mut s = hostname_stats();
        for t in 0..7 {
            s.apply(&ok(t, 10.0 + t as f64));
        }
        for t in 7..10 {
            s.apply(&fail(t));
        }
        s.finish(at(10));
        let v = one(|j| j.summary(&s, at(10)));

        assert_eq!(v["type"], "stats");
        assert_eq!(v["total_packets"], 10);
        assert_eq!(v["total_successful_probes"], 7);
        assert_eq!(v["total_unsuccessful_probes"], 3);
        assert!((v["total_packet_loss"].as_f64().unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(v["longest_uptime"], 7.0);
        assert_eq!(v["longest_downtime"], 3.0);
        assert_eq!(v["retried_hostname_resolves"], 0);
        assert_eq!(v["rtt_min"], 10.0);
        assert_eq!(v["rtt_max"], 16.0);
        assert!(v.get("end_time").is_some());
        assert!(v["message"].as_str().unwrap().ends_with("30.00% packet loss"));
    }

    #[test]
    fn summary_for_unreachable_target_omits_uptime() {
        let mut s = hostname_stats();
        for t in 1..=3 {
            s.apply(&fail(t));
        }
        let v = one(|j| j.summary(&s, at(4)));
        assert!(v.get("longest_uptime").is_none());
        assert_eq!(v["longest_downtime"], 3.0);
        assert_eq!(v["total_downtime"], 3.0);
    }

    #[test]
    fn summary_without_probes() {
        let s = hostname_stats();
        let v = one(|j| j.summary(&s, at(5)));
        assert!(v.get("total_packet_loss").is_none());
        assert_eq!(v["total_packets"], 0);
        assert!(v.get("rtt_min").is_none());
        assert!(v.get("longest_downtime").is_none());
        assert!(v.get("end_time").is_none());
    }
}
