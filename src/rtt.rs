//! Round-trip-time summary over successful probes.

/// min / avg / max of the collected RTT samples, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RttSummary {
    pub min: f64,
    pub average: f64,
    pub max: f64,
    /// `false` until at least one probe succeeded; the other fields are
    /// meaningless in that case and must not be rendered.
    pub has_results: bool,
}

/// Recompute the summary from scratch; only needed at report time.
pub fn summarize(samples: &[f64]) -> RttSummary {
    let Some(&first) = samples.first() else {
        return RttSummary::default();
    };

    let (min, max, total) = samples
        .iter()
        .fold((first, first, 0.0), |(lo, hi, sum), &rtt| {
            (lo.min(rtt), hi.max(rtt), sum + rtt)
        });

    RttSummary {
        min,
        average: total / samples.len() as f64,
        max,
        has_results: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_results() {
        assert!(!summarize(&[]).has_results);
    }

    #[test]
    fn min_avg_max() {
        let s = summarize(&[12.0, 3.0, 9.0]);
        assert!(s.has_results);
        assert_eq!(s.min, 3.0);
        assert_eq!(s.max, 12.0);
        assert_eq!(s.average, 8.0);
    }

    #[test]
    fn ordering_holds() {
        let s = summarize(&[0.41, 17.3, 2.2, 2.2, 99.9, 0.05]);
        assert!(s.min <= s.average && s.average <= s.max);
    }
}
