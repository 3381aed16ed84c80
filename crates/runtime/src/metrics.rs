use std::collections::BTreeMap;

pub const FRAMES: &str = "frames";
pub const DRAW_CALLS: &str = "draw_calls";
pub const CHART_DRAWS: &str = "chart_draws";
pub const LAYER_APPLIES: &str = "layer_applies";
/// Gauge: links in the currently bound layer set.
pub const BOUND_LINKS: &str = "bound_links";

/// Frame-loop counters and gauges.
///
/// Sorted maps keep snapshots stable for logs and assertions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(String, u64)>,
    pub gauges: Vec<(String, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        *self.counters.entry(name.into()).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: impl Into<String>, value: i64) {
        self.gauges.insert(name.into(), value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DRAW_CALLS, FRAMES, Metrics};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc_counter(DRAW_CALLS, 1);
        m.inc_counter(DRAW_CALLS, 2);
        assert_eq!(m.counter(DRAW_CALLS), 3);
        assert_eq!(m.counter("missing"), 0);
    }

    #[test]
    fn snapshot_is_sorted() {
        let mut m = Metrics::new();
        m.inc_counter(FRAMES, 1);
        m.inc_counter(DRAW_CALLS, 1);
        m.set_gauge("links", 4);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![(DRAW_CALLS.to_string(), 1), (FRAMES.to_string(), 1)]
        );
        assert_eq!(snap.gauges, vec![("links".to_string(), 4)]);
    }
}
