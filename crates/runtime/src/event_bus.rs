use std::sync::Arc;

use parking_lot::Mutex;

/// A diagnostic record emitted by the data pipeline.
///
/// Kinds are short static tags (`"fetch_failure"`, `"cache_hit"`, …) so tests
/// and log sinks can filter without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    events: Vec<Event>,
}

/// Shared diagnostic channel. Clones observe the same event log.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Inner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, kind: &'static str, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.events.push(Event {
            seq,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().events.clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut self.inner.lock().events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;

    #[test]
    fn clones_share_the_log() {
        let bus = EventBus::new();
        let other = bus.clone();
        other.emit("fetch_failure", "timeout");
        bus.emit("cache_hit", "3 links");
        assert_eq!(bus.events().len(), 2);
        assert_eq!(bus.count("fetch_failure"), 1);
        assert_eq!(bus.events()[1].seq, 1);
    }

    #[test]
    fn drain_clears_events() {
        let bus = EventBus::new();
        bus.emit("k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }
}
