//! Read-only report sink

use std::collections::BTreeMap;

use super::EventSink;
use crate::Result;
use crate::event::{Event, EventKind};

/// Records one diagnostic line per event, in visit order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    lines: Vec<String>,
    counts: BTreeMap<EventKind, usize>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line under an event kind.
    pub fn record(&mut self, kind: EventKind, line: String) {
        *self.counts.entry(kind).or_default() += 1;
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Per-kind counts, only for kinds seen at least once.
    pub fn counts(&self) -> &BTreeMap<EventKind, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.lines.len()
    }

    /// True if the run found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }
}

impl EventSink for Report {
    fn handle(&mut self, event: &Event) -> Result<()> {
        self.record(event.kind(), event.to_string());
        Ok(())
    }
}
