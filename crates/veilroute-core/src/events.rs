//! Append-only event log.

use veilroute_types::{EventId, EventRecord, RouterEvent};

/// Ordered, gap-free record of every accepted transition.
///
/// Sequence numbers keep counting across [`EventLog::drain`], so a consumer
/// can resume with [`EventLog::since`] using the next sequence it expects.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: u64, event: RouterEvent) -> &EventRecord {
        let record = EventRecord {
            id: EventId::new(),
            sequence: self.next_sequence,
            at,
            event,
        };
        self.next_sequence += 1;
        tracing::info!(
            event = record.event.name(),
            sequence = record.sequence,
            at,
            "{}",
            record.event
        );
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Retained records with `sequence >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.sequence < from);
        &self.records[start..]
    }

    /// Hand all retained records to the caller.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
