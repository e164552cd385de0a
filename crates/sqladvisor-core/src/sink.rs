//! Advice sinks: where finished reports are handed off
//!
//! A sink keeps at most one active record per key (typically a database or
//! a migration script). Recording again under the same key replaces the
//! active record and moves the previous one into the archive.

use indexmap::IndexMap;
use tracing::debug;

use crate::advice::Advice;

/// Destination for advice produced by an advisor run
pub trait AdviceSink {
    /// Upsert the active advice for `key`
    fn record(&mut self, key: &str, advice: &[Advice]);

    /// Retire the active record for `key`; returns whether one existed
    fn archive_active(&mut self, key: &str) -> bool;
}

/// One stored advice list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Starts at 1 and grows by one per upsert under the same key
    pub revision: u64,
    pub advice: Vec<Advice>,
}

#[derive(Debug, Default)]
struct Slot {
    active: Option<Record>,
    archived: Vec<Record>,
    last_revision: u64,
}

/// In-memory sink, mostly for tests and one-shot CLI runs
#[derive(Debug, Default)]
pub struct MemorySink {
    slots: IndexMap<String, Slot>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self, key: &str) -> Option<&Record> {
        self.slots.get(key).and_then(|slot| slot.active.as_ref())
    }

    /// Archived records for `key`, oldest first
    pub fn archive(&self, key: &str) -> &[Record] {
        self.slots
            .get(key)
            .map(|slot| slot.archived.as_slice())
            .unwrap_or_default()
    }

    /// Every record for `key`, oldest first, ending with the active one
    pub fn history(&self, key: &str) -> Vec<&Record> {
        let Some(slot) = self.slots.get(key) else {
            return Vec::new();
        };
        slot.archived.iter().chain(slot.active.as_ref()).collect()
    }

    /// Keys that currently have an active record, in first-recorded order
    pub fn active_keys(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.active.is_some())
            .map(|(key, _)| key.as_str())
    }
}

impl AdviceSink for MemorySink {
    fn record(&mut self, key: &str, advice: &[Advice]) {
        let slot = self.slots.entry(key.to_string()).or_default();
        if let Some(previous) = slot.active.take() {
            slot.archived.push(previous);
        }
        slot.last_revision += 1;
        slot.active = Some(Record {
            revision: slot.last_revision,
            advice: advice.to_vec(),
        });
        debug!(key, revision = slot.last_revision, "recorded advice");
    }

    fn archive_active(&mut self, key: &str) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        match slot.active.take() {
            Some(record) => {
                slot.archived.push(record);
                true
            }
            None => false,
        }
    }
}
