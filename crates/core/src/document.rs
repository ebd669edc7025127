//! Configuration documents
//!
//! The root persisted structure: an ordered mapping from event to an
//! ordered sequence of hook entries. Serialized as a JSON object keyed by
//! event name; event insertion order is preserved.

use crate::{Error, HookEntry, HookEvent, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The root configuration structure, one per persisted file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationDocument {
    /// Entries grouped by event, in event insertion order
    pub events: IndexMap<HookEvent, Vec<HookEntry>>,
}

impl ConfigurationDocument {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document holding a single entry
    #[must_use]
    pub fn from_entry(event: HookEvent, entry: HookEntry) -> Self {
        let mut document = Self::new();
        document.events.insert(event, vec![entry]);
        document
    }

    /// Parse a document from its JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Parse)
    }

    /// Serialize the document to pretty-printed JSON with a trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(self).map_err(Error::Serialize)?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// The entries registered for an event (empty slice if none)
    #[must_use]
    pub fn entries_for(&self, event: HookEvent) -> &[HookEntry] {
        self.events.get(&event).map_or(&[], Vec::as_slice)
    }

    /// Append an entry at the end of an event's sequence
    pub fn push(&mut self, event: HookEvent, entry: HookEntry) {
        self.events.entry(event).or_default().push(entry);
    }

    /// Insert an entry into an event's sequence, ordered by priority
    ///
    /// The entry lands after the last existing entry whose priority is
    /// less than or equal to its own, keeping equal priorities in arrival
    /// order. Deterministic regardless of how the existing sequence was
    /// ordered.
    pub fn insert_sorted(&mut self, event: HookEvent, entry: HookEntry) {
        let sequence = self.events.entry(event).or_default();
        let position = sequence
            .iter()
            .rposition(|existing| existing.priority <= entry.priority)
            .map_or(0, |index| index + 1);
        sequence.insert(position, entry);
    }

    /// Total number of entries across all events
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// Whether the document holds no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }
}
