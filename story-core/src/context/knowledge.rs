//! Character knowledge resolution.
//!
//! This is the component enforcing the product's core guarantee: a character
//! must never answer from knowledge outside its snapshot for the requester's
//! progress point, and must express genuine ignorance (not a deflection
//! line) for anything in `doesnt_know`.

use crate::store::{canonical_id, JourneyEntry, JourneyTable};
use std::collections::BTreeMap;

/// A character's state of awareness at a reader's progress point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeSnapshot {
    pub beat_id: Option<u32>,
    pub beat_title: String,
    pub knows: Vec<String>,
    pub doesnt_know: Vec<String>,
    pub can_discuss_freely: Vec<String>,
    pub must_not_reveal: Vec<String>,
    pub can_tease: Vec<String>,
    pub emotional_state: String,
    pub relationships: BTreeMap<String, String>,
}

impl KnowledgeSnapshot {
    /// The all-empty snapshot for characters absent from the journey table.
    /// The engine degrades gracefully for characters not yet authored.
    pub fn unknown() -> Self {
        Self {
            beat_id: None,
            beat_title: "Unknown".to_string(),
            knows: Vec::new(),
            doesnt_know: Vec::new(),
            can_discuss_freely: Vec::new(),
            must_not_reveal: Vec::new(),
            can_tease: Vec::new(),
            emotional_state: "Unknown".to_string(),
            relationships: BTreeMap::new(),
        }
    }

    fn from_entry(entry: &JourneyEntry) -> Self {
        Self {
            beat_id: Some(entry.beat_id),
            beat_title: entry.beat_title.clone(),
            knows: entry.knows.clone(),
            doesnt_know: entry.doesnt_know.clone(),
            can_discuss_freely: entry.can_discuss_freely.clone(),
            must_not_reveal: entry.must_not_reveal.clone(),
            can_tease: entry.can_tease.clone(),
            emotional_state: entry.emotional_state.clone(),
            relationships: entry.relationships.clone(),
        }
    }
}

/// Resolve a character's knowledge snapshot at the reader's episode.
///
/// Scans the character's journey for the entry whose range contains the
/// episode (first match wins; ranges are non-overlapping per character).
/// Past all ranges the last entry applies (saturation); an unauthored
/// character gets the all-empty snapshot rather than an error.
pub fn resolve_knowledge(
    journeys: &JourneyTable,
    character_id: &str,
    reader_episode: u32,
) -> KnowledgeSnapshot {
    let Some(character) = journeys.journey(&canonical_id(character_id)) else {
        return KnowledgeSnapshot::unknown();
    };

    if let Some(entry) = character.entry_at(reader_episode) {
        return KnowledgeSnapshot::from_entry(entry);
    }

    match character.last_entry() {
        Some(last) => KnowledgeSnapshot::from_entry(last),
        None => KnowledgeSnapshot::unknown(),
    }
}
