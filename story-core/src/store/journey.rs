//! Per-character knowledge journeys.
//!
//! A journey is an ordered sequence of knowledge states, one per beat range,
//! describing what the character knows, must not reveal, and may tease at
//! that point in the story.

use super::beat::EpisodeRange;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One entry in a character's journey: their knowledge state across an
/// episode range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub beat_id: u32,
    #[serde(default)]
    pub beat_title: String,
    pub episode_range: EpisodeRange,
    /// Facts true for the character at this point.
    #[serde(default)]
    pub knows: Vec<String>,
    /// Facts the character must treat as genuinely unknown.
    #[serde(default)]
    pub doesnt_know: Vec<String>,
    /// Topics safe to reference freely.
    #[serde(default)]
    pub can_discuss_freely: Vec<String>,
    /// Hard ceiling: never output, even obliquely.
    #[serde(default)]
    pub must_not_reveal: Vec<String>,
    /// Soft hooks: may be hinted at, never confirmed.
    #[serde(default)]
    pub can_tease: Vec<String>,
    /// Free-text mood descriptor.
    #[serde(default)]
    pub emotional_state: String,
    /// Other character -> relationship descriptor. BTreeMap keeps rendering
    /// order stable regardless of document key order.
    #[serde(default)]
    pub relationships: BTreeMap<String, String>,
}

/// A character's full journey, ordered by beat id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterJourney {
    #[serde(default)]
    pub journey: Vec<JourneyEntry>,
}

impl CharacterJourney {
    /// Find the entry whose range contains the episode; first match wins.
    pub fn entry_at(&self, episode: u32) -> Option<&JourneyEntry> {
        self.journey
            .iter()
            .find(|entry| entry.episode_range.contains(episode))
    }

    /// The last declared entry, used for saturation past all ranges.
    pub fn last_entry(&self) -> Option<&JourneyEntry> {
        self.journey.last()
    }
}

/// The journey table for one show, keyed by canonical character id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JourneyTable {
    #[serde(default)]
    pub characters: HashMap<String, CharacterJourney>,
}

impl JourneyTable {
    /// Look up a journey by canonical character id.
    pub fn journey(&self, character_id: &str) -> Option<&CharacterJourney> {
        self.characters.get(character_id)
    }

    /// Rebuild the character index with canonical ids. Runs once at load.
    pub(crate) fn canonicalize(&mut self) {
        let characters = std::mem::take(&mut self.characters);
        self.characters = characters
            .into_iter()
            .map(|(id, journey)| (super::canonical_id(&id), journey))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(beat_id: u32, start: u32, end: u32) -> JourneyEntry {
        JourneyEntry {
            beat_id,
            beat_title: format!("Beat {beat_id}"),
            episode_range: EpisodeRange::new(start, end),
            knows: Vec::new(),
            doesnt_know: Vec::new(),
            can_discuss_freely: Vec::new(),
            must_not_reveal: Vec::new(),
            can_tease: Vec::new(),
            emotional_state: String::new(),
            relationships: BTreeMap::new(),
        }
    }

    #[test]
    fn test_entry_at_picks_containing_range() {
        let journey = CharacterJourney {
            journey: vec![entry(1, 1, 10), entry(2, 11, 20)],
        };

        assert_eq!(journey.entry_at(5).unwrap().beat_id, 1);
        assert_eq!(journey.entry_at(11).unwrap().beat_id, 2);
        assert!(journey.entry_at(21).is_none());
    }

    #[test]
    fn test_canonicalize_keys() {
        let mut table = JourneyTable::default();
        table
            .characters
            .insert("Nora Smith".to_string(), CharacterJourney::default());
        table.canonicalize();

        assert!(table.journey("nora_smith").is_some());
        assert!(table.journey("Nora Smith").is_none());
    }
}
