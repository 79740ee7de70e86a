//! Beat and episode progression data.
//!
//! A beat is a contiguous arc segment of the serialized story, spanning an
//! inclusive episode range and carrying the ordered episode entries that
//! belong to it.

use serde::{Deserialize, Serialize};

/// An inclusive range of episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRange {
    pub start: u32,
    pub end: u32,
}

impl EpisodeRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Check whether an episode number falls inside this range.
    pub fn contains(&self, episode: u32) -> bool {
        self.start <= episode && episode <= self.end
    }

    /// Render as the display form used in prompts, e.g. `EP21-30`.
    pub fn display(&self) -> String {
        format!("EP{}-{}", self.start, self.end)
    }
}

/// A fact the story reveals in a specific episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealedFact {
    pub fact: String,
    /// Who or what the reveal is attributed to, when authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

/// One unit of narrative content within a beat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeEntry {
    pub episode_id: u32,
    /// The narrative objective of the episode.
    #[serde(default)]
    pub objective: String,
    /// Plot-state changes the episode causes.
    #[serde(default)]
    pub what_changes: Vec<String>,
    /// Closing cliffhanger line, if the episode ends on one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliffhanger: Option<String>,
    /// Facts the episode reveals to the audience.
    #[serde(default)]
    pub facts_revealed: Vec<RevealedFact>,
    /// Short teaser phrases usable for engagement without revealing payoff.
    #[serde(default)]
    pub hooks: Vec<String>,
}

/// A contiguous arc segment of the story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beat {
    pub beat_id: u32,
    #[serde(default)]
    pub beat_title: String,
    pub episode_range: EpisodeRange,
    /// Episode entries in ascending episode order.
    #[serde(default)]
    pub episodes: Vec<EpisodeEntry>,
}

/// The ordered beat/episode progression table for one show.
///
/// Beats are expected in ascending range order with non-overlapping ranges;
/// resolution scans in order and the first containing beat wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionTable {
    #[serde(default)]
    pub beats: Vec<Beat>,
}

impl ProgressionTable {
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Find a beat by id.
    pub fn beat(&self, beat_id: u32) -> Option<&Beat> {
        self.beats.iter().find(|b| b.beat_id == beat_id)
    }

    /// Iterate over every episode entry across all beats, with its beat id.
    pub fn all_entries(&self) -> impl Iterator<Item = (u32, &EpisodeEntry)> {
        self.beats
            .iter()
            .flat_map(|beat| beat.episodes.iter().map(move |ep| (beat.beat_id, ep)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = EpisodeRange::new(21, 30);
        assert!(range.contains(21));
        assert!(range.contains(25));
        assert!(range.contains(30));
        assert!(!range.contains(20));
        assert!(!range.contains(31));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(EpisodeRange::new(1, 10).display(), "EP1-10");
    }

    #[test]
    fn test_all_entries_carries_beat_id() {
        let table = ProgressionTable {
            beats: vec![
                Beat {
                    beat_id: 1,
                    beat_title: "Homecoming".to_string(),
                    episode_range: EpisodeRange::new(1, 2),
                    episodes: vec![
                        EpisodeEntry {
                            episode_id: 1,
                            objective: "Arrival".to_string(),
                            what_changes: Vec::new(),
                            cliffhanger: None,
                            facts_revealed: Vec::new(),
                            hooks: Vec::new(),
                        },
                        EpisodeEntry {
                            episode_id: 2,
                            objective: "First clash".to_string(),
                            what_changes: Vec::new(),
                            cliffhanger: None,
                            facts_revealed: Vec::new(),
                            hooks: Vec::new(),
                        },
                    ],
                },
                Beat {
                    beat_id: 2,
                    beat_title: "The Reveal".to_string(),
                    episode_range: EpisodeRange::new(3, 4),
                    episodes: vec![EpisodeEntry {
                        episode_id: 3,
                        objective: "Truth surfaces".to_string(),
                        what_changes: Vec::new(),
                        cliffhanger: None,
                        facts_revealed: Vec::new(),
                        hooks: Vec::new(),
                    }],
                },
            ],
        };

        let entries: Vec<_> = table.all_entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, 1);
        assert_eq!(entries[2].0, 2);
        assert_eq!(entries[2].1.episode_id, 3);
    }
}
