//! Current-beat progress.
//!
//! The reader-relative view of the beat they are inside: which of its
//! episodes they have heard, which cliffhangers they have reached, which
//! facts the story has revealed to them, and which entries remain unheard.

use super::beat::{resolve_beat, BeatInfo};
use crate::store::ProgressionTable;

/// An episode the reader has already heard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeardEpisode {
    pub episode_id: u32,
    pub objective: String,
    pub what_changes: Vec<String>,
    pub cliffhanger: Option<String>,
}

/// A cliffhanger the reader has reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachedCliffhanger {
    pub episode_id: u32,
    pub line: String,
}

/// Progress through the reader's current beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatProgress {
    pub beat: BeatInfo,
    /// Episodes in this beat the reader has heard, in order.
    pub heard: Vec<HeardEpisode>,
    /// Cliffhangers among the heard episodes.
    pub cliffhangers: Vec<ReachedCliffhanger>,
    /// Facts revealed to the reader so far in this beat.
    pub known_facts: Vec<String>,
    /// Episode ids in this beat still ahead of the reader.
    pub upcoming: Vec<u32>,
}

/// Compute the reader's progress through their current beat.
pub fn beat_progress(progression: &ProgressionTable, reader_episode: u32) -> BeatProgress {
    let beat = resolve_beat(progression, reader_episode);

    let mut progress = BeatProgress {
        beat,
        heard: Vec::new(),
        cliffhangers: Vec::new(),
        known_facts: Vec::new(),
        upcoming: Vec::new(),
    };

    let Some(beat_id) = progress.beat.beat_id else {
        return progress;
    };
    let Some(current) = progression.beat(beat_id) else {
        return progress;
    };

    for entry in &current.episodes {
        if entry.episode_id <= reader_episode {
            if let Some(line) = &entry.cliffhanger {
                progress.cliffhangers.push(ReachedCliffhanger {
                    episode_id: entry.episode_id,
                    line: line.clone(),
                });
            }
            for fact in &entry.facts_revealed {
                progress.known_facts.push(fact.fact.clone());
            }
            progress.heard.push(HeardEpisode {
                episode_id: entry.episode_id,
                objective: entry.objective.clone(),
                what_changes: entry.what_changes.clone(),
                cliffhanger: entry.cliffhanger.clone(),
            });
        } else {
            progress.upcoming.push(entry.episode_id);
        }
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Beat, EpisodeEntry, EpisodeRange, RevealedFact};

    fn table() -> ProgressionTable {
        ProgressionTable {
            beats: vec![Beat {
                beat_id: 3,
                beat_title: "Athena's Surgery".to_string(),
                episode_range: EpisodeRange::new(21, 24),
                episodes: vec![
                    EpisodeEntry {
                        episode_id: 21,
                        objective: "The hospital calls".to_string(),
                        what_changes: vec!["Athena is summoned".to_string()],
                        cliffhanger: Some("Who is Athena?".to_string()),
                        facts_revealed: vec![RevealedFact {
                            fact: "Athena took the case".to_string(),
                            attribution: None,
                        }],
                        hooks: Vec::new(),
                    },
                    EpisodeEntry {
                        episode_id: 22,
                        objective: "The operation begins".to_string(),
                        what_changes: Vec::new(),
                        cliffhanger: None,
                        facts_revealed: Vec::new(),
                        hooks: Vec::new(),
                    },
                    EpisodeEntry {
                        episode_id: 23,
                        objective: "Complications".to_string(),
                        what_changes: Vec::new(),
                        cliffhanger: Some("The monitors flatline.".to_string()),
                        facts_revealed: Vec::new(),
                        hooks: Vec::new(),
                    },
                    EpisodeEntry {
                        episode_id: 24,
                        objective: "Aftermath".to_string(),
                        what_changes: Vec::new(),
                        cliffhanger: None,
                        facts_revealed: Vec::new(),
                        hooks: Vec::new(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_splits_heard_and_upcoming() {
        let progress = beat_progress(&table(), 22);
        let heard: Vec<u32> = progress.heard.iter().map(|e| e.episode_id).collect();
        assert_eq!(heard, vec![21, 22]);
        assert_eq!(progress.upcoming, vec![23, 24]);
    }

    #[test]
    fn test_collects_reached_cliffhangers_and_facts() {
        let progress = beat_progress(&table(), 23);
        assert_eq!(progress.cliffhangers.len(), 2);
        assert_eq!(progress.cliffhangers[1].line, "The monitors flatline.");
        assert_eq!(progress.known_facts, vec!["Athena took the case".to_string()]);
    }

    #[test]
    fn test_empty_progression() {
        let progress = beat_progress(&ProgressionTable::default(), 5);
        assert!(progress.heard.is_empty());
        assert!(progress.upcoming.is_empty());
        assert_eq!(progress.beat.beat_id, None);
    }
}
