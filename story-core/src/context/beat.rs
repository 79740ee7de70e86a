//! Episode-to-beat resolution.

use crate::store::{EpisodeRange, ProgressionTable};

/// Where an episode falls in the beat structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatInfo {
    /// `None` when no beats are authored at all.
    pub beat_id: Option<u32>,
    pub title: String,
    pub episode_range: Option<EpisodeRange>,
    /// False when the episode saturates past the last authored beat.
    pub is_within_beat: bool,
    /// 1-based position inside the beat; 0 when saturated or unknown.
    pub position_in_beat: u32,
}

impl BeatInfo {
    /// Sentinel for an empty beat table. Callers must treat this as "no
    /// narrative context available", not as an error.
    pub fn unknown() -> Self {
        Self {
            beat_id: None,
            title: "Unknown".to_string(),
            episode_range: None,
            is_within_beat: false,
            position_in_beat: 0,
        }
    }
}

/// Map an episode number to the beat it belongs to.
///
/// Linear scan in ascending range order; the first containing beat wins.
/// Episodes beyond every authored range saturate at the final beat with
/// `is_within_beat = false`.
pub fn resolve_beat(progression: &ProgressionTable, episode: u32) -> BeatInfo {
    for beat in &progression.beats {
        if beat.episode_range.contains(episode) {
            return BeatInfo {
                beat_id: Some(beat.beat_id),
                title: beat.beat_title.clone(),
                episode_range: Some(beat.episode_range),
                is_within_beat: true,
                position_in_beat: episode - beat.episode_range.start + 1,
            };
        }
    }

    if let Some(last) = progression.beats.last() {
        return BeatInfo {
            beat_id: Some(last.beat_id),
            title: last.beat_title.clone(),
            episode_range: Some(last.episode_range),
            is_within_beat: false,
            position_in_beat: 0,
        };
    }

    BeatInfo::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Beat;

    fn table() -> ProgressionTable {
        ProgressionTable {
            beats: vec![
                Beat {
                    beat_id: 1,
                    beat_title: "Homecoming".to_string(),
                    episode_range: EpisodeRange::new(1, 10),
                    episodes: Vec::new(),
                },
                Beat {
                    beat_id: 2,
                    beat_title: "The Wager".to_string(),
                    episode_range: EpisodeRange::new(11, 20),
                    episodes: Vec::new(),
                },
                Beat {
                    beat_id: 3,
                    beat_title: "Athena's Surgery".to_string(),
                    episode_range: EpisodeRange::new(21, 30),
                    episodes: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_resolve_inside_beat() {
        let info = resolve_beat(&table(), 25);
        assert_eq!(info.beat_id, Some(3));
        assert_eq!(info.title, "Athena's Surgery");
        assert!(info.is_within_beat);
        assert_eq!(info.position_in_beat, 5);
    }

    #[test]
    fn test_same_beat_for_all_episodes_in_range() {
        let table = table();
        let first = resolve_beat(&table, 11);
        let last = resolve_beat(&table, 20);
        assert_eq!(first.beat_id, last.beat_id);
    }

    #[test]
    fn test_saturates_past_final_beat() {
        let info = resolve_beat(&table(), 100);
        assert_eq!(info.beat_id, Some(3));
        assert!(!info.is_within_beat);
        assert_eq!(info.position_in_beat, 0);

        // Regardless of how far beyond.
        let far = resolve_beat(&table(), 10_000);
        assert_eq!(far.beat_id, Some(3));
        assert!(!far.is_within_beat);
    }

    #[test]
    fn test_empty_table_yields_sentinel() {
        let info = resolve_beat(&ProgressionTable::default(), 5);
        assert_eq!(info.beat_id, None);
        assert_eq!(info.title, "Unknown");
        assert!(!info.is_within_beat);
    }

    #[test]
    fn test_range_boundaries() {
        let table = table();
        assert_eq!(resolve_beat(&table, 10).beat_id, Some(1));
        assert_eq!(resolve_beat(&table, 11).beat_id, Some(2));
        assert_eq!(resolve_beat(&table, 1).position_in_beat, 1);
    }
}
