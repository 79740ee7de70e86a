//! Prior-story condensation.
//!
//! Collapses every beat before the reader's current beat into short recaps,
//! keeping only the most recent few. Long-range memory is intentionally
//! dropped to bound prompt size.

use crate::prompt::{truncate_chars, PromptBudget};
use crate::store::PlotTable;

/// A condensed recap of one prior beat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatRecap {
    pub beat_id: u32,
    pub title: String,
    /// Display form of the beat's episode span, e.g. `EP1-10`.
    pub episode_span: String,
    pub summary: String,
}

/// The prior-story view for one reader position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotHistory {
    /// The reader is in the first beat; there is no prior story. Templates
    /// render an opening line instead of a blank section.
    NotYetBegun,
    /// Recaps of prior beats in ascending beat order, most recent retained.
    Beats(Vec<BeatRecap>),
}

impl PlotHistory {
    pub fn recaps(&self) -> &[BeatRecap] {
        match self {
            PlotHistory::NotYetBegun => &[],
            PlotHistory::Beats(recaps) => recaps,
        }
    }
}

/// Summarize the beats strictly before `current_beat_id`.
///
/// Returns at most `budget.max_history_beats` recaps, keeping the highest
/// beat ids below the current one. Condensed text is truncated to the
/// budget's character ceiling with an ellipsis marker.
pub fn previous_beats(
    plots: &PlotTable,
    current_beat_id: Option<u32>,
    budget: &PromptBudget,
) -> PlotHistory {
    let Some(current_beat_id) = current_beat_id else {
        return PlotHistory::NotYetBegun;
    };

    let mut recaps: Vec<BeatRecap> = plots
        .beats
        .iter()
        .filter(|beat| beat.beat_id < current_beat_id)
        .map(|beat| BeatRecap {
            beat_id: beat.beat_id,
            title: beat.title.clone(),
            episode_span: beat.episode_span(),
            summary: truncate_chars(&beat.condensed(), budget.summary_char_ceiling),
        })
        .collect();

    if recaps.is_empty() {
        return PlotHistory::NotYetBegun;
    }

    recaps.sort_by_key(|recap| recap.beat_id);
    if recaps.len() > budget.max_history_beats {
        let excess = recaps.len() - budget.max_history_beats;
        recaps.drain(..excess);
    }

    PlotHistory::Beats(recaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BeatSummary;

    fn summary(beat_id: u32, text: &str) -> BeatSummary {
        BeatSummary {
            beat_id,
            title: format!("Beat {beat_id}"),
            start_episode: Some(beat_id * 10 - 9),
            end_episode: Some(beat_id * 10),
            start: Some(text.to_string()),
            mid: None,
            end: None,
        }
    }

    fn plots(count: u32) -> PlotTable {
        PlotTable {
            beats: (1..=count).map(|id| summary(id, "Something happened.")).collect(),
        }
    }

    #[test]
    fn test_first_beat_has_no_history() {
        assert_eq!(
            previous_beats(&plots(8), Some(1), &PromptBudget::default()),
            PlotHistory::NotYetBegun
        );
    }

    #[test]
    fn test_unknown_beat_has_no_history() {
        assert_eq!(
            previous_beats(&plots(8), None, &PromptBudget::default()),
            PlotHistory::NotYetBegun
        );
    }

    #[test]
    fn test_keeps_most_recent_beats() {
        let history = previous_beats(&plots(8), Some(8), &PromptBudget::default());
        let ids: Vec<u32> = history.recaps().iter().map(|r| r.beat_id).collect();
        assert_eq!(ids, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_fewer_prior_beats_than_budget() {
        let history = previous_beats(&plots(8), Some(3), &PromptBudget::default());
        let ids: Vec<u32> = history.recaps().iter().map(|r| r.beat_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_long_summaries_truncated_with_ellipsis() {
        let mut table = plots(2);
        table.beats[0].start = Some("x".repeat(900));
        let budget = PromptBudget::default();
        let history = previous_beats(&table, Some(2), &budget);

        let recap = &history.recaps()[0];
        assert!(recap.summary.ends_with("..."));
        assert_eq!(recap.summary.chars().count(), budget.summary_char_ceiling + 3);
    }

    #[test]
    fn test_episode_span_rendered() {
        let history = previous_beats(&plots(3), Some(2), &PromptBudget::default());
        assert_eq!(history.recaps()[0].episode_span, "EP1-10");
    }
}
