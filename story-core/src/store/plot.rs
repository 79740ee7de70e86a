//! Beat-level plot summaries.
//!
//! Each beat carries up to three summary fragments (start, mid, end) that the
//! history formatter collapses into one condensed recap.

use serde::{Deserialize, Serialize};

/// Summary fragments for one beat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatSummary {
    pub beat_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_episode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl BeatSummary {
    /// Concatenate the authored fragments in order; missing fragments are
    /// omitted, not padded.
    pub fn condensed(&self) -> String {
        [&self.start, &self.mid, &self.end]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Display form of the episode span, e.g. `EP1-10` or `EP?-?`.
    pub fn episode_span(&self) -> String {
        let start = self
            .start_episode
            .map_or_else(|| "?".to_string(), |e| e.to_string());
        let end = self
            .end_episode
            .map_or_else(|| "?".to_string(), |e| e.to_string());
        format!("EP{start}-{end}")
    }
}

/// The plot summary table for one show, in beat order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlotTable {
    #[serde(default)]
    pub beats: Vec<BeatSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condensed_skips_missing_fragments() {
        let summary = BeatSummary {
            beat_id: 1,
            title: "Homecoming".to_string(),
            start_episode: Some(1),
            end_episode: Some(10),
            start: Some("Nora returns.".to_string()),
            mid: None,
            end: Some("The engagement shatters.".to_string()),
        };

        assert_eq!(summary.condensed(), "Nora returns. The engagement shatters.");
    }

    #[test]
    fn test_episode_span_with_unknowns() {
        let summary = BeatSummary {
            beat_id: 2,
            title: String::new(),
            start_episode: None,
            end_episode: Some(20),
            start: None,
            mid: None,
            end: None,
        };

        assert_eq!(summary.episode_span(), "EP?-20");
        assert_eq!(summary.condensed(), "");
    }
}
