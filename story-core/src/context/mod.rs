//! Narrative context resolution.
//!
//! Given a character, a reader's progress episode, and the episode a post
//! references, each resolver independently derives its slice of context from
//! the Narrative Store, keyed by beat/episode:
//!
//! - [`resolve_beat`] maps an episode to its beat (§ beat structure)
//! - [`resolve_knowledge`] pins the character's knowledge snapshot
//! - [`spoiler_rules`] derives what must never be mentioned and what may be
//!   teased
//! - [`previous_beats`] condenses the prior story
//! - [`beat_progress`] tracks the reader's position inside the current beat
//!
//! [`resolve_context`] runs all of them and aggregates the result. Every
//! path degrades to a documented sentinel rather than failing: resolution
//! never returns an error.

mod beat;
mod history;
mod knowledge;
mod progress;
mod spoilers;

pub use beat::{resolve_beat, BeatInfo};
pub use history::{previous_beats, BeatRecap, PlotHistory};
pub use knowledge::{resolve_knowledge, KnowledgeSnapshot};
pub use progress::{beat_progress, BeatProgress, HeardEpisode, ReachedCliffhanger};
pub use spoilers::{spoiler_rules, SpoilerEpisode, SpoilerRules};

use crate::prompt::PromptBudget;
use crate::store::{canonical_id, Persona, ShowData};

/// Everything the prompt assembler needs for one reply, fully resolved.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    /// Canonical character id the context was resolved for.
    pub character_id: String,
    pub show_id: String,
    /// The reader's progress episode: the spoiler boundary.
    pub reader_episode: u32,
    /// The episode the post/comment references. Carried for callers; the
    /// reader episode remains the sole spoiler boundary.
    pub referenced_episode: u32,
    /// Persona, if the character is authored in the persona table.
    pub persona: Option<Persona>,
    /// The reader's current beat.
    pub beat: BeatInfo,
    pub knowledge: KnowledgeSnapshot,
    pub spoilers: SpoilerRules,
    pub history: PlotHistory,
    pub progress: BeatProgress,
}

/// Resolve the complete narrative context for one reply.
pub fn resolve_context(
    show: &ShowData,
    show_id: &str,
    character_id: &str,
    reader_episode: u32,
    referenced_episode: u32,
    budget: &PromptBudget,
) -> ResolvedContext {
    let character_id = canonical_id(character_id);
    let beat = resolve_beat(&show.progression, reader_episode);

    ResolvedContext {
        persona: show.persona(&character_id).cloned(),
        knowledge: resolve_knowledge(&show.journeys, &character_id, reader_episode),
        spoilers: spoiler_rules(&show.progression, reader_episode, budget),
        history: previous_beats(&show.plots, beat.beat_id, budget),
        progress: beat_progress(&show.progression, reader_episode),
        character_id,
        show_id: canonical_id(show_id),
        reader_episode,
        referenced_episode,
        beat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_context_on_empty_show() {
        let show = ShowData::default();
        let ctx = resolve_context(
            &show,
            "saving_nora",
            "Nora Smith",
            5,
            3,
            &PromptBudget::default(),
        );

        assert_eq!(ctx.character_id, "nora_smith");
        assert_eq!(ctx.show_id, "saving_nora");
        assert!(ctx.persona.is_none());
        assert_eq!(ctx.beat.beat_id, None);
        assert_eq!(ctx.knowledge.emotional_state, "Unknown");
        assert!(ctx.spoilers.spoiler_facts.is_empty());
        assert_eq!(ctx.history, PlotHistory::NotYetBegun);
    }
}
