//! Spoiler rule calculation.
//!
//! Derives, for a reader's progress episode, the set of future episodes and
//! facts a reply must never reference, plus the bounded set of hooks that
//! may be teased. Hooks come only from unreached entries inside the
//! reader's *current* beat: a hook from a beat the reader hasn't reached at
//! all would spoil the arc's existence.

use super::beat::resolve_beat;
use crate::prompt::PromptBudget;
use crate::store::ProgressionTable;
use std::collections::HashSet;

/// An episode entry the reader has not reached yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoilerEpisode {
    pub episode_id: u32,
    pub objective: String,
}

/// The derived no-spoiler rule set for one reader position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoilerRules {
    /// Episodes strictly ahead of the reader; never mention their content.
    pub spoiler_episodes: Vec<SpoilerEpisode>,
    /// Facts revealed in those episodes; never output, even obliquely.
    pub spoiler_facts: Vec<String>,
    /// Hooks from unreached entries in the reader's current beat; the only
    /// forward-looking content allowed to leak, and only as teasers.
    pub engagement_hooks: Vec<String>,
}

/// Compute spoiler rules for a reader's progress episode.
///
/// All output lists are truncated to the budget, never errored on.
pub fn spoiler_rules(
    progression: &ProgressionTable,
    reader_episode: u32,
    budget: &PromptBudget,
) -> SpoilerRules {
    let current_beat_id = resolve_beat(progression, reader_episode).beat_id;

    let mut rules = SpoilerRules::default();
    let mut seen_hooks = HashSet::new();

    for (beat_id, entry) in progression.all_entries() {
        if entry.episode_id <= reader_episode {
            continue;
        }

        if rules.spoiler_episodes.len() < budget.max_spoiler_episodes {
            rules.spoiler_episodes.push(SpoilerEpisode {
                episode_id: entry.episode_id,
                objective: entry.objective.clone(),
            });
        }

        for fact in &entry.facts_revealed {
            if rules.spoiler_facts.len() < budget.max_spoiler_facts {
                rules.spoiler_facts.push(fact.fact.clone());
            }
        }

        if Some(beat_id) == current_beat_id {
            for hook in &entry.hooks {
                if rules.engagement_hooks.len() < budget.max_hooks
                    && seen_hooks.insert(hook.clone())
                {
                    rules.engagement_hooks.push(hook.clone());
                }
            }
        }
    }

    rules
}
