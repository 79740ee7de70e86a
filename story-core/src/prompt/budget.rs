//! Prompt size budgets.
//!
//! Every list the assembler renders is bounded by an explicit budget rather
//! than scattered literal constants, so truncation policy is a single
//! tunable. Truncation never errors; overflow is silently dropped to keep
//! downstream prompts a bounded size.

/// Caps applied during spoiler calculation, history formatting, and
/// template rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    /// Spoiler episode entries retained by the calculator.
    pub max_spoiler_episodes: usize,
    /// Spoiler facts retained by the calculator.
    pub max_spoiler_facts: usize,
    /// Engagement hooks retained after deduplication.
    pub max_hooks: usize,
    /// Prior beats kept in the plot history (most recent win).
    pub max_history_beats: usize,
    /// Character ceiling for one condensed beat summary.
    pub summary_char_ceiling: usize,
    /// Character ceiling for an episode objective snippet.
    pub max_objective_chars: usize,
    /// "What you know" items rendered in the full template.
    pub max_known_facts: usize,
    /// "What you don't know" items rendered in the full template.
    pub max_unknown_facts: usize,
    /// Generic cap for other list sections (topics, reveals, teases).
    pub max_section_items: usize,
    /// Verbal tics included in voice rules.
    pub max_verbal_tics: usize,
    /// Never-says entries included in voice rules.
    pub max_never_says: usize,
    /// Signature phrases included in voice rules.
    pub max_signature_phrases: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_spoiler_episodes: 20,
            max_spoiler_facts: 20,
            max_hooks: 10,
            max_history_beats: 5,
            summary_char_ceiling: 500,
            max_objective_chars: 80,
            max_known_facts: 15,
            max_unknown_facts: 10,
            max_section_items: 10,
            max_verbal_tics: 5,
            max_never_says: 5,
            max_signature_phrases: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let budget = PromptBudget::default();
        assert_eq!(budget.max_hooks, 10);
        assert_eq!(budget.max_history_beats, 5);
        assert_eq!(budget.summary_char_ceiling, 500);
    }
}
