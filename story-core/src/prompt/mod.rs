//! Spoiler-safe prompt assembly.
//!
//! Renders a [`ResolvedContext`] through one of three template variants.
//! The variants trade context completeness for size, but all satisfy the
//! same contract: state the reader's progress boundary, forbid referencing
//! anything past it, and instruct the model to end on a hook rather than a
//! flat acknowledgment. Optional fields render as labeled-but-empty
//! sections so template structure stays stable regardless of data sparsity.
//!
//! Assembly is pure string work over already-resolved data: no I/O, no
//! randomness, byte-identical output for identical inputs.

mod budget;

pub use budget::PromptBudget;

use crate::context::{PlotHistory, ResolvedContext};

/// Static guidance blocks shared by renderers.
const HOOK_TECHNIQUES: &str = include_str!("templates/hook_techniques.txt");
const ANTI_PATTERNS: &str = include_str!("templates/anti_patterns.txt");

const DIVIDER: &str =
    "===============================================================================";

/// Which prompt rendering strategy to use. Selection is an explicit caller
/// input, chosen on the cost/quality tradeoff, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateVariant {
    /// Complete persona, voice rules, history, spoiler explanation, and
    /// worked hook examples.
    Full,
    /// Same semantic fields, shorter prose, no worked examples.
    Concise,
    /// Emotional state, a short voice cue, and the teasable hooks only;
    /// for cheap/fast generation paths.
    Minimal,
}

impl TemplateVariant {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateVariant::Full => "full",
            TemplateVariant::Concise => "concise",
            TemplateVariant::Minimal => "minimal",
        }
    }
}

/// The post and comment being replied to.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInputs<'a> {
    pub post_text: &'a str,
    pub user_message: &'a str,
}

/// Assemble the generation prompt for one reply.
pub fn assemble(
    ctx: &ResolvedContext,
    inputs: &PromptInputs<'_>,
    variant: TemplateVariant,
    budget: &PromptBudget,
) -> String {
    let view = PromptView::extract(ctx, budget);
    match variant {
        TemplateVariant::Full => render_full(ctx, &view, inputs, budget),
        TemplateVariant::Concise => render_concise(ctx, &view, inputs, budget),
        TemplateVariant::Minimal => render_minimal(ctx, &view, inputs),
    }
}

/// Truncate to a character ceiling, appending an ellipsis marker when text
/// was dropped. Operates on chars, not bytes.
pub(crate) fn truncate_chars(text: &str, ceiling: usize) -> String {
    if text.chars().count() <= ceiling {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(ceiling).collect();
    truncated.push_str("...");
    truncated
}

// ============================================================================
// Shared context extraction
// ============================================================================

/// Pre-formatted pieces shared by all renderers, extracted once so the
/// template contract is enforced in one place.
struct PromptView {
    character_name: String,
    persona_block: String,
    vocabulary: String,
    rhythm: String,
    emotional_default: String,
    humor: String,
    signature_phrases: String,
    never_says: String,
    verbal_tics: String,
    emotional_state: String,
    history_block: String,
    history_inline: String,
    tease_block: String,
    tease_inline: String,
}

impl PromptView {
    fn extract(ctx: &ResolvedContext, budget: &PromptBudget) -> Self {
        let persona = ctx.persona.as_ref();

        let character_name = persona
            .map(|p| p.identity.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ctx.character_id.clone());

        let persona_block = match persona {
            Some(persona) => {
                let mut lines = vec![format!("Name: {character_name}")];
                if !persona.identity.one_liner.is_empty() {
                    lines.push(format!("Role: {}", persona.identity.one_liner));
                }
                if !persona.psychology.core_want.is_empty() {
                    lines.push(format!("Core want: {}", persona.psychology.core_want));
                }
                if !persona.psychology.primary_fear.is_empty() {
                    lines.push(format!("Primary fear: {}", persona.psychology.primary_fear));
                }
                if !persona.psychology.self_perception.is_empty() {
                    lines.push(format!(
                        "Self-perception: {}",
                        persona.psychology.self_perception
                    ));
                }
                lines.join("\n")
            }
            None => format!("Name: {character_name}"),
        };

        let or_default = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        let (vocabulary, rhythm, emotional_default, humor) = match persona {
            Some(p) => (
                or_default(&p.voice.vocabulary, "normal"),
                or_default(&p.voice.rhythm, "normal"),
                or_default(&p.voice.emotional_default, "neutral"),
                or_default(&p.voice.humor, "none"),
            ),
            None => (
                "normal".to_string(),
                "normal".to_string(),
                "neutral".to_string(),
                "none".to_string(),
            ),
        };

        let signature_phrases = inline_list(
            persona.map(|p| p.signature_phrases.as_slice()).unwrap_or(&[]),
            budget.max_signature_phrases,
            "None specific",
        );
        let never_says = inline_list(
            persona.map(|p| p.never_says.as_slice()).unwrap_or(&[]),
            budget.max_never_says,
            "None specific",
        );
        let verbal_tics = inline_list(
            persona.map(|p| p.verbal_tics.as_slice()).unwrap_or(&[]),
            budget.max_verbal_tics,
            "None specific",
        );

        let emotional_state = if ctx.knowledge.emotional_state.is_empty() {
            "Engaged with current events".to_string()
        } else {
            ctx.knowledge.emotional_state.clone()
        };

        let history_block = match &ctx.history {
            PlotHistory::NotYetBegun => {
                "The story has not yet begun - this is the opening arc.".to_string()
            }
            PlotHistory::Beats(recaps) => {
                let mut block = String::new();
                for recap in recaps {
                    block.push_str(&format!(
                        "**Beat {} - {} ({}):**\n{}\n\n",
                        recap.beat_id, recap.title, recap.episode_span, recap.summary
                    ));
                }
                block.trim_end().to_string()
            }
        };

        let history_inline = match &ctx.history {
            PlotHistory::NotYetBegun => "Story beginning".to_string(),
            PlotHistory::Beats(recaps) => recaps
                .iter()
                .map(|r| format!("Beat {}: {}", r.beat_id, r.title))
                .collect::<Vec<_>>()
                .join("; "),
        };

        let tease_block = bullet_list(
            &ctx.knowledge.can_tease,
            budget.max_section_items,
            "Nothing specific authored - lean on your current situation to create intrigue",
        );
        let tease_inline = inline_list(
            &ctx.knowledge.can_tease,
            budget.max_section_items,
            "your current situation",
        );

        Self {
            character_name,
            persona_block,
            vocabulary,
            rhythm,
            emotional_default,
            humor,
            signature_phrases,
            never_says,
            verbal_tics,
            emotional_state,
            history_block,
            history_inline,
            tease_block,
            tease_inline,
        }
    }
}

/// The progress boundary every variant must state.
fn boundary_line(reader_episode: u32) -> String {
    format!(
        "The reader is at Episode {reader_episode}. Never reference, hint at, or react to anything past Episode {reader_episode}."
    )
}

/// The closing instruction every variant must carry.
const HOOK_LINE: &str =
    "END your reply with a hook that creates curiosity about what happens next, never a flat acknowledgment.";

fn bullet_list(items: &[String], cap: usize, empty_placeholder: &str) -> String {
    if items.is_empty() {
        return format!("- {empty_placeholder}");
    }
    items
        .iter()
        .take(cap)
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn inline_list(items: &[String], cap: usize, empty_placeholder: &str) -> String {
    if items.is_empty() {
        return empty_placeholder.to_string();
    }
    items.iter().take(cap).cloned().collect::<Vec<_>>().join("; ")
}

fn section(prompt: &mut String, title: &str) {
    prompt.push_str(DIVIDER);
    prompt.push('\n');
    prompt.push_str(title);
    prompt.push('\n');
    prompt.push_str(DIVIDER);
    prompt.push('\n');
}

// ============================================================================
// Variant renderers
// ============================================================================

fn render_full(
    ctx: &ResolvedContext,
    view: &PromptView,
    inputs: &PromptInputs<'_>,
    budget: &PromptBudget,
) -> String {
    let mut p = String::new();
    p.push_str(&format!(
        "You are {}, replying in character to a fan comment about your show.\n\n",
        view.character_name
    ));

    section(&mut p, "## 1. CHARACTER ESSENCE (who you are)");
    p.push_str(&view.persona_block);
    p.push_str("\n\n### Voice guidelines (not rigid rules - vary your language naturally)\n");
    p.push_str(&format!("- Vocabulary: {}\n", view.vocabulary));
    p.push_str(&format!("- Rhythm: {}\n", view.rhythm));
    p.push_str(&format!("- Default tone: {}\n", view.emotional_default));
    p.push_str(&format!("- Humor: {}\n", view.humor));
    p.push_str(&format!("- Verbal tics: {}\n", view.verbal_tics));
    p.push_str("\n### Phrases you MIGHT use (pick one occasionally, never every reply):\n");
    p.push_str(&view.signature_phrases);
    p.push_str("\n\n### Things you would NEVER say:\n");
    p.push_str(&view.never_says);
    p.push_str("\n\n");

    section(&mut p, "## 2. PRIOR STORY (what has happened so far)");
    p.push_str(&view.history_block);
    p.push_str("\n\n");

    let beat_title = if ctx.beat.title.is_empty() {
        "Unknown"
    } else {
        &ctx.beat.title
    };
    section(
        &mut p,
        &format!(
            "## 3. CURRENT STORY MOMENT (Beat {}: {beat_title})",
            ctx.beat
                .beat_id
                .map_or_else(|| "?".to_string(), |id| id.to_string()),
        ),
    );
    p.push_str("### Episodes the reader has heard in this beat:\n");
    if ctx.progress.heard.is_empty() {
        p.push_str("- (none authored)\n");
    }
    for episode in &ctx.progress.heard {
        let marker = if episode.cliffhanger.is_some() { "*" } else { "-" };
        p.push_str(&format!(
            "{marker} EP{}: {}\n",
            episode.episode_id, episode.objective
        ));
    }
    p.push_str("\n### Cliffhangers the reader has reached:\n");
    if ctx.progress.cliffhangers.is_empty() {
        p.push_str("- (none yet)\n");
    }
    for cliff in &ctx.progress.cliffhangers {
        p.push_str(&format!("- EP{}: \"{}\"\n", cliff.episode_id, cliff.line));
    }
    p.push_str("\n### Facts the reader now knows:\n");
    p.push_str(&bullet_list(
        &ctx.progress.known_facts,
        budget.max_section_items,
        "(none yet)",
    ));
    p.push_str("\n\n");

    section(&mut p, "## 4. YOUR KNOWLEDGE STATE & CURRENT DRAMA");
    p.push_str("### What YOU know at this point:\n");
    p.push_str(&bullet_list(
        &ctx.knowledge.knows,
        budget.max_known_facts,
        "(nothing authored)",
    ));
    p.push_str("\n\n### What you DON'T know yet (respond with genuine ignorance, not deflection):\n");
    p.push_str(&bullet_list(
        &ctx.knowledge.doesnt_know,
        budget.max_unknown_facts,
        "(nothing authored)",
    ));
    p.push_str("\n\n### Topics you can discuss freely:\n");
    p.push_str(&bullet_list(
        &ctx.knowledge.can_discuss_freely,
        budget.max_section_items,
        "(nothing authored)",
    ));
    p.push_str("\n\n### Things you MUST NOT reveal, even obliquely:\n");
    p.push_str(&bullet_list(
        &ctx.knowledge.must_not_reveal,
        budget.max_section_items,
        "(nothing authored)",
    ));
    p.push_str("\n\n### Things you CAN hint at (create intrigue without spoiling):\n");
    p.push_str(&view.tease_block);
    p.push_str("\n\n### Your relationships right now:\n");
    if ctx.knowledge.relationships.is_empty() {
        p.push_str("- (none authored)\n");
    }
    for (other, descriptor) in &ctx.knowledge.relationships {
        p.push_str(&format!("- {other}: {descriptor}\n"));
    }
    p.push_str(&format!(
        "\n### Your emotional state right now:\n{}\n\n",
        view.emotional_state
    ));

    section(&mut p, "## 5. SPOILER CONTROL");
    p.push_str(&boundary_line(ctx.reader_episode));
    p.push_str("\n\n### NEVER MENTION (the reader has not reached these):\n");
    if ctx.spoilers.spoiler_episodes.is_empty() {
        p.push_str("- (nothing ahead - the reader is fully caught up)\n");
    }
    for episode in ctx
        .spoilers
        .spoiler_episodes
        .iter()
        .take(budget.max_section_items)
    {
        p.push_str(&format!(
            "- EP{}: {}\n",
            episode.episode_id,
            truncate_chars(&episode.objective, budget.max_objective_chars)
        ));
    }
    p.push_str("\n### FACTS TO NEVER REVEAL:\n");
    p.push_str(&bullet_list(
        &ctx.spoilers.spoiler_facts,
        budget.max_section_items,
        "(none ahead)",
    ));
    p.push_str("\n\n### HOOKS YOU CAN TEASE (hint, don't reveal):\n");
    p.push_str(&bullet_list(
        &ctx.spoilers.engagement_hooks,
        budget.max_hooks,
        "(none available)",
    ));
    p.push_str("\n\n");

    section(&mut p, "## 6. ENGAGEMENT CRAFT");
    p.push_str(HOOK_TECHNIQUES);
    p.push('\n');
    p.push_str(ANTI_PATTERNS);
    p.push('\n');

    section(&mut p, "## CONTEXT");
    p.push_str(&format!("Post: {}\n", inputs.post_text));
    p.push_str(&format!("Fan comment: {}\n\n", inputs.user_message));

    section(&mut p, "## YOUR REPLY");
    p.push_str("Write 1-4 sentences that:\n");
    p.push_str("- sound authentically like you, not a bot reciting phrases\n");
    p.push_str("- engage emotionally with what the fan said\n");
    p.push_str(&format!("- {HOOK_LINE}\n"));
    p.push_str(&format!(
        "- stay spoiler-free: nothing past Episode {}\n",
        ctx.reader_episode
    ));
    p
}

fn render_concise(
    ctx: &ResolvedContext,
    view: &PromptView,
    inputs: &PromptInputs<'_>,
    budget: &PromptBudget,
) -> String {
    let mut p = String::new();
    p.push_str(&format!(
        "You are {} replying to a fan comment. {}\n\n",
        view.character_name,
        boundary_line(ctx.reader_episode)
    ));

    p.push_str("## YOUR VOICE\n");
    p.push_str(&format!(
        "Style: {}. Rhythm: {}\n",
        view.vocabulary, view.rhythm
    ));
    p.push_str(&format!(
        "Example phrases (use sparingly, vary your language): {}\n",
        view.signature_phrases
    ));
    p.push_str(&format!("NEVER say: {}\n\n", view.never_says));

    p.push_str(&format!(
        "## YOUR CURRENT STATE (at EP{})\n",
        ctx.reader_episode
    ));
    p.push_str(&format!("Emotional state: {}\n", view.emotional_state));
    p.push_str(&format!(
        "What you know: {}\n",
        inline_list(
            &ctx.knowledge.knows,
            budget.max_known_facts,
            "Basic story knowledge"
        )
    ));
    p.push_str(&format!(
        "What you DON'T know (be genuinely ignorant): {}\n",
        inline_list(
            &ctx.knowledge.doesnt_know,
            budget.max_unknown_facts,
            "Nothing specific"
        )
    ));
    p.push_str(&format!(
        "Never reveal: {}\n\n",
        inline_list(
            &ctx.knowledge.must_not_reveal,
            budget.max_section_items,
            "Nothing specific"
        )
    ));

    p.push_str("## THINGS YOU CAN TEASE (create intrigue):\n");
    p.push_str(&view.tease_inline);
    p.push_str("\n\n## STORY CONTEXT\n");
    p.push_str(&format!("Previous beats: {}\n", view.history_inline));
    let beat_title = if ctx.beat.title.is_empty() {
        "Unknown"
    } else {
        &ctx.beat.title
    };
    p.push_str(&format!("Current beat: {beat_title}\n\n"));

    p.push_str("## RULES\n");
    p.push_str(&format!(
        "- NO spoilers beyond EP{}\n",
        ctx.reader_episode
    ));
    p.push_str("- 1-4 sentences, natural fan-thread style\n");
    p.push_str(&format!("- {HOOK_LINE}\n\n"));

    p.push_str("## POST & COMMENT\n");
    p.push_str(&format!("Post: {}\n", inputs.post_text));
    p.push_str(&format!("Fan says: {}\n\n", inputs.user_message));
    p.push_str(&format!(
        "Reply as {} (engage emotionally, end with intrigue):\n",
        view.character_name
    ));
    p
}

fn render_minimal(ctx: &ResolvedContext, view: &PromptView, inputs: &PromptInputs<'_>) -> String {
    let mut p = String::new();
    p.push_str(&format!(
        "You are {}. {}\n\n",
        view.character_name,
        boundary_line(ctx.reader_episode)
    ));
    p.push_str(&format!(
        "Voice: {}. Vary your language.\n",
        view.rhythm
    ));
    p.push_str(&format!("Emotional state: {}\n", view.emotional_state));
    p.push_str(&format!("You can hint at: {}\n\n", view.tease_inline));
    p.push_str(&format!(
        "RULES: No spoilers past EP{}. 1-4 sentences. {HOOK_LINE}\n\n",
        ctx.reader_episode
    ));
    p.push_str(&format!("Post: {}\n", inputs.post_text));
    p.push_str(&format!("Fan: {}\n\n", inputs.user_message));
    p.push_str("Reply (be authentic, create curiosity):\n");
    p
}
