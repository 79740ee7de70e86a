//! In-character reply engine.
//!
//! The `ReplyEngine` is the single entry point consumed by the surrounding
//! application: it resolves narrative context from the store, assembles a
//! prompt through the chosen template variant, invokes the generation
//! client, and post-processes the output. Resolution is synchronous and
//! side-effect-free; only the generation call touches the network.

use crate::context::{resolve_context, ResolvedContext};
use crate::prompt::{assemble, PromptBudget, PromptInputs, TemplateVariant};
use crate::store::NarrativeStore;
use genai::{Gemini, SafetySetting};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for the reply engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model override; `None` uses the client default.
    pub model: Option<String>,

    /// Temperature for generation.
    pub temperature: f32,

    /// Nucleus sampling parameter.
    pub top_p: f32,

    /// Top-k sampling parameter.
    pub top_k: u32,

    /// Replies are short by design; keep the output budget tight.
    pub max_output_tokens: u32,

    /// Variant used when a query does not choose one.
    pub default_variant: TemplateVariant,

    /// Size budget threaded through resolution and assembly.
    pub budget: PromptBudget,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 150,
            default_variant: TemplateVariant::Full,
            budget: PromptBudget::default(),
        }
    }
}

/// One reply request from the surrounding application.
#[derive(Debug, Clone)]
pub struct ReplyQuery {
    /// Character who should reply; display names are accepted and
    /// canonicalized ("Nora Smith" -> `nora_smith`).
    pub character_id: String,
    pub show_id: String,
    /// How far this reader has progressed: the spoiler boundary.
    pub reader_episode: u32,
    /// Episode the post references; defaults to the reader's episode.
    pub referenced_episode: Option<u32>,
    /// The post being discussed.
    pub post_text: String,
    /// The fan comment to reply to.
    pub user_message: String,
    /// Template choice; engine default applies when `None`.
    pub variant: Option<TemplateVariant>,
}

impl ReplyQuery {
    pub fn new(
        character_id: impl Into<String>,
        show_id: impl Into<String>,
        reader_episode: u32,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            show_id: show_id.into(),
            reader_episode,
            referenced_episode: None,
            post_text: String::new(),
            user_message: String::new(),
            variant: None,
        }
    }

    pub fn with_post_text(mut self, post_text: impl Into<String>) -> Self {
        self.post_text = post_text.into();
        self
    }

    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = user_message.into();
        self
    }

    pub fn with_referenced_episode(mut self, episode: u32) -> Self {
        self.referenced_episode = Some(episode);
        self
    }

    pub fn with_variant(mut self, variant: TemplateVariant) -> Self {
        self.variant = Some(variant);
        self
    }
}

/// Pre-rendered prompt text for every template variant.
#[derive(Debug, Clone)]
pub struct RenderedVariants {
    pub full: String,
    pub concise: String,
    pub minimal: String,
}

impl RenderedVariants {
    pub fn get(&self, variant: TemplateVariant) -> &str {
        match variant {
            TemplateVariant::Full => &self.full,
            TemplateVariant::Concise => &self.concise,
            TemplateVariant::Minimal => &self.minimal,
        }
    }
}

/// The fully resolved context plus rendered prompts, as returned by the
/// resolution API.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub context: ResolvedContext,
    pub rendered: RenderedVariants,
}

/// Why no reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoReplyReason {
    /// The generation client failed (network, API error, misconfiguration).
    ClientError,
    /// The safety layer blocked the prompt or the output.
    SafetyBlocked,
    /// Generation succeeded but produced nothing usable.
    EmptyOutput,
}

impl fmt::Display for NoReplyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NoReplyReason::ClientError => "client error",
            NoReplyReason::SafetyBlocked => "safety blocked",
            NoReplyReason::EmptyOutput => "empty output",
        };
        f.write_str(reason)
    }
}

/// Result of a reply attempt. On failure the caller decides whether to
/// retry, skip, or show static fallback copy; the engine never fabricates a
/// placeholder line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reply(String),
    NoReply(NoReplyReason),
}

impl ReplyOutcome {
    /// The reply text, if one was produced.
    pub fn text(&self) -> Option<&str> {
        match self {
            ReplyOutcome::Reply(text) => Some(text),
            ReplyOutcome::NoReply(_) => None,
        }
    }
}

/// The in-character reply engine.
pub struct ReplyEngine {
    store: Arc<NarrativeStore>,
    client: Gemini,
    config: EngineConfig,
}

impl ReplyEngine {
    /// Create an engine over a shared narrative store and generation client.
    pub fn new(store: Arc<NarrativeStore>, client: Gemini) -> Self {
        Self {
            store,
            client,
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with the client configured from GEMINI_API_KEY.
    pub fn from_env(store: Arc<NarrativeStore>) -> Result<Self, genai::Error> {
        Ok(Self::new(store, Gemini::from_env()?))
    }

    /// Configure the engine.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn resolve_for(&self, query: &ReplyQuery) -> ResolvedContext {
        let show = self.store.show(&query.show_id);
        resolve_context(
            &show,
            &query.show_id,
            &query.character_id,
            query.reader_episode,
            query.referenced_episode.unwrap_or(query.reader_episode),
            &self.config.budget,
        )
    }

    /// Resolve the full context for a query and pre-render every template
    /// variant. Never fails: missing data degrades to sentinel context.
    pub fn resolve(&self, query: &ReplyQuery) -> Resolution {
        let context = self.resolve_for(query);

        let inputs = PromptInputs {
            post_text: &query.post_text,
            user_message: &query.user_message,
        };
        let rendered = RenderedVariants {
            full: assemble(&context, &inputs, TemplateVariant::Full, &self.config.budget),
            concise: assemble(
                &context,
                &inputs,
                TemplateVariant::Concise,
                &self.config.budget,
            ),
            minimal: assemble(
                &context,
                &inputs,
                TemplateVariant::Minimal,
                &self.config.budget,
            ),
        };

        Resolution { context, rendered }
    }

    /// Assemble the prompt for the query's chosen variant.
    pub fn assemble_prompt(&self, query: &ReplyQuery) -> String {
        let context = self.resolve_for(query);
        let inputs = PromptInputs {
            post_text: &query.post_text,
            user_message: &query.user_message,
        };
        let variant = query.variant.unwrap_or(self.config.default_variant);
        assemble(&context, &inputs, variant, &self.config.budget)
    }

    /// Generate an in-character reply to a fan comment.
    pub async fn reply(&self, query: &ReplyQuery) -> ReplyOutcome {
        let context = self.resolve_for(query);
        let inputs = PromptInputs {
            post_text: &query.post_text,
            user_message: &query.user_message,
        };
        let variant = query.variant.unwrap_or(self.config.default_variant);
        let prompt = assemble(&context, &inputs, variant, &self.config.budget);

        debug!(
            character = %context.character_id,
            reader_episode = query.reader_episode,
            variant = variant.name(),
            prompt_chars = prompt.len(),
            "generating reply"
        );

        let mut request = genai::Request::new(prompt)
            .with_temperature(self.config.temperature)
            .with_top_p(self.config.top_p)
            .with_top_k(self.config.top_k)
            .with_max_output_tokens(self.config.max_output_tokens)
            .with_safety(SafetySetting::block_none_all());
        if let Some(model) = &self.config.model {
            request = request.with_model(model);
        }

        let character_name = context
            .persona
            .as_ref()
            .map(|p| p.identity.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&context.character_id)
            .to_string();

        match self.client.generate(request).await {
            Ok(response) => {
                let cleaned = postprocess(&response.text, &character_name);
                if cleaned.is_empty() {
                    ReplyOutcome::NoReply(NoReplyReason::EmptyOutput)
                } else {
                    ReplyOutcome::Reply(cleaned)
                }
            }
            Err(genai::Error::Blocked(reason)) => {
                warn!(character = %context.character_id, %reason, "generation blocked");
                ReplyOutcome::NoReply(NoReplyReason::SafetyBlocked)
            }
            Err(genai::Error::Empty) => ReplyOutcome::NoReply(NoReplyReason::EmptyOutput),
            Err(error) => {
                warn!(character = %context.character_id, %error, "generation failed");
                ReplyOutcome::NoReply(NoReplyReason::ClientError)
            }
        }
    }
}

/// Clean up raw model output into a postable reply.
///
/// Trims whitespace, strips wrapping quote characters and basic emphasis
/// markup, and removes a small set of role-prefix echoes the model may
/// repeat back ("Reply:", "Response:", "Character:", or the character's own
/// name followed by a colon).
pub fn postprocess(raw: &str, character_name: &str) -> String {
    let mut text = raw.trim().to_string();

    text = text
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string();

    text = text.replace("**", "").replace('*', "");

    let name_prefix = format!("{character_name}:");
    for prefix in ["Reply:", "Response:", "Character:", name_prefix.as_str()] {
        if let Some(head) = text.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                text = text[prefix.len()..].trim().to_string();
            }
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postprocess_trims_and_strips_quotes() {
        assert_eq!(postprocess("  \"Just wait.\"  ", "Nora Smith"), "Just wait.");
        assert_eq!(postprocess("'Hmm.'", "Nora Smith"), "Hmm.");
    }

    #[test]
    fn test_postprocess_strips_emphasis() {
        assert_eq!(
            postprocess("**Some** things *stay* buried.", "Nora Smith"),
            "Some things stay buried."
        );
    }

    #[test]
    fn test_postprocess_strips_role_prefixes() {
        assert_eq!(postprocess("Reply: Just wait.", "Nora Smith"), "Just wait.");
        assert_eq!(
            postprocess("reply: case insensitive", "Nora Smith"),
            "case insensitive"
        );
        assert_eq!(
            postprocess("Nora Smith: You don't know the half of it.", "Nora Smith"),
            "You don't know the half of it."
        );
        assert_eq!(
            postprocess("Character: Some secrets stay buried.", "Nora Smith"),
            "Some secrets stay buried."
        );
    }

    #[test]
    fn test_postprocess_empty_stays_empty() {
        assert_eq!(postprocess("   ", "Nora Smith"), "");
        assert_eq!(postprocess("\"\"", "Nora Smith"), "");
    }

    #[test]
    fn test_query_builder() {
        let query = ReplyQuery::new("Nora Smith", "saving_nora", 25)
            .with_post_text("Angela got what she deserved")
            .with_user_message("Do you think Justin knows?")
            .with_referenced_episode(23)
            .with_variant(TemplateVariant::Concise);

        assert_eq!(query.reader_episode, 25);
        assert_eq!(query.referenced_episode, Some(23));
        assert_eq!(query.variant, Some(TemplateVariant::Concise));
    }

    #[test]
    fn test_no_reply_reason_display() {
        assert_eq!(NoReplyReason::SafetyBlocked.to_string(), "safety blocked");
        assert_eq!(
            ReplyOutcome::NoReply(NoReplyReason::EmptyOutput).text(),
            None
        );
        assert_eq!(
            ReplyOutcome::Reply("hi".to_string()).text(),
            Some("hi")
        );
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_output_tokens, 150);
        assert_eq!(config.default_variant, TemplateVariant::Full);
        assert!(config.model.is_none());
    }
}
