//! Narrative-state resolution and spoiler-safe prompt assembly.
//!
//! This crate is the engine behind in-character fan replies for a
//! serialized show: given a character, how far a reader has progressed, and
//! the episode a post references, it computes exactly what that character is
//! allowed to know, say, hint at, or must never reveal, and assembles the
//! result into a generation request.
//!
//! - [`store`] loads and caches the read-only narrative tables
//! - [`context`] resolves beats, knowledge snapshots, spoiler rules, and
//!   plot history for one reader position
//! - [`prompt`] renders the resolved context through a template variant
//! - [`reply`] drives the full pipeline and post-processes model output
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use story_core::{NarrativeStore, ReplyEngine, ReplyQuery, TemplateVariant};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(NarrativeStore::new("context"));
//!     let engine = ReplyEngine::from_env(store).expect("GEMINI_API_KEY not set");
//!
//!     let query = ReplyQuery::new("nora_smith", "saving_nora", 25)
//!         .with_post_text("Angela got what she deserved")
//!         .with_user_message("Nora, do you think Justin knows you're Athena?")
//!         .with_variant(TemplateVariant::Concise);
//!
//!     if let Some(text) = engine.reply(&query).await.text() {
//!         println!("{text}");
//!     }
//! }
//! ```

pub mod context;
pub mod prompt;
pub mod reply;
pub mod store;
pub mod testing;

// Primary public API
pub use context::{
    resolve_beat, resolve_context, spoiler_rules, BeatInfo, KnowledgeSnapshot, PlotHistory,
    ResolvedContext, SpoilerRules,
};
pub use prompt::{assemble, PromptBudget, PromptInputs, TemplateVariant};
pub use reply::{
    postprocess, EngineConfig, NoReplyReason, ReplyEngine, ReplyOutcome, ReplyQuery, Resolution,
};
pub use store::{canonical_id, NarrativeStore, Persona, ShowData};
