//! End-to-end demo of the reply pipeline.
//!
//! Writes the fixture show to a temporary narrative store, resolves context
//! for a reader mid-story, and prints the assembled prompt for each template
//! variant. If GEMINI_API_KEY is set, also generates a real reply.
//!
//! Run with: `cargo run -p story-core --example generate_reply`

use std::sync::Arc;
use story_core::testing::write_sample_store;
use story_core::{NarrativeStore, ReplyEngine, ReplyQuery, TemplateVariant};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_core=debug".into()),
        )
        .init();

    let dir = tempfile::tempdir().expect("tempdir");
    write_sample_store(dir.path()).expect("write fixture store");

    let store = Arc::new(NarrativeStore::new(dir.path()));
    let client = match genai::Gemini::from_env() {
        Ok(client) => client,
        Err(_) => {
            println!("GEMINI_API_KEY not set; showing assembled prompts only.\n");
            genai::Gemini::new("offline")
        }
    };
    let has_key = std::env::var("GEMINI_API_KEY").is_ok();
    let engine = ReplyEngine::new(store, client);

    let query = ReplyQuery::new("Nora Smith", "saving_nora", 25)
        .with_referenced_episode(23)
        .with_post_text("Angela got what she deserved")
        .with_user_message("Nora, do you think Justin knows you're Athena?");

    let resolution = engine.resolve(&query);
    println!(
        "Reader at EP{} -> beat {:?} ({}), emotional state: {}\n",
        resolution.context.reader_episode,
        resolution.context.beat.beat_id,
        resolution.context.beat.title,
        resolution.context.knowledge.emotional_state
    );

    for variant in [
        TemplateVariant::Full,
        TemplateVariant::Concise,
        TemplateVariant::Minimal,
    ] {
        let prompt = resolution.rendered.get(variant);
        println!("=== {} template ({} chars) ===", variant.name(), prompt.len());
        println!("{prompt}\n");
    }

    if has_key {
        let outcome = engine
            .reply(&query.with_variant(TemplateVariant::Concise))
            .await;
        match outcome.text() {
            Some(text) => println!("Generated reply: {text}"),
            None => println!("No reply generated."),
        }
    }
}
