//! The Narrative Store: read-only structured story data.
//!
//! Four tables per show, loaded from a directory tree of JSON documents:
//!
//! ```text
//! <root>/personas/<show_id>.json         character personas
//! <root>/journeys/<show_id>.json         per-character knowledge journeys
//! <root>/episodes/<show_id>.json         beat/episode progression
//! <root>/plot_summaries/<show_id>.json   beat-level summary fragments
//! ```
//!
//! A show's tables are loaded on first access and cached for the process
//! lifetime; picking up updated documents requires a fresh process. After
//! load the data is immutable, so concurrent readers share `Arc<ShowData>`
//! with no further locking.
//!
//! Missing or unparsable documents degrade to empty tables (logged, never
//! fatal): a character should still be able to reply with maximally
//! conservative context rather than crash the surrounding service.

mod beat;
mod journey;
mod persona;
mod plot;

pub use beat::{Beat, EpisodeEntry, EpisodeRange, ProgressionTable, RevealedFact};
pub use journey::{CharacterJourney, JourneyEntry, JourneyTable};
pub use persona::{Identity, Persona, PersonaTable, Psychology, Voice};
pub use plot::{BeatSummary, PlotTable};

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Canonicalize a character or show identifier: trim, lowercase, and
/// replace whitespace runs with single underscores.
///
/// Applied once to every key at ingestion and to every id at query time, so
/// "Nora Smith", "nora smith" and "nora_smith" all address the same entry
/// and lookup failure is a single well-defined case.
pub fn canonical_id(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// All narrative tables for one show, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct ShowData {
    pub personas: PersonaTable,
    pub journeys: JourneyTable,
    pub progression: ProgressionTable,
    pub plots: PlotTable,
}

impl ShowData {
    /// Look up a persona; the id is canonicalized before lookup.
    pub fn persona(&self, character_id: &str) -> Option<&Persona> {
        self.personas.persona(&canonical_id(character_id))
    }

    /// Look up a journey; the id is canonicalized before lookup.
    pub fn journey(&self, character_id: &str) -> Option<&CharacterJourney> {
        self.journeys.journey(&canonical_id(character_id))
    }
}

/// The narrative store: a root directory plus a per-show read cache.
///
/// Construct once at process start and share by reference; resolvers take it
/// by injection rather than through global state.
#[derive(Debug)]
pub struct NarrativeStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<ShowData>>>,
}

impl NarrativeStore {
    /// Create a store rooted at the given directory. No I/O happens until a
    /// show is first requested.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the tables for a show, loading and caching them on first access.
    pub fn show(&self, show_id: &str) -> Arc<ShowData> {
        let show_id = canonical_id(show_id);

        if let Some(data) = self.cache.read().expect("store cache poisoned").get(&show_id) {
            return Arc::clone(data);
        }

        let data = Arc::new(self.load_show(&show_id));
        let mut cache = self.cache.write().expect("store cache poisoned");
        // A concurrent loader may have won the race; keep the first entry so
        // every caller sees the same Arc.
        Arc::clone(cache.entry(show_id).or_insert(data))
    }

    fn load_show(&self, show_id: &str) -> ShowData {
        let mut personas: PersonaTable =
            load_table(&self.root.join("personas").join(format!("{show_id}.json")));
        let mut journeys: JourneyTable =
            load_table(&self.root.join("journeys").join(format!("{show_id}.json")));
        let progression: ProgressionTable =
            load_table(&self.root.join("episodes").join(format!("{show_id}.json")));
        let plots: PlotTable = load_table(
            &self
                .root
                .join("plot_summaries")
                .join(format!("{show_id}.json")),
        );

        personas.canonicalize();
        journeys.canonicalize();

        ShowData {
            personas,
            journeys,
            progression,
            plots,
        }
    }
}

/// Load one table document, degrading to the empty table on any failure.
/// One corrupt file must not prevent resolution using the remaining tables.
fn load_table<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            warn!(path = %path.display(), %error, "narrative document unreadable, using empty table");
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(table) => table,
        Err(error) => {
            warn!(path = %path.display(), %error, "narrative document malformed, using empty table");
            T::default()
        }
    }
}
