//! Character personas.
//!
//! A persona is episode-independent: who the character is, what drives them,
//! and how they sound. Knowledge state lives in the journey table instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Who the character is, in brief.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: String,
    /// One-line role description.
    #[serde(default)]
    pub one_liner: String,
}

/// What drives the character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Psychology {
    #[serde(default)]
    pub core_want: String,
    #[serde(default)]
    pub primary_fear: String,
    #[serde(default)]
    pub self_perception: String,
}

/// How the character sounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    /// Vocabulary register, e.g. "clinical, precise".
    #[serde(default)]
    pub vocabulary: String,
    /// Speech rhythm, e.g. "short sentences, long pauses".
    #[serde(default)]
    pub rhythm: String,
    /// Default emotional tone.
    #[serde(default)]
    pub emotional_default: String,
    /// Humor style.
    #[serde(default)]
    pub humor: String,
}

/// A character persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Persona {
    pub identity: Identity,
    #[serde(default)]
    pub psychology: Psychology,
    #[serde(default)]
    pub voice: Voice,
    /// Verbal tics, e.g. trailing "...anyway".
    #[serde(default)]
    pub verbal_tics: Vec<String>,
    /// Short phrases the character characteristically posts.
    #[serde(default)]
    pub signature_phrases: Vec<String>,
    /// Things the character would never say.
    #[serde(default)]
    pub never_says: Vec<String>,
}

/// The persona table for one show, keyed by canonical character id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaTable {
    #[serde(default)]
    pub characters: HashMap<String, Persona>,
}

impl PersonaTable {
    /// Look up a persona by canonical character id.
    pub fn persona(&self, character_id: &str) -> Option<&Persona> {
        self.characters.get(character_id)
    }

    /// Rebuild the character index with canonical ids. Runs once at load.
    pub(crate) fn canonicalize(&mut self) {
        let characters = std::mem::take(&mut self.characters);
        self.characters = characters
            .into_iter()
            .map(|(id, persona)| (super::canonical_id(&id), persona))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_deserializes_with_sparse_fields() {
        let persona: Persona = serde_json::from_str(
            r#"{"identity": {"name": "Pete Hunt"}}"#,
        )
        .unwrap();

        assert_eq!(persona.identity.name, "Pete Hunt");
        assert!(persona.identity.one_liner.is_empty());
        assert!(persona.verbal_tics.is_empty());
        assert!(persona.voice.vocabulary.is_empty());
    }

    #[test]
    fn test_canonicalize_keys() {
        let mut table = PersonaTable::default();
        table
            .characters
            .insert("  Justin Hunt ".to_string(), Persona::default());
        table.canonicalize();

        assert!(table.persona("justin_hunt").is_some());
    }
}
