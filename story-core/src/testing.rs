//! Testing utilities for the narrative engine.
//!
//! This module provides:
//! - `sample_show` / `write_sample_store` for fixture narrative data
//! - `MockGenerator` for deterministic reply tests without API calls
//!
//! The fixture show is small but exercises every table: three beats, three
//! characters (one without a journey, for degradation paths), mid-beat fact
//! reveals, cliffhangers, and hooks.

use crate::reply::{postprocess, NoReplyReason, ReplyOutcome};
use crate::store::{
    Beat, BeatSummary, CharacterJourney, EpisodeEntry, EpisodeRange, Identity, JourneyEntry,
    JourneyTable, Persona, PersonaTable, PlotTable, ProgressionTable, Psychology, RevealedFact,
    ShowData, Voice,
};
use std::collections::BTreeMap;
use std::path::Path;

fn episode(
    episode_id: u32,
    objective: &str,
    cliffhanger: Option<&str>,
    facts: &[&str],
    hooks: &[&str],
) -> EpisodeEntry {
    EpisodeEntry {
        episode_id,
        objective: objective.to_string(),
        what_changes: Vec::new(),
        cliffhanger: cliffhanger.map(str::to_string),
        facts_revealed: facts
            .iter()
            .map(|fact| RevealedFact {
                fact: fact.to_string(),
                attribution: None,
            })
            .collect(),
        hooks: hooks.iter().map(|h| h.to_string()).collect(),
    }
}

fn progression() -> ProgressionTable {
    ProgressionTable {
        beats: vec![
            Beat {
                beat_id: 1,
                beat_title: "Homecoming".to_string(),
                episode_range: EpisodeRange::new(1, 10),
                episodes: vec![
                    episode(
                        1,
                        "Nora returns after five years away",
                        None,
                        &["Nora has a son named Pete"],
                        &[],
                    ),
                    episode(
                        5,
                        "The engagement is called off in public",
                        Some("Henry tears up the contract on the courthouse steps."),
                        &["The engagement is broken"],
                        &["what Henry is really after"],
                    ),
                    episode(
                        10,
                        "A stranger intervenes on Nora's behalf",
                        None,
                        &["Justin intervened for Nora"],
                        &["the stranger's motive"],
                    ),
                ],
            },
            Beat {
                beat_id: 2,
                beat_title: "The Wager".to_string(),
                episode_range: EpisodeRange::new(11, 20),
                episodes: vec![
                    episode(
                        11,
                        "Justin offers Nora a deal",
                        None,
                        &[],
                        &["the terms nobody else heard"],
                    ),
                    episode(
                        15,
                        "Henry moves against the Smith estate",
                        Some("The will is not what anyone thought."),
                        &["The Smith will was altered"],
                        &["who altered the will"],
                    ),
                    episode(
                        20,
                        "A masked surgeon saves a dying patient",
                        None,
                        &["Athena saved the chairman"],
                        &[],
                    ),
                ],
            },
            Beat {
                beat_id: 3,
                beat_title: "Athena's Surgery".to_string(),
                episode_range: EpisodeRange::new(21, 30),
                episodes: vec![
                    episode(
                        21,
                        "The hospital begs Athena to operate again",
                        None,
                        &["Nora is Athena"],
                        &["whether she takes the case"],
                    ),
                    episode(
                        25,
                        "Justin starts connecting the pieces",
                        Some("He has seen those hands before."),
                        &["Justin suspects Nora is Athena"],
                        &["how close Justin is to the truth"],
                    ),
                    episode(
                        30,
                        "The operation and its price",
                        None,
                        &["The surgery cost Nora her cover"],
                        &[],
                    ),
                ],
            },
        ],
    }
}

fn journeys() -> JourneyTable {
    let mut nora_relationships = BTreeMap::new();
    nora_relationships.insert(
        "justin_hunt".to_string(),
        "wary gratitude she will not name".to_string(),
    );

    let nora = CharacterJourney {
        journey: vec![
            JourneyEntry {
                beat_id: 1,
                beat_title: "Homecoming".to_string(),
                episode_range: EpisodeRange::new(1, 10),
                knows: vec![
                    "She has a son named Pete".to_string(),
                    "Her family pushed her out five years ago".to_string(),
                ],
                doesnt_know: vec!["Who Pete's father is".to_string()],
                can_discuss_freely: vec!["Coming home".to_string()],
                must_not_reveal: vec!["She is the surgeon Athena".to_string()],
                can_tease: vec!["Old debts coming due".to_string()],
                emotional_state: "Guarded, quietly furious".to_string(),
                relationships: BTreeMap::new(),
            },
            JourneyEntry {
                beat_id: 2,
                beat_title: "The Wager".to_string(),
                episode_range: EpisodeRange::new(11, 20),
                knows: vec![
                    "She has a son named Pete".to_string(),
                    "The engagement is broken".to_string(),
                    "Justin intervened for Nora".to_string(),
                ],
                doesnt_know: vec!["Who Pete's father is".to_string()],
                can_discuss_freely: vec!["The broken engagement".to_string()],
                must_not_reveal: vec!["She is the surgeon Athena".to_string()],
                can_tease: vec!["What she does after midnight".to_string()],
                emotional_state: "Defiant".to_string(),
                relationships: nora_relationships.clone(),
            },
            JourneyEntry {
                beat_id: 3,
                beat_title: "Athena's Surgery".to_string(),
                episode_range: EpisodeRange::new(21, 30),
                knows: vec![
                    "She has a son named Pete".to_string(),
                    "The Smith will was altered".to_string(),
                    "Athena saved the chairman".to_string(),
                ],
                doesnt_know: vec!["That Justin suspects her".to_string()],
                can_discuss_freely: vec!["The hospital's plea".to_string()],
                must_not_reveal: vec!["She is the surgeon Athena".to_string()],
                can_tease: vec!["Whether Athena will operate".to_string()],
                emotional_state: "Torn between cover and conscience".to_string(),
                relationships: nora_relationships,
            },
        ],
    };

    let justin = CharacterJourney {
        journey: vec![
            JourneyEntry {
                beat_id: 1,
                beat_title: "Homecoming".to_string(),
                episode_range: EpisodeRange::new(1, 10),
                knows: vec!["A woman named Nora has returned".to_string()],
                doesnt_know: vec!["Anything about Athena".to_string()],
                can_discuss_freely: Vec::new(),
                must_not_reveal: vec!["His interest in the Smith family".to_string()],
                can_tease: Vec::new(),
                emotional_state: "Coolly curious".to_string(),
                relationships: BTreeMap::new(),
            },
            JourneyEntry {
                beat_id: 2,
                beat_title: "The Wager".to_string(),
                episode_range: EpisodeRange::new(11, 20),
                knows: vec!["Nora accepted his deal".to_string()],
                doesnt_know: vec!["That Nora is Athena".to_string()],
                can_discuss_freely: vec!["The deal, in vague terms".to_string()],
                must_not_reveal: vec!["The deal's real terms".to_string()],
                can_tease: vec!["What he saw at the hospital".to_string()],
                emotional_state: "Intrigued despite himself".to_string(),
                relationships: BTreeMap::new(),
            },
        ],
    };

    let mut table = JourneyTable::default();
    table.characters.insert("nora_smith".to_string(), nora);
    table.characters.insert("justin_hunt".to_string(), justin);
    table
}

fn personas() -> PersonaTable {
    let nora = Persona {
        identity: Identity {
            name: "Nora Smith".to_string(),
            one_liner: "Disgraced heiress with a scalpel and a secret".to_string(),
        },
        psychology: Psychology {
            core_want: "To protect Pete from her family's world".to_string(),
            primary_fear: "Being unmasked before she is ready".to_string(),
            self_perception: "A ghost the family buried too early".to_string(),
        },
        voice: Voice {
            vocabulary: "clinical precision with dry edges".to_string(),
            rhythm: "short sentences, long pauses".to_string(),
            emotional_default: "controlled".to_string(),
            humor: "scalpel-dry".to_string(),
        },
        verbal_tics: vec!["...noted.".to_string()],
        signature_phrases: vec![
            "Some things can't stay hidden forever.".to_string(),
            "Ask me again in a few episodes.".to_string(),
        ],
        never_says: vec!["I need rescuing".to_string()],
    };

    let justin = Persona {
        identity: Identity {
            name: "Justin Hunt".to_string(),
            one_liner: "The man who notices everything and admits nothing".to_string(),
        },
        psychology: Psychology {
            core_want: "To understand the woman who won't be understood".to_string(),
            primary_fear: "Caring more than he controls".to_string(),
            self_perception: String::new(),
        },
        voice: Voice {
            vocabulary: "measured, expensive".to_string(),
            rhythm: "unhurried".to_string(),
            emotional_default: "amused reserve".to_string(),
            humor: "understatement".to_string(),
        },
        verbal_tics: Vec::new(),
        signature_phrases: vec!["Funny how people think they know me.".to_string()],
        never_says: vec!["I was wrong".to_string()],
    };

    // Cherry has a persona but no authored journey, exercising the
    // empty-snapshot degradation path.
    let cherry = Persona {
        identity: Identity {
            name: "Cherry".to_string(),
            one_liner: "Nora's unsinkable best friend".to_string(),
        },
        ..Persona::default()
    };

    let mut table = PersonaTable::default();
    table.characters.insert("nora_smith".to_string(), nora);
    table.characters.insert("justin_hunt".to_string(), justin);
    table.characters.insert("cherry".to_string(), cherry);
    table
}

fn plots() -> PlotTable {
    PlotTable {
        beats: vec![
            BeatSummary {
                beat_id: 1,
                title: "Homecoming".to_string(),
                start_episode: Some(1),
                end_episode: Some(10),
                start: Some("Nora returns to a family that declared her dead.".to_string()),
                mid: Some("The engagement collapses in public.".to_string()),
                end: Some("A stranger's intervention changes the board.".to_string()),
            },
            BeatSummary {
                beat_id: 2,
                title: "The Wager".to_string(),
                start_episode: Some(11),
                end_episode: Some(20),
                start: Some("Justin's deal binds their fates together.".to_string()),
                mid: None,
                end: Some("A masked surgeon's miracle sets the city talking.".to_string()),
            },
            BeatSummary {
                beat_id: 3,
                title: "Athena's Surgery".to_string(),
                start_episode: Some(21),
                end_episode: Some(30),
                start: Some("The hospital begs Athena to return.".to_string()),
                mid: Some("Justin starts connecting the pieces.".to_string()),
                end: Some("The operation exacts its price.".to_string()),
            },
        ],
    }
}

/// Build the in-memory fixture show.
pub fn sample_show() -> ShowData {
    ShowData {
        personas: personas(),
        journeys: journeys(),
        progression: progression(),
        plots: plots(),
    }
}

/// Write the fixture show to disk as a narrative store rooted at `dir`,
/// under the show id `saving_nora`.
pub fn write_sample_store(dir: &Path) -> std::io::Result<()> {
    let show = sample_show();

    let write = |subdir: &str, json: String| -> std::io::Result<()> {
        let table_dir = dir.join(subdir);
        std::fs::create_dir_all(&table_dir)?;
        std::fs::write(table_dir.join("saving_nora.json"), json)
    };

    write("personas", serde_json::to_string_pretty(&show.personas)?)?;
    write("journeys", serde_json::to_string_pretty(&show.journeys)?)?;
    write("episodes", serde_json::to_string_pretty(&show.progression)?)?;
    write("plot_summaries", serde_json::to_string_pretty(&show.plots)?)?;
    Ok(())
}

/// A mock generator that returns scripted raw model outputs.
///
/// Use this for deterministic pipeline tests without API calls; outputs run
/// through the same post-processing as real generations.
pub struct MockGenerator {
    responses: Vec<String>,
    index: usize,
}

impl MockGenerator {
    /// Create a mock with scripted raw outputs, returned in order.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            index: 0,
        }
    }

    /// Queue another scripted output.
    pub fn queue(&mut self, response: impl Into<String>) {
        self.responses.push(response.into());
    }

    /// The next scripted raw output, or `None` when exhausted.
    pub fn generate(&mut self, _prompt: &str) -> Option<String> {
        let response = self.responses.get(self.index).cloned();
        if response.is_some() {
            self.index += 1;
        }
        response
    }

    /// Run the next scripted output through reply post-processing, yielding
    /// what the real engine would return for that generation.
    pub fn reply(&mut self, prompt: &str, character_name: &str) -> ReplyOutcome {
        match self.generate(prompt) {
            Some(raw) => {
                let cleaned = postprocess(&raw, character_name);
                if cleaned.is_empty() {
                    ReplyOutcome::NoReply(NoReplyReason::EmptyOutput)
                } else {
                    ReplyOutcome::Reply(cleaned)
                }
            }
            None => ReplyOutcome::NoReply(NoReplyReason::EmptyOutput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_show_shape() {
        let show = sample_show();
        assert_eq!(show.progression.beats.len(), 3);
        assert!(show.persona("nora_smith").is_some());
        assert!(show.journey("cherry").is_none());
        assert!(show.persona("cherry").is_some());
    }

    #[test]
    fn test_mock_generator_scripted_order() {
        let mut mock = MockGenerator::new(vec!["\"First.\"".to_string()]);
        mock.queue("Reply: Second.");

        assert_eq!(
            mock.reply("prompt", "Nora Smith"),
            ReplyOutcome::Reply("First.".to_string())
        );
        assert_eq!(
            mock.reply("prompt", "Nora Smith"),
            ReplyOutcome::Reply("Second.".to_string())
        );
        assert_eq!(
            mock.reply("prompt", "Nora Smith"),
            ReplyOutcome::NoReply(NoReplyReason::EmptyOutput)
        );
    }
}
