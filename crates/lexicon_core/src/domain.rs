//! crates/lexicon_core/src/domain.rs
//!
//! Defines the pure, core data structures for the vocabulary subsystem.
//! Definition payloads derive `serde` so adapters can persist them, but nothing
//! in here knows how or where they are stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_PHONETICS: usize = 3;
pub const MAX_MEANINGS: usize = 3;
pub const MAX_DEFINITIONS_PER_MEANING: usize = 3;
/// Applies to synonyms and antonyms alike.
pub const MAX_RELATED_WORDS: usize = 5;

/// Canonical form used for every case-insensitive comparison of words.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

//=========================================================================================
// Definition Payload
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Phonetic {
    fn has_audio(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub text: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// Phonetics and meanings resolved for a single word.
///
/// A missing definition is always an empty `Vec`, never an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionPayload {
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

impl DefinitionPayload {
    pub fn is_empty(&self) -> bool {
        self.phonetics.is_empty() && self.meanings.is_empty()
    }

    /// Whether a cached payload should be re-fetched from the dictionary.
    ///
    /// A payload that was cached empty counts as stale, so words the dictionary
    /// once failed on get another chance.
    pub fn needs_update(payload: Option<&DefinitionPayload>) -> bool {
        payload.map_or(true, DefinitionPayload::is_empty)
    }

    /// Applies the list caps. Phonetics carrying audio are moved to the front,
    /// keeping relative order inside each group.
    pub fn capped(self) -> Self {
        let (mut phonetics, without_audio): (Vec<_>, Vec<_>) =
            self.phonetics.into_iter().partition(Phonetic::has_audio);
        phonetics.extend(without_audio);
        phonetics.truncate(MAX_PHONETICS);

        let meanings = self
            .meanings
            .into_iter()
            .take(MAX_MEANINGS)
            .map(|mut meaning| {
                meaning.definitions.truncate(MAX_DEFINITIONS_PER_MEANING);
                for definition in &mut meaning.definitions {
                    definition.synonyms.truncate(MAX_RELATED_WORDS);
                    definition.antonyms.truncate(MAX_RELATED_WORDS);
                }
                meaning
            })
            .collect();

        Self {
            phonetics,
            meanings,
        }
    }
}

//=========================================================================================
// Catalogue and Learned Words
//=========================================================================================

/// A catalogued word with its cached definition and translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyEntry {
    pub id: Uuid,
    pub word: String,
    pub translation: String,
    /// `None` until a definition has been written back at least once.
    pub definition: Option<DefinitionPayload>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VocabularyEntry {
    pub fn needs_definition(&self) -> bool {
        DefinitionPayload::needs_update(self.definition.as_ref())
    }
}

/// A per-user record marking a word as already studied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnedWord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub word: String,
    pub learned_at: DateTime<Utc>,
}

//=========================================================================================
// Results handed to collaborators
//=========================================================================================

/// A selected word together with whatever definition could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWord {
    /// `None` when the word is not (yet) part of the catalogue.
    pub id: Option<Uuid>,
    pub word: String,
    pub translation: String,
    pub definition: DefinitionPayload,
    /// Set when neither provider could be reached and only cached data is returned.
    pub degraded: bool,
}

impl ResolvedWord {
    pub fn from_entry(entry: VocabularyEntry) -> Self {
        Self {
            id: Some(entry.id),
            word: entry.word,
            translation: entry.translation,
            definition: entry.definition.unwrap_or_default(),
            degraded: false,
        }
    }

    pub fn degraded(entry: VocabularyEntry) -> Self {
        Self {
            degraded: true,
            ..Self::from_entry(entry)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Word(ResolvedWord),
    /// No word outside the user's learned set is left.
    Exhausted,
}
