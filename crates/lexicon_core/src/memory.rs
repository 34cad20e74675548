//! crates/lexicon_core/src/memory.rs
//!
//! In-process implementations of the storage ports. They back the test suites
//! and small embedded setups where a database would be overkill.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{normalize_word, DefinitionPayload, LearnedWord, VocabularyEntry};
use crate::ports::{LearnedWordRepository, PortError, PortResult, VocabularyStore};
use crate::rng::SharedRng;

//=========================================================================================
// Vocabulary
//=========================================================================================

pub struct InMemoryVocabularyStore {
    entries: RwLock<Vec<VocabularyEntry>>,
    rng: SharedRng,
}

impl InMemoryVocabularyStore {
    pub fn new(rng: SharedRng) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            rng,
        }
    }

    /// A catalogue pre-filled with bare words (no definition yet).
    pub fn with_words<I, S>(rng: SharedRng, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::new(rng);
        {
            let mut entries = store.entries.write();
            for word in words {
                let word = word.as_ref().trim();
                if !word.is_empty() && position(&entries, word).is_none() {
                    entries.push(new_entry(word));
                }
            }
        }
        store
    }

    /// Draws uniformly from the entries accepted by `keep`.
    fn sample(&self, keep: impl Fn(&VocabularyEntry) -> bool) -> Option<VocabularyEntry> {
        let entries = self.entries.read();
        let candidates: Vec<&VocabularyEntry> = entries.iter().filter(|e| keep(e)).collect();
        let index = self.rng.index(candidates.len())?;
        Some(candidates[index].clone())
    }
}

fn position(entries: &[VocabularyEntry], word: &str) -> Option<usize> {
    let key = normalize_word(word);
    entries.iter().position(|e| normalize_word(&e.word) == key)
}

fn new_entry(word: &str) -> VocabularyEntry {
    VocabularyEntry {
        id: Uuid::new_v4(),
        word: word.to_string(),
        translation: String::new(),
        definition: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[async_trait]
impl VocabularyStore for InMemoryVocabularyStore {
    async fn count(&self) -> PortResult<u64> {
        Ok(self.entries.read().len() as u64)
    }

    async fn get_random(&self) -> PortResult<Option<VocabularyEntry>> {
        Ok(self.sample(|_| true))
    }

    async fn get_random_excluding(
        &self,
        exclude: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>> {
        Ok(self.sample(|entry| !exclude.contains(&normalize_word(&entry.word))))
    }

    async fn find_by_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        let entries = self.entries.read();
        Ok(position(&entries, word).map(|i| entries[i].clone()))
    }

    async fn list_all(&self) -> PortResult<Vec<VocabularyEntry>> {
        Ok(self.entries.read().clone())
    }

    async fn add_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        let word = word.trim();
        if word.is_empty() {
            return Err(PortError::InvalidInput("word must not be blank".to_string()));
        }
        let mut entries = self.entries.write();
        if position(&entries, word).is_some() {
            return Ok(None);
        }
        let entry = new_entry(word);
        entries.push(entry.clone());
        Ok(Some(entry))
    }

    async fn upsert_definition(
        &self,
        word: &str,
        payload: &DefinitionPayload,
        translation: Option<&str>,
    ) -> PortResult<VocabularyEntry> {
        let word = word.trim();
        let mut entries = self.entries.write();
        let index = match position(&entries, word) {
            Some(i) => i,
            None => {
                entries.push(new_entry(word));
                entries.len() - 1
            }
        };

        let entry = &mut entries[index];
        entry.definition = Some(payload.clone());
        if let Some(translation) = translation.filter(|t| !t.is_empty()) {
            entry.translation = translation.to_string();
        }
        entry.updated_at = Some(Utc::now());
        Ok(entry.clone())
    }
}

//=========================================================================================
// Learned Words
//=========================================================================================

#[derive(Default)]
pub struct InMemoryLearnedWordRepository {
    records: RwLock<Vec<LearnedWord>>,
}

impl InMemoryLearnedWordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LearnedWordRepository for InMemoryLearnedWordRepository {
    async fn insert(&self, user_id: Uuid, word: &str) -> PortResult<LearnedWord> {
        let key = normalize_word(word);
        let mut records = self.records.write();
        if records
            .iter()
            .any(|r| r.user_id == user_id && normalize_word(&r.word) == key)
        {
            return Err(PortError::AlreadyLearned(word.to_string()));
        }
        let record = LearnedWord {
            id: Uuid::new_v4(),
            user_id,
            word: word.to_string(),
            learned_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: Uuid) -> PortResult<Option<LearnedWord>> {
        let mut records = self.records.write();
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|i| records.remove(i)))
    }

    async fn delete_by_word(&self, user_id: Uuid, word: &str) -> PortResult<bool> {
        let key = normalize_word(word);
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| !(r.user_id == user_id && normalize_word(&r.word) == key));
        Ok(records.len() != before)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PortResult<Vec<LearnedWord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
