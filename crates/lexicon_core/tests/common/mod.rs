//! Shared test doubles for the core integration tests.
//!
//! Providers count their invocations so tests can assert how often the
//! "network" was hit.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lexicon_core::memory::{InMemoryLearnedWordRepository, InMemoryVocabularyStore};
use lexicon_core::{
    DefinitionPayload, DictionaryProvider, ExhaustionPolicy, LearnedWord, LearnedWordStore,
    Meaning, MembershipCache, Phonetic, PortError, PortResult, SharedRng, TranslationProvider,
    VocabularyEntry, VocabularyStore, WordSelector,
};
use uuid::Uuid;

pub fn payload_for(word: &str) -> DefinitionPayload {
    DefinitionPayload {
        phonetics: vec![Phonetic {
            text: format!("/{word}/"),
            audio_url: Some(format!("https://audio.example/{word}.mp3")),
        }],
        meanings: vec![Meaning {
            part_of_speech: "noun".to_string(),
            definitions: vec![],
        }],
    }
}

//=========================================================================================
// Providers
//=========================================================================================

#[derive(Default)]
pub struct CountingDictionary {
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl CountingDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every lookup for the given words.
    pub fn failing_on(words: &[&str]) -> Self {
        Self {
            failing: words.iter().map(|w| w.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionaryProvider for CountingDictionary {
    async fn fetch(&self, word: &str) -> Option<DefinitionPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains("*") || self.failing.contains(word) {
            None
        } else {
            Some(payload_for(word))
        }
    }
}

#[derive(Default)]
pub struct CountingTranslation {
    translations: HashMap<String, String>,
    calls: AtomicUsize,
}

impl CountingTranslation {
    /// Translates nothing.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            translations: pairs
                .iter()
                .map(|(w, t)| (w.to_string(), t.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for CountingTranslation {
    async fn fetch(&self, word: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.translations.get(word).cloned()
    }
}

//=========================================================================================
// Stores
//=========================================================================================

/// A store whose every call fails, standing in for an unreachable database.
pub struct BrokenVocabularyStore;

fn broken<T>() -> PortResult<T> {
    Err(PortError::Storage("connection refused".to_string()))
}

#[async_trait]
impl VocabularyStore for BrokenVocabularyStore {
    async fn count(&self) -> PortResult<u64> {
        broken()
    }
    async fn get_random(&self) -> PortResult<Option<VocabularyEntry>> {
        broken()
    }
    async fn get_random_excluding(
        &self,
        _exclude: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>> {
        broken()
    }
    async fn find_by_word(&self, _word: &str) -> PortResult<Option<VocabularyEntry>> {
        broken()
    }
    async fn list_all(&self) -> PortResult<Vec<VocabularyEntry>> {
        broken()
    }
    async fn add_word(&self, _word: &str) -> PortResult<Option<VocabularyEntry>> {
        broken()
    }
    async fn upsert_definition(
        &self,
        _word: &str,
        _payload: &DefinitionPayload,
        _translation: Option<&str>,
    ) -> PortResult<VocabularyEntry> {
        broken()
    }
}

/// Wraps the in-memory store but never finds anything through the
/// exclusion query, forcing the selector into its retry loop.
pub struct RandomOnlyStore {
    pub inner: InMemoryVocabularyStore,
    random_calls: AtomicUsize,
}

impl RandomOnlyStore {
    pub fn new(inner: InMemoryVocabularyStore) -> Self {
        Self {
            inner,
            random_calls: AtomicUsize::new(0),
        }
    }

    pub fn random_calls(&self) -> usize {
        self.random_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VocabularyStore for RandomOnlyStore {
    async fn count(&self) -> PortResult<u64> {
        self.inner.count().await
    }
    async fn get_random(&self) -> PortResult<Option<VocabularyEntry>> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_random().await
    }
    async fn get_random_excluding(
        &self,
        _exclude: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>> {
        Ok(None)
    }
    async fn find_by_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        self.inner.find_by_word(word).await
    }
    async fn list_all(&self) -> PortResult<Vec<VocabularyEntry>> {
        self.inner.list_all().await
    }
    async fn add_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        self.inner.add_word(word).await
    }
    async fn upsert_definition(
        &self,
        word: &str,
        payload: &DefinitionPayload,
        translation: Option<&str>,
    ) -> PortResult<VocabularyEntry> {
        self.inner.upsert_definition(word, payload, translation).await
    }
}

//=========================================================================================
// Fixture
//=========================================================================================

/// A fully wired selector over in-memory stores and counting providers.
pub struct Fixture {
    pub vocabulary: Arc<dyn VocabularyStore>,
    pub learned: LearnedWordStore,
    pub dictionary: Arc<CountingDictionary>,
    pub translation: Arc<CountingTranslation>,
    pub selector: WordSelector,
}

impl Fixture {
    pub fn new(words: &[&str]) -> Self {
        Self::build(
            Arc::new(InMemoryVocabularyStore::with_words(SharedRng::seeded(2024), words)),
            CountingDictionary::new(),
            CountingTranslation::unavailable(),
            ExhaustionPolicy::ReportExhausted,
        )
    }

    pub fn build(
        vocabulary: Arc<dyn VocabularyStore>,
        dictionary: CountingDictionary,
        translation: CountingTranslation,
        policy: ExhaustionPolicy,
    ) -> Self {
        let learned = LearnedWordStore::new(
            Arc::new(InMemoryLearnedWordRepository::new()),
            Arc::new(MembershipCache::new(64, Duration::from_secs(300))),
        );
        let dictionary = Arc::new(dictionary);
        let translation = Arc::new(translation);
        let selector = WordSelector::new(
            Arc::clone(&vocabulary),
            learned.clone(),
            dictionary.clone(),
            translation.clone(),
            policy,
        );
        Self {
            vocabulary,
            learned,
            dictionary,
            translation,
            selector,
        }
    }

    pub async fn learn(&self, user_id: Uuid, words: &[&str]) -> Vec<LearnedWord> {
        let mut learned = Vec::new();
        for word in words {
            learned.push(self.learned.add(user_id, word).await.unwrap());
        }
        learned
    }
}
