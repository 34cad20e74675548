//! crates/lexicon_core/src/definitions.rs
//!
//! The definition cache answers "is this word already resolved?" from the
//! catalogue alone, without touching the network, and writes new resolutions
//! back to it.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{DefinitionPayload, VocabularyEntry};
use crate::ports::{PortResult, VocabularyStore};

#[derive(Clone)]
pub struct DefinitionCache {
    store: Arc<dyn VocabularyStore>,
}

impl DefinitionCache {
    pub fn new(store: Arc<dyn VocabularyStore>) -> Self {
        Self { store }
    }

    /// The cached payload for `word`, if one was ever written.
    ///
    /// Callers decide freshness with [`DefinitionPayload::needs_update`].
    pub async fn try_get(&self, word: &str) -> PortResult<Option<DefinitionPayload>> {
        Ok(self.lookup(word).await?.and_then(|entry| entry.definition))
    }

    pub async fn lookup(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        self.store.find_by_word(word).await
    }

    /// Caps `payload` and upserts it, creating the catalogue entry if needed.
    pub async fn put(
        &self,
        word: &str,
        payload: DefinitionPayload,
        translation: Option<&str>,
    ) -> PortResult<VocabularyEntry> {
        let payload = payload.capped();
        let entry = self
            .store
            .upsert_definition(word, &payload, translation)
            .await?;
        debug!(
            word = %entry.word,
            phonetics = payload.phonetics.len(),
            meanings = payload.meanings.len(),
            "definition cached"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Meaning, Phonetic};
    use crate::memory::InMemoryVocabularyStore;
    use crate::rng::SharedRng;
    use pretty_assertions::assert_eq;

    fn cache_with(words: &[&str]) -> DefinitionCache {
        DefinitionCache::new(Arc::new(InMemoryVocabularyStore::with_words(
            SharedRng::seeded(1),
            words,
        )))
    }

    fn sample_payload() -> DefinitionPayload {
        DefinitionPayload {
            phonetics: vec![Phonetic {
                text: "/ˈæp.əl/".to_string(),
                audio_url: None,
            }],
            meanings: vec![Meaning {
                part_of_speech: "noun".to_string(),
                definitions: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn try_get_distinguishes_unknown_and_never_resolved() {
        let cache = cache_with(&["apple"]);
        assert_eq!(cache.try_get("apple").await.unwrap(), None);
        assert_eq!(cache.try_get("pear").await.unwrap(), None);
        assert!(cache.lookup("apple").await.unwrap().is_some());
        assert!(cache.lookup("pear").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_try_get_round_trips() {
        let cache = cache_with(&["apple"]);
        cache.put("apple", sample_payload(), Some("táo")).await.unwrap();

        let cached = cache.try_get("Apple").await.unwrap();
        assert_eq!(cached, Some(sample_payload()));
        assert!(!DefinitionPayload::needs_update(cached.as_ref()));
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let cache = cache_with(&["apple"]);
        let first = cache.put("apple", sample_payload(), Some("táo")).await.unwrap();
        let second = cache.put("apple", sample_payload(), Some("táo")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.translation, second.translation);
        assert_eq!(first.definition, second.definition);
    }

    #[tokio::test]
    async fn put_applies_caps() {
        let cache = cache_with(&[]);
        let payload = DefinitionPayload {
            phonetics: (0..6)
                .map(|i| Phonetic {
                    text: format!("p{i}"),
                    audio_url: None,
                })
                .collect(),
            meanings: vec![],
        };
        let entry = cache.put("apple", payload, None).await.unwrap();
        assert_eq!(entry.definition.unwrap().phonetics.len(), 3);
    }
}
