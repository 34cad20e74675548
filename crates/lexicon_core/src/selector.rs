//! crates/lexicon_core/src/selector.rs
//!
//! Picks a word the user has not learned yet and resolves its definition,
//! falling back from cache to the external providers to a degraded answer.
//!
//! Selection runs through these steps, strictly in order:
//!
//! 1. load the user's learned set (an empty set skips straight to an
//!    unrestricted draw);
//! 2. draw once from the catalogue with the learned set excluded;
//! 3. if nothing is left, retry up to [`MAX_RETRY_DRAWS`] unrestricted draws
//!    for an unlearned word;
//! 4. if every retry hits a learned word, apply the configured [`ExhaustionPolicy`];
//! 5. resolve the chosen entry's definition.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::definitions::DefinitionCache;
use crate::domain::{
    normalize_word, DefinitionPayload, ResolvedWord, SelectionOutcome, VocabularyEntry,
};
use crate::learned::LearnedWordStore;
use crate::ports::{DictionaryProvider, PortResult, TranslationProvider, VocabularyStore};

pub const MAX_RETRY_DRAWS: u32 = 5;

/// What to do once every retry draw hit an already-learned word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Report [`SelectionOutcome::Exhausted`].
    #[default]
    ReportExhausted,
    /// Serve an unrestricted random word, which may be one the user learned.
    AllowRepeat,
}

impl FromStr for ExhaustionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exhausted" | "report" => Ok(Self::ReportExhausted),
            "repeat" | "allow-repeat" => Ok(Self::AllowRepeat),
            other => Err(format!(
                "'{other}' is not an exhaustion policy (expected 'exhausted' or 'repeat')"
            )),
        }
    }
}

#[derive(Clone)]
pub struct WordSelector {
    vocabulary: Arc<dyn VocabularyStore>,
    learned: LearnedWordStore,
    definitions: DefinitionCache,
    dictionary: Arc<dyn DictionaryProvider>,
    translation: Arc<dyn TranslationProvider>,
    policy: ExhaustionPolicy,
}

impl WordSelector {
    pub fn new(
        vocabulary: Arc<dyn VocabularyStore>,
        learned: LearnedWordStore,
        dictionary: Arc<dyn DictionaryProvider>,
        translation: Arc<dyn TranslationProvider>,
        policy: ExhaustionPolicy,
    ) -> Self {
        Self {
            definitions: DefinitionCache::new(Arc::clone(&vocabulary)),
            vocabulary,
            learned,
            dictionary,
            translation,
            policy,
        }
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    /// Picks a random word `user_id` has not learned yet and resolves it.
    pub async fn select_random_word_for_user(
        &self,
        user_id: Uuid,
    ) -> PortResult<SelectionOutcome> {
        let learned = self.learned.learned_set(user_id).await?;

        let picked = if learned.is_empty() {
            self.vocabulary.get_random().await?
        } else {
            self.pick_unlearned(&learned).await?
        };

        match picked {
            Some(entry) => {
                debug!(%user_id, word = %entry.word, "word selected");
                Ok(SelectionOutcome::Word(self.resolve_entry(entry).await?))
            }
            None => {
                info!(%user_id, learned = learned.len(), "no unlearned word left");
                Ok(SelectionOutcome::Exhausted)
            }
        }
    }

    async fn pick_unlearned(
        &self,
        learned: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>> {
        if let Some(entry) = self.vocabulary.get_random_excluding(learned).await? {
            return Ok(Some(entry));
        }

        for attempt in 1..=MAX_RETRY_DRAWS {
            match self.vocabulary.get_random().await? {
                Some(entry) if !learned.contains(&normalize_word(&entry.word)) => {
                    debug!(attempt, word = %entry.word, "retry found an unlearned word");
                    return Ok(Some(entry));
                }
                Some(entry) => debug!(attempt, word = %entry.word, "retry drew a learned word"),
                // Empty catalogue, nothing to draw.
                None => return Ok(None),
            }
        }

        match self.policy {
            ExhaustionPolicy::ReportExhausted => Ok(None),
            ExhaustionPolicy::AllowRepeat => {
                debug!("retries exhausted, serving a possibly learned word");
                self.vocabulary.get_random().await
            }
        }
    }

    /// Cache-or-fetch for a single word, whether or not it is catalogued yet.
    pub async fn get_or_fetch_definition(&self, word: &str) -> PortResult<ResolvedWord> {
        let word = word.trim();
        if let Some(entry) = self.definitions.lookup(word).await? {
            return self.resolve_entry(entry).await;
        }

        let (definition, translation) = self.fetch_from_providers(word).await;
        if definition.is_none() && translation.is_none() {
            warn!(word = %word, "uncatalogued word could not be resolved");
            return Ok(ResolvedWord {
                id: None,
                word: word.to_string(),
                translation: String::new(),
                definition: DefinitionPayload::default(),
                degraded: true,
            });
        }

        let entry = self
            .definitions
            .put(word, definition.unwrap_or_default(), translation.as_deref())
            .await?;
        Ok(ResolvedWord::from_entry(entry))
    }

    async fn resolve_entry(&self, entry: VocabularyEntry) -> PortResult<ResolvedWord> {
        if !entry.needs_definition() {
            return Ok(ResolvedWord::from_entry(entry));
        }

        let (definition, translation) = self.fetch_from_providers(&entry.word).await;
        if definition.is_none() && translation.is_none() {
            warn!(word = %entry.word, "providers unavailable, returning cached data only");
            return Ok(ResolvedWord::degraded(entry));
        }

        // A partial result is still worth keeping.
        let stored = self
            .definitions
            .put(
                &entry.word,
                definition.unwrap_or_default(),
                translation.as_deref(),
            )
            .await?;
        Ok(ResolvedWord::from_entry(stored))
    }

    async fn fetch_from_providers(
        &self,
        word: &str,
    ) -> (Option<DefinitionPayload>, Option<String>) {
        let definition = self.dictionary.fetch(word).await;
        let translation = self
            .translation
            .fetch(word)
            .await
            .filter(|t| !t.trim().is_empty());
        (definition, translation)
    }
}
