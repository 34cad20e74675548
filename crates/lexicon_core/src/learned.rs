//! crates/lexicon_core/src/learned.rs
//!
//! Per-user learned words. Wraps the raw repository port so that every
//! successful mutation invalidates the user's cached membership set before
//! returning to the caller.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{normalize_word, LearnedWord};
use crate::membership::MembershipCache;
use crate::ports::{LearnedWordRepository, PortError, PortResult};

#[derive(Clone)]
pub struct LearnedWordStore {
    repo: Arc<dyn LearnedWordRepository>,
    cache: Arc<MembershipCache>,
}

impl LearnedWordStore {
    pub fn new(repo: Arc<dyn LearnedWordRepository>, cache: Arc<MembershipCache>) -> Self {
        Self { repo, cache }
    }

    /// Marks `word` as learned by `user_id`.
    pub async fn add(&self, user_id: Uuid, word: &str) -> PortResult<LearnedWord> {
        let word = word.trim();
        if word.is_empty() {
            return Err(PortError::InvalidInput("word must not be blank".to_string()));
        }

        let learned = self.repo.insert(user_id, word).await?;
        self.cache.invalidate(user_id);
        info!(%user_id, word = %learned.word, "word marked as learned");
        Ok(learned)
    }

    pub async fn remove_by_id(&self, id: Uuid) -> PortResult<bool> {
        match self.repo.delete_by_id(id).await? {
            Some(removed) => {
                self.cache.invalidate(removed.user_id);
                info!(user_id = %removed.user_id, word = %removed.word, "learned word removed");
                Ok(true)
            }
            None => {
                debug!(%id, "no learned word with this id");
                Ok(false)
            }
        }
    }

    pub async fn remove_by_word(&self, user_id: Uuid, word: &str) -> PortResult<bool> {
        let removed = self.repo.delete_by_word(user_id, word.trim()).await?;
        if removed {
            self.cache.invalidate(user_id);
            info!(%user_id, word = %word.trim(), "learned word removed");
        }
        Ok(removed)
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> PortResult<Vec<LearnedWord>> {
        self.repo.list_by_user(user_id).await
    }

    /// The user's learned words in normalized form, served from the
    /// membership cache when warm.
    pub async fn learned_set(&self, user_id: Uuid) -> PortResult<Arc<HashSet<String>>> {
        if let Some(words) = self.cache.get(user_id) {
            return Ok(words);
        }

        let epoch = self.cache.epoch();
        let records = self.repo.list_by_user(user_id).await?;
        let words = records
            .iter()
            .map(|record| normalize_word(&record.word))
            .collect();
        Ok(self.cache.insert(user_id, words, epoch))
    }
}
