//! services/lexicon/src/state.rs
//!
//! Defines the application's shared state: one instance of every component,
//! wired together once at startup.

use std::sync::Arc;

use lexicon_core::ports::{
    DictionaryProvider, LearnedWordRepository, TranslationProvider, VocabularyStore,
};
use lexicon_core::{BulkCacheJob, LearnedWordStore, MembershipCache, SharedRng, WordSelector};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::adapters::{build_http_client, DbAdapter, FreeDictionaryAdapter, TranslationChain};
use crate::config::Config;
use crate::error::ApiError;

//=========================================================================================
// AppState (Shared Across All Commands)
//=========================================================================================

/// The shared application state, created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub vocabulary: Arc<dyn VocabularyStore>,
    pub learned_words: LearnedWordStore,
    pub selector: WordSelector,
    pub bulk_job: Arc<BulkCacheJob>,
}

impl AppState {
    /// Connects to PostgreSQL, applies migrations and builds the HTTP providers.
    pub async fn connect(config: &Config) -> Result<Self, ApiError> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        let rng = match config.rng_seed {
            Some(seed) => SharedRng::seeded(seed),
            None => SharedRng::from_entropy(),
        };

        let db = Arc::new(DbAdapter::new(pool, rng.clone()));
        info!("Running database migrations...");
        db.run_migrations().await?;
        info!("Database migrations complete.");

        let http = build_http_client(config.http_timeout)?;
        let dictionary = Arc::new(FreeDictionaryAdapter::new(
            http.clone(),
            config.dictionary_api_base.clone(),
        ));
        let translation = Arc::new(TranslationChain::from_apis(
            &http,
            &config.translation_apis,
            &config.translation_source_lang,
            &config.translation_target_lang,
        ));
        info!(providers = translation.len(), "Translation providers configured.");

        Ok(Self::with_backends(
            config,
            db.clone(),
            db,
            dictionary,
            translation,
        ))
    }

    /// Assembles the component graph over arbitrary port implementations.
    pub fn with_backends(
        config: &Config,
        vocabulary: Arc<dyn VocabularyStore>,
        learned_repo: Arc<dyn LearnedWordRepository>,
        dictionary: Arc<dyn DictionaryProvider>,
        translation: Arc<dyn TranslationProvider>,
    ) -> Self {
        let membership = Arc::new(MembershipCache::new(
            config.membership_cache_capacity,
            config.membership_cache_ttl,
        ));
        let learned_words = LearnedWordStore::new(learned_repo, membership);

        let selector = WordSelector::new(
            Arc::clone(&vocabulary),
            learned_words.clone(),
            Arc::clone(&dictionary),
            translation,
            config.exhaustion_policy,
        );
        let bulk_job = Arc::new(BulkCacheJob::new(
            Arc::clone(&vocabulary),
            dictionary,
            config.bulk_request_delay,
        ));

        info!(policy = ?config.exhaustion_policy, "Word selector ready.");

        Self {
            vocabulary,
            learned_words,
            selector,
            bulk_job,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use lexicon_core::memory::{InMemoryLearnedWordRepository, InMemoryVocabularyStore};
    use lexicon_core::DefinitionPayload;

    pub struct Offline;

    #[async_trait]
    impl DictionaryProvider for Offline {
        async fn fetch(&self, _word: &str) -> Option<DefinitionPayload> {
            None
        }
    }

    #[async_trait]
    impl TranslationProvider for Offline {
        async fn fetch(&self, _word: &str) -> Option<String> {
            None
        }
    }

    pub fn test_config(overrides: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
                return Some(value.to_string());
            }
            match key {
                "DATABASE_URL" => Some("postgres://unused/lexicon".to_string()),
                "BULK_REQUEST_DELAY_MS" => Some("0".to_string()),
                _ => None,
            }
        })
        .unwrap()
    }

    /// An offline state over in-memory stores.
    pub fn memory_state(words: &[&str]) -> AppState {
        memory_state_with(&test_config(&[]), words)
    }

    pub fn memory_state_with(config: &Config, words: &[&str]) -> AppState {
        let rng = SharedRng::seeded(7);
        AppState::with_backends(
            config,
            Arc::new(InMemoryVocabularyStore::with_words(rng, words.iter().copied())),
            Arc::new(InMemoryLearnedWordRepository::new()),
            Arc::new(Offline),
            Arc::new(Offline),
        )
    }
}
