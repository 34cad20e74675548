//! crates/lexicon_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the vocabulary subsystem.
//! These traits form the boundary of the hexagonal architecture, so the selector
//! and cache logic never depend on a particular database or HTTP API.

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{DefinitionPayload, LearnedWord, VocabularyEntry};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Word already learned: {0}")]
    AlreadyLearned(String),
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

/// The persisted word catalogue.
///
/// Sampling methods must draw uniformly from the population left *after*
/// filtering; an empty population is `Ok(None)`, not an error.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    async fn count(&self) -> PortResult<u64>;

    async fn get_random(&self) -> PortResult<Option<VocabularyEntry>>;

    /// `exclude` holds normalized words (see [`crate::domain::normalize_word`]).
    async fn get_random_excluding(
        &self,
        exclude: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>>;

    async fn find_by_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>>;

    async fn list_all(&self) -> PortResult<Vec<VocabularyEntry>>;

    /// Adds a bare word to the catalogue. Returns `None` if it already exists.
    async fn add_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>>;

    /// Creates or refreshes the definition of `word`.
    ///
    /// A non-empty `translation` replaces the stored one; `None` or an empty
    /// string leaves it untouched.
    async fn upsert_definition(
        &self,
        word: &str,
        payload: &DefinitionPayload,
        translation: Option<&str>,
    ) -> PortResult<VocabularyEntry>;
}

/// Raw persistence for learned words. Cache invalidation is layered on top by
/// [`crate::learned::LearnedWordStore`].
#[async_trait]
pub trait LearnedWordRepository: Send + Sync {
    /// Fails with [`PortError::AlreadyLearned`] on a duplicate `(user_id, word)`.
    async fn insert(&self, user_id: Uuid, word: &str) -> PortResult<LearnedWord>;

    /// Returns the removed record, if any.
    async fn delete_by_id(&self, id: Uuid) -> PortResult<Option<LearnedWord>>;

    async fn delete_by_word(&self, user_id: Uuid, word: &str) -> PortResult<bool>;

    async fn list_by_user(&self, user_id: Uuid) -> PortResult<Vec<LearnedWord>>;
}

//=========================================================================================
// Provider Ports (Traits)
//=========================================================================================

/// Resolves phonetics and meanings from an external dictionary.
///
/// Failures are logged by the implementation and reported as `None`.
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    async fn fetch(&self, word: &str) -> Option<DefinitionPayload>;
}

/// Resolves a word's translation into the configured target language.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn fetch(&self, word: &str) -> Option<String>;
}
