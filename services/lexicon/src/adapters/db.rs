//! services/lexicon/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `VocabularyStore` and `LearnedWordRepository` ports from the `core` crate.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lexicon_core::domain::{DefinitionPayload, LearnedWord, Meaning, Phonetic, VocabularyEntry};
use lexicon_core::ports::{LearnedWordRepository, PortError, PortResult, VocabularyStore};
use lexicon_core::{normalize_word, SharedRng};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::adapters::blob;

const VOCABULARY_COLUMNS: &str =
    "id, word, translation, phonetics, meanings, created_at, updated_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
    rng: SharedRng,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`. `rng` supplies the random offsets for sampling.
    pub fn new(pool: PgPool, rng: SharedRng) -> Self {
        Self { pool, rng }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Uniform draw among the rows whose `word_key` is not in `exclude`.
    ///
    /// The filtered population is counted first and the random offset is taken
    /// against the same filtered, ordered query. Keys are compared verbatim:
    /// both sides come from `normalize_word`, so the database collation never
    /// takes part.
    async fn random_row(&self, exclude: Vec<String>) -> PortResult<Option<VocabularyEntry>> {
        let candidates: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vocabulary WHERE NOT (word_key = ANY($1))",
        )
        .bind(&exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        let Some(offset) = self.rng.index(candidates.max(0) as usize) else {
            return Ok(None);
        };

        // A row deleted between the two queries only shortens the result to None.
        let record = sqlx::query_as::<_, VocabularyRecord>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary
             WHERE NOT (word_key = ANY($1))
             ORDER BY id
             OFFSET $2 LIMIT 1"
        ))
        .bind(&exclude)
        .bind(offset as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        Ok(record.map(VocabularyRecord::to_domain))
    }
}

fn storage(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct VocabularyRecord {
    id: Uuid,
    word: String,
    translation: String,
    phonetics: Option<serde_json::Value>,
    meanings: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}
impl VocabularyRecord {
    fn to_domain(self) -> VocabularyEntry {
        let definition = decode_definition(&self.word, self.phonetics, self.meanings);
        VocabularyEntry {
            id: self.id,
            word: self.word,
            translation: self.translation,
            definition,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Both columns NULL means the word was never resolved. A blob that fails to
/// decode is treated the same way, so the next lookup refreshes it.
fn decode_definition(
    word: &str,
    phonetics: Option<serde_json::Value>,
    meanings: Option<serde_json::Value>,
) -> Option<DefinitionPayload> {
    if phonetics.is_none() && meanings.is_none() {
        return None;
    }
    let decoded = decode_payload(phonetics, meanings);
    match decoded {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(word = %word, error = %e, "discarding undecodable definition blob");
            None
        }
    }
}

fn decode_payload(
    phonetics: Option<serde_json::Value>,
    meanings: Option<serde_json::Value>,
) -> Result<DefinitionPayload, blob::BlobError> {
    Ok(DefinitionPayload {
        phonetics: phonetics
            .map(blob::decode::<Phonetic>)
            .transpose()?
            .unwrap_or_default(),
        meanings: meanings
            .map(blob::decode::<Meaning>)
            .transpose()?
            .unwrap_or_default(),
    })
}

#[derive(FromRow)]
struct LearnedWordRecord {
    id: Uuid,
    user_id: Uuid,
    word: String,
    learned_at: DateTime<Utc>,
}
impl LearnedWordRecord {
    fn to_domain(self) -> LearnedWord {
        LearnedWord {
            id: self.id,
            user_id: self.user_id,
            word: self.word,
            learned_at: self.learned_at,
        }
    }
}

//=========================================================================================
// `VocabularyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VocabularyStore for DbAdapter {
    async fn count(&self) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(count.max(0) as u64)
    }

    async fn get_random(&self) -> PortResult<Option<VocabularyEntry>> {
        self.random_row(Vec::new()).await
    }

    async fn get_random_excluding(
        &self,
        exclude: &HashSet<String>,
    ) -> PortResult<Option<VocabularyEntry>> {
        self.random_row(exclude.iter().map(|w| normalize_word(w)).collect()).await
    }

    async fn find_by_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        let record = sqlx::query_as::<_, VocabularyRecord>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary WHERE word_key = $1"
        ))
        .bind(normalize_word(word))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(record.map(VocabularyRecord::to_domain))
    }

    async fn list_all(&self) -> PortResult<Vec<VocabularyEntry>> {
        let records = sqlx::query_as::<_, VocabularyRecord>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabulary ORDER BY created_at ASC, word ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(records.into_iter().map(VocabularyRecord::to_domain).collect())
    }

    async fn add_word(&self, word: &str) -> PortResult<Option<VocabularyEntry>> {
        let word = word.trim();
        if word.is_empty() {
            return Err(PortError::InvalidInput("word must not be blank".to_string()));
        }
        let record = sqlx::query_as::<_, VocabularyRecord>(&format!(
            "INSERT INTO vocabulary (id, word, word_key) VALUES ($1, $2, $3)
             ON CONFLICT (word_key) DO NOTHING
             RETURNING {VOCABULARY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(word)
        .bind(normalize_word(word))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(record.map(VocabularyRecord::to_domain))
    }

    async fn upsert_definition(
        &self,
        word: &str,
        payload: &DefinitionPayload,
        translation: Option<&str>,
    ) -> PortResult<VocabularyEntry> {
        let phonetics =
            blob::encode(&payload.phonetics).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let meanings =
            blob::encode(&payload.meanings).map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, VocabularyRecord>(&format!(
            "INSERT INTO vocabulary (id, word, word_key, translation, phonetics, meanings, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (word_key) DO UPDATE SET
                 phonetics = EXCLUDED.phonetics,
                 meanings = EXCLUDED.meanings,
                 translation = CASE
                     WHEN EXCLUDED.translation <> '' THEN EXCLUDED.translation
                     ELSE vocabulary.translation
                 END,
                 updated_at = NOW()
             RETURNING {VOCABULARY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(word.trim())
        .bind(normalize_word(word))
        .bind(translation.unwrap_or_default())
        .bind(phonetics)
        .bind(meanings)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `LearnedWordRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl LearnedWordRepository for DbAdapter {
    async fn insert(&self, user_id: Uuid, word: &str) -> PortResult<LearnedWord> {
        let record = sqlx::query_as::<_, LearnedWordRecord>(
            "INSERT INTO learned_words (id, user_id, word, word_key) VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, word, learned_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(word)
        .bind(normalize_word(word))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PortError::AlreadyLearned(word.to_string())
            }
            other => storage(other),
        })?;
        Ok(record.to_domain())
    }

    async fn delete_by_id(&self, id: Uuid) -> PortResult<Option<LearnedWord>> {
        let record = sqlx::query_as::<_, LearnedWordRecord>(
            "DELETE FROM learned_words WHERE id = $1 RETURNING id, user_id, word, learned_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(record.map(LearnedWordRecord::to_domain))
    }

    async fn delete_by_word(&self, user_id: Uuid, word: &str) -> PortResult<bool> {
        let result = sqlx::query(
            "DELETE FROM learned_words WHERE user_id = $1 AND word_key = $2",
        )
        .bind(user_id)
        .bind(normalize_word(word))
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_user(&self, user_id: Uuid) -> PortResult<Vec<LearnedWord>> {
        let records = sqlx::query_as::<_, LearnedWordRecord>(
            "SELECT id, user_id, word, learned_at FROM learned_words
             WHERE user_id = $1 ORDER BY learned_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(records.into_iter().map(LearnedWordRecord::to_domain).collect())
    }
}
