//! crates/lexicon_core/src/bulk.rs
//!
//! Warms the definition cache for every catalogue entry that is missing one.
//! Entries are processed one at a time with a pause after each dictionary
//! request, to stay under the provider's rate limit.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::definitions::DefinitionCache;
use crate::ports::{DictionaryProvider, PortResult, VocabularyStore};

/// Tally of a single bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub examined: usize,
    pub updated: usize,
    pub failed: usize,
    /// Entries whose cached definition was already usable.
    pub skipped: usize,
    pub cancelled: bool,
}

pub struct BulkCacheJob {
    vocabulary: Arc<dyn VocabularyStore>,
    definitions: DefinitionCache,
    dictionary: Arc<dyn DictionaryProvider>,
    request_delay: Duration,
}

impl BulkCacheJob {
    pub fn new(
        vocabulary: Arc<dyn VocabularyStore>,
        dictionary: Arc<dyn DictionaryProvider>,
        request_delay: Duration,
    ) -> Self {
        Self {
            definitions: DefinitionCache::new(Arc::clone(&vocabulary)),
            vocabulary,
            dictionary,
            request_delay,
        }
    }

    /// Runs the job to completion and returns how many entries were updated.
    pub async fn cache_all_vocabulary_definitions(&self) -> PortResult<usize> {
        let report = self.run(&CancellationToken::new()).await?;
        Ok(report.updated)
    }

    /// Runs the job until every entry was visited or `cancel` fires.
    ///
    /// Only listing the catalogue can fail the run; per-entry failures are
    /// counted and logged.
    pub async fn run(&self, cancel: &CancellationToken) -> PortResult<BulkReport> {
        let entries = self.vocabulary.list_all().await?;
        let total = entries.len();
        info!(total, "bulk definition caching started");

        let mut report = BulkReport::default();
        for (index, entry) in entries.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            report.examined += 1;

            if !entry.needs_definition() {
                report.skipped += 1;
                continue;
            }

            match self.dictionary.fetch(&entry.word).await {
                Some(payload) => match self.definitions.put(&entry.word, payload, None).await {
                    Ok(_) => {
                        report.updated += 1;
                        debug!(word = %entry.word, "definition cached");
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!(word = %entry.word, error = %e, "failed to persist definition");
                    }
                },
                None => {
                    report.failed += 1;
                    warn!(word = %entry.word, "no definition available");
                }
            }

            if index + 1 == total {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.request_delay) => {}
            }
        }

        info!(
            examined = report.examined,
            updated = report.updated,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "bulk definition caching finished"
        );
        Ok(report)
    }
}
