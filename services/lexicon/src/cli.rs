//! services/lexicon/src/cli.rs
//!
//! Command-line surface of the `lexicon` binary. Arguments are parsed into a
//! [`Command`] and executed against a shared [`AppState`]; every result is
//! printed as pretty JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexicon_core::PortError;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "lexicon", version, about = "Vocabulary catalogue, definition cache and word picker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Multi-word arguments (`define ice cream`) are joined with single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch definitions for every catalogued word that lacks one
    WarmCache,
    /// Add one word per line (blank lines and `#` comments are skipped)
    Import { file: PathBuf },
    /// Add a word to the catalogue
    Add {
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Pick a word the user has not learned yet
    Pick { user_id: Uuid },
    /// Show a word's definition, fetching it if needed
    Define {
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Mark a word as learned
    Learn {
        user_id: Uuid,
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Unmark a learned word
    Forget {
        user_id: Uuid,
        #[arg(required = true, num_args = 1..)]
        word: Vec<String>,
    },
    /// Unmark a learned word by its record id
    ForgetId { learned_id: Uuid },
    /// List a user's learned words
    Learned { user_id: Uuid },
    /// Number of catalogued words
    Count,
}

fn joined(parts: &[String]) -> Result<String, ApiError> {
    let word = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if word.is_empty() {
        return Err(PortError::InvalidInput("word must not be blank".to_string()).into());
    }
    Ok(word)
}

//=========================================================================================
// Import
//=========================================================================================

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub already_present: usize,
}

/// The words of an import file: one per line, blank and `#` lines skipped.
fn import_words(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

async fn import(state: &AppState, contents: &str) -> Result<ImportReport, ApiError> {
    let mut report = ImportReport::default();
    for word in import_words(contents) {
        match state.vocabulary.add_word(word).await? {
            Some(_) => report.added += 1,
            None => {
                debug!(word = %word, "already catalogued");
                report.already_present += 1;
            }
        }
    }
    info!(added = report.added, already_present = report.already_present, "import finished");
    Ok(report)
}

//=========================================================================================
// Execution
//=========================================================================================

/// Runs `command` and returns its JSON result. `cancel` stops a running
/// cache warm-up between words.
pub async fn execute(
    command: Command,
    state: &AppState,
    cancel: &CancellationToken,
) -> Result<serde_json::Value, ApiError> {
    let value = match command {
        Command::WarmCache => serde_json::to_value(state.bulk_job.run(cancel).await?),
        Command::Import { file } => {
            let contents = tokio::fs::read_to_string(&file).await?;
            serde_json::to_value(import(state, &contents).await?)
        }
        Command::Add { word } => {
            let word = joined(&word)?;
            Ok(match state.vocabulary.add_word(&word).await? {
                Some(entry) => json!({ "added": true, "entry": entry }),
                None => json!({ "added": false, "word": word }),
            })
        }
        Command::Pick { user_id } => {
            serde_json::to_value(state.selector.select_random_word_for_user(user_id).await?)
        }
        Command::Define { word } => {
            let word = joined(&word)?;
            serde_json::to_value(state.selector.get_or_fetch_definition(&word).await?)
        }
        Command::Learn { user_id, word } => {
            let word = joined(&word)?;
            serde_json::to_value(state.learned_words.add(user_id, &word).await?)
        }
        Command::Forget { user_id, word } => {
            let word = joined(&word)?;
            Ok(json!({
                "removed": state.learned_words.remove_by_word(user_id, &word).await?
            }))
        }
        Command::ForgetId { learned_id } => Ok(json!({
            "removed": state.learned_words.remove_by_id(learned_id).await?
        })),
        Command::Learned { user_id } => {
            serde_json::to_value(state.learned_words.get_by_user_id(user_id).await?)
        }
        Command::Count => Ok(json!({ "count": state.vocabulary.count().await? })),
    };
    value.map_err(|e| ApiError::Internal(format!("could not serialize result: {e}")))
}

/// Runs `command` and prints its result.
pub async fn run(
    command: Command,
    state: &AppState,
    cancel: &CancellationToken,
) -> Result<(), ApiError> {
    let value = execute(command, state, cancel).await?;
    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|e| ApiError::Internal(format!("could not render result: {e}")))?;
    println!("{rendered}");
    Ok(())
}
