//! services/lexicon/src/adapters/dictionary.rs
//!
//! This module contains the adapter for the Free Dictionary API
//! (`GET {base}/{word}`). It implements the `DictionaryProvider` port from the
//! `core` crate.

use async_trait::async_trait;
use lexicon_core::domain::{Definition, DefinitionPayload, Meaning, Phonetic};
use lexicon_core::ports::{DictionaryProvider, PortError, PortResult};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Converts the first entry of a response into a capped payload.
/// Returns `None` when the entry carries nothing usable.
fn payload_from_entries(entries: Vec<ApiEntry>) -> Option<DefinitionPayload> {
    let entry = entries.into_iter().next()?;

    let phonetics = entry
        .phonetics
        .into_iter()
        .filter_map(|p| {
            let text = non_empty(p.text).unwrap_or_default();
            let audio_url = non_empty(p.audio);
            (!text.is_empty() || audio_url.is_some()).then_some(Phonetic { text, audio_url })
        })
        .collect();

    let meanings = entry
        .meanings
        .into_iter()
        .map(|m| Meaning {
            part_of_speech: m.part_of_speech,
            definitions: m
                .definitions
                .into_iter()
                .filter(|d| !d.definition.trim().is_empty())
                .map(|d| Definition {
                    text: d.definition,
                    example: non_empty(d.example),
                    synonyms: d.synonyms,
                    antonyms: d.antonyms,
                })
                .collect(),
        })
        .collect();

    let payload = DefinitionPayload {
        phonetics,
        meanings,
    }
    .capped();
    (!payload.is_empty()).then_some(payload)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DictionaryProvider` over HTTP.
#[derive(Clone)]
pub struct FreeDictionaryAdapter {
    http: reqwest::Client,
    base_url: String,
}

impl FreeDictionaryAdapter {
    /// Creates a new `FreeDictionaryAdapter`. The client carries the request timeout.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn entry_url(&self, word: &str) -> PortResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PortError::Unexpected(format!("bad dictionary base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("dictionary base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }

    async fn lookup(&self, word: &str) -> PortResult<Option<DefinitionPayload>> {
        let url = self.entry_url(word)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PortError::ProviderUnavailable(format!(
                "dictionary API returned {status}"
            )));
        }

        let entries: Vec<ApiEntry> = response
            .json()
            .await
            .map_err(|e| PortError::ProviderUnavailable(format!("undecodable response: {e}")))?;
        Ok(payload_from_entries(entries))
    }
}

//=========================================================================================
// `DictionaryProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl DictionaryProvider for FreeDictionaryAdapter {
    async fn fetch(&self, word: &str) -> Option<DefinitionPayload> {
        match self.lookup(word.trim()).await {
            Ok(Some(payload)) => Some(payload),
            Ok(None) => {
                debug!(word = %word, "dictionary has no entry");
                None
            }
            Err(e) => {
                warn!(word = %word, error = %e, "dictionary lookup failed");
                None
            }
        }
    }
}
