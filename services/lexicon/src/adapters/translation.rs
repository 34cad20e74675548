//! services/lexicon/src/adapters/translation.rs
//!
//! This module contains the translation adapters. Each `HttpTranslationAdapter`
//! talks to one public translation endpoint, and `TranslationChain` tries several
//! of them in order. Both implement the `TranslationProvider` port.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lexicon_core::ports::{PortError, PortResult, TranslationProvider};
use serde_json::Value;
use tracing::{debug, warn};

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const MYMEMORY_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// The public translation endpoints the service knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationApi {
    Google,
    MyMemory,
}

impl TranslationApi {
    fn default_endpoint(self) -> &'static str {
        match self {
            TranslationApi::Google => GOOGLE_ENDPOINT,
            TranslationApi::MyMemory => MYMEMORY_ENDPOINT,
        }
    }
}

impl FromStr for TranslationApi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(TranslationApi::Google),
            "mymemory" => Ok(TranslationApi::MyMemory),
            other => Err(format!("unknown translation provider '{other}'")),
        }
    }
}

impl fmt::Display for TranslationApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationApi::Google => f.write_str("google"),
            TranslationApi::MyMemory => f.write_str("mymemory"),
        }
    }
}

/// Pulls the translated text out of any of the supported response shapes:
/// Google's nested arrays (`[[["táo","apple",...]],...]`), a top-level
/// `translatedText`, or MyMemory's `responseData.translatedText`.
fn extract_translated_text(body: &Value) -> Option<String> {
    // MyMemory sends this as a number or as a string.
    if let Some(status) = body.get("responseStatus") {
        let code = status
            .as_u64()
            .or_else(|| status.as_str()?.trim().parse().ok());
        if code != Some(200) {
            return None;
        }
    }

    let text = if body.is_array() {
        // Google splits long input into segments; join them back.
        let segments = body.get(0)?.as_array()?;
        segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect::<String>()
    } else {
        body.get("translatedText")
            .or_else(|| body.pointer("/responseData/translatedText"))
            .and_then(Value::as_str)?
            .to_string()
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter for a single translation endpoint.
#[derive(Clone)]
pub struct HttpTranslationAdapter {
    http: reqwest::Client,
    api: TranslationApi,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl HttpTranslationAdapter {
    /// Creates an adapter that calls the public endpoint of `api`.
    pub fn new(
        http: reqwest::Client,
        api: TranslationApi,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self::with_endpoint(http, api, api.default_endpoint(), source_lang, target_lang)
    }

    /// Same as `new`, but against a custom endpoint (mirrors, tests).
    pub fn with_endpoint(
        http: reqwest::Client,
        api: TranslationApi,
        endpoint: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api,
            endpoint: endpoint.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    fn request(&self, word: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(&self.endpoint);
        match self.api {
            TranslationApi::Google => request.query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", word),
            ]),
            TranslationApi::MyMemory => {
                let langpair = format!("{}|{}", self.source_lang, self.target_lang);
                request.query(&[("q", word), ("langpair", langpair.as_str())])
            }
        }
    }

    async fn translate(&self, word: &str) -> PortResult<Option<String>> {
        let response = self
            .request(word)
            .send()
            .await
            .map_err(|e| PortError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::ProviderUnavailable(format!(
                "{} returned {status}",
                self.api
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::ProviderUnavailable(format!("undecodable response: {e}")))?;
        Ok(extract_translated_text(&body))
    }
}

//=========================================================================================
// `TranslationProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranslationProvider for HttpTranslationAdapter {
    async fn fetch(&self, word: &str) -> Option<String> {
        match self.translate(word.trim()).await {
            Ok(Some(text)) => Some(text),
            Ok(None) => {
                debug!(provider = %self.api, word = %word, "no translation in response");
                None
            }
            Err(e) => {
                warn!(provider = %self.api, word = %word, error = %e, "translation failed");
                None
            }
        }
    }
}

//=========================================================================================
// Fallback Chain
//=========================================================================================

/// Tries each provider in order and returns the first translation found.
#[derive(Clone, Default)]
pub struct TranslationChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
}

impl TranslationChain {
    pub fn new(providers: Vec<Arc<dyn TranslationProvider>>) -> Self {
        Self { providers }
    }

    /// Builds one HTTP adapter per configured API, sharing the same client.
    pub fn from_apis(
        http: &reqwest::Client,
        apis: &[TranslationApi],
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        let providers = apis
            .iter()
            .map(|api| {
                Arc::new(HttpTranslationAdapter::new(
                    http.clone(),
                    *api,
                    source_lang,
                    target_lang,
                )) as Arc<dyn TranslationProvider>
            })
            .collect();
        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl TranslationProvider for TranslationChain {
    async fn fetch(&self, word: &str) -> Option<String> {
        for provider in &self.providers {
            if let Some(text) = provider.fetch(word).await {
                return Some(text);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationProvider for Fixed {
        async fn fetch(&self, _word: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.map(str::to_string)
        }
    }

    #[test]
    fn parses_provider_names() {
        assert_eq!("Google".parse::<TranslationApi>(), Ok(TranslationApi::Google));
        assert_eq!(" mymemory ".parse::<TranslationApi>(), Ok(TranslationApi::MyMemory));
        assert!("babelfish".parse::<TranslationApi>().is_err());
    }

    #[test]
    fn extracts_google_nested_arrays() {
        let body = json!([[["quả táo", "apple", null, null, 10]], null, "en"]);
        assert_eq!(extract_translated_text(&body), Some("quả táo".to_string()));

        let body = json!([[["xin chào. ", "hello. ", null], ["thế giới", "world", null]], null, "en"]);
        assert_eq!(extract_translated_text(&body), Some("xin chào. thế giới".to_string()));
    }

    #[test]
    fn extracts_translated_text_objects() {
        let body = json!({ "translatedText": " táo " });
        assert_eq!(extract_translated_text(&body), Some("táo".to_string()));

        let body = json!({
            "responseData": { "translatedText": "táo", "match": 1 },
            "responseStatus": 200
        });
        assert_eq!(extract_translated_text(&body), Some("táo".to_string()));
    }

    #[test]
    fn rejects_empty_and_failed_responses() {
        assert_eq!(extract_translated_text(&json!({ "translatedText": "  " })), None);
        assert_eq!(extract_translated_text(&json!([])), None);
        assert_eq!(extract_translated_text(&json!({ "error": "quota" })), None);
        let body = json!({
            "responseData": { "translatedText": "MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS" },
            "responseStatus": 429
        });
        assert_eq!(extract_translated_text(&body), None);
    }

    #[test]
    fn string_error_status_is_not_a_translation() {
        let body = json!({
            "responseData": {
                "translatedText": "INVALID LANGUAGE PAIR SPECIFIED. EXAMPLE: LANGPAIR=EN|IT USING 2 LETTER ISO OR RFC3066 LIKE ZH-CN. ALMOST ALL LANGUAGES SUPPORTED BUT SOME MAY HAVE NO CONTENT"
            },
            "responseStatus": "403"
        });
        assert_eq!(extract_translated_text(&body), None);

        let body = json!({
            "responseData": { "translatedText": "táo" },
            "responseStatus": "200"
        });
        assert_eq!(extract_translated_text(&body), Some("táo".to_string()));

        let body = json!({
            "responseData": { "translatedText": "táo" },
            "responseStatus": null
        });
        assert_eq!(extract_translated_text(&body), None);
    }

    #[tokio::test]
    async fn chain_stops_at_first_answer() {
        let first = Fixed::new(None);
        let second = Fixed::new(Some("táo"));
        let third = Fixed::new(Some("never"));
        let providers: Vec<Arc<dyn TranslationProvider>> =
            vec![first.clone(), second.clone(), third.clone()];
        let chain = TranslationChain::new(providers);

        assert_eq!(chain.fetch("apple").await, Some("táo".to_string()));
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_chain_translates_nothing() {
        assert_eq!(TranslationChain::default().fetch("apple").await, None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_none() {
        let adapter = HttpTranslationAdapter::with_endpoint(
            reqwest::Client::new(),
            TranslationApi::MyMemory,
            "http://127.0.0.1:9/get",
            "en",
            "vi",
        );
        assert_eq!(adapter.fetch("apple").await, None);
    }

    #[test]
    fn from_apis_builds_one_adapter_per_api() {
        let chain = TranslationChain::from_apis(
            &reqwest::Client::new(),
            &[TranslationApi::Google, TranslationApi::MyMemory],
            "en",
            "vi",
        );
        assert_eq!(chain.len(), 2);
    }
}
