pub mod blob;
pub mod db;
pub mod dictionary;
pub mod translation;

pub use db::DbAdapter;
pub use dictionary::FreeDictionaryAdapter;
pub use translation::{HttpTranslationAdapter, TranslationApi, TranslationChain};

use std::time::Duration;

/// Builds the single outbound HTTP client shared by every provider adapter.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(timeout)
        .user_agent(concat!("lexicon/", env!("CARGO_PKG_VERSION")))
        .build()
}
