pub mod bulk;
pub mod definitions;
pub mod domain;
pub mod learned;
pub mod membership;
pub mod memory;
pub mod ports;
pub mod rng;
pub mod selector;

pub use bulk::{BulkCacheJob, BulkReport};
pub use definitions::DefinitionCache;
pub use domain::{
    normalize_word, Definition, DefinitionPayload, LearnedWord, Meaning, Phonetic, ResolvedWord,
    SelectionOutcome, VocabularyEntry,
};
pub use learned::LearnedWordStore;
pub use membership::MembershipCache;
pub use ports::{
    DictionaryProvider, LearnedWordRepository, PortError, PortResult, TranslationProvider,
    VocabularyStore,
};
pub use rng::SharedRng;
pub use selector::{ExhaustionPolicy, WordSelector, MAX_RETRY_DRAWS};
