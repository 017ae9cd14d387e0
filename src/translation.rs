use std::collections::HashMap;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::language::Language;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("no translation resource for {language}")]
    Missing { language: Language },

    #[error("malformed translation resource for {language}: {source}")]
    Parse {
        language: Language,
        #[source]
        source: serde_json::Error,
    },
}

/// Provides the raw JSON resource for a language.
pub trait LanguageSource {
    fn language_resource(&self, language: Language) -> Option<String>;
}

/// Language resources held in memory, keyed by language.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: HashMap<Language, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, language: Language, json: impl Into<String>) -> Self {
        self.insert(language, json);
        self
    }

    pub fn insert(&mut self, language: Language, json: impl Into<String>) {
        self.resources.insert(language, json.into());
    }
}

impl LanguageSource for MemorySource {
    fn language_resource(&self, language: Language) -> Option<String> {
        self.resources.get(&language).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResource {
    translations: Vec<TranslationEntry>,
}

/// Key to text mapping for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    /// Parses a `{ "translations": [ {key, value}, ... ] }` resource. Later
    /// entries override earlier ones with the same key.
    pub fn from_json(language: Language, json: &str) -> Result<Self, TranslationError> {
        let resource: TranslationResource = serde_json::from_str(json)
            .map_err(|source| TranslationError::Parse { language, source })?;
        Ok(Self::from_entries(resource.translations))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TranslationEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.key, entry.value))
                .collect(),
        }
    }

    /// Translation for `key`, if present.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for a table without keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every key, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Holds the table of the most recently loaded language.
#[derive(Debug, Clone, Default)]
pub struct TranslationStore {
    loaded: Option<Language>,
    table: TranslationTable,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active table with the resource for `language`. On error
    /// the previous table is kept as is.
    pub fn load(
        &mut self,
        language: Language,
        source: &dyn LanguageSource,
    ) -> Result<&TranslationTable, TranslationError> {
        let json = source
            .language_resource(language)
            .ok_or(TranslationError::Missing { language })?;
        let table = TranslationTable::from_json(language, &json)?;
        info!("Loaded {} translation(s) for {language}", table.len());
        debug!("Keys: {}", table.keys().collect::<Vec<_>>().join(", "));
        self.table = table;
        self.loaded = Some(language);
        Ok(&self.table)
    }

    /// Active translation for `key`, if the loaded table has one.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.table.lookup(key)
    }

    /// Language of the table currently held, if any load succeeded.
    pub fn loaded_language(&self) -> Option<Language> {
        self.loaded
    }

    /// Table currently in use.
    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// Forgets the loaded table and its language.
    pub fn clear(&mut self) {
        self.loaded = None;
        self.table = TranslationTable::default();
    }
}
