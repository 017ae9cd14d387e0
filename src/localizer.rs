use log::{debug, error};

use crate::language::{Language, LanguageSettings};
use crate::text::TextRegistry;
use crate::translation::{LanguageSource, TranslationError, TranslationStore};

/// Outcome of one localization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub language: Language,
    pub visited: usize,
    pub translated: usize,
}

/// Rewrites visible text for the active language.
#[derive(Debug)]
pub struct Localizer {
    registry: TextRegistry,
    settings: LanguageSettings,
    store: TranslationStore,
    selected: Option<Language>,
}

impl Localizer {
    pub fn new(registry: TextRegistry, settings: LanguageSettings) -> Self {
        Self {
            registry,
            settings,
            store: TranslationStore::new(),
            selected: None,
        }
    }

    /// Language used by the next pass; the configured default until one is
    /// selected.
    pub fn active_language(&self) -> Language {
        self.selected.unwrap_or(self.settings.default_language)
    }

    pub fn settings(&self) -> &LanguageSettings {
        &self.settings
    }

    pub fn store(&self) -> &TranslationStore {
        &self.store
    }

    pub fn registry(&self) -> &TextRegistry {
        &self.registry
    }

    /// Switches language and retranslates. A resource that fails to load is
    /// logged and the previous table stays in use; font and direction still
    /// follow the newly selected language.
    pub fn select_language(
        &mut self,
        language: Language,
        source: &dyn LanguageSource,
    ) -> Result<PassSummary, TranslationError> {
        self.selected = Some(language);
        let loaded = self.store.load(language, source).map(|_| ());
        if let Err(err) = &loaded {
            error!("Keeping previous translations: {err}");
        }
        let summary = self.retranslate_all();
        loaded.map(|()| summary)
    }

    /// Applies the active table, font and direction to every visible element.
    pub fn retranslate_all(&self) -> PassSummary {
        let language = self.active_language();
        let direction = self.settings.direction(language);
        let font = self.settings.font(language);
        let mut translated = 0;

        let visited = self.registry.for_each_visible(|element| {
            if let Some(text) = self.store.lookup(element.lookup_key()) {
                element.text = text.to_string();
                translated += 1;
            }
            element.direction = direction;
            element.font = font;
        });

        debug!("Localized {translated}/{visited} element(s) for {language}");
        PassSummary {
            language,
            visited,
            translated,
        }
    }

    /// Forgets the selected language and loaded table.
    pub fn reset(&mut self) {
        self.selected = None;
        self.store.clear();
    }
}
