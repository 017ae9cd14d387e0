use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Languages the flow can be presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hebrew,
    Arabic,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hebrew, Language::Arabic];

    /// Parses a language from its full name or two letter code.
    pub fn from_name(name: &str) -> Option<Self> {
        let language = match name.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Language::English,
            "hebrew" | "he" | "iw" => Language::Hebrew,
            "arabic" | "ar" => Language::Arabic,
            _ => return None,
        };
        Some(language)
    }

    /// Lowercase name, also used for resource file names.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hebrew => "hebrew",
            Language::Arabic => "arabic",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    pub fn is_right_to_left(self) -> bool {
        self == TextDirection::RightToLeft
    }
}

/// Font asset a text element should be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    #[default]
    Standard,
    Arabic,
}

impl FontFace {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" | "other" => Some(FontFace::Standard),
            "arabic" => Some(FontFace::Arabic),
            _ => None,
        }
    }
}

/// Per-language presentation rules: which languages read right to left,
/// which font each one uses and what to fall back to before a language has
/// been picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSettings {
    pub default_language: Language,
    right_to_left: HashSet<Language>,
    fonts: HashMap<Language, FontFace>,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            default_language: Language::Hebrew,
            right_to_left: HashSet::from([Language::Hebrew, Language::Arabic]),
            fonts: HashMap::from([(Language::Arabic, FontFace::Arabic)]),
        }
    }
}

impl LanguageSettings {
    pub fn direction(&self, language: Language) -> TextDirection {
        if self.right_to_left.contains(&language) {
            TextDirection::RightToLeft
        } else {
            TextDirection::LeftToRight
        }
    }

    pub fn font(&self, language: Language) -> FontFace {
        self.fonts.get(&language).copied().unwrap_or_default()
    }

    pub fn set_right_to_left(&mut self, language: Language, rtl: bool) {
        if rtl {
            self.right_to_left.insert(language);
        } else {
            self.right_to_left.remove(&language);
        }
    }

    pub fn set_font(&mut self, language: Language, font: FontFace) {
        self.fonts.insert(language, font);
    }
}
