use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::warn;
use roxmltree::Document;

use crate::language::{FontFace, Language, LanguageSettings};
use crate::screen::{parse_bool, Screen, ScreenSequence};
use crate::translation::{LanguageSource, MemorySource};

pub const FLOW_FILE: &str = "flow.xml";
pub const LANGUAGE_DIR: &str = "lang";

/// Screens and language rules described by `flow.xml`.
#[derive(Debug)]
pub struct FlowDefinition {
    pub settings: LanguageSettings,
    pub screens: ScreenSequence,
}

impl FlowDefinition {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid flow XML")?;
        let root = document.root_element();
        if !root.has_tag_name("flow") {
            return Err(anyhow!(
                "expected <flow> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let mut settings = LanguageSettings::default();
        if let Some(name) = root.attribute("default-language") {
            settings.default_language = parse_language(name)?;
        }
        for node in root.children().filter(|n| n.has_tag_name("language")) {
            let name = node
                .attribute("name")
                .ok_or_else(|| anyhow!("<language> is missing a name attribute"))?;
            let language = parse_language(name)?;
            if let Some(rtl) = node.attribute("rtl") {
                let rtl = parse_bool(Some(rtl), false)
                    .with_context(|| format!("invalid rtl flag for {language}"))?;
                settings.set_right_to_left(language, rtl);
            }
            if let Some(font) = node.attribute("font") {
                let font = FontFace::from_name(font)
                    .ok_or_else(|| anyhow!("unknown font {font:?} for {language}"))?;
                settings.set_font(language, font);
            }
        }

        let screens = root
            .children()
            .filter(|n| n.has_tag_name("screen"))
            .map(|node| Screen::from_node(&node))
            .collect::<Result<Vec<_>>>()?;
        let screens = ScreenSequence::new(screens)?;

        Ok(Self { settings, screens })
    }
}

fn parse_language(name: &str) -> Result<Language> {
    Language::from_name(name).ok_or_else(|| anyhow!("unknown language {name:?}"))
}

#[derive(Debug, Clone)]
enum BundleBacking {
    Directory(PathBuf),
    Memory(MemorySource),
}

/// Flow description plus one translation resource per language.
///
/// On disk a bundle is a directory holding `flow.xml` and
/// `lang/<language>.json` files.
#[derive(Debug, Clone)]
pub struct FlowBundle {
    backing: BundleBacking,
    flow_xml: String,
}

impl FlowBundle {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let flow_path = root.join(FLOW_FILE);
        let flow_xml = fs::read_to_string(&flow_path)
            .with_context(|| format!("unable to read {}", flow_path.display()))?;
        Ok(Self {
            backing: BundleBacking::Directory(root),
            flow_xml,
        })
    }

    pub fn from_parts(flow_xml: impl Into<String>, resources: MemorySource) -> Self {
        Self {
            backing: BundleBacking::Memory(resources),
            flow_xml: flow_xml.into(),
        }
    }

    pub fn flow_xml(&self) -> &str {
        &self.flow_xml
    }

    /// Parses a fresh copy of the flow description.
    pub fn definition(&self) -> Result<FlowDefinition> {
        FlowDefinition::from_xml(&self.flow_xml)
    }

    /// Languages with a resource present in the bundle.
    pub fn available_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| match &self.backing {
                BundleBacking::Directory(root) => language_path(root, *language).is_file(),
                BundleBacking::Memory(source) => source.language_resource(*language).is_some(),
            })
            .collect()
    }
}

fn language_path(root: &Path, language: Language) -> PathBuf {
    root.join(LANGUAGE_DIR)
        .join(format!("{}.json", language.name()))
}

impl LanguageSource for FlowBundle {
    fn language_resource(&self, language: Language) -> Option<String> {
        match &self.backing {
            BundleBacking::Directory(root) => {
                let path = language_path(root, language);
                match fs::read_to_string(&path) {
                    Ok(json) => Some(json),
                    Err(err) => {
                        warn!("unable to read {}: {err}", path.display());
                        None
                    }
                }
            }
            BundleBacking::Memory(source) => source.language_resource(language),
        }
    }
}
