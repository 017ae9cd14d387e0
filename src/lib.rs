//! Headless runtime for linear, multi-screen learning flows.
//!
//! A flow is an ordered list of screens loaded once from a bundle. The
//! navigator moves through it one screen at a time, each screen drives a
//! shared popup and the score board, and every transition re-runs the
//! localization pass so visible text follows the selected language.
//! Rendering and input stay outside the crate; hosts read state back through
//! the text registry, popup and score board handles.

pub mod bundle;
pub mod groups;
pub mod language;
pub mod localizer;
pub mod navigator;
pub mod popup;
pub mod scheduler;
pub mod score;
pub mod screen;
pub mod session;
pub mod text;
pub mod translation;

pub use bundle::{FlowBundle, FlowDefinition};
pub use groups::{GameData, GroupData, GroupStore};
pub use language::{FontFace, Language, LanguageSettings, TextDirection};
pub use localizer::{Localizer, PassSummary};
pub use navigator::{FlowContext, Navigator};
pub use popup::{Popup, PopupSurface};
pub use scheduler::{Liveness, LivenessToken, Scheduler, TaskId};
pub use score::{ScoreBoard, ScoreSink};
pub use screen::{Affordance, Screen, ScreenProperties, ScreenSequence};
pub use session::{FlowSession, FlowSnapshot};
pub use text::{ElementId, ElementScope, TextElement, TextRegistry};
pub use translation::{
    LanguageSource, MemorySource, TranslationEntry, TranslationError, TranslationStore,
    TranslationTable,
};
