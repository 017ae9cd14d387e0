use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};

use crate::bundle::{FlowBundle, FlowDefinition};
use crate::language::{Language, TextDirection};
use crate::localizer::{Localizer, PassSummary};
use crate::navigator::{FlowContext, Navigator};
use crate::popup::Popup;
use crate::score::ScoreBoard;
use crate::scheduler::{Scheduler, TaskId};
use crate::text::TextRegistry;
use crate::translation::{LanguageSource, TranslationError};

/// One running flow: the navigator, its collaborators and the timer queue,
/// wired together once at startup.
pub struct FlowSession {
    navigator: Navigator,
    scheduler: Scheduler<Navigator>,
    source: Box<dyn LanguageSource>,
    registry: TextRegistry,
    popup: Arc<Popup>,
    score: Arc<ScoreBoard>,
}

impl fmt::Debug for FlowSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowSession")
            .field("navigator", &self.navigator)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl FlowSession {
    pub fn new(definition: FlowDefinition, source: impl LanguageSource + 'static) -> Self {
        let FlowDefinition { settings, screens } = definition;
        let source: Box<dyn LanguageSource> = Box::new(source);
        let registry = TextRegistry::new();
        let popup = Arc::new(Popup::new(registry.clone()));
        let score = Arc::new(ScoreBoard::new(screens.len()));

        let mut localizer = Localizer::new(registry.clone(), settings);
        load_default_language(&mut localizer, source.as_ref());

        let context = FlowContext {
            localizer,
            popup: popup.clone(),
            score: score.clone(),
        };
        let navigator = Navigator::new(screens, context);
        info!("Started flow with {} screen(s)", navigator.len());

        Self {
            navigator,
            scheduler: Scheduler::new(),
            source,
            registry,
            popup,
            score,
        }
    }

    pub fn from_bundle(bundle: FlowBundle) -> Result<Self> {
        let definition = bundle.definition()?;
        Ok(Self::new(definition, bundle))
    }

    pub fn next(&mut self) -> bool {
        self.navigator.next()
    }

    pub fn previous(&mut self) -> bool {
        self.navigator.previous()
    }

    pub fn screen_ended(&mut self) {
        self.navigator.screen_ended();
    }

    pub fn select_language(&mut self, language: Language) -> Result<PassSummary, TranslationError> {
        self.navigator
            .context_mut()
            .localizer
            .select_language(language, self.source.as_ref())
    }

    /// Reapplies translations, e.g. after content code added or changed text.
    pub fn retranslate(&self) -> PassSummary {
        self.navigator.context().localizer.retranslate_all()
    }

    /// Runs `continuation` after `delay`, unless the current screen is left
    /// before then.
    pub fn defer<F>(&mut self, delay: Duration, continuation: F) -> TaskId
    where
        F: FnOnce(&mut Navigator) + Send + 'static,
    {
        let token = self.navigator.current_screen().liveness_token();
        self.scheduler.schedule(delay, token, continuation)
    }

    /// Advances the session clock, running due continuations.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.scheduler.advance(elapsed, &mut self.navigator)
    }

    /// Drops pending work, progress and translations, and returns to the
    /// first screen in the default language.
    pub fn reset(&mut self) {
        info!("Resetting flow session");
        self.scheduler.clear();
        self.score.reset();
        let localizer = &mut self.navigator.context_mut().localizer;
        localizer.reset();
        load_default_language(localizer, self.source.as_ref());
        self.navigator.restart();
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn registry(&self) -> &TextRegistry {
        &self.registry
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn language(&self) -> Language {
        self.navigator.context().localizer.active_language()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let screen = self.navigator.current_screen();
        let localizer = &self.navigator.context().localizer;
        let language = localizer.active_language();
        FlowSnapshot {
            index: self.navigator.current_index(),
            count: self.navigator.len(),
            screen: screen.name.clone(),
            language,
            direction: localizer.settings().direction(language),
            popup_visible: self.popup.is_visible(),
            popup_header: self.popup.header(),
            popup_body: self.popup.body(),
            next_visible: screen.next_visible(),
            info_visible: screen.info_visible(),
            score: self.score.score(),
            progress_visible: self.score.progress_visible(),
        }
    }
}

fn load_default_language(localizer: &mut Localizer, source: &dyn LanguageSource) {
    let language = localizer.settings().default_language;
    if let Err(err) = localizer.select_language(language, source) {
        debug!("Default language {language} unavailable: {err}");
    }
}

/// Observable state of a session at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub index: usize,
    pub count: usize,
    pub screen: String,
    pub language: Language,
    pub direction: TextDirection,
    pub popup_visible: bool,
    pub popup_header: String,
    pub popup_body: String,
    pub next_visible: bool,
    pub info_visible: bool,
    pub score: u32,
    pub progress_visible: bool,
}

impl fmt::Display for FlowSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.direction.is_right_to_left() {
            "rtl"
        } else {
            "ltr"
        };
        writeln!(
            f,
            " - screen {}/{} {}",
            self.index + 1,
            self.count,
            self.screen
        )?;
        writeln!(f, " - language {} ({direction})", self.language)?;
        writeln!(
            f,
            " - popup visible={} header={:?} body={:?}",
            self.popup_visible, self.popup_header, self.popup_body
        )?;
        writeln!(
            f,
            " - buttons next={} info={}",
            self.next_visible, self.info_visible
        )?;
        write!(
            f,
            " - score {} (progress bar {})",
            self.score,
            if self.progress_visible { "shown" } else { "hidden" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::FontFace;
    use crate::translation::MemorySource;

    const FLOW: &str = r#"<flow default-language="hebrew">
  <screen name="intro" progress-bar="false">
    <begin popup="true"><header>welcome</header><body>intro_text</body></begin>
    <end popup="true"><header>well_done</header></end>
  </screen>
  <screen name="quiz" next-button="false">
    <begin popup="false"><header>quiz</header></begin>
  </screen>
  <screen name="outro"/>
</flow>"#;

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                Language::Hebrew,
                r#"{"translations":[{"key":"welcome","value":"ברוכים הבאים"}]}"#,
            )
            .with(
                Language::English,
                r#"{"translations":[{"key":"welcome","value":"Welcome"},{"key":"well_done","value":"Well done"},{"key":"quiz_title","value":"Quiz time"}]}"#,
            )
            .with(
                Language::Arabic,
                r#"{"translations":[{"key":"welcome","value":"أهلا وسهلا"}]}"#,
            )
    }

    fn session() -> FlowSession {
        FlowSession::new(FlowDefinition::from_xml(FLOW).unwrap(), source())
    }

    #[test]
    fn starts_translated_in_default_language() {
        let session = session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.language, Language::Hebrew);
        assert_eq!(snapshot.popup_header, "ברוכים הבאים");
        assert!(snapshot.popup_visible);
        assert!(!snapshot.progress_visible);
        assert_eq!(snapshot.direction, TextDirection::RightToLeft);
    }

    #[test]
    fn language_switch_retranslates_popup() {
        let mut session = session();
        session.select_language(Language::English).unwrap();
        assert_eq!(session.popup().header(), "Welcome");
        session.select_language(Language::Arabic).unwrap();
        assert_eq!(session.popup().header(), "أهلا وسهلا");
        let header = session
            .registry()
            .get(session.popup().header_id())
            .unwrap();
        assert_eq!(header.font, FontFace::Arabic);
    }

    #[test]
    fn full_walkthrough_scores_progress() {
        let mut session = session();
        session.select_language(Language::English).unwrap();
        session.screen_ended();
        assert_eq!(session.popup().header(), "Well done");
        assert!(session.snapshot().next_visible);
        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.score().score(), 100);
        assert!(session.previous());
        assert_eq!(session.score().score(), 50);
    }

    #[test]
    fn deferred_work_is_dropped_when_screen_is_left() {
        let mut session = session();
        session.defer(Duration::from_secs(3), |navigator| navigator.screen_ended());
        session.next();
        assert_eq!(session.advance(Duration::from_secs(5)), 0);
        assert!(!session.snapshot().next_visible);
    }

    #[test]
    fn deferred_work_runs_on_live_screen() {
        let mut session = session();
        session.select_language(Language::English).unwrap();
        session.defer(Duration::from_secs(3), |navigator| navigator.screen_ended());
        assert_eq!(session.advance(Duration::from_secs(1)), 0);
        assert_eq!(session.advance(Duration::from_secs(2)), 1);
        assert_eq!(session.popup().header(), "Well done");
    }

    #[test]
    fn far_future_deferral_does_not_panic() {
        let mut session = session();
        session.advance(Duration::from_secs(1));
        session.defer(Duration::MAX, |navigator| navigator.screen_ended());
        assert_eq!(session.pending_tasks(), 1);
        assert_eq!(session.advance(Duration::from_secs(60)), 0);
        assert_eq!(session.advance(Duration::MAX), 1);
        assert!(session.snapshot().next_visible);
    }

    #[test]
    fn popup_body_follows_language_styling() {
        let mut session = session();
        let body_id = session.popup().body_id();
        session.select_language(Language::English).unwrap();
        let body = session.registry().get(body_id).unwrap();
        assert_eq!(body.text, "intro_text");
        assert_eq!(body.direction, TextDirection::LeftToRight);
        assert_eq!(body.font, FontFace::Standard);

        session.select_language(Language::Arabic).unwrap();
        let body = session.registry().get(body_id).unwrap();
        assert_eq!(body.text, "intro_text");
        assert!(body.direction.is_right_to_left());
        assert_eq!(body.font, FontFace::Arabic);
    }

    #[test]
    fn discovered_text_follows_active_screen() {
        let mut session = session();
        let title = session
            .registry()
            .discover(Some("quiz"), "quiz_title", "Quiz");
        session.select_language(Language::English).unwrap();
        assert_eq!(session.registry().text(title).as_deref(), Some("Quiz"));
        session.next();
        assert_eq!(
            session.registry().text(title).as_deref(),
            Some("Quiz time")
        );
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut session = session();
        session.select_language(Language::English).unwrap();
        session.next();
        session.defer(Duration::from_secs(1), |navigator| navigator.screen_ended());
        session.reset();

        assert_eq!(session.pending_tasks(), 0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.index, 0);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.language, Language::Hebrew);
        assert_eq!(snapshot.popup_header, "ברוכים הבאים");
    }

    #[test]
    fn missing_language_keeps_session_usable() {
        let mut session = FlowSession::new(
            FlowDefinition::from_xml(FLOW).unwrap(),
            MemorySource::new(),
        );
        assert_eq!(session.popup().header(), "welcome");
        assert!(session.select_language(Language::English).is_err());
        assert_eq!(session.language(), Language::English);
        assert!(session.next());
    }
}
