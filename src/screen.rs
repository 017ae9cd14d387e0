use anyhow::{anyhow, bail, Context, Result};
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::navigator::FlowContext;
use crate::scheduler::{Liveness, LivenessToken};

/// Popup state a screen shows when it begins or ends.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenProperties {
    pub show_popup: bool,
    pub header_text: String,
    pub body_text: String,
}

impl ScreenProperties {
    pub fn new(show_popup: bool, header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            show_popup,
            header_text: header.into(),
            body_text: body.into(),
        }
    }

    fn from_node(node: Option<Node<'_, '_>>) -> Result<Self> {
        let Some(node) = node else {
            return Ok(Self::default());
        };
        Ok(Self {
            show_popup: parse_bool(node.attribute("popup"), false)?,
            header_text: child_text(&node, "header").unwrap_or_default(),
            body_text: child_text(&node, "body").unwrap_or_default(),
        })
    }
}

/// A button owned by a screen, such as "Next" or "Info".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    /// Visibility applied when the screen begins.
    pub show_on_begin: bool,
    visible: bool,
}

impl Affordance {
    pub fn new(show_on_begin: bool) -> Self {
        Self {
            show_on_begin,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// One step of the flow.
#[derive(Debug)]
pub struct Screen {
    pub name: String,
    pub begin: ScreenProperties,
    pub end: ScreenProperties,
    pub next_button: Option<Affordance>,
    pub info_button: Option<Affordance>,
    pub progress_bar: bool,
    liveness: Liveness,
}

impl Screen {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            begin: ScreenProperties::default(),
            end: ScreenProperties::default(),
            next_button: Some(Affordance::new(false)),
            info_button: Some(Affordance::new(true)),
            progress_bar: true,
            liveness: Liveness::new(),
        }
    }

    /// Sets the popup state shown when the screen begins.
    pub fn with_begin(mut self, begin: ScreenProperties) -> Self {
        self.begin = begin;
        self
    }

    /// Sets the popup state shown when the screen ends.
    pub fn with_end(mut self, end: ScreenProperties) -> Self {
        self.end = end;
        self
    }

    /// Sets the Next button, or `None` for a screen without one.
    pub fn with_next_button(mut self, button: Option<Affordance>) -> Self {
        self.next_button = button;
        self
    }

    /// Sets the Info button, or `None` for a screen without one.
    pub fn with_info_button(mut self, button: Option<Affordance>) -> Self {
        self.info_button = button;
        self
    }

    /// Whether the progress bar shows on this screen.
    pub fn with_progress_bar(mut self, visible: bool) -> Self {
        self.progress_bar = visible;
        self
    }

    /// Parses a `<screen>` element of the flow description.
    pub fn from_node(node: &Node<'_, '_>) -> Result<Self> {
        let name = node
            .attribute("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow!("<screen> is missing a name attribute"))?;
        let begin = ScreenProperties::from_node(child(node, "begin"))
            .with_context(|| format!("invalid <begin> in screen {name}"))?;
        let end = ScreenProperties::from_node(child(node, "end"))
            .with_context(|| format!("invalid <end> in screen {name}"))?;
        Ok(Self::new(name)
            .with_begin(begin)
            .with_end(end)
            .with_next_button(parse_affordance(node.attribute("next-button"), false)?)
            .with_info_button(parse_affordance(node.attribute("info-button"), true)?)
            .with_progress_bar(parse_bool(node.attribute("progress-bar"), true)?))
    }

    /// Returns `true` between activation and deactivation.
    pub fn is_active(&self) -> bool {
        self.liveness.is_active()
    }

    /// Token that stays alive until this activation of the screen ends.
    pub fn liveness_token(&self) -> LivenessToken {
        self.liveness.token()
    }

    /// Whether the Next button is currently shown.
    pub fn next_visible(&self) -> bool {
        self.next_button.is_some_and(|button| button.is_visible())
    }

    /// Whether the Info button is currently shown.
    pub fn info_visible(&self) -> bool {
        self.info_button.is_some_and(|button| button.is_visible())
    }

    pub(crate) fn activate(&mut self, context: &FlowContext) {
        self.liveness.activate();
        if let Some(button) = self.next_button.as_mut() {
            button.set_visible(button.show_on_begin);
        }
        if let Some(button) = self.info_button.as_mut() {
            button.set_visible(button.show_on_begin);
        }
        context
            .popup
            .set_texts(&self.begin.header_text, &self.begin.body_text);
        context.popup.toggle(self.begin.show_popup);
        context.score.show_progress(self.progress_bar);
        context.localizer.registry().set_active_view(Some(self.name.as_str()));
        context.localizer.retranslate_all();
    }

    /// Shows the end state and unlocks the Next button.
    pub(crate) fn finish(&mut self, context: &FlowContext) {
        context
            .popup
            .set_texts(&self.end.header_text, &self.end.body_text);
        context.popup.toggle(self.end.show_popup);
        if let Some(button) = self.next_button.as_mut() {
            button.set_visible(true);
        }
        context.localizer.retranslate_all();
    }

    pub(crate) fn deactivate(&mut self) {
        self.liveness.deactivate();
        for button in [self.next_button.as_mut(), self.info_button.as_mut()]
            .into_iter()
            .flatten()
        {
            button.set_visible(false);
        }
    }
}

/// Ordered, fixed list of screens.
#[derive(Debug)]
pub struct ScreenSequence {
    screens: Vec<Screen>,
}

impl ScreenSequence {
    /// Builds the sequence, rejecting an empty list.
    pub fn new(screens: Vec<Screen>) -> Result<Self> {
        if screens.is_empty() {
            bail!("a flow needs at least one screen");
        }
        Ok(Self { screens })
    }

    /// Number of screens.
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// Always `false` for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Screen at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Screen> {
        self.screens.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Screen> {
        self.screens.get_mut(index)
    }

    /// Screens in flow order.
    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.screens.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Screen> {
        self.screens.iter_mut()
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn child_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .map(|text| text.to_string())
}

pub(crate) fn parse_bool(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(str::trim) {
        None => Ok(default),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some("false") | Some("no") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("expected a boolean, found {other:?}")),
    }
}

fn parse_affordance(value: Option<&str>, default: bool) -> Result<Option<Affordance>> {
    if value.map(str::trim) == Some("none") {
        return Ok(None);
    }
    parse_bool(value, default).map(|show| Some(Affordance::new(show)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse_screen(xml: &str) -> Result<Screen> {
        let document = Document::parse(xml).unwrap();
        Screen::from_node(&document.root_element())
    }

    #[test]
    fn parses_screen_attributes_and_properties() {
        let screen = parse_screen(
            r#"<screen name="quiz" next-button="true" info-button="none" progress-bar="false">
                <begin popup="true"><header>quiz_header</header><body> quiz_body </body></begin>
                <end><header>done</header></end>
            </screen>"#,
        )
        .unwrap();
        assert_eq!(screen.name, "quiz");
        assert_eq!(screen.begin, ScreenProperties::new(true, "quiz_header", "quiz_body"));
        assert_eq!(screen.end, ScreenProperties::new(false, "done", ""));
        assert_eq!(screen.next_button, Some(Affordance::new(true)));
        assert_eq!(screen.info_button, None);
        assert!(!screen.progress_bar);
    }

    #[test]
    fn defaults_apply_when_attributes_are_missing() {
        let screen = parse_screen(r#"<screen name="intro"/>"#).unwrap();
        assert_eq!(screen.next_button, Some(Affordance::new(false)));
        assert_eq!(screen.info_button, Some(Affordance::new(true)));
        assert!(screen.progress_bar);
        assert_eq!(screen.begin, ScreenProperties::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_screen(r#"<screen/>"#).is_err());
        assert!(parse_screen(r#"<screen name="a" progress-bar="maybe"/>"#).is_err());
        assert!(parse_screen(r#"<screen name="a"><begin popup="2"/></screen>"#).is_err());
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(ScreenSequence::new(Vec::new()).is_err());
        let sequence = ScreenSequence::new(vec![Screen::new("only")]).unwrap();
        assert_eq!(sequence.len(), 1);
    }
}
