use std::sync::Arc;

use parking_lot::RwLock;

use crate::text::{ElementId, TextRegistry};

/// Overlay shared by every screen for header/body messages.
pub trait PopupSurface: Send + Sync {
    fn set_texts(&self, header: &str, body: &str);
    fn toggle(&self, visible: bool);
}

impl<T> PopupSurface for Arc<T>
where
    T: PopupSurface + ?Sized,
{
    fn set_texts(&self, header: &str, body: &str) {
        (**self).set_texts(header, body)
    }

    fn toggle(&self, visible: bool) {
        (**self).toggle(visible)
    }
}

/// Popup whose header and body are translatable registry elements.
#[derive(Debug)]
pub struct Popup {
    registry: TextRegistry,
    header: ElementId,
    body: ElementId,
    visible: RwLock<bool>,
}

impl Popup {
    pub fn new(registry: TextRegistry) -> Self {
        let header = registry.register("PopupHeader", "");
        let body = registry.register("PopupBody", "");
        Self {
            registry,
            header,
            body,
            visible: RwLock::new(false),
        }
    }

    /// Whether the popup is currently shown.
    pub fn is_visible(&self) -> bool {
        *self.visible.read()
    }

    /// Header as currently displayed.
    pub fn header(&self) -> String {
        self.registry.text(self.header).unwrap_or_default()
    }

    /// Body as currently displayed.
    pub fn body(&self) -> String {
        self.registry.text(self.body).unwrap_or_default()
    }

    /// Registry element holding the header text.
    pub fn header_id(&self) -> ElementId {
        self.header
    }

    /// Registry element holding the body text.
    pub fn body_id(&self) -> ElementId {
        self.body
    }
}

impl PopupSurface for Popup {
    fn set_texts(&self, header: &str, body: &str) {
        self.registry.set_text(self.header, header);
        self.registry.set_text(self.body, body);
    }

    fn toggle(&self, visible: bool) {
        *self.visible.write() = visible;
    }
}
