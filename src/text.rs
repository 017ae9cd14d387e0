use std::sync::Arc;

use parking_lot::RwLock;

use crate::language::{FontFace, TextDirection};

/// Handle to a text element stored in a [`TextRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// How an element takes part in the localization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementScope {
    /// Registered up front; translated using the text content code assigned.
    Explicit,
    /// Found inside a view; translated using its name. `None` means the
    /// element lives outside any screen and is always visible.
    Discovered { view: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    pub id: ElementId,
    pub name: String,
    /// Text as authored or last assigned by content code.
    pub source: String,
    /// Text currently on screen.
    pub text: String,
    pub direction: TextDirection,
    pub font: FontFace,
    pub scope: ElementScope,
}

impl TextElement {
    /// Key used against the translation table.
    pub fn lookup_key(&self) -> &str {
        match self.scope {
            ElementScope::Explicit => &self.source,
            ElementScope::Discovered { .. } => &self.name,
        }
    }

    fn in_view(&self, active_view: Option<&str>) -> bool {
        match &self.scope {
            ElementScope::Explicit => true,
            ElementScope::Discovered { view: None } => true,
            ElementScope::Discovered { view: Some(view) } => Some(view.as_str()) == active_view,
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    elements: Vec<TextElement>,
    active_view: Option<String>,
}

/// Shared store of every text element the flow can show.
#[derive(Debug, Default)]
pub struct TextRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl Clone for TextRegistry {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl TextRegistry {
    /// Creates an empty registry with no active view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an element keyed by its text.
    pub fn register(&self, name: impl Into<String>, text: impl Into<String>) -> ElementId {
        self.insert(name.into(), text.into(), ElementScope::Explicit)
    }

    /// Registers an element keyed by its name, visible while `view` is
    /// active (or always, for `None`).
    pub fn discover(
        &self,
        view: Option<&str>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> ElementId {
        let scope = ElementScope::Discovered {
            view: view.map(str::to_string),
        };
        self.insert(name.into(), text.into(), scope)
    }

    fn insert(&self, name: String, text: String, scope: ElementScope) -> ElementId {
        let mut state = self.state.write();
        let id = ElementId(state.elements.len());
        state.elements.push(TextElement {
            id,
            name,
            source: text.clone(),
            text,
            direction: TextDirection::default(),
            font: FontFace::default(),
            scope,
        });
        id
    }

    /// Assigns new content text. This becomes the element's lookup source.
    pub fn set_text(&self, id: ElementId, text: &str) -> bool {
        self.update(id, |element| {
            element.source = text.to_string();
            element.text = text.to_string();
        })
        .is_some()
    }

    /// Returns a copy of the element, if the id is known.
    pub fn get(&self, id: ElementId) -> Option<TextElement> {
        self.state.read().elements.get(id.0).cloned()
    }

    /// Text currently displayed by the element.
    pub fn text(&self, id: ElementId) -> Option<String> {
        self.state.read().elements.get(id.0).map(|e| e.text.clone())
    }

    /// Looks up the first element registered under `name`.
    pub fn find(&self, name: &str) -> Option<TextElement> {
        self.state
            .read()
            .elements
            .iter()
            .find(|element| element.name == name)
            .cloned()
    }

    /// Snapshot of every registered element, in registration order.
    pub fn all_elements(&self) -> Vec<TextElement> {
        self.state.read().elements.clone()
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.state.read().elements.len()
    }

    /// Returns `true` when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `updater` on the element under the write lock.
    pub fn update<F, R>(&self, id: ElementId, updater: F) -> Option<R>
    where
        F: FnOnce(&mut TextElement) -> R,
    {
        let mut state = self.state.write();
        let element = state.elements.get_mut(id.0)?;
        Some(updater(element))
    }

    /// Marks which view's discovered elements are visible.
    pub fn set_active_view(&self, view: Option<&str>) {
        self.state.write().active_view = view.map(str::to_string);
    }

    /// Name of the currently visible view, if any.
    pub fn active_view(&self) -> Option<String> {
        self.state.read().active_view.clone()
    }

    /// Calls `visit` on every element that is explicit or belongs to the
    /// active view. Returns how many elements were visited.
    pub fn for_each_visible<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&mut TextElement),
    {
        let mut state = self.state.write();
        let RegistryState {
            elements,
            active_view,
        } = &mut *state;
        let mut visited = 0;
        for element in elements
            .iter_mut()
            .filter(|element| element.in_view(active_view.as_deref()))
        {
            visit(element);
            visited += 1;
        }
        visited
    }
}
