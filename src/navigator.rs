//! Linear screen flow.
//!
//! The navigator owns the screen sequence and the collaborators screens talk
//! to. Moving between screens deactivates the old one, moves the index and
//! activates the new one as a single step; requests that would leave the
//! sequence are ignored.

use std::sync::Arc;

use log::{debug, info};

use crate::localizer::Localizer;
use crate::popup::PopupSurface;
use crate::score::ScoreSink;
use crate::screen::{Screen, ScreenSequence};

/// Services a screen needs while it begins or ends.
pub struct FlowContext {
    pub localizer: Localizer,
    pub popup: Arc<dyn PopupSurface>,
    pub score: Arc<dyn ScoreSink>,
}

impl std::fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("localizer", &self.localizer)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Navigator {
    screens: ScreenSequence,
    context: FlowContext,
    current: usize,
}

impl Navigator {
    /// Deactivates every screen and activates the first one.
    pub fn new(screens: ScreenSequence, context: FlowContext) -> Self {
        let mut navigator = Self {
            screens,
            context,
            current: 0,
        };
        navigator.restart();
        navigator
    }

    /// Returns to the initial state: index 0 with only the first screen active.
    pub fn restart(&mut self) {
        for screen in self.screens.iter_mut() {
            screen.deactivate();
        }
        self.current = 0;
        self.activate_current();
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_screen(&self) -> &Screen {
        self.screens
            .get(self.current)
            .expect("current index is always within the sequence")
    }

    pub fn screens(&self) -> &ScreenSequence {
        &self.screens
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut FlowContext {
        &mut self.context
    }

    /// Advances one screen. Returns `false` on the last screen.
    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.screens.len() {
            debug!("Ignoring next on last screen {}", self.current);
            return false;
        }
        self.move_to(self.current + 1, 1);
        true
    }

    /// Goes back one screen. Returns `false` on the first screen.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            debug!("Ignoring previous on first screen");
            return false;
        }
        self.move_to(self.current - 1, -1);
        true
    }

    /// Completion signal from whatever runs inside the active screen.
    pub fn screen_ended(&mut self) {
        let Self {
            screens,
            context,
            current,
        } = self;
        if let Some(screen) = screens.get_mut(*current) {
            info!("Screen {} ended", screen.name);
            screen.finish(context);
        }
    }

    fn move_to(&mut self, target: usize, delta: i32) {
        if let Some(screen) = self.screens.get_mut(self.current) {
            screen.deactivate();
        }
        self.current = target;
        self.activate_current();
        self.context.score.report(delta);
    }

    fn activate_current(&mut self) {
        let Self {
            screens,
            context,
            current,
        } = self;
        if let Some(screen) = screens.get_mut(*current) {
            info!("Entering screen {} ({})", *current, screen.name);
            screen.activate(context);
        }
    }
}
