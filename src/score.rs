use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

/// Receives progress changes from the navigator.
pub trait ScoreSink: Send + Sync {
    fn report(&self, delta: i32);
    fn show_progress(&self, visible: bool);
}

impl<T> ScoreSink for Arc<T>
where
    T: ScoreSink + ?Sized,
{
    fn report(&self, delta: i32) {
        (**self).report(delta)
    }

    fn show_progress(&self, visible: bool) {
        (**self).show_progress(visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScoreState {
    completed: u32,
    score: u32,
    progress_visible: bool,
}

impl ScoreState {
    const INITIAL: Self = Self {
        completed: 0,
        score: 0,
        progress_visible: true,
    };
}

/// Tracks how many screens past the first one the player reached.
#[derive(Debug)]
pub struct ScoreBoard {
    max: u32,
    state: RwLock<ScoreState>,
}

impl ScoreBoard {
    /// Creates a board for a flow of `screen_count` screens.
    pub fn new(screen_count: usize) -> Self {
        let max = u32::try_from(screen_count.saturating_sub(1)).unwrap_or(u32::MAX);
        Self {
            max,
            state: RwLock::new(ScoreState::INITIAL),
        }
    }

    /// Completed screens, in `[0, screen_count - 1]`.
    pub fn completed(&self) -> u32 {
        self.state.read().completed
    }

    /// Integer percentage of completed screens.
    pub fn score(&self) -> u32 {
        self.state.read().score
    }

    /// Fill fraction for a progress bar, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.completed() as f32 / self.max as f32
    }

    /// Whether the current screen shows the progress bar.
    pub fn progress_visible(&self) -> bool {
        self.state.read().progress_visible
    }

    /// Score line shown with the progress bar, e.g. `Score: 50`.
    pub fn label(&self) -> String {
        format!("Score: {}", self.score())
    }

    /// Clears progress back to the first screen.
    pub fn reset(&self) {
        *self.state.write() = ScoreState::INITIAL;
    }
}

impl ScoreSink for ScoreBoard {
    fn report(&self, delta: i32) {
        let mut state = self.state.write();
        let completed = i64::from(state.completed) + i64::from(delta);
        state.completed = completed.clamp(0, i64::from(self.max)) as u32;
        state.score = if self.max == 0 {
            0
        } else {
            state.completed * 100 / self.max
        };
        debug!(
            "Progress {}/{} (score {})",
            state.completed, self.max, state.score
        );
    }

    fn show_progress(&self, visible: bool) {
        self.state.write().progress_visible = visible;
    }
}
