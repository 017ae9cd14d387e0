use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

/// Owner side of a liveness flag. Each activation hands out tokens that die
/// as soon as the owner deactivates, even if it later activates again.
#[derive(Debug, Default)]
pub struct Liveness {
    current: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh activation. Tokens from earlier activations stay dead.
    pub fn activate(&mut self) {
        self.current.store(false, Ordering::Release);
        self.current = Arc::new(AtomicBool::new(true));
    }

    pub fn deactivate(&self) {
        self.current.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.current.load(Ordering::Acquire)
    }

    pub fn token(&self) -> LivenessToken {
        LivenessToken {
            alive: Arc::clone(&self.current),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LivenessToken {
    alive: Arc<AtomicBool>,
}

impl LivenessToken {
    /// Token that never dies.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

type Continuation<T> = Box<dyn FnOnce(&mut T) + Send>;

struct Task<T> {
    id: TaskId,
    due: Duration,
    token: LivenessToken,
    run: Continuation<T>,
}

/// Timer queue of deferred continuations driven by a virtual clock.
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    queue: VecDeque<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: VecDeque::new(),
        }
    }
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues `run` to execute once the clock has moved `delay` past now.
    pub fn schedule<F>(&mut self, delay: Duration, token: LivenessToken, run: F) -> TaskId
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        // Keep the queue sorted by due time; equal times stay in schedule order.
        let position = self.queue.partition_point(|task| task.due <= due);
        self.queue.insert(
            position,
            Task {
                id,
                due,
                token,
                run: Box::new(run),
            },
        );
        id
    }

    /// Moves the clock forward and runs every continuation that became due.
    /// Continuations whose token died are dropped. Work scheduled while
    /// running waits for the next call. Returns how many continuations ran.
    pub fn advance(&mut self, elapsed: Duration, target: &mut T) -> usize {
        self.now = self.now.saturating_add(elapsed);
        let ready = self.queue.partition_point(|task| task.due <= self.now);
        let batch: Vec<Task<T>> = self.queue.drain(..ready).collect();

        let mut ran = 0;
        for task in batch {
            if !task.token.is_alive() {
                debug!("Dropping task {:?}: owner is no longer active", task.id);
                continue;
            }
            (task.run)(target);
            ran += 1;
        }
        ran
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_due_order() {
        let mut scheduler: Scheduler<Vec<&'static str>> = Scheduler::new();
        let token = LivenessToken::detached();
        scheduler.schedule(Duration::from_secs(3), token.clone(), |log| log.push("late"));
        scheduler.schedule(Duration::from_secs(1), token.clone(), |log| log.push("early"));
        scheduler.schedule(Duration::from_secs(1), token, |log| log.push("early-2"));

        let mut log = Vec::new();
        assert_eq!(scheduler.advance(Duration::from_secs(2), &mut log), 2);
        assert_eq!(log, vec!["early", "early-2"]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::from_secs(1), &mut log), 1);
        assert_eq!(log, vec!["early", "early-2", "late"]);
    }

    #[test]
    fn dead_tokens_are_skipped() {
        let mut liveness = Liveness::new();
        liveness.activate();
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule(Duration::from_secs(1), liveness.token(), |n| *n += 1);
        liveness.deactivate();

        let mut counter = 0;
        assert_eq!(scheduler.advance(Duration::from_secs(5), &mut counter), 0);
        assert_eq!(counter, 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn reactivation_does_not_revive_old_tokens() {
        let mut liveness = Liveness::new();
        liveness.activate();
        let old = liveness.token();
        liveness.deactivate();
        liveness.activate();
        assert!(!old.is_alive());
        assert!(liveness.token().is_alive());
    }

    #[test]
    fn huge_delays_saturate_instead_of_overflowing() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        let mut counter = 0;
        scheduler.advance(Duration::from_secs(1), &mut counter);
        scheduler.schedule(Duration::MAX, LivenessToken::detached(), |n| *n += 1);
        scheduler.schedule(Duration::from_secs(1), LivenessToken::detached(), |n| *n += 10);

        assert_eq!(scheduler.advance(Duration::MAX, &mut counter), 2);
        assert_eq!(scheduler.now(), Duration::MAX);
        assert_eq!(counter, 11);

        scheduler.schedule(Duration::MAX, LivenessToken::detached(), |n| *n += 100);
        assert_eq!(scheduler.advance(Duration::MAX, &mut counter), 1);
        assert_eq!(counter, 111);
    }

    #[test]
    fn inactive_owner_hands_out_dead_tokens() {
        let liveness = Liveness::new();
        assert!(!liveness.is_active());
        assert!(!liveness.token().is_alive());
    }
}
