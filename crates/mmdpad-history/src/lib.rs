//! Undo/redo history over a single editable value.
//!
//! The history keeps the value's snapshots in three parts: `past` (oldest
//! first), `present` and `future` (nearest first). Edits push onto `past` and
//! drop the redo branch; loads replace `present` without touching either stack.
//! Observers registered with [`History::subscribe`] hear about every change of
//! state, which lets a view redraw without polling.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

/// Default cap on the number of `past` snapshots
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Snapshot stacks around the present value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
}

impl<T> HistoryState<T> {
    fn new(present: T) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
        }
    }

    /// Snapshots older than `present`, oldest first
    pub fn past(&self) -> &VecDeque<T> {
        &self.past
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Undone snapshots, nearest first
    pub fn future(&self) -> &VecDeque<T> {
        &self.future
    }
}

/// How [`History::set_with`] treats the previous value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Record the previous value so it can be undone
    #[default]
    Record,
    /// Replace the present value only (document/template loads)
    SkipHistory,
}

/// Handle returned by [`History::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

/// Bounded linear undo/redo buffer
pub struct History<T> {
    state: HistoryState<T>,
    max_history: usize,
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_subscription: u64,
}

impl<T: Clone + PartialEq> History<T> {
    /// Create a history with the default cap
    pub fn new(initial: T) -> Self {
        Self::with_max_history(initial, DEFAULT_MAX_HISTORY)
    }

    /// Create a history keeping at most `max_history` past snapshots
    pub fn with_max_history(initial: T, max_history: usize) -> Self {
        Self {
            state: HistoryState::new(initial),
            max_history,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Record a new present value
    pub fn set(&mut self, value: T) {
        self.set_with(value, SetMode::Record);
    }

    /// Set the present value, optionally bypassing history
    pub fn set_with(&mut self, value: T, mode: SetMode) {
        match mode {
            SetMode::SkipHistory => {
                self.state.present = value;
                debug!("history: present replaced without recording");
            }
            SetMode::Record => {
                if value == self.state.present {
                    return;
                }
                let previous = std::mem::replace(&mut self.state.present, value);
                self.state.past.push_back(previous);
                self.trim_past();
                self.state.future.clear();
                debug!(past = self.state.past.len(), "history: recorded edit");
            }
        }
        self.notify();
    }

    /// Replace the present value and forget all history.
    ///
    /// Used after opening a document so undo cannot cross the load boundary.
    pub fn load(&mut self, value: T) {
        self.set_with(value, SetMode::SkipHistory);
        self.clear();
    }

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.state.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.state.present, previous);
        self.state.future.push_front(current);
        debug!(
            past = self.state.past.len(),
            future = self.state.future.len(),
            "history: undo"
        );
        self.notify();
        true
    }

    /// Step forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.state.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.state.present, next);
        self.state.past.push_back(current);
        self.trim_past();
        debug!(
            past = self.state.past.len(),
            future = self.state.future.len(),
            "history: redo"
        );
        self.notify();
        true
    }

    /// Drop past and future, keeping the present value
    pub fn clear(&mut self) {
        if self.state.past.is_empty() && self.state.future.is_empty() {
            return;
        }
        self.state.past.clear();
        self.state.future.clear();
        self.notify();
    }

    fn trim_past(&mut self) {
        while self.state.past.len() > self.max_history {
            self.state.past.pop_front();
        }
    }

    fn notify(&mut self) {
        let present = &self.state.present;
        for (_, observer) in self.observers.iter_mut() {
            observer(present);
        }
    }
}

impl<T> History<T> {
    pub fn present(&self) -> &T {
        &self.state.present
    }

    pub fn past(&self) -> &VecDeque<T> {
        &self.state.past
    }

    pub fn future(&self) -> &VecDeque<T> {
        &self.state.future
    }

    pub fn state(&self) -> &HistoryState<T> {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        !self.state.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.state.future.is_empty()
    }

    /// Number of snapshots held, counting the present one
    pub fn history_size(&self) -> usize {
        self.state.past.len() + 1 + self.state.future.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Register a callback that receives the present value after each change
    pub fn subscribe(&mut self, observer: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }
}

impl<T: Clone + PartialEq + Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("state", &self.state)
            .field("max_history", &self.max_history)
            .field("observers", &self.observers.len())
            .finish()
    }
}
