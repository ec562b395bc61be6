//! Per-session state: the selected mode, the gate, and flash notices.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::Mode;

/// Severity of a flash notice rendered on the next page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }
}

/// State for one browser session. Created on first page load, mutated
/// by the mode radio and the gate, gone when the process exits.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The mode last selected in the sidebar. `None` until the first render.
    pub last_mode: Option<Mode>,
    /// Whether this session has passed the advanced-mode gate.
    pub advanced_unlocked: bool,
    /// Messages queued for the next render.
    pub notices: Vec<Notice>,
}

impl SessionState {
    /// The mode shown as selected in the sidebar control.
    pub fn selected_mode(&self) -> Mode {
        self.last_mode.unwrap_or(Mode::Basic)
    }

    /// The mode actually used for model loading and analysis. Advanced
    /// stays locked down to Basic until the gate has been passed, so
    /// the restricted model is never exposed early.
    pub fn active_mode(&self) -> Mode {
        match self.last_mode {
            Some(Mode::Advanced) if self.advanced_unlocked => Mode::Advanced,
            _ => Mode::Basic,
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Outcome of applying a mode selection to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// First render: the default was stored silently.
    First,
    /// Same mode selected again.
    Unchanged,
    /// A real transition; the caller must invalidate memoized handles.
    Changed { previous: Mode },
}

/// Applies a newly selected mode to the session state.
///
/// The first selection is not a "change": it stores the mode without
/// signalling invalidation. A real transition records the new mode and
/// closes the gate again.
pub fn apply_mode_selection(state: &mut SessionState, selected: Mode) -> ModeChange {
    match state.last_mode {
        None => {
            state.last_mode = Some(selected);
            ModeChange::First
        }
        Some(previous) if previous == selected => ModeChange::Unchanged,
        Some(previous) => {
            state.last_mode = Some(selected);
            state.advanced_unlocked = false;
            ModeChange::Changed { previous }
        }
    }
}

/// In-process session store keyed by the session cookie.
///
/// Lock scope is a single map operation; nothing is held across awaits.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the session, creating it on first sight.
    pub fn load(&self, id: Uuid) -> SessionState {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .entry(id)
            .or_default()
            .clone()
    }

    /// Mutates the session under the lock and returns the closure's result.
    pub fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.inner.lock().expect("session store lock poisoned");
        f(sessions.entry(id).or_default())
    }

    /// Drains queued notices for rendering.
    pub fn take_notices(&self, id: Uuid) -> Vec<Notice> {
        self.update(id, |state| std::mem::take(&mut state.notices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_selection_is_not_a_change() {
        let mut state = SessionState::default();
        assert_eq!(apply_mode_selection(&mut state, Mode::Basic), ModeChange::First);
        assert_eq!(state.last_mode, Some(Mode::Basic));
    }

    #[test]
    fn test_reselecting_same_mode_is_unchanged() {
        let mut state = SessionState::default();
        apply_mode_selection(&mut state, Mode::Basic);
        assert_eq!(
            apply_mode_selection(&mut state, Mode::Basic),
            ModeChange::Unchanged
        );
    }

    #[test]
    fn test_transition_reports_previous_mode_and_locks_gate() {
        let mut state = SessionState::default();
        apply_mode_selection(&mut state, Mode::Advanced);
        state.advanced_unlocked = true;

        let change = apply_mode_selection(&mut state, Mode::Basic);
        assert_eq!(change, ModeChange::Changed { previous: Mode::Advanced });
        assert!(!state.advanced_unlocked);
    }

    #[test]
    fn test_locked_advanced_resolves_to_basic() {
        let mut state = SessionState::default();
        apply_mode_selection(&mut state, Mode::Advanced);
        assert_eq!(state.selected_mode(), Mode::Advanced);
        assert_eq!(state.active_mode(), Mode::Basic);

        state.advanced_unlocked = true;
        assert_eq!(state.active_mode(), Mode::Advanced);
    }

    #[test]
    fn test_store_round_trip_and_notice_drain() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();

        store.update(id, |state| {
            state.last_mode = Some(Mode::Advanced);
            state.push_notice(Notice::warning("Switching to Basic mode."));
        });

        assert_eq!(store.load(id).last_mode, Some(Mode::Advanced));
        assert_eq!(store.take_notices(id).len(), 1);
        assert!(store.take_notices(id).is_empty());
    }
}
