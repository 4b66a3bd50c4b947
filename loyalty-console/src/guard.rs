//! Unsaved-changes guard
//!
//! Compares a live collection against the snapshot taken at the last save
//! and decides whether leaving the page may proceed. The host shell wires
//! the decision to its own navigation primitives through [`NavigationPort`].

use std::future::Future;

/// Text offered to the native "leave page?" dialog
pub const UNLOAD_MESSAGE: &str = "You have unsaved changes. Are you sure you want to leave?";

/// Result of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Navigate now
    Proceed,
    /// Show the save / discard prompt first
    Prompt,
}

/// Host navigation primitives
pub trait NavigationPort {
    /// Perform the navigation
    fn navigate(&mut self, target: &str);

    /// Show the in-app save / discard modal
    fn prompt_leave(&mut self, target: &str);
}

/// Snapshot-based dirty tracking
///
/// The snapshot is only replaced by [`ChangeGuard::mark_saved`] (or a save
/// through the guard) and only read back by a discard.
#[derive(Debug, Clone)]
pub struct ChangeGuard<T> {
    snapshot: T,
    pending_target: Option<String>,
    navigating: bool,
}

impl<T: Clone + PartialEq> ChangeGuard<T> {
    pub fn new(snapshot: T) -> Self {
        Self {
            snapshot,
            pending_target: None,
            navigating: false,
        }
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Order-sensitive deep comparison
    pub fn is_dirty(&self, live: &T) -> bool {
        *live != self.snapshot
    }

    /// Live value was just persisted
    pub fn mark_saved(&mut self, live: &T) {
        self.snapshot = live.clone();
    }

    /// Fresh data from the backend; nothing is pending any more
    pub fn reset(&mut self, value: &T) {
        self.snapshot = value.clone();
        self.pending_target = None;
    }

    pub fn is_navigating(&self) -> bool {
        self.navigating
    }

    pub fn pending_target(&self) -> Option<&str> {
        self.pending_target.as_deref()
    }

    /// Attempt to leave for `target`
    ///
    /// A navigation already in progress is never interrupted by the guard.
    /// A clean leave proceeds without disarming it.
    pub fn request_leave(&mut self, live: &T, target: &str) -> LeaveDecision {
        if self.navigating || !self.is_dirty(live) {
            return LeaveDecision::Proceed;
        }
        self.pending_target = Some(target.to_string());
        LeaveDecision::Prompt
    }

    /// [`ChangeGuard::request_leave`] wired to a host port
    pub fn route(&mut self, live: &T, target: &str, port: &mut impl NavigationPort) -> LeaveDecision {
        let decision = self.request_leave(live, target);
        match decision {
            LeaveDecision::Proceed => port.navigate(target),
            LeaveDecision::Prompt => port.prompt_leave(target),
        }
        decision
    }

    /// Run `save`; on success adopt `live` as the snapshot and release the
    /// pending navigation target
    ///
    /// On failure the user stays on the page and the prompt may be retried.
    pub async fn save_then_leave<R, E, Fut>(
        &mut self,
        live: &T,
        save: Fut,
    ) -> Result<(R, Option<String>), E>
    where
        Fut: Future<Output = Result<R, E>>,
    {
        let saved = save.await?;
        self.snapshot = live.clone();
        let target = self.pending_target.take();
        if target.is_some() {
            self.navigating = true;
        }
        Ok((saved, target))
    }

    /// Revert `live` to the snapshot and release the pending target
    pub fn discard_then_leave(&mut self, live: &mut T) -> Option<String> {
        *live = self.snapshot.clone();
        let target = self.pending_target.take();
        if target.is_some() {
            self.navigating = true;
        }
        target
    }

    /// Close the prompt and stay
    pub fn cancel_leave(&mut self) {
        self.pending_target = None;
    }

    /// Native unload confirmation text when there is something to lose
    pub fn before_unload(&self, live: &T) -> Option<&'static str> {
        (!self.navigating && self.is_dirty(live)).then_some(UNLOAD_MESSAGE)
    }

    /// Navigation finished; the guard may fire again
    pub fn navigation_settled(&mut self) {
        self.navigating = false;
    }
}
