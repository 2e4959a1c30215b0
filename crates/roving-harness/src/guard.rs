#![forbid(unsafe_code)]

//! Re-entrance guard for program-driven focus changes.
//!
//! Applying a `Focus` command moves host focus, and the host reports that
//! move back as a focus event. Without a guard the echo would be sensed as a
//! fresh user action and dispatched again. The guard tracks dispatch depth
//! and a causality id per dispatch, so nested dispatches each keep their own
//! cause and an echo can be attributed to the dispatch that produced it.

/// Identifies one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CauseId(pub u64);

/// Where an observed focus change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOrigin {
    /// Produced by the dispatch with this cause.
    SelfInflicted(CauseId),
    /// Nothing is dispatching; the user (or the host) moved focus.
    External,
}

/// Depth counter plus a stack of causality ids.
#[derive(Debug, Clone, Default)]
pub struct ReentryGuard {
    causes: Vec<CauseId>,
    next: u64,
    echoes_suppressed: u64,
}

impl ReentryGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a dispatch.
    pub fn enter(&mut self) -> CauseId {
        self.next += 1;
        let cause = CauseId(self.next);
        self.causes.push(cause);
        cause
    }

    /// End the dispatch started by `cause`.
    ///
    /// Exits are expected in LIFO order; an out-of-order exit also unwinds
    /// every dispatch nested inside `cause`.
    pub fn exit(&mut self, cause: CauseId) {
        if let Some(pos) = self.causes.iter().rposition(|c| *c == cause) {
            self.causes.truncate(pos);
        } else {
            tracing::warn!(cause = cause.0, "exit for unknown dispatch");
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.causes.len()
    }

    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        !self.causes.is_empty()
    }

    /// Innermost running dispatch.
    #[must_use]
    pub fn current(&self) -> Option<CauseId> {
        self.causes.last().copied()
    }

    /// Classify a focus change reported by the host.
    pub fn classify(&mut self) -> FocusOrigin {
        match self.current() {
            Some(cause) => {
                self.echoes_suppressed += 1;
                FocusOrigin::SelfInflicted(cause)
            }
            None => FocusOrigin::External,
        }
    }

    /// Number of focus echoes classified as self-inflicted so far.
    #[must_use]
    pub fn echoes_suppressed(&self) -> u64 {
        self.echoes_suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_guard_reports_external() {
        let mut guard = ReentryGuard::new();
        assert_eq!(guard.classify(), FocusOrigin::External);
        assert_eq!(guard.echoes_suppressed(), 0);
    }

    #[test]
    fn nested_dispatch_keeps_its_own_cause() {
        let mut guard = ReentryGuard::new();
        let outer = guard.enter();
        let inner = guard.enter();
        assert_eq!(guard.depth(), 2);
        assert_eq!(guard.classify(), FocusOrigin::SelfInflicted(inner));

        guard.exit(inner);
        assert_eq!(guard.classify(), FocusOrigin::SelfInflicted(outer));

        guard.exit(outer);
        assert!(!guard.is_dispatching());
        assert_eq!(guard.classify(), FocusOrigin::External);
        assert_eq!(guard.echoes_suppressed(), 2);
    }

    #[test]
    fn out_of_order_exit_unwinds_nested() {
        let mut guard = ReentryGuard::new();
        let outer = guard.enter();
        let _inner = guard.enter();
        guard.exit(outer);
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn causes_are_unique() {
        let mut guard = ReentryGuard::new();
        let a = guard.enter();
        guard.exit(a);
        let b = guard.enter();
        assert_ne!(a, b);
    }
}
