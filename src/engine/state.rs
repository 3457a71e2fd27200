//! Preview session state machine.

/// Lifecycle state of the preview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// No session is running. Initial state, re-entered only via `stop`.
    #[default]
    Stopped,
    /// A session is live and file changes are broadcast to clients.
    LiveEditing,
    /// A session is live but broadcasting is suspended.
    Paused,
}

impl PreviewState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Stopped -> LiveEditing (start)
    /// - LiveEditing -> Paused (pause)
    /// - Paused -> LiveEditing (resume)
    /// - LiveEditing -> Stopped (stop)
    /// - Paused -> Stopped (stop)
    ///
    /// There is no direct Stopped -> Paused transition.
    pub fn can_transition_to(&self, target: PreviewState) -> bool {
        use PreviewState::*;
        matches!(
            (*self, target),
            (Stopped, LiveEditing)
                | (LiveEditing, Paused)
                | (Paused, LiveEditing)
                | (LiveEditing, Stopped)
                | (Paused, Stopped)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: PreviewState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::PreviewError::InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check whether broadcasting is allowed in this state.
    ///
    /// Consulted at the moment of send, never at schedule time.
    pub fn may_broadcast(&self) -> bool {
        matches!(self, PreviewState::LiveEditing)
    }

    /// Check whether a session exists (live or paused).
    pub fn is_running(&self) -> bool {
        !matches!(self, PreviewState::Stopped)
    }

    /// Short label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            PreviewState::Stopped => "stopped",
            PreviewState::LiveEditing => "live editing",
            PreviewState::Paused => "paused",
        }
    }
}
