/// Task state definitions for tracking crawl progress
///
/// Every fetch task walks `Queued -> InFlight -> {Completed | Failed}` or is
/// dropped as `Queued -> Discarded`. Nothing leaves a terminal state.
use crate::CheckerError;
use std::fmt;

/// Represents the current state of a fetch task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the frontier
    Queued,

    /// Task has been dispatched and its fetch is running
    InFlight,

    // ===== Terminal States =====
    /// Transport returned a response (any status code)
    Completed,

    /// Transport failed before a response was obtained
    Failed,

    /// Target was already visited; the task was dropped without a fetch
    Discarded,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Discarded)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InFlight)
                | (Self::Queued, Self::Discarded)
                | (Self::InFlight, Self::Completed)
                | (Self::InFlight, Self::Failed)
        )
    }

    /// Validates and returns the next state
    ///
    /// # Errors
    ///
    /// `CheckerError::InvalidTransition` if the lifecycle forbids the move.
    pub fn transition(self, next: TaskState) -> Result<TaskState, CheckerError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CheckerError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Discarded => "discarded",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::InFlight,
            Self::Completed,
            Self::Failed,
            Self::Discarded,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::InFlight.is_terminal());

        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Discarded.is_terminal());
    }

    #[test]
    fn test_is_active() {
        assert!(TaskState::Queued.is_active());
        assert!(TaskState::InFlight.is_active());
        assert!(!TaskState::Completed.is_active());
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(TaskState::Queued.can_transition_to(TaskState::InFlight));
        assert!(TaskState::Queued.can_transition_to(TaskState::Discarded));
        assert!(TaskState::InFlight.can_transition_to(TaskState::Completed));
        assert!(TaskState::InFlight.can_transition_to(TaskState::Failed));
    }

    #[test]
    fn test_terminal_states_never_move() {
        for from in [TaskState::Completed, TaskState::Failed, TaskState::Discarded] {
            for to in TaskState::all_states() {
                assert!(!from.can_transition_to(to), "{} -> {} allowed", from, to);
            }
        }
    }

    #[test]
    fn test_forbidden_transitions() {
        assert!(!TaskState::Queued.can_transition_to(TaskState::Completed));
        assert!(!TaskState::Queued.can_transition_to(TaskState::Failed));
        assert!(!TaskState::InFlight.can_transition_to(TaskState::Discarded));
        assert!(!TaskState::InFlight.can_transition_to(TaskState::Queued));
    }

    #[test]
    fn test_transition_error() {
        let result = TaskState::Completed.transition(TaskState::InFlight);
        assert!(matches!(
            result,
            Err(CheckerError::InvalidTransition {
                from: TaskState::Completed,
                to: TaskState::InFlight
            })
        ));

        assert_eq!(
            TaskState::Queued.transition(TaskState::InFlight).unwrap(),
            TaskState::InFlight
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TaskState::Queued), "queued");
        assert_eq!(format!("{}", TaskState::InFlight), "in_flight");
        assert_eq!(format!("{}", TaskState::Discarded), "discarded");
    }
}
