use std::fmt::Display;

/// Where the session is in its check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Waiting for the debounce period to pass.
    Scheduled,
    Fetching,
    Reconciling,
}

impl Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Scheduled => write!(f, "scheduled"),
            SessionPhase::Fetching => write!(f, "fetching"),
            SessionPhase::Reconciling => write!(f, "reconciling"),
        }
    }
}
