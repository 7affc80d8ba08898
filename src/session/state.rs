use std::fmt;

/// Lifecycle of a session.
///
/// `Uninitialized -> Open -> Closed`; `Closed` is terminal. A session that
/// failed to open never leaves `Uninitialized` and is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Open,
    Closed,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Uninitialized, SessionState::Open)
                | (SessionState::Open, SessionState::Closed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("uninitialized"),
            SessionState::Open => f.write_str("open"),
            SessionState::Closed => f.write_str("closed"),
        }
    }
}
