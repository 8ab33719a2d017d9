//! Session lifecycle state machine

/// Lifecycle state of an emulation session.
///
/// Exactly one authoritative instance exists per session, owned by the
/// session manager. `Closed` is terminal: only constructing a fresh
/// session leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No native core exists yet.
    Uninitialized,
    /// The native core is up, nothing is loaded.
    Initialized,
    /// An application has been loaded and is ready to run.
    Loaded,
    /// Worker activities are driving the session.
    Running,
    /// Close was requested; teardown is in progress.
    Stopping,
    /// The native core has been released.
    Closed,
}

impl SessionState {
    /// Whether a load operation may be attempted in this state.
    pub fn can_load(self) -> bool {
        matches!(self, Self::Initialized | Self::Loaded)
    }

    /// Whether the session still holds live native resources.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Initialized | Self::Loaded | Self::Running | Self::Stopping
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Loaded => write!(f, "loaded"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_load() {
        assert!(!SessionState::Uninitialized.can_load());
        assert!(SessionState::Initialized.can_load());
        assert!(SessionState::Loaded.can_load());
        assert!(!SessionState::Running.can_load());
        assert!(!SessionState::Stopping.can_load());
        assert!(!SessionState::Closed.can_load());
    }

    #[test]
    fn test_is_active() {
        assert!(!SessionState::Uninitialized.is_active());
        assert!(SessionState::Initialized.is_active());
        assert!(SessionState::Stopping.is_active());
        assert!(!SessionState::Closed.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SessionState::Running), "running");
        assert_eq!(format!("{}", SessionState::Closed), "closed");
    }
}
