//! Monitor state machine.
//!
//! # States
//! - Unresolved: no session, resolve before probing
//! - Active: session bound, consecutive failures below threshold
//! - Degraded: threshold reached, session released, re-resolve next cycle
//! - ShuttingDown: terminal, entered only on cancellation
//!
//! # State Transitions
//! ```text
//! Unresolved --resolve ok-->   Active
//! Unresolved --resolve err-->  Unresolved (after backoff)
//! Active     --probe ok-->     Active (failures reset)
//! Active     --probe err-->    Active | Degraded (failures >= threshold)
//! Degraded   --next cycle-->   resolve, as Unresolved
//! any        --shutdown-->     ShuttingDown
//! ```

use crate::discovery::Endpoint;

/// State owned exclusively by the monitor loop.
#[derive(Debug)]
pub enum MonitorState<S> {
    Unresolved,
    Active {
        endpoint: Endpoint,
        session: S,
        consecutive_failures: u32,
    },
    Degraded {
        endpoint: Endpoint,
        consecutive_failures: u32,
    },
    ShuttingDown,
}

/// Session-free view of the state, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unresolved,
    Active,
    Degraded,
    ShuttingDown,
}

impl<S> MonitorState<S> {
    pub fn phase(&self) -> Phase {
        match self {
            MonitorState::Unresolved => Phase::Unresolved,
            MonitorState::Active { .. } => Phase::Active,
            MonitorState::Degraded { .. } => Phase::Degraded,
            MonitorState::ShuttingDown => Phase::ShuttingDown,
        }
    }

    /// Whether the next cycle must go through discovery first.
    pub fn needs_resolution(&self) -> bool {
        matches!(self, MonitorState::Unresolved | MonitorState::Degraded { .. })
    }

    pub fn consecutive_failures(&self) -> u32 {
        match self {
            MonitorState::Active {
                consecutive_failures,
                ..
            }
            | MonitorState::Degraded {
                consecutive_failures,
                ..
            } => *consecutive_failures,
            _ => 0,
        }
    }

    /// Release the session, keeping the endpoint and failure count.
    pub fn degrade(self) -> Self {
        match self {
            MonitorState::Active {
                endpoint,
                consecutive_failures,
                ..
            } => MonitorState::Degraded {
                endpoint,
                consecutive_failures,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Unresolved => "UNRESOLVED",
            Phase::Active => "ACTIVE",
            Phase::Degraded => "DEGRADED",
            Phase::ShuttingDown => "SHUTTING_DOWN",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_releases_session() {
        let state = MonitorState::Active {
            endpoint: Endpoint::new("10.0.0.1", 6379),
            session: "session",
            consecutive_failures: 3,
        };
        assert!(!state.needs_resolution());

        let state = state.degrade();
        assert_eq!(state.phase(), Phase::Degraded);
        assert!(state.needs_resolution());
        assert!(matches!(
            state,
            MonitorState::Degraded { ref endpoint, .. } if *endpoint == Endpoint::new("10.0.0.1", 6379)
        ));
    }

    #[test]
    fn test_unresolved_needs_resolution() {
        let state: MonitorState<()> = MonitorState::Unresolved;
        assert!(state.needs_resolution());
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(state.phase().to_string(), "UNRESOLVED");
    }
}
