// crates/harvest-daemon/src/state.rs
//
// Node state machine for the Harvest daemon.
//
// Valid transitions:
//   Initializing -> Restoring -> Ready
//   Any state -> ShuttingDown

use std::fmt;

/// Lifecycle states of the daemon node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Loading configuration and opening storage.
    Initializing,
    /// Restoring the snapshot or building genesis state.
    Restoring,
    /// Serving RPC requests.
    Ready,
    ShuttingDown,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Restoring => write!(f, "Restoring"),
            NodeState::Ready => write!(f, "Ready"),
            NodeState::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// State machine for managing node lifecycle transitions.
pub struct NodeStateMachine {
    pub current: NodeState,
}

impl NodeStateMachine {
    pub fn new() -> Self {
        Self {
            current: NodeState::Initializing,
        }
    }

    /// Attempt to transition to a new state.
    pub fn transition(&mut self, new_state: NodeState) -> Result<(), String> {
        let valid = matches!(
            (&self.current, &new_state),
            (_, NodeState::ShuttingDown)
                | (NodeState::Initializing, NodeState::Restoring)
                | (NodeState::Restoring, NodeState::Ready)
        );

        if valid {
            tracing::info!("State transition: {} -> {}", self.current, new_state);
            self.current = new_state;
            Ok(())
        } else {
            Err(format!(
                "Invalid state transition: {} -> {}",
                self.current, new_state
            ))
        }
    }
}

impl Default for NodeStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
