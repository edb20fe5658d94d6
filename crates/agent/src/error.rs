use thiserror::Error;

use holon_core::{AgentAddress, CoreError, Status, StatusCode};

/// Errors that can occur while building a kernel or activating an agent.
///
/// Life-cycle calls report through [`Status`]; these errors cover the
/// situations where no status can be produced yet, and convert into one
/// when they surface from inside a life-cycle call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Kernel thread pools could not be created
    #[error("Runtime build failed: {0}")]
    RuntimeBuild(#[from] std::io::Error),

    /// Kernel agent did not reach the alive state
    #[error("Kernel failed to start: {0}")]
    InitFailed(String),

    /// Activation arguments do not match the agent's prototype
    #[error("Invalid activation parameters: {0}")]
    InvalidParameters(String),

    /// Owning kernel is gone
    #[error("No reachable kernel")]
    NoKernel,

    /// Referenced agent does not exist in the repository
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentAddress),

    /// Killer is neither the target, its creator nor the kernel
    #[error("{killer} is not allowed to kill {target}")]
    KillForbidden {
        killer: AgentAddress,
        target: AgentAddress,
    },

    /// Agent panicked outside of a guarded life-cycle call
    #[error("Agent panicked: {0}")]
    AgentPanicked(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<AgentError> for Status {
    fn from(err: AgentError) -> Self {
        let status = match &err {
            AgentError::NoKernel => Status::fatal(StatusCode::NoKernel),
            AgentError::AgentNotFound(_) => Status::error(StatusCode::AgentNotFound),
            AgentError::KillForbidden { .. } => Status::error(StatusCode::KillForbidden),
            AgentError::InvalidParameters(_) => Status::error(StatusCode::InvalidParameters),
            AgentError::AgentPanicked(_) => {
                Status::new(holon_core::Severity::Failure, StatusCode::Panicked)
            }
            AgentError::RuntimeBuild(_) | AgentError::InitFailed(_) | AgentError::Core(_) => {
                Status::error(StatusCode::Rejected)
            }
        };
        status.with_message(err.to_string())
    }
}
