pub mod activator;
pub mod agent;
pub mod builtin;
pub mod context;
pub mod error;
pub mod execution;
mod interaction;
pub mod kernel;
pub mod lifecycle;
pub mod mailbox;
pub mod prototype;
pub mod registry;
pub mod traits;
pub mod types;

pub use activator::Activator;
pub use agent::Agent;
pub use context::AgentContext;
pub use error::{AgentError, Result};
pub use execution::ExecutionResource;
pub use kernel::{Kernel, KernelBuilder};
pub use mailbox::Mailbox;
pub use prototype::{ActivationPrototype, ParamKind};
pub use registry::KernelRegistry;
pub use traits::{
    Activable, AgentLifeStateListener, DistantKernelHandler, Idle, KernelListener,
    ReceiverSelectionPolicy,
};
pub use types::{InitArgs, KernelEvent, KernelEventKind, LaunchOptions};

pub use holon_core::{
    AgentAddress, KernelConfig, LifeState, Message, MultipleStatus, Severity, Status, StatusCode,
};

pub mod prelude {
    pub use crate::builtin::{HeartbeatAgent, RelayAgent};
    pub use crate::context::AgentContext;
    pub use crate::error::AgentError;
    pub use crate::kernel::Kernel;
    pub use crate::traits::{Activable, KernelListener};
    pub use crate::types::LaunchOptions;
    pub use crate::Agent;
    pub use holon_core::{AgentAddress, KernelConfig, LifeState, Message, Status};
}
