use std::sync::Arc;

use holon_core::{AgentAddress, Timestamp};
use serde_json::Value;

use crate::activator::Activator;

/// Positional arguments handed to `activate`.
pub type InitArgs = Vec<Value>;

/// Optional settings of a launch.
#[derive(Clone, Default)]
pub struct LaunchOptions {
    pub name: Option<String>,
    /// Activator of a light agent. Defaults to the kernel's own.
    pub activator: Option<Arc<Activator>>,
    pub args: Option<InitArgs>,
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_activator(mut self, activator: Arc<Activator>) -> Self {
        self.activator = Some(activator);
        self
    }

    pub fn with_args(mut self, args: InitArgs) -> Self {
        self.args = Some(args);
        self
    }
}

impl std::fmt::Debug for LaunchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchOptions")
            .field("name", &self.name)
            .field("activator", &self.activator.is_some())
            .field("args", &self.args)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelEventKind {
    Launched,
    Killed,
}

/// Notification published to kernel listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelEvent {
    pub kind: KernelEventKind,
    pub agent: AgentAddress,
    pub name: Option<String>,
    pub heavy: bool,
    pub timestamp: Timestamp,
}

impl KernelEvent {
    pub fn new(kind: KernelEventKind, agent: AgentAddress) -> Self {
        Self {
            kind,
            agent,
            name: None,
            heavy: false,
            timestamp: Timestamp::now(),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_heavy(mut self, heavy: bool) -> Self {
        self.heavy = heavy;
        self
    }
}
