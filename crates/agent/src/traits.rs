use holon_core::{AgentAddress, LifeState, Message, Status};
use serde_json::Value;

use crate::context::AgentContext;
use crate::prototype::ActivationPrototype;
use crate::types::KernelEvent;

/// The three-stage life-cycle contract (`activate → live* → end`).
///
/// Besides the stages, an activable exposes the bookkeeping the kernel needs
/// to decide whether its agent has nothing left to do: `is_used` tells
/// whether it ever held work (a role, a duty), `has_activable` whether it
/// still holds some.
pub trait Activable: Send {
    /// Shape the activation arguments must have. `None` accepts anything.
    fn prototype(&self) -> Option<ActivationPrototype> {
        None
    }

    fn activate(&mut self, _ctx: &AgentContext<'_>, _args: &[Value]) -> Status {
        Status::ok()
    }

    fn live(&mut self, ctx: &AgentContext<'_>) -> Status;

    fn end(&mut self, _ctx: &AgentContext<'_>) -> Status {
        Status::ok()
    }

    /// Applies pending changes. Called before each stage.
    fn sync(&mut self) {}

    fn is_used(&self) -> bool {
        false
    }

    fn has_activable(&self) -> bool {
        false
    }

    fn leave_all_roles(&mut self) {}

    fn clear_capacity_calls(&mut self) {}
}

/// Behaviour that does nothing; used by the kernel agent by default.
#[derive(Debug, Default)]
pub struct Idle;

impl Activable for Idle {
    fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
        Status::ok()
    }
}

pub trait KernelListener: Send + Sync {
    fn agent_launched(&self, _event: &KernelEvent) {}

    fn agent_killed(&self, _event: &KernelEvent) {}

    fn kernel_agent_launched(&self, _kernel: AgentAddress) {}

    fn kernel_agent_killed(&self, _kernel: AgentAddress) {}

    /// A panic escaped an agent's execution thread.
    fn uncaught_panic(&self, _agent: AgentAddress, _message: &str) {}
}

pub trait AgentLifeStateListener: Send + Sync {
    fn state_changed(&self, agent: AgentAddress, state: LifeState);
}

impl<F> AgentLifeStateListener for F
where
    F: Fn(AgentAddress, LifeState) + Send + Sync,
{
    fn state_changed(&self, agent: AgentAddress, state: LifeState) {
        self(agent, state)
    }
}

/// Transport towards agents hosted by other kernels.
pub trait DistantKernelHandler: Send + Sync {
    /// Returns `false` when the message could not be handed over.
    fn send_message(&self, message: Message) -> bool;

    fn broadcast_message(&self, message: Message);
}

/// Chooses the receiver of a message among the locally known agents.
pub trait ReceiverSelectionPolicy: Send + Sync {
    fn select(&self, sender: AgentAddress, candidates: &[AgentAddress]) -> Option<AgentAddress>;
}

impl<F> ReceiverSelectionPolicy for F
where
    F: Fn(AgentAddress, &[AgentAddress]) -> Option<AgentAddress> + Send + Sync,
{
    fn select(&self, sender: AgentAddress, candidates: &[AgentAddress]) -> Option<AgentAddress> {
        self(sender, candidates)
    }
}
