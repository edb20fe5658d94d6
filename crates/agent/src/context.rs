use std::sync::Arc;
use std::time::Duration;

use holon_core::{AgentAddress, Message, Status, StatusCode};

use crate::agent::Agent;
use crate::kernel::Kernel;
use crate::mailbox::Mailbox;
use crate::traits::ReceiverSelectionPolicy;
use crate::types::LaunchOptions;

/// What a behaviour can reach during one of its stages.
pub struct AgentContext<'a> {
    agent: &'a Arc<Agent>,
}

impl<'a> AgentContext<'a> {
    pub(crate) fn new(agent: &'a Arc<Agent>) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &Arc<Agent> {
        self.agent
    }

    pub fn address(&self) -> AgentAddress {
        self.agent.address()
    }

    pub fn name(&self) -> Option<String> {
        self.agent.name()
    }

    /// The owning kernel, unless it is gone.
    pub fn kernel(&self) -> Option<Kernel> {
        self.agent.kernel().map(Kernel::from_inner)
    }

    pub fn mailbox(&self) -> &Mailbox {
        self.agent.mailbox()
    }

    pub fn take_message(&self) -> Option<Message> {
        self.agent.take_message()
    }

    pub fn send(&self, message: Message, receivers: &[AgentAddress]) -> Option<AgentAddress> {
        self.agent.send_message(message, receivers)
    }

    pub fn send_with_policy(
        &self,
        message: Message,
        policy: &dyn ReceiverSelectionPolicy,
    ) -> Option<AgentAddress> {
        self.agent.send_message_with_policy(message, policy)
    }

    pub fn broadcast(&self, message: Message, receivers: &[AgentAddress]) {
        self.agent.broadcast_message(message, receivers)
    }

    pub fn forward(&self, message: Message, receivers: &[AgentAddress]) -> Option<AgentAddress> {
        self.agent.forward_message(message, receivers)
    }

    pub fn forward_broadcast(&self, message: Message, receivers: &[AgentAddress]) {
        self.agent.forward_broadcast_message(message, receivers)
    }

    pub fn reply(&self, original: &Message, reply: Message) -> Option<AgentAddress> {
        self.agent.reply_to(original, reply)
    }

    /// Launches a light agent created by this one.
    pub fn launch_light_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        match self.agent.kernel() {
            Some(kernel) => kernel.launch_light(&agent, self.address(), options, false),
            None => no_kernel(self.agent),
        }
    }

    /// Launches a heavy agent created by this one.
    pub fn launch_heavy_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        match self.agent.kernel() {
            Some(kernel) => kernel.launch_heavy(&agent, self.address(), options, false),
            None => no_kernel(self.agent),
        }
    }

    pub fn kill(&self, target: AgentAddress) -> Status {
        self.agent.kill(target)
    }

    pub fn kill_me(&self) -> Status {
        self.agent.kill_me()
    }

    pub fn sleep(&self, duration: Duration) -> bool {
        self.agent.sleep(duration)
    }

    pub fn sleep_until<F>(&self, condition: F) -> bool
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.agent.sleep_until(condition)
    }

    pub fn set_heavy(&self) -> bool {
        self.agent.set_heavy()
    }

    pub fn set_light(&self) -> bool {
        self.agent.set_light()
    }

    /// Addresses of the local agents, the kernel excluded.
    pub fn local_agents(&self) -> Vec<AgentAddress> {
        self.agent
            .kernel()
            .map(|k| k.agents().iter().map(|a| a.address()).collect())
            .unwrap_or_default()
    }

    pub fn find_agent(&self, name: &str) -> Option<AgentAddress> {
        self.agent.kernel()?.find_by_name(name).map(|a| a.address())
    }
}

fn no_kernel(agent: &Agent) -> Status {
    Status::fatal(StatusCode::NoKernel).with_provider(agent.provider())
}
