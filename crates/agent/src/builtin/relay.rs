use tracing::{debug, info};

use holon_core::{AgentAddress, Status};

use crate::context::AgentContext;
use crate::traits::Activable;

pub const DEFAULT_MAX_HOPS: u32 = 10;

/// Forwards every received message to its targets, or to every other local
/// agent when it has none, as long as the message has hops left.
pub struct RelayAgent {
    targets: Vec<AgentAddress>,
    max_hops: u32,
    relayed: u64,
    dropped: u64,
}

impl RelayAgent {
    pub fn new(targets: Vec<AgentAddress>) -> Self {
        Self {
            targets,
            max_hops: DEFAULT_MAX_HOPS,
            relayed: 0,
            dropped: 0,
        }
    }

    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn relayed(&self) -> u64 {
        self.relayed
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn targets(&self, ctx: &AgentContext<'_>) -> Vec<AgentAddress> {
        if !self.targets.is_empty() {
            return self.targets.clone();
        }
        let me = ctx.address();
        ctx.local_agents().into_iter().filter(|a| *a != me).collect()
    }
}

impl Activable for RelayAgent {
    fn live(&mut self, ctx: &AgentContext<'_>) -> Status {
        while let Some(message) = ctx.take_message() {
            if message.hops >= self.max_hops {
                self.dropped += 1;
                debug!(
                    agent = %ctx.address(),
                    hops = message.hops,
                    max_hops = self.max_hops,
                    "Message dropped (max hops reached)"
                );
                continue;
            }

            let targets = self.targets(ctx);
            if targets.is_empty() {
                self.dropped += 1;
                continue;
            }
            ctx.forward_broadcast(message.forwarded(), &targets);
            self.relayed += 1;
        }
        Status::ok()
    }

    fn end(&mut self, ctx: &AgentContext<'_>) -> Status {
        info!(
            agent = %ctx.address(),
            relayed = self.relayed,
            dropped = self.dropped,
            "RelayAgent stopping"
        );
        Status::ok()
    }
}
