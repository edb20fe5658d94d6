//! Message routing between agents.
//!
//! Receivers are looked up in the kernel's repository first. An address the
//! local kernel does not know is handed to the distant kernel handler, when
//! one is installed.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use holon_core::{AgentAddress, Message, Timestamp};

use crate::agent::Agent;
use crate::kernel::KernelInner;
use crate::traits::ReceiverSelectionPolicy;

/// Who is sending, and how the routing fields are stamped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Emitter {
    pub address: AgentAddress,
    /// Overwrite any sender already carried by the message.
    pub force_sender: bool,
    /// Deliver to the sender itself when it is among the receivers.
    pub include_sender: bool,
}

impl Emitter {
    fn sender_of(&self, message: &Message) -> AgentAddress {
        if self.force_sender {
            self.address
        } else {
            message.sender.unwrap_or(self.address)
        }
    }
}

/// Sends to one of `receivers`, chosen at random. Candidates whose delivery
/// fails are excluded and another one is drawn. The emitter never receives
/// its own message through this path.
pub(crate) fn send_message(
    kernel: &KernelInner,
    emitter: &Emitter,
    message: Message,
    receivers: &[AgentAddress],
) -> Option<AgentAddress> {
    let mut excluded = vec![emitter.address];
    let mut rng = rand::thread_rng();
    while let Some(receiver) = choose(receivers, &excluded, &mut rng) {
        if let Some(delivered) = deliver(kernel, emitter, message.clone(), receiver) {
            return Some(delivered);
        }
        excluded.push(receiver);
    }
    None
}

/// Lets `policy` pick among the local agents, retrying without the agents
/// whose delivery failed. A pick the kernel does not know goes to the
/// distant kernels.
pub(crate) fn send_message_with_policy(
    kernel: &KernelInner,
    emitter: &Emitter,
    message: Message,
    policy: &dyn ReceiverSelectionPolicy,
) -> Option<AgentAddress> {
    let mut candidates: Vec<AgentAddress> = kernel
        .agents()
        .iter()
        .map(|agent| agent.address())
        .filter(|address| *address != emitter.address)
        .collect();

    while !candidates.is_empty() {
        let receiver = policy.select(emitter.address, &candidates)?;
        if let Some(delivered) = deliver(kernel, emitter, message.clone(), receiver) {
            return Some(delivered);
        }
        let position = candidates.iter().position(|c| *c == receiver)?;
        candidates.remove(position);
    }
    None
}

/// Delivers a copy to every listed receiver, or to every local agent plus
/// every distant kernel when `receivers` is empty.
pub(crate) fn broadcast_message(
    kernel: &KernelInner,
    emitter: &Emitter,
    message: Message,
    receivers: &[AgentAddress],
) {
    if receivers.is_empty() {
        for address in kernel.addresses() {
            if let Some(agent) = kernel.lookup(&address) {
                deliver_local(&agent, emitter, message.clone());
            }
        }
        if let Some(distant) = kernel.distant() {
            let mut message = message;
            message.sender = Some(emitter.sender_of(&message));
            message.receiver = None;
            message.creation_date.get_or_insert_with(Timestamp::now);
            distant.broadcast_message(message);
        }
        return;
    }

    for &receiver in receivers {
        deliver(kernel, emitter, message.clone(), receiver);
    }
}

fn deliver(
    kernel: &KernelInner,
    emitter: &Emitter,
    message: Message,
    receiver: AgentAddress,
) -> Option<AgentAddress> {
    match kernel.lookup(&receiver) {
        Some(agent) => deliver_local(&agent, emitter, message),
        None => send_remote(kernel, emitter, message, receiver),
    }
}

fn deliver_local(agent: &Arc<Agent>, emitter: &Emitter, mut message: Message) -> Option<AgentAddress> {
    let sender = emitter.sender_of(&message);
    let receiver = agent.address();
    if !emitter.include_sender && receiver == sender {
        return None;
    }
    if agent.state().is_mortuary() {
        return None;
    }

    message.creation_date.get_or_insert_with(Timestamp::now);
    message.sender = Some(sender);
    message.receiver = Some(receiver);
    if agent.mailbox().add(message) {
        Some(receiver)
    } else {
        None
    }
}

fn send_remote(
    kernel: &KernelInner,
    emitter: &Emitter,
    mut message: Message,
    receiver: AgentAddress,
) -> Option<AgentAddress> {
    let distant = kernel.distant()?;
    trace!(receiver = %receiver, "Receiver not local, handing over to distant kernels");
    message.creation_date.get_or_insert_with(Timestamp::now);
    message.sender = Some(emitter.sender_of(&message));
    message.receiver = Some(receiver);
    if distant.send_message(message) {
        Some(receiver)
    } else {
        None
    }
}

fn choose<R: Rng + ?Sized>(
    candidates: &[AgentAddress],
    excluded: &[AgentAddress],
    rng: &mut R,
) -> Option<AgentAddress> {
    let remaining: Vec<AgentAddress> = candidates
        .iter()
        .copied()
        .filter(|c| !excluded.contains(c))
        .collect();
    remaining.choose(rng).copied()
}
