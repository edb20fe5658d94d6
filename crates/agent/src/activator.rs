use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};

use holon_core::{guarded, AgentAddress, LifeState, MultipleStatus, Status, StatusCode};

use crate::agent::Agent;
use crate::types::InitArgs;

const PROVIDER: &str = "activator";

#[derive(Default)]
struct Pending {
    added: Vec<Arc<Agent>>,
    removed: Vec<Arc<Agent>>,
}

/// Cooperative batch scheduler of light agents.
///
/// Each batch operation visits the agents attached when it starts, once,
/// in attachment order. Additions and removals stay pending until the next
/// [`Activator::sync`].
pub struct Activator {
    agents: RwLock<Vec<Arc<Agent>>>,
    pending: Mutex<Pending>,
    init_args: Mutex<InitArgs>,
    used: AtomicBool,
    activated: AtomicBool,
    self_ref: Weak<Activator>,
}

impl Activator {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            agents: RwLock::new(Vec::new()),
            pending: Mutex::new(Pending::default()),
            init_args: Mutex::new(Vec::new()),
            used: AtomicBool::new(false),
            activated: AtomicBool::new(false),
            self_ref: self_ref.clone(),
        })
    }

    /// Schedules `agent` from the next sync on. `args`, when given, are used
    /// for that agent's initialization only.
    pub fn add_agent(&self, agent: Arc<Agent>, args: Option<InitArgs>) {
        if let Some(args) = args {
            agent.set_personal_init_parameters(args);
        }
        self.used.store(true, Ordering::SeqCst);

        debug!(agent = %agent.address(), "Agent added to activator");
        let mut pending = self.pending.lock();
        pending.removed.retain(|a| !Arc::ptr_eq(a, &agent));
        if !pending.added.iter().any(|a| Arc::ptr_eq(a, &agent)) {
            pending.added.push(agent);
        }
    }

    /// Returns `false` when the agent is neither attached nor pending.
    pub fn remove_agent(&self, agent: &Arc<Agent>) -> bool {
        let mut pending = self.pending.lock();
        if let Some(index) = pending.added.iter().position(|a| Arc::ptr_eq(a, agent)) {
            pending.added.remove(index);
            return true;
        }
        let attached = self.agents.read().iter().any(|a| Arc::ptr_eq(a, agent));
        if !attached {
            return false;
        }
        if !pending.removed.iter().any(|a| Arc::ptr_eq(a, agent)) {
            pending.removed.push(Arc::clone(agent));
        }
        debug!(agent = %agent.address(), "Agent removal pending");
        true
    }

    /// Drops `agent` from the pending additions only. Returns `false` when
    /// it was not waiting there.
    pub(crate) fn cancel_pending(&self, agent: &Arc<Agent>) -> bool {
        let mut pending = self.pending.lock();
        match pending.added.iter().position(|a| Arc::ptr_eq(a, agent)) {
            Some(index) => {
                pending.added.remove(index);
                true
            }
            None => false,
        }
    }

    /// Applies pending changes. Once activated, newly attached agents are
    /// initialized and detached ones destroyed. Agents that died while
    /// pending are dropped.
    pub fn sync(&self) {
        let Pending { mut added, removed } = std::mem::take(&mut *self.pending.lock());
        added.retain(|agent| !agent.state().is_mortuary());
        if added.is_empty() && removed.is_empty() {
            return;
        }

        {
            let mut agents = self.agents.write();
            agents.retain(|a| !removed.iter().any(|r| Arc::ptr_eq(a, r)));
            for agent in &added {
                if !agents.iter().any(|a| Arc::ptr_eq(a, agent)) {
                    agents.push(Arc::clone(agent));
                }
            }
        }
        for agent in &removed {
            agent.detach_scheduler(self);
        }
        for agent in &added {
            agent.attach_scheduler(self.self_ref.clone());
        }

        if self.activated.load(Ordering::SeqCst) {
            let args = self.init_args.lock().clone();
            log_if_needed(self.init_agents(&added, &args));
            log_if_needed(self.destroy_agents(&removed));
        }
    }

    /// Stores the activation arguments and initializes the attached agents.
    pub fn activate(&self, args: &[Value]) -> Status {
        *self.init_args.lock() = args.to_vec();
        let status = self.run_init(args);
        self.activated.store(true, Ordering::SeqCst);
        status
    }

    pub fn run_init(&self, args: &[Value]) -> Status {
        self.sync();
        let snapshot = self.agents.read().clone();
        self.init_agents(&snapshot, args)
    }

    fn init_agents(&self, agents: &[Arc<Agent>], args: &[Value]) -> Status {
        let mut statuses = MultipleStatus::new();
        for agent in agents {
            statuses.push(guarded(&agent.provider(), || {
                if agent.state() == LifeState::Unborn && !agent.is_migrating() {
                    agent.initialize(args)
                } else {
                    Status::ok()
                }
            }));
        }
        statuses.pack(PROVIDER)
    }

    /// Runs one behaviour step of every attached agent and removes those
    /// that died.
    pub fn run_behaviour(&self) -> Status {
        let snapshot = self.agents.read().clone();
        let mut statuses = MultipleStatus::new();

        for agent in snapshot {
            let status = guarded(&agent.provider(), || match agent.state() {
                LifeState::Alive => {
                    if agent.is_sleeping() {
                        Status::ok()
                    } else {
                        agent.behaviour_step()
                    }
                }
                LifeState::Dying => {
                    self.kill_agent(&agent);
                    Status::ok()
                }
                state @ LifeState::Died => {
                    warn!(agent = %agent.address(), %state, "Dead agent found in activator");
                    self.kill_agent(&agent);
                    Status::warning(StatusCode::UnexpectedStateDuringDestruction)
                        .with_provider(agent.provider())
                }
                state @ (LifeState::Unborn | LifeState::Born) => {
                    warn!(agent = %agent.address(), %state, "Unborn agent found in activator");
                    self.kill_agent(&agent);
                    Status::warning(StatusCode::UnexpectedStateDuringActivation)
                        .with_provider(agent.provider())
                }
                state @ LifeState::BreakingDown => {
                    warn!(agent = %agent.address(), %state, "Agent found breaking down in activator");
                    self.kill_agent(&agent);
                    Status::warning(StatusCode::UnexpectedStateDuringDestruction)
                        .with_provider(agent.provider())
                }
            });
            statuses.push(status);
            thread::yield_now();
        }

        statuses.pack(PROVIDER)
    }

    pub fn run_destroy(&self) -> Status {
        let snapshot = self.agents.read().clone();
        self.destroy_agents(&snapshot)
    }

    fn destroy_agents(&self, agents: &[Arc<Agent>]) -> Status {
        let mut statuses = MultipleStatus::new();
        for agent in agents {
            statuses.push(guarded(&agent.provider(), || {
                if agent.is_alive() && !agent.is_migrating() {
                    agent.destroy()
                } else {
                    Status::ok()
                }
            }));
        }
        statuses.pack(PROVIDER)
    }

    /// Destroys the attached agents and forgets all of them.
    pub fn end(&self) -> Status {
        let status = self.run_destroy();
        let detached: Vec<_> = std::mem::take(&mut *self.agents.write());
        *self.pending.lock() = Pending::default();
        for agent in &detached {
            agent.detach_scheduler(self);
        }
        self.init_args.lock().clear();
        self.activated.store(false, Ordering::SeqCst);
        status
    }

    fn kill_agent(&self, agent: &Arc<Agent>) {
        self.agents.write().retain(|a| !Arc::ptr_eq(a, agent));
        self.pending.lock().removed.retain(|a| !Arc::ptr_eq(a, agent));
        agent.detach_scheduler(self);
        agent.remove_from_kernel();
    }

    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.agents.read().clone()
    }

    pub fn contains(&self, address: AgentAddress) -> bool {
        self.agents.read().iter().any(|a| a.address() == address)
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// Attached or pending agents remain.
    pub fn has_activable(&self) -> bool {
        !self.agents.read().is_empty() || !self.pending.lock().added.is_empty()
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::SeqCst)
    }

    pub fn used(&self) {
        self.used.store(true, Ordering::SeqCst);
    }

    pub fn unused(&self) {
        self.used.store(false, Ordering::SeqCst);
    }

    pub fn is_activated(&self) -> bool {
        self.activated.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Activator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activator")
            .field("agents", &self.len())
            .field("used", &self.is_used())
            .field("activated", &self.is_activated())
            .finish()
    }
}

fn log_if_needed(status: Status) {
    if status.is_loggable() {
        status.log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AgentContext;
    use crate::traits::Activable;
    use std::sync::atomic::AtomicUsize;

    struct Stepper {
        steps: Arc<AtomicUsize>,
    }

    impl Activable for Stepper {
        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            self.steps.fetch_add(1, Ordering::SeqCst);
            Status::ok()
        }
    }

    /// Adds a fresh agent to the activator during its first live step.
    struct Spawner {
        activator: Arc<Activator>,
        spawned: Arc<Mutex<Option<Arc<Agent>>>>,
        steps: Arc<AtomicUsize>,
    }

    impl Activable for Spawner {
        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            let mut spawned = self.spawned.lock();
            if spawned.is_none() {
                let agent = Agent::new(Stepper {
                    steps: self.steps.clone(),
                });
                self.activator.add_agent(agent.clone(), None);
                *spawned = Some(agent);
            }
            Status::ok()
        }
    }

    struct Exploding;

    impl Activable for Exploding {
        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            panic!("behaviour exploded");
        }
    }

    fn stepper() -> (Arc<Agent>, Arc<AtomicUsize>) {
        let steps = Arc::new(AtomicUsize::new(0));
        (
            Agent::new(Stepper {
                steps: steps.clone(),
            }),
            steps,
        )
    }

    #[test]
    fn test_pending_until_sync() {
        let activator = Activator::new();
        let (agent, _) = stepper();
        assert!(!activator.is_used());
        activator.add_agent(agent.clone(), None);
        assert!(activator.is_used());
        assert!(activator.has_activable());
        assert!(activator.is_empty());

        activator.sync();
        assert!(activator.contains(agent.address()));
        assert!(Arc::ptr_eq(&agent.scheduler().unwrap(), &activator));
    }

    #[test]
    fn test_init_behaviour_destroy() {
        let activator = Activator::new();
        let (a, steps_a) = stepper();
        let (b, steps_b) = stepper();
        activator.add_agent(a.clone(), None);
        activator.add_agent(b.clone(), None);

        assert!(activator.run_init(&[]).is_success());
        assert_eq!(a.state(), LifeState::Alive);
        assert_eq!(b.state(), LifeState::Alive);

        assert!(activator.run_behaviour().is_success());
        assert_eq!(steps_a.load(Ordering::SeqCst), 1);
        assert_eq!(steps_b.load(Ordering::SeqCst), 1);

        assert!(activator.run_destroy().is_success());
        assert_eq!(a.state(), LifeState::Died);
        assert_eq!(b.state(), LifeState::Died);
        assert_eq!(activator.len(), 2);
    }

    #[test]
    fn test_mid_batch_addition_waits_for_next_call() {
        let activator = Activator::new();
        let spawned = Arc::new(Mutex::new(None));
        let steps = Arc::new(AtomicUsize::new(0));
        let spawner = Agent::new(Spawner {
            activator: activator.clone(),
            spawned: spawned.clone(),
            steps: steps.clone(),
        });
        activator.add_agent(spawner, None);
        activator.activate(&[]);

        activator.run_behaviour();
        let child = spawned.lock().clone().unwrap();
        assert!(!activator.contains(child.address()));
        assert_eq!(steps.load(Ordering::SeqCst), 0);

        activator.sync();
        assert_eq!(child.state(), LifeState::Alive);
        activator.run_behaviour();
        assert_eq!(steps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_does_not_abort_batch() {
        let activator = Activator::new();
        let bad = Agent::new(Exploding);
        let (good, steps) = stepper();
        activator.add_agent(bad, None);
        activator.add_agent(good, None);
        activator.run_init(&[]);

        let status = activator.run_behaviour();
        assert!(status.is_failure());
        assert_eq!(status.code(), StatusCode::Panicked);
        assert_eq!(steps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dying_agent_is_removed() {
        let activator = Activator::new();
        let (agent, steps) = stepper();
        activator.add_agent(agent.clone(), None);
        activator.run_init(&[]);

        assert!(agent.transition(LifeState::Alive, LifeState::Dying));
        activator.run_behaviour();
        assert!(!activator.contains(agent.address()));
        assert_eq!(agent.state(), LifeState::Died);
        assert!(agent.is_terminated());
        assert_eq!(steps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_agent() {
        let activator = Activator::new();
        let (agent, _) = stepper();
        assert!(!activator.remove_agent(&agent));

        activator.add_agent(agent.clone(), None);
        assert!(activator.remove_agent(&agent));
        activator.sync();
        assert!(activator.is_empty());

        activator.add_agent(agent.clone(), None);
        activator.sync();
        assert!(activator.remove_agent(&agent));
        assert!(activator.contains(agent.address()));
        activator.sync();
        assert!(!activator.contains(agent.address()));
        assert!(agent.scheduler().is_none());
    }

    #[test]
    fn test_cancel_pending_only_touches_additions() {
        let activator = Activator::new();
        let (agent, _) = stepper();
        assert!(!activator.cancel_pending(&agent));

        activator.add_agent(agent.clone(), None);
        assert!(activator.has_activable());
        assert!(activator.cancel_pending(&agent));
        assert!(!activator.has_activable());

        activator.add_agent(agent.clone(), None);
        activator.sync();
        assert!(!activator.cancel_pending(&agent));
        assert!(activator.contains(agent.address()));
    }

    #[test]
    fn test_agent_dead_while_pending_is_never_initialized() {
        let activator = Activator::new();
        activator.activate(&[]);
        let (agent, lives) = stepper();
        activator.add_agent(agent.clone(), None);
        assert!(agent.transition(LifeState::Unborn, LifeState::Died));

        activator.sync();
        assert!(activator.is_empty());
        assert!(!activator.has_activable());
        assert!(agent.scheduler().is_none());
        assert!(activator.run_behaviour().is_success());
        assert_eq!(agent.state(), LifeState::Died);
        assert_eq!(lives.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_end_clears() {
        let activator = Activator::new();
        let (agent, _) = stepper();
        activator.add_agent(agent.clone(), None);
        activator.activate(&[]);
        assert!(activator.is_activated());

        assert!(activator.end().is_success());
        assert!(activator.is_empty());
        assert!(!activator.is_activated());
        assert_eq!(agent.state(), LifeState::Died);
    }

    #[test]
    fn test_per_agent_arguments() {
        use crate::prototype::{ActivationPrototype, ParamKind};

        struct NeedsName;

        impl Activable for NeedsName {
            fn prototype(&self) -> Option<ActivationPrototype> {
                Some(ActivationPrototype::new([ParamKind::String]))
            }

            fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
                Status::ok()
            }
        }

        let activator = Activator::new();
        let agent = Agent::new(NeedsName);
        activator.add_agent(agent.clone(), Some(vec![Value::from("alpha")]));
        assert!(activator.run_init(&[]).is_success());
        assert_eq!(agent.state(), LifeState::Alive);
    }
}
