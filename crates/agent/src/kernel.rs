use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use holon_core::{
    guarded, AgentAddress, KernelConfig, LifeState, MultipleStatus, Status, StatusCode,
};

use crate::activator::Activator;
use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::execution::ExecutionResource;
use crate::registry::KernelRegistry;
use crate::traits::{Activable, DistantKernelHandler, Idle, KernelListener};
use crate::types::{InitArgs, KernelEvent, KernelEventKind, LaunchOptions};

/// Upper bound of simultaneously running heavy agents.
const MAX_HEAVY_AGENTS: usize = 4096;

const START_POLL: Duration = Duration::from_millis(10);

struct Pools {
    /// Heavy agents run as blocking tasks: one thread each, reused while idle.
    heavy: Runtime,
    timers: Runtime,
}

impl Pools {
    fn new(config: &KernelConfig) -> std::io::Result<Self> {
        let heavy = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(MAX_HEAVY_AGENTS)
            .thread_keep_alive(config.pool_keep_alive)
            .thread_name("holon-agent")
            .build()?;
        let timers = Builder::new_multi_thread()
            .worker_threads(config.timer_threads.max(1))
            .enable_time()
            .thread_name("holon-timer")
            .build()?;
        Ok(Self { heavy, timers })
    }

    fn shutdown(self) {
        self.heavy.shutdown_background();
        self.timers.shutdown_background();
    }
}

struct DifferedLight {
    agent: Arc<Agent>,
    activator: Arc<Activator>,
    args: Option<InitArgs>,
}

pub(crate) struct KernelInner {
    self_ref: Weak<KernelInner>,
    config: KernelConfig,
    agent: Arc<Agent>,
    activator: Arc<Activator>,
    repository: DashMap<AgentAddress, Arc<Agent>>,
    pools: Mutex<Option<Pools>>,
    differed_light: Mutex<Vec<DifferedLight>>,
    differed_heavy: Mutex<Vec<Arc<ExecutionResource>>>,
    new_heavy_agents: Mutex<Vec<Arc<Agent>>>,
    listeners: RwLock<Vec<Arc<dyn KernelListener>>>,
    distant: RwLock<Option<Arc<dyn DistantKernelHandler>>>,
    registry: Option<Arc<KernelRegistry>>,
    launched: AtomicBool,
    ever_launched: AtomicBool,
    paused: AtomicBool,
    watchdog_armed: AtomicBool,
}

impl KernelInner {
    pub(crate) fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub(crate) fn address(&self) -> AgentAddress {
        self.agent.address()
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn set_launched(&self, launched: bool) {
        self.launched.store(launched, Ordering::SeqCst);
    }

    pub(crate) fn lookup(&self, address: &AgentAddress) -> Option<Arc<Agent>> {
        self.repository.get(address).map(|e| Arc::clone(e.value()))
    }

    pub(crate) fn addresses(&self) -> Vec<AgentAddress> {
        self.repository.iter().map(|e| *e.key()).collect()
    }

    /// Local agents, the kernel agent excluded.
    pub(crate) fn agents(&self) -> Vec<Arc<Agent>> {
        self.repository
            .iter()
            .filter(|e| !e.value().is_kernel())
            .map(|e| Arc::clone(e.value()))
            .collect()
    }

    pub(crate) fn find_by_name(&self, name: &str) -> Option<Arc<Agent>> {
        self.repository
            .iter()
            .find(|e| e.value().name().as_deref() == Some(name))
            .map(|e| Arc::clone(e.value()))
    }

    pub(crate) fn distant(&self) -> Option<Arc<dyn DistantKernelHandler>> {
        self.distant.read().clone()
    }

    /// Scheduling code requested by the kernel agent's self-kill decision:
    /// `-1` before any launch, `1` once the repository is down to the kernel,
    /// `0` otherwise.
    pub(crate) fn launch_indicator(&self) -> i8 {
        if !self.ever_launched.load(Ordering::SeqCst) {
            return -1;
        }
        let own = usize::from(self.repository.contains_key(&self.address()));
        if self.repository.len() <= own {
            1
        } else {
            0
        }
    }

    fn listeners(&self) -> Vec<Arc<dyn KernelListener>> {
        self.listeners.read().clone()
    }

    pub(crate) fn fire_kernel_agent_launched(&self) {
        for listener in self.listeners() {
            listener.kernel_agent_launched(self.address());
        }
    }

    pub(crate) fn fire_uncaught_panic(&self, agent: AgentAddress, message: &str) {
        for listener in self.listeners() {
            listener.uncaught_panic(agent, message);
        }
    }

    // ---- pools ----

    fn submit(&self, resource: Arc<ExecutionResource>) -> bool {
        let Some(kernel) = self.self_ref.upgrade() else {
            return false;
        };
        let handle = match self.pools.lock().as_ref() {
            Some(pools) => pools.heavy.handle().clone(),
            None => return false,
        };
        handle.spawn_blocking(move || resource.run(kernel));
        true
    }

    pub(crate) fn submit_task<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = match self.pools.lock().as_ref() {
            Some(pools) => pools.heavy.handle().clone(),
            None => return false,
        };
        handle.spawn_blocking(task);
        true
    }

    pub(crate) fn schedule_task<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = match self.pools.lock().as_ref() {
            Some(pools) => pools.timers.handle().clone(),
            None => return false,
        };
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        true
    }

    // ---- launch ----

    fn register(
        &self,
        agent: &Arc<Agent>,
        creator: AgentAddress,
        name: Option<String>,
        heavy: bool,
    ) -> std::result::Result<(), Status> {
        let provider = self.agent.provider();
        match agent.state() {
            LifeState::Unborn => {}
            LifeState::Alive => {
                warn!(agent = %agent.address(), "Agent already launched");
                return Err(Status::warning(StatusCode::AlreadyLaunched).with_provider(provider));
            }
            state => {
                warn!(agent = %agent.address(), %state, "Agent cannot be launched");
                return Err(Status::error(StatusCode::AlreadyLaunched)
                    .with_provider(provider)
                    .with_message(format!("agent is {}", state)));
            }
        }
        if self.repository.contains_key(&agent.address()) {
            warn!(agent = %agent.address(), "Agent already submitted");
            return Err(Status::warning(StatusCode::AlreadyLaunched).with_provider(provider));
        }
        if self.agent.state().is_mortuary() || self.pools.lock().is_none() {
            return Err(Status::error(StatusCode::Rejected)
                .with_provider(provider)
                .with_message("kernel is shutting down"));
        }

        agent.set_kernel(self.self_ref.clone());
        agent.set_creator(Some(creator));
        agent.stamp_creation_date();
        if let Some(name) = name {
            agent.set_name(name);
        }
        self.repository.insert(agent.address(), Arc::clone(agent));
        self.ever_launched.store(true, Ordering::SeqCst);

        debug!(agent = %agent.address(), creator = %creator, heavy, "Agent launched");
        let event = KernelEvent::new(KernelEventKind::Launched, agent.address())
            .with_name(agent.name())
            .with_heavy(heavy);
        for listener in self.listeners() {
            listener.agent_launched(&event);
        }
        Ok(())
    }

    pub(crate) fn launch_light(
        &self,
        agent: &Arc<Agent>,
        creator: AgentAddress,
        options: LaunchOptions,
        differed: bool,
    ) -> Status {
        if let Err(status) = self.register(agent, creator, options.name, false) {
            return status;
        }
        let activator = options
            .activator
            .unwrap_or_else(|| Arc::clone(&self.activator));
        if differed {
            self.differed_light.lock().push(DifferedLight {
                agent: Arc::clone(agent),
                activator,
                args: options.args,
            });
        } else {
            activator.add_agent(Arc::clone(agent), options.args);
        }
        Status::ok()
    }

    pub(crate) fn launch_heavy(
        &self,
        agent: &Arc<Agent>,
        creator: AgentAddress,
        options: LaunchOptions,
        differed: bool,
    ) -> Status {
        if let Err(status) = self.register(agent, creator, options.name, true) {
            return status;
        }
        let resource = ExecutionResource::new(Arc::clone(agent), options.args);
        agent.set_execution_resource(Some(Arc::clone(&resource)));
        if differed {
            self.differed_heavy.lock().push(resource);
        } else if !self.submit(resource) {
            self.remove_agent_from_kernel(agent);
            return Status::error(StatusCode::Rejected).with_provider(self.agent.provider());
        }
        Status::ok()
    }

    pub(crate) fn launch_differed_execution_agents(&self) {
        let light = std::mem::take(&mut *self.differed_light.lock());
        for differed in light {
            differed.activator.add_agent(differed.agent, differed.args);
        }
        let heavy = std::mem::take(&mut *self.differed_heavy.lock());
        for resource in heavy {
            let agent = Arc::clone(resource.agent());
            if !self.submit(resource) {
                self.remove_agent_from_kernel(&agent);
            }
        }
    }

    // ---- kill ----

    pub(crate) fn kill(&self, killer: AgentAddress, target: AgentAddress) -> Status {
        let provider = killer.to_string();
        let Some(agent) = self.lookup(&target) else {
            return Status::from(AgentError::AgentNotFound(target)).with_provider(provider);
        };

        let allowed =
            target == killer || killer == self.address() || agent.creator() == Some(killer);
        if !allowed {
            return Status::from(AgentError::KillForbidden { killer, target })
                .with_provider(provider);
        }

        if agent.transition(LifeState::Alive, LifeState::Dying) {
            debug!(agent = %target, killer = %killer, "Agent dying");
            Status::ok()
        } else {
            Status::warning(StatusCode::AgentIsDead)
                .with_provider(provider)
                .with_message(format!("agent is {}", agent.state()))
        }
    }

    /// Kill request aimed at the kernel agent. Other agents are killed first
    /// and the kernel ends itself once they are gone.
    pub(crate) fn kill_kernel(&self) -> Status {
        let me = self.address();
        if !self.repository.contains_key(&me) {
            return Status::ok();
        }
        if self.repository.len() <= 1 {
            return self.kill(me, me);
        }

        // differed agents never start
        let differed_light = std::mem::take(&mut *self.differed_light.lock());
        for differed in differed_light {
            differed.agent.transition(LifeState::Unborn, LifeState::Died);
            self.remove_agent_from_kernel(&differed.agent);
        }
        let differed_heavy = std::mem::take(&mut *self.differed_heavy.lock());
        for resource in differed_heavy {
            resource.kill();
            let agent = Arc::clone(resource.agent());
            agent.transition(LifeState::Unborn, LifeState::Died);
            self.remove_agent_from_kernel(&agent);
        }

        let mut statuses = MultipleStatus::new();
        for agent in self.agents() {
            match (agent.state(), agent.execution_resource()) {
                (LifeState::Alive, _) => statuses.push(self.kill(me, agent.address())),
                // the thread removes its agent once the loop is left
                (_, Some(resource)) => resource.kill(),
                (LifeState::Unborn, None) => {
                    // a dead agent is dropped by whichever activator holds it
                    if agent.transition(LifeState::Unborn, LifeState::Died) {
                        self.activator.cancel_pending(&agent);
                        self.remove_agent_from_kernel(&agent);
                    } else {
                        statuses.push(self.kill(me, agent.address()));
                    }
                }
                (LifeState::Died, None) => self.remove_agent_from_kernel(&agent),
                _ => statuses.push(self.kill(me, agent.address())),
            }
        }
        self.agent.set_can_commit_suicide(Some(true));
        self.activator.used();
        statuses.push(self.arm_kill_watchdog());
        statuses.pack(self.agent.provider())
    }

    fn arm_kill_watchdog(&self) -> Status {
        if self.watchdog_armed.swap(true, Ordering::SeqCst) {
            return Status::ok();
        }
        let handle = match self.pools.lock().as_ref() {
            Some(pools) => pools.timers.handle().clone(),
            None => {
                return Status::warning(StatusCode::NoTerminationWatchdog)
                    .with_provider(self.agent.provider())
            }
        };

        let weak = self.self_ref.clone();
        let timeout = self.config.kill_timeout;
        handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(kernel) = weak.upgrade() {
                if !kernel.agent.state().is_mortuary() {
                    warn!(
                        kernel = %kernel.address(),
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "Kernel did not terminate in time"
                    );
                    thread::spawn(move || kernel.shutdown_now());
                }
            }
        });
        Status::ok()
    }

    pub(crate) fn remove_agent_from_kernel(&self, agent: &Arc<Agent>) {
        if agent.is_alive() {
            let status = guarded(&agent.provider(), || agent.destroy());
            if status.is_loggable() {
                status.log();
            }
        }

        let heavy = agent.is_heavy();
        let registered = self.repository.remove(&agent.address()).is_some();
        agent.set_execution_resource(None);
        agent.set_kernel(Weak::new());

        if agent.is_kernel() {
            self.destroy_context();
            info!(kernel = %agent.address(), "Kernel stopped");
            for listener in self.listeners() {
                listener.kernel_agent_killed(agent.address());
            }
        } else if registered {
            debug!(agent = %agent.address(), "Agent removed");
            let event = KernelEvent::new(KernelEventKind::Killed, agent.address())
                .with_name(agent.name())
                .with_heavy(heavy);
            for listener in self.listeners() {
                listener.agent_killed(&event);
            }
        }

        agent.mark_terminated();
        agent.dispose();
    }

    fn destroy_context(&self) {
        if let Some(registry) = &self.registry {
            registry.unregister(self.address());
        }
        if let Some(pools) = self.pools.lock().take() {
            pools.shutdown();
        }

        let remaining: Vec<Arc<Agent>> = self
            .repository
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        for agent in remaining {
            match agent.execution_resource() {
                Some(resource) => resource.kill(),
                None => self.remove_agent_from_kernel(&agent),
            }
        }
    }

    /// Stops the pools without waiting for agents to finish.
    pub(crate) fn shutdown_now(&self) {
        info!(kernel = %self.address(), "Kernel shutting down now");
        let pools = self.pools.lock().take();
        let snapshot: Vec<Arc<Agent>> = self
            .repository
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        self.repository.clear();
        if let Some(pools) = pools {
            pools.shutdown();
        }

        for agent in snapshot {
            match agent.execution_resource() {
                Some(resource) => resource.kill(),
                None => {
                    // light agents leave at their activator's next batch
                    agent.transition(LifeState::Alive, LifeState::Dying);
                }
            }
        }
    }

    // ---- migration ----

    pub(crate) fn set_heavy(&self, agent: &Arc<Agent>) -> bool {
        if agent.is_kernel() || agent.is_heavy() || !self.repository.contains_key(&agent.address())
        {
            return false;
        }
        let Some(activator) = agent.scheduler() else {
            return self.set_pending_heavy(agent);
        };
        agent.set_migrating(true);
        if !activator.remove_agent(agent) {
            agent.set_migrating(false);
            return false;
        }
        debug!(agent = %agent.address(), "Agent migrating to a dedicated thread");
        self.new_heavy_agents.lock().push(Arc::clone(agent));
        true
    }

    /// Moves an agent still waiting in the kernel activator's pending
    /// additions. An unborn one is initialized by its new thread.
    fn set_pending_heavy(&self, agent: &Arc<Agent>) -> bool {
        if !self.activator.cancel_pending(agent) {
            return false;
        }
        if agent.state() != LifeState::Unborn {
            agent.set_migrating(true);
            debug!(agent = %agent.address(), "Agent migrating to a dedicated thread");
            self.new_heavy_agents.lock().push(Arc::clone(agent));
            return true;
        }

        debug!(agent = %agent.address(), "Pending agent moved to a dedicated thread");
        let resource = ExecutionResource::new(Arc::clone(agent), None);
        agent.set_execution_resource(Some(Arc::clone(&resource)));
        if !self.submit(resource) {
            self.remove_agent_from_kernel(agent);
            return false;
        }
        true
    }

    pub(crate) fn set_light(&self, agent: &Arc<Agent>) -> bool {
        if agent.is_kernel() {
            return false;
        }
        let Some(resource) = agent.execution_resource() else {
            return false;
        };
        agent.set_migrating(true);
        debug!(agent = %agent.address(), "Agent migrating to the kernel activator");
        let activator = Arc::clone(&self.activator);
        resource.kill_with(Box::new(move |agent: &Arc<Agent>| {
            agent.set_execution_resource(None);
            activator.add_agent(Arc::clone(agent), None);
        }));
        true
    }

    /// Gives a thread to every migrating agent its activator has let go of.
    pub(crate) fn flush_new_heavy_agents(&self) {
        let ready: Vec<Arc<Agent>> = {
            let mut queue = self.new_heavy_agents.lock();
            if queue.is_empty() {
                return;
            }
            let (ready, waiting) = std::mem::take(&mut *queue)
                .into_iter()
                .partition(|agent| agent.scheduler().is_none());
            *queue = waiting;
            ready
        };

        for agent in ready {
            let resource = ExecutionResource::new(Arc::clone(&agent), None);
            agent.set_execution_resource(Some(Arc::clone(&resource)));
            if !self.submit(resource) {
                agent.set_migrating(false);
                self.remove_agent_from_kernel(&agent);
            }
        }
    }
}

impl Drop for KernelInner {
    fn drop(&mut self) {
        if let Some(pools) = self.pools.get_mut().take() {
            pools.shutdown();
        }
    }
}

/// Builds and starts a [`Kernel`].
pub struct KernelBuilder {
    config: KernelConfig,
    behaviour: Option<Box<dyn Activable>>,
    listeners: Vec<Arc<dyn KernelListener>>,
    distant: Option<Arc<dyn DistantKernelHandler>>,
    registry: Option<Arc<KernelRegistry>>,
    commit_suicide: Option<bool>,
    args: InitArgs,
}

impl KernelBuilder {
    fn new() -> Self {
        Self {
            config: KernelConfig::default(),
            behaviour: None,
            listeners: Vec::new(),
            distant: None,
            registry: None,
            commit_suicide: None,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    /// Behaviour played by the kernel agent itself.
    #[must_use]
    pub fn behaviour(mut self, behaviour: impl Activable + 'static) -> Self {
        self.behaviour = Some(Box::new(behaviour));
        self
    }

    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn KernelListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    #[must_use]
    pub fn distant_kernel_handler(mut self, handler: Arc<dyn DistantKernelHandler>) -> Self {
        self.distant = Some(handler);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<KernelRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Keeps the kernel running after its last agent is gone.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.commit_suicide = Some(!keep_alive);
        self
    }

    #[must_use]
    pub fn args(mut self, args: InitArgs) -> Self {
        self.args = args;
        self
    }

    /// Starts the kernel agent and blocks until it is alive.
    pub fn start(self) -> Result<Kernel> {
        let pools = Pools::new(&self.config)?;
        let activator = Activator::new();
        let agent = Agent::kernel_agent(
            self.behaviour.unwrap_or_else(|| Box::new(Idle)),
            Arc::clone(&activator),
        );
        agent.set_can_commit_suicide(self.commit_suicide);
        agent.set_name(
            self.config
                .application_name
                .clone()
                .unwrap_or_else(|| "kernel".to_string()),
        );

        let inner = Arc::new_cyclic(|self_ref| KernelInner {
            self_ref: self_ref.clone(),
            config: self.config,
            agent: Arc::clone(&agent),
            activator,
            repository: DashMap::new(),
            pools: Mutex::new(Some(pools)),
            differed_light: Mutex::new(Vec::new()),
            differed_heavy: Mutex::new(Vec::new()),
            new_heavy_agents: Mutex::new(Vec::new()),
            listeners: RwLock::new(self.listeners),
            distant: RwLock::new(self.distant),
            registry: self.registry,
            launched: AtomicBool::new(false),
            ever_launched: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            watchdog_armed: AtomicBool::new(false),
        });

        agent.set_kernel(Arc::downgrade(&inner));
        agent.set_creator(Some(agent.address()));
        agent.stamp_creation_date();
        inner.repository.insert(agent.address(), Arc::clone(&agent));
        if let Some(registry) = &inner.registry {
            registry.register(&inner);
        }

        let resource = ExecutionResource::new(Arc::clone(&agent), Some(self.args));
        agent.set_execution_resource(Some(Arc::clone(&resource)));
        if !inner.submit(resource) {
            return Err(AgentError::InitFailed(
                "kernel agent was rejected by its pool".to_string(),
            ));
        }

        while !inner.launched.load(Ordering::SeqCst) {
            if agent.is_terminated() || agent.state().is_mortuary() {
                return Err(AgentError::InitFailed(format!(
                    "kernel agent ended in state {}",
                    agent.state()
                )));
            }
            agent.wait_for_change(START_POLL);
        }

        info!(kernel = %agent.address(), name = ?agent.name(), "Kernel started");
        Ok(Kernel { inner })
    }
}

/// Handle on a running kernel.
///
/// Cloning is cheap. The kernel keeps running when every handle is dropped
/// and stops once its agent ends itself or is killed.
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

impl Kernel {
    pub fn new(config: KernelConfig) -> Result<Self> {
        Self::builder().config(config).start()
    }

    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<KernelInner>) -> Self {
        Self { inner }
    }

    pub fn address(&self) -> AgentAddress {
        self.inner.address()
    }

    /// The kernel's own agent.
    pub fn kernel_agent(&self) -> &Arc<Agent> {
        &self.inner.agent
    }

    /// Activator that schedules light agents by default.
    pub fn activator(&self) -> &Arc<Activator> {
        &self.inner.activator
    }

    pub fn config(&self) -> &KernelConfig {
        &self.inner.config
    }

    pub fn launch_light_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        self.inner
            .launch_light(&agent, self.address(), options, false)
    }

    pub fn launch_heavy_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        self.inner
            .launch_heavy(&agent, self.address(), options, false)
    }

    /// Registers a light agent whose execution waits for
    /// [`Kernel::launch_differed_execution_agents`].
    pub fn submit_light_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        self.inner.launch_light(&agent, self.address(), options, true)
    }

    pub fn submit_heavy_agent(&self, agent: Arc<Agent>, options: LaunchOptions) -> Status {
        self.inner.launch_heavy(&agent, self.address(), options, true)
    }

    pub fn launch_differed_execution_agents(&self) {
        self.inner.launch_differed_execution_agents()
    }

    /// Kills every agent, then the kernel itself.
    pub fn kill(&self) -> Status {
        self.inner.kill_kernel()
    }

    /// Kills one agent with the kernel's authority.
    pub fn kill_agent(&self, target: AgentAddress) -> Status {
        self.inner.kill(self.address(), target)
    }

    pub fn kill_all(&self) -> Status {
        let mut statuses = MultipleStatus::new();
        for agent in self.inner.agents() {
            statuses.push(self.kill_agent(agent.address()));
        }
        statuses.pack(self.inner.agent.provider())
    }

    /// Suspends the live loops of heavy agents, the kernel's included.
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
        debug!(kernel = %self.address(), "Kernel paused");
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
        debug!(kernel = %self.address(), "Kernel resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    pub fn wait_until_termination(&self, timeout: Option<Duration>) -> bool {
        self.inner.agent.wait_until_termination(timeout)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.agent.is_alive()
    }

    pub fn state(&self) -> LifeState {
        self.inner.agent.state()
    }

    pub fn agents(&self) -> Vec<Arc<Agent>> {
        self.inner.agents()
    }

    pub fn agent(&self, address: AgentAddress) -> Option<Arc<Agent>> {
        self.inner.lookup(&address)
    }

    pub fn find_agent(&self, name: &str) -> Option<Arc<Agent>> {
        self.inner.find_by_name(name)
    }

    pub fn set_heavy_agent(&self, agent: &Arc<Agent>) -> bool {
        self.inner.set_heavy(agent)
    }

    pub fn set_light_agent(&self, agent: &Arc<Agent>) -> bool {
        self.inner.set_light(agent)
    }

    pub fn add_kernel_listener(&self, listener: Arc<dyn KernelListener>) {
        self.inner.listeners.write().push(listener);
    }

    pub fn set_distant_kernel_handler(&self, handler: Option<Arc<dyn DistantKernelHandler>>) {
        *self.inner.distant.write() = handler;
    }

    /// Runs `task` on the agent pool.
    pub fn submit_task<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.submit_task(task)
    }

    /// Runs `task` on the timer pool after `delay`.
    pub fn schedule_task<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.schedule_task(delay, task)
    }

    pub fn registry(&self) -> Option<&Arc<KernelRegistry>> {
        self.inner.registry.as_ref()
    }

    pub fn shutdown_now(&self) {
        self.inner.shutdown_now()
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("address", &self.address())
            .field("state", &self.state())
            .field("agents", &self.inner.repository.len())
            .field("paused", &self.is_paused())
            .finish()
    }
}
