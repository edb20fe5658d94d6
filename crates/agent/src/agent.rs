use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use serde_json::Value;
use tracing::debug;

use holon_core::{guarded, AgentAddress, LifeState, Message, Status, StatusCode, Timestamp};

use crate::activator::Activator;
use crate::context::AgentContext;
use crate::execution::ExecutionResource;
use crate::interaction::{self, Emitter};
use crate::kernel::KernelInner;
use crate::lifecycle::{self, Activity};
use crate::mailbox::Mailbox;
use crate::traits::{Activable, AgentLifeStateListener, ReceiverSelectionPolicy};
use crate::types::InitArgs;

enum WakeUpCondition {
    At(Instant),
    When(Box<dyn Fn() -> bool + Send + Sync>),
}

impl WakeUpCondition {
    fn is_satisfied(&self) -> bool {
        match self {
            WakeUpCondition::At(deadline) => Instant::now() >= *deadline,
            WakeUpCondition::When(predicate) => predicate(),
        }
    }
}

struct Life {
    state: LifeState,
    /// Set once the kernel has forgotten the agent.
    terminated: bool,
}

/// An autonomous entity driven through `activate → live* → end`.
///
/// An agent is light while an [`Activator`] schedules it and heavy while an
/// [`ExecutionResource`] runs it on a dedicated pool thread. Its address and
/// mailbox survive migrations between the two.
pub struct Agent {
    address: AgentAddress,
    name: RwLock<Option<String>>,
    life: Mutex<Life>,
    life_changed: Condvar,
    creator: RwLock<Option<AgentAddress>>,
    creation_date: RwLock<Option<Timestamp>>,
    can_commit_suicide: RwLock<Option<bool>>,
    mailbox: OnceLock<Mailbox>,
    execution_resource: Mutex<Option<Arc<ExecutionResource>>>,
    migrating: AtomicBool,
    wake_up: Mutex<Option<WakeUpCondition>>,
    personal_init: Mutex<Option<InitArgs>>,
    kernel: RwLock<Weak<KernelInner>>,
    behaviour: Mutex<Box<dyn Activable>>,
    managed: Option<Arc<Activator>>,
    scheduler: Mutex<Weak<Activator>>,
    is_kernel: bool,
    send_feedback: AtomicBool,
    forward_feedback: AtomicBool,
    broadcast_feedback: AtomicBool,
    listeners: RwLock<Vec<Arc<dyn AgentLifeStateListener>>>,
}

impl Agent {
    pub fn new(behaviour: impl Activable + 'static) -> Arc<Self> {
        Arc::new(Self::build(Box::new(behaviour), None, false))
    }

    /// An agent that also schedules its own light agents.
    ///
    /// Its stages drive the owned activator, and it ends itself once that
    /// activator has been used and emptied.
    pub fn with_activator(behaviour: impl Activable + 'static) -> Arc<Self> {
        Arc::new(Self::build(Box::new(behaviour), Some(Activator::new()), false))
    }

    pub(crate) fn kernel_agent(behaviour: Box<dyn Activable>, activator: Arc<Activator>) -> Arc<Self> {
        Arc::new(Self::build(behaviour, Some(activator), true))
    }

    fn build(
        behaviour: Box<dyn Activable>,
        managed: Option<Arc<Activator>>,
        is_kernel: bool,
    ) -> Self {
        Self {
            address: AgentAddress::generate(),
            name: RwLock::new(None),
            life: Mutex::new(Life {
                state: LifeState::Unborn,
                terminated: false,
            }),
            life_changed: Condvar::new(),
            creator: RwLock::new(None),
            creation_date: RwLock::new(None),
            can_commit_suicide: RwLock::new(None),
            mailbox: OnceLock::new(),
            execution_resource: Mutex::new(None),
            migrating: AtomicBool::new(false),
            wake_up: Mutex::new(None),
            personal_init: Mutex::new(None),
            kernel: RwLock::new(Weak::new()),
            behaviour: Mutex::new(behaviour),
            managed,
            scheduler: Mutex::new(Weak::new()),
            is_kernel,
            send_feedback: AtomicBool::new(true),
            forward_feedback: AtomicBool::new(true),
            broadcast_feedback: AtomicBool::new(true),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn address(&self) -> AgentAddress {
        self.address
    }

    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = Some(name.into());
    }

    pub fn state(&self) -> LifeState {
        self.life.lock().state
    }

    pub fn is_alive(&self) -> bool {
        self.state().is_alive()
    }

    pub fn creator(&self) -> Option<AgentAddress> {
        *self.creator.read()
    }

    pub fn creation_date(&self) -> Option<Timestamp> {
        *self.creation_date.read()
    }

    pub fn is_kernel(&self) -> bool {
        self.is_kernel
    }

    pub fn is_heavy(&self) -> bool {
        self.execution_resource.lock().is_some()
    }

    pub fn is_light(&self) -> bool {
        !self.is_heavy()
    }

    pub fn is_migrating(&self) -> bool {
        self.migrating.load(Ordering::SeqCst)
    }

    /// Activator owned by this agent, if any.
    pub fn activator(&self) -> Option<&Arc<Activator>> {
        self.managed.as_ref()
    }

    /// Activator currently scheduling this agent.
    pub fn scheduler(&self) -> Option<Arc<Activator>> {
        self.scheduler.lock().upgrade()
    }

    pub fn execution_resource(&self) -> Option<Arc<ExecutionResource>> {
        self.execution_resource.lock().clone()
    }

    /// `None` inherits the kernel's keep-alive setting.
    pub fn set_can_commit_suicide(&self, value: Option<bool>) {
        *self.can_commit_suicide.write() = value;
    }

    pub fn can_commit_suicide(&self) -> bool {
        self.resolve_can_commit_suicide(self.kernel().as_deref())
    }

    fn resolve_can_commit_suicide(&self, kernel: Option<&KernelInner>) -> bool {
        self.can_commit_suicide.read().unwrap_or_else(|| {
            !kernel
                .map(|k| k.config().agent_keep_alive)
                .unwrap_or(false)
        })
    }

    pub fn mailbox(&self) -> &Mailbox {
        self.mailbox.get_or_init(|| {
            let buffered = self
                .kernel()
                .map(|k| k.config().buffered_mailboxes)
                .unwrap_or(false);
            if buffered {
                Mailbox::buffered()
            } else {
                Mailbox::new()
            }
        })
    }

    pub fn add_state_listener(&self, listener: Arc<dyn AgentLifeStateListener>) {
        self.listeners.write().push(listener);
    }

    pub fn set_send_feedback(&self, enabled: bool) {
        self.send_feedback.store(enabled, Ordering::SeqCst);
    }

    pub fn set_forward_feedback(&self, enabled: bool) {
        self.forward_feedback.store(enabled, Ordering::SeqCst);
    }

    pub fn set_broadcast_feedback(&self, enabled: bool) {
        self.broadcast_feedback.store(enabled, Ordering::SeqCst);
    }

    /// Arguments used by the next initialization instead of the
    /// scheduler's. Consumed by that initialization.
    pub fn set_personal_init_parameters(&self, args: InitArgs) {
        *self.personal_init.lock() = Some(args);
    }

    pub(crate) fn provider(&self) -> String {
        self.address.to_string()
    }

    // ---- kernel bookkeeping ----

    pub(crate) fn kernel(&self) -> Option<Arc<KernelInner>> {
        self.kernel.read().upgrade()
    }

    pub(crate) fn set_kernel(&self, kernel: Weak<KernelInner>) {
        *self.kernel.write() = kernel;
    }

    pub(crate) fn set_creator(&self, creator: Option<AgentAddress>) {
        *self.creator.write() = creator;
    }

    pub(crate) fn stamp_creation_date(&self) {
        *self.creation_date.write() = Some(Timestamp::now());
    }

    pub(crate) fn set_migrating(&self, migrating: bool) {
        self.migrating.store(migrating, Ordering::SeqCst);
    }

    pub(crate) fn set_execution_resource(&self, resource: Option<Arc<ExecutionResource>>) {
        *self.execution_resource.lock() = resource;
    }

    pub(crate) fn attach_scheduler(&self, activator: Weak<Activator>) {
        *self.scheduler.lock() = activator;
        self.set_migrating(false);
    }

    pub(crate) fn detach_scheduler(&self, activator: &Activator) {
        let mut scheduler = self.scheduler.lock();
        if std::ptr::eq(scheduler.as_ptr(), activator) {
            *scheduler = Weak::new();
        }
    }

    pub(crate) fn set_state(&self, state: LifeState) {
        {
            let mut life = self.life.lock();
            if life.state == state {
                return;
            }
            life.state = state;
            self.life_changed.notify_all();
        }
        self.fire_state_changed(state);
    }

    /// Moves from `from` to `to` only if the agent is still in `from`.
    pub(crate) fn transition(&self, from: LifeState, to: LifeState) -> bool {
        {
            let mut life = self.life.lock();
            if life.state != from {
                return false;
            }
            life.state = to;
            self.life_changed.notify_all();
        }
        self.fire_state_changed(to);
        true
    }

    fn fire_state_changed(&self, state: LifeState) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.state_changed(self.address, state);
        }
    }

    pub(crate) fn mark_terminated(&self) {
        let mut life = self.life.lock();
        life.terminated = true;
        self.life_changed.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.life.lock().terminated
    }

    /// Blocks until the kernel has removed this agent. Returns `false` if the
    /// timeout elapsed first.
    pub fn wait_until_termination(&self, timeout: Option<Duration>) -> bool {
        let mut life = self.life.lock();
        match timeout {
            None => {
                while !life.terminated {
                    self.life_changed.wait(&mut life);
                }
                true
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while !life.terminated {
                    if self.life_changed.wait_until(&mut life, deadline).timed_out() {
                        return life.terminated;
                    }
                }
                true
            }
        }
    }

    pub(crate) fn wait_for_change(&self, timeout: Duration) {
        let mut life = self.life.lock();
        self.life_changed.wait_for(&mut life, timeout);
    }

    pub(crate) fn dispose(&self) {
        if let Some(mailbox) = self.mailbox.get() {
            mailbox.clear();
        }
        self.wake_up.lock().take();
        self.listeners.write().clear();
    }

    /// Hands the agent back to its kernel for removal, or tears it down
    /// locally when no kernel owns it.
    pub(crate) fn remove_from_kernel(self: &Arc<Self>) {
        match self.kernel() {
            Some(kernel) => kernel.remove_agent_from_kernel(self),
            None => {
                if self.is_alive() {
                    let status = guarded(&self.provider(), || self.destroy());
                    if status.is_loggable() {
                        status.log();
                    }
                }
                self.mark_terminated();
                self.dispose();
            }
        }
    }

    // ---- sleeping ----

    /// Skips behaviour steps for the given duration. Refused for the kernel
    /// agent.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_kernel {
            return false;
        }
        *self.wake_up.lock() = Some(WakeUpCondition::At(Instant::now() + duration));
        true
    }

    /// Skips behaviour steps until the predicate holds.
    pub fn sleep_until<F>(&self, condition: F) -> bool
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        if self.is_kernel {
            return false;
        }
        *self.wake_up.lock() = Some(WakeUpCondition::When(Box::new(condition)));
        true
    }

    pub fn wake_up(&self) {
        self.wake_up.lock().take();
    }

    /// Evaluates the wake-up condition, clearing it once satisfied.
    pub fn is_sleeping(&self) -> bool {
        let mut wake_up = self.wake_up.lock();
        match wake_up.as_ref() {
            None => false,
            Some(condition) if condition.is_satisfied() => {
                *wake_up = None;
                false
            }
            Some(_) => true,
        }
    }

    // ---- life cycle ----

    pub(crate) fn initialize(self: &Arc<Self>, args: &[Value]) -> Status {
        let personal = self.personal_init.lock().take();
        let args = personal.as_deref().unwrap_or(args);

        let prototype = self.behaviour.lock().prototype();
        if let Some(prototype) = prototype {
            if let Err(err) = prototype.validate(args) {
                self.set_state(LifeState::Died);
                return Status::from(err).with_provider(self.provider());
            }
        }

        self.set_state(LifeState::Born);
        self.sync();
        let status = self.activate(args);
        if status.is_success() {
            self.set_state(LifeState::Alive);
        } else {
            self.set_state(LifeState::Died);
        }
        status
    }

    fn activate(self: &Arc<Self>, args: &[Value]) -> Status {
        let provider = self.provider();
        let ctx = AgentContext::new(self);
        let role = guarded(&provider, || self.behaviour.lock().activate(&ctx, args));
        match &self.managed {
            Some(activator) => role.merge(guarded(&provider, || activator.activate(args)), &provider),
            None => role,
        }
    }

    pub(crate) fn behaviour_step(self: &Arc<Self>) -> Status {
        let kernel = self.kernel();
        if self.is_kernel {
            if let Some(mailbox) = self.mailbox.get() {
                mailbox.clear();
            }
        }

        self.sync();

        if self.is_kernel {
            if let Some(kernel) = &kernel {
                kernel.flush_new_heavy_agents();
            }
        }

        if self.is_sleeping() {
            return Status::ok();
        }

        if self.is_self_killable(kernel.as_deref()) {
            debug!(agent = %self.address, "Agent has nothing left to do");
            return self.kill_me();
        }

        self.live()
    }

    fn live(self: &Arc<Self>) -> Status {
        let provider = self.provider();
        let ctx = AgentContext::new(self);
        let role = guarded(&provider, || self.behaviour.lock().live(&ctx));
        match &self.managed {
            Some(activator) => role.merge(guarded(&provider, || activator.run_behaviour()), &provider),
            None => role,
        }
    }

    pub(crate) fn destroy(self: &Arc<Self>) -> Status {
        self.set_state(LifeState::BreakingDown);
        {
            let mut behaviour = self.behaviour.lock();
            behaviour.clear_capacity_calls();
            behaviour.leave_all_roles();
        }
        self.sync();
        let status = self.end();
        self.set_state(LifeState::Died);
        status
    }

    fn end(self: &Arc<Self>) -> Status {
        let provider = self.provider();
        let ctx = AgentContext::new(self);
        let scheduled = self
            .managed
            .as_ref()
            .map(|activator| guarded(&provider, || activator.end()));
        let role = guarded(&provider, || self.behaviour.lock().end(&ctx));
        match scheduled {
            Some(scheduled) => scheduled.merge(role, &provider),
            None => role,
        }
    }

    fn sync(&self) {
        self.behaviour.lock().sync();
        if let Some(activator) = &self.managed {
            activator.sync();
        }
        if let Some(mailbox) = self.mailbox.get() {
            mailbox.sync();
        }
    }

    fn is_self_killable(&self, kernel: Option<&KernelInner>) -> bool {
        if !self.resolve_can_commit_suicide(kernel) {
            return false;
        }
        let role = {
            let behaviour = self.behaviour.lock();
            Activity::observe(behaviour.is_used(), behaviour.has_activable())
        };
        let scheduling = self
            .managed
            .as_ref()
            .map(|a| Activity::observe(a.is_used(), a.has_activable()))
            .unwrap_or(Activity::Unused);
        let requested = match kernel {
            Some(kernel) if self.is_kernel => kernel.launch_indicator(),
            _ => -1,
        };
        lifecycle::is_self_killable(true, -1, role.code(), requested, scheduling.code())
    }

    // ---- kernel requests ----

    pub fn kill_me(self: &Arc<Self>) -> Status {
        match self.kernel() {
            Some(kernel) if self.is_kernel => kernel.kill_kernel(),
            Some(kernel) => kernel.kill(self.address, self.address),
            None => Status::fatal(StatusCode::NoKernel).with_provider(self.provider()),
        }
    }

    /// Kills another agent with this agent's authority.
    pub fn kill(&self, target: AgentAddress) -> Status {
        match self.kernel() {
            Some(kernel) => kernel.kill(self.address, target),
            None => Status::fatal(StatusCode::NoKernel).with_provider(self.provider()),
        }
    }

    /// Moves this light agent onto a dedicated thread.
    pub fn set_heavy(self: &Arc<Self>) -> bool {
        self.kernel().map(|k| k.set_heavy(self)).unwrap_or(false)
    }

    /// Moves this heavy agent back into the kernel's activator.
    pub fn set_light(self: &Arc<Self>) -> bool {
        self.kernel().map(|k| k.set_light(self)).unwrap_or(false)
    }

    // ---- messaging ----

    fn emitter(&self, force_sender: bool, include_sender: &AtomicBool) -> Emitter {
        Emitter {
            address: self.address,
            force_sender,
            include_sender: include_sender.load(Ordering::SeqCst),
        }
    }

    /// Sends to one of `receivers`, picked at random when there are several.
    /// Returns the address the message went to.
    pub fn send_message(&self, message: Message, receivers: &[AgentAddress]) -> Option<AgentAddress> {
        let kernel = self.kernel()?;
        let emitter = self.emitter(true, &self.send_feedback);
        interaction::send_message(&kernel, &emitter, message, receivers)
    }

    pub fn send_message_with_policy(
        &self,
        message: Message,
        policy: &dyn ReceiverSelectionPolicy,
    ) -> Option<AgentAddress> {
        let kernel = self.kernel()?;
        let emitter = self.emitter(true, &self.send_feedback);
        interaction::send_message_with_policy(&kernel, &emitter, message, policy)
    }

    /// Delivers to every listed agent, or to every agent of every kernel
    /// when `receivers` is empty.
    pub fn broadcast_message(&self, message: Message, receivers: &[AgentAddress]) {
        if let Some(kernel) = self.kernel() {
            let emitter = self.emitter(true, &self.broadcast_feedback);
            interaction::broadcast_message(&kernel, &emitter, message, receivers);
        }
    }

    /// Like [`Agent::send_message`] but keeps the sender already set.
    pub fn forward_message(&self, message: Message, receivers: &[AgentAddress]) -> Option<AgentAddress> {
        let kernel = self.kernel()?;
        let emitter = self.emitter(false, &self.forward_feedback);
        interaction::send_message(&kernel, &emitter, message, receivers)
    }

    pub fn forward_broadcast_message(&self, message: Message, receivers: &[AgentAddress]) {
        if let Some(kernel) = self.kernel() {
            let emitter = self.emitter(false, &self.forward_feedback);
            interaction::broadcast_message(&kernel, &emitter, message, receivers);
        }
    }

    pub fn reply_to(&self, original: &Message, reply: Message) -> Option<AgentAddress> {
        let receiver = original.sender?;
        self.send_message(reply, &[receiver])
    }

    pub fn take_message(&self) -> Option<Message> {
        self.mailbox().take()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("address", &self.address)
            .field("name", &self.name())
            .field("state", &self.state())
            .field("heavy", &self.is_heavy())
            .field("kernel", &self.is_kernel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prototype::{ActivationPrototype, ParamKind};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        activated: Arc<AtomicUsize>,
        lived: Arc<AtomicUsize>,
        ended: Arc<AtomicUsize>,
    }

    impl Activable for Counting {
        fn activate(&mut self, _ctx: &AgentContext<'_>, _args: &[Value]) -> Status {
            self.activated.fetch_add(1, Ordering::SeqCst);
            Status::ok()
        }

        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            self.lived.fetch_add(1, Ordering::SeqCst);
            Status::ok()
        }

        fn end(&mut self, _ctx: &AgentContext<'_>) -> Status {
            self.ended.fetch_add(1, Ordering::SeqCst);
            Status::ok()
        }
    }

    struct Failing;

    impl Activable for Failing {
        fn activate(&mut self, _ctx: &AgentContext<'_>, _args: &[Value]) -> Status {
            Status::failure("refused")
        }

        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            Status::ok()
        }
    }

    struct Typed;

    impl Activable for Typed {
        fn prototype(&self) -> Option<ActivationPrototype> {
            Some(ActivationPrototype::new([ParamKind::String]))
        }

        fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
            Status::ok()
        }
    }

    #[test]
    fn test_new_agent_is_unborn() {
        let agent = Agent::new(Counting::default());
        assert_eq!(agent.state(), LifeState::Unborn);
        assert!(agent.is_light());
        assert!(!agent.is_migrating());
        assert!(agent.creator().is_none());
    }

    #[test]
    fn test_full_life_cycle() {
        let behaviour = Counting::default();
        let (activated, lived, ended) = (
            behaviour.activated.clone(),
            behaviour.lived.clone(),
            behaviour.ended.clone(),
        );
        let agent = Agent::new(behaviour);

        assert!(agent.initialize(&[]).is_success());
        assert_eq!(agent.state(), LifeState::Alive);
        assert!(agent.behaviour_step().is_success());
        assert!(agent.destroy().is_success());
        assert_eq!(agent.state(), LifeState::Died);

        assert_eq!(activated.load(Ordering::SeqCst), 1);
        assert_eq!(lived.load(Ordering::SeqCst), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_activation_dies() {
        let agent = Agent::new(Failing);
        assert!(agent.initialize(&[]).is_failure());
        assert_eq!(agent.state(), LifeState::Died);
    }

    #[test]
    fn test_prototype_mismatch_dies() {
        let agent = Agent::new(Typed);
        let status = agent.initialize(&[json!(42)]);
        assert_eq!(status.code(), StatusCode::InvalidParameters);
        assert_eq!(agent.state(), LifeState::Died);
    }

    #[test]
    fn test_personal_parameters_override() {
        let agent = Agent::new(Typed);
        agent.set_personal_init_parameters(vec![json!("ok")]);
        assert!(agent.initialize(&[json!(42)]).is_success());
        assert_eq!(agent.state(), LifeState::Alive);
    }

    #[test]
    fn test_sleep_gates_behaviour() {
        let behaviour = Counting::default();
        let lived = behaviour.lived.clone();
        let agent = Agent::new(behaviour);
        agent.initialize(&[]);

        assert!(agent.sleep(Duration::from_secs(60)));
        assert!(agent.is_sleeping());
        agent.behaviour_step();
        assert_eq!(lived.load(Ordering::SeqCst), 0);

        agent.wake_up();
        agent.behaviour_step();
        assert_eq!(lived.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sleep_until_condition() {
        let flag = Arc::new(AtomicBool::new(false));
        let agent = Agent::new(Counting::default());
        let watched = flag.clone();
        assert!(agent.sleep_until(move || watched.load(Ordering::SeqCst)));
        assert!(agent.is_sleeping());
        flag.store(true, Ordering::SeqCst);
        assert!(!agent.is_sleeping());
    }

    #[test]
    fn test_kill_me_without_kernel_is_fatal() {
        let agent = Agent::new(Counting::default());
        agent.initialize(&[]);
        assert_eq!(agent.kill_me().severity(), holon_core::Severity::Fatal);
        assert_eq!(agent.state(), LifeState::Alive);
    }

    #[test]
    fn test_state_listener() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let agent = Agent::new(Counting::default());
        let sink = seen.clone();
        agent.add_state_listener(Arc::new(move |_adr: AgentAddress, state: LifeState| {
            sink.lock().push(state)
        }));
        agent.initialize(&[]);
        agent.destroy();
        assert_eq!(
            *seen.lock(),
            vec![
                LifeState::Born,
                LifeState::Alive,
                LifeState::BreakingDown,
                LifeState::Died
            ]
        );
    }

    #[test]
    fn test_wait_until_termination_times_out() {
        let agent = Agent::new(Counting::default());
        assert!(!agent.wait_until_termination(Some(Duration::from_millis(10))));
        agent.mark_terminated();
        assert!(agent.wait_until_termination(None));
    }
}
