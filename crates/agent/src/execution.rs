use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use holon_core::status::panic_message;
use holon_core::{guarded, LifeState, Severity};

use crate::agent::Agent;
use crate::error::AgentError;
use crate::kernel::KernelInner;
use crate::types::InitArgs;

type KillCallback = Box<dyn FnOnce(&Arc<Agent>) + Send>;

/// Pause of the live loop while the agent sleeps or the kernel is paused.
const IDLE_PAUSE: Duration = Duration::from_millis(1);

/// Runs one heavy agent's whole life cycle on a pool thread.
pub struct ExecutionResource {
    agent: Arc<Agent>,
    init_args: Mutex<Option<InitArgs>>,
    killed: AtomicBool,
    on_killed: Mutex<Vec<KillCallback>>,
}

impl ExecutionResource {
    pub(crate) fn new(agent: Arc<Agent>, init_args: Option<InitArgs>) -> Arc<Self> {
        Arc::new(Self {
            agent,
            init_args: Mutex::new(init_args),
            killed: AtomicBool::new(false),
            on_killed: Mutex::new(Vec::new()),
        })
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Asks the live loop to stop after the current step.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    /// Stops the loop and runs `callback` once the thread has let go of
    /// the agent.
    pub(crate) fn kill_with(&self, callback: KillCallback) {
        self.on_killed.lock().push(callback);
        self.kill();
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    pub(crate) fn run(self: Arc<Self>, kernel: Arc<KernelInner>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_agent(&kernel)));
        if let Err(payload) = outcome {
            let err = AgentError::AgentPanicked(panic_message(payload.as_ref()));
            error!(agent = %self.agent.address(), error = %err, "Execution thread panicked");
            kernel.fire_uncaught_panic(self.agent.address(), &err.to_string());
        }
        self.run_kill_callbacks();
    }

    fn run_agent(&self, kernel: &KernelInner) {
        let agent = &self.agent;
        let provider = agent.provider();

        if !agent.is_migrating() {
            agent.stamp_creation_date();
            let args = self.init_args.lock().take().unwrap_or_default();
            let status = guarded(&provider, || agent.initialize(&args));
            if status.is_failure() {
                status.log();
                if agent.is_kernel() {
                    kernel.set_launched(false);
                }
                kernel.remove_agent_from_kernel(agent);
                return;
            }
        }
        agent.set_migrating(false);

        if agent.is_kernel() {
            kernel.set_launched(true);
            info!(kernel = %agent.address(), "Kernel agent launched");
            kernel.fire_kernel_agent_launched();
        }

        let pause = kernel.config().heavy_loop_pause;
        while !self.is_killed() && agent.state() == LifeState::Alive {
            if kernel.is_paused() || agent.is_sleeping() {
                thread::sleep(IDLE_PAUSE);
                continue;
            }

            let status = guarded(&provider, || agent.behaviour_step());
            if status.is_loggable() {
                status.log();
            }
            if status.is_failure() && status.severity() != Severity::Cancel {
                debug!(agent = %agent.address(), "Failed step stops the agent");
                self.kill();
            }

            if pause.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(pause);
            }
        }

        if !agent.is_migrating() {
            if agent.is_kernel() {
                kernel.set_launched(false);
            }
            kernel.remove_agent_from_kernel(agent);
        }
    }

    fn run_kill_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.on_killed.lock());
        for callback in callbacks {
            callback(&self.agent);
        }
    }
}

impl std::fmt::Debug for ExecutionResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionResource")
            .field("agent", &self.agent.address())
            .field("killed", &self.is_killed())
            .finish()
    }
}
