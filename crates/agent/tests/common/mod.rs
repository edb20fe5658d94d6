#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use holon_agent::prelude::*;
use parking_lot::Mutex;
use serde_json::Value;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn kernel() -> Kernel {
    init_tracing();
    Kernel::builder().keep_alive(true).start().unwrap()
}

/// Counts its live steps and never reads its mailbox. Ends itself after
/// `limit` steps when one is set.
#[derive(Default)]
pub struct Probe {
    pub lives: Arc<AtomicUsize>,
    pub limit: Option<usize>,
}

impl Probe {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let probe = Self::default();
        let lives = probe.lives.clone();
        (probe, lives)
    }

    pub fn limited(limit: usize) -> (Self, Arc<AtomicUsize>) {
        let (mut probe, lives) = Self::new();
        probe.limit = Some(limit);
        (probe, lives)
    }
}

impl Activable for Probe {
    fn live(&mut self, ctx: &AgentContext<'_>) -> Status {
        let lives = self.lives.fetch_add(1, Ordering::SeqCst) + 1;
        if self.limit.is_some_and(|limit| lives >= limit) {
            return ctx.kill_me();
        }
        Status::ok()
    }
}

/// Moves every received message into a shared inbox.
pub struct Collector {
    pub inbox: Arc<Mutex<Vec<Message>>>,
}

impl Collector {
    pub fn new() -> (Self, Arc<Mutex<Vec<Message>>>) {
        let inbox = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inbox: inbox.clone(),
            },
            inbox,
        )
    }
}

impl Activable for Collector {
    fn live(&mut self, ctx: &AgentContext<'_>) -> Status {
        while let Some(message) = ctx.take_message() {
            self.inbox.lock().push(message);
        }
        Status::ok()
    }
}

/// Fails its activation.
pub struct Refusing;

impl Activable for Refusing {
    fn activate(&mut self, _ctx: &AgentContext<'_>, _args: &[Value]) -> Status {
        Status::failure("not today")
    }

    fn live(&mut self, _ctx: &AgentContext<'_>) -> Status {
        Status::ok()
    }
}

pub fn launch_light(kernel: &Kernel, behaviour: impl Activable + 'static) -> Arc<Agent> {
    let agent = Agent::new(behaviour);
    assert!(kernel
        .launch_light_agent(agent.clone(), LaunchOptions::new())
        .is_success());
    assert!(wait_for(TIMEOUT, || agent.is_alive()));
    agent
}

pub fn launch_heavy(kernel: &Kernel, behaviour: impl Activable + 'static) -> Arc<Agent> {
    let agent = Agent::new(behaviour);
    assert!(kernel
        .launch_heavy_agent(agent.clone(), LaunchOptions::new())
        .is_success());
    assert!(wait_for(TIMEOUT, || agent.is_alive()));
    agent
}
