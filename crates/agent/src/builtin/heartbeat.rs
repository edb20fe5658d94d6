use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use holon_core::{Message, Status, Timestamp};

use crate::context::AgentContext;
use crate::traits::Activable;

pub const HEARTBEAT_KIND: &str = "heartbeat";

/// Payload of a `heartbeat` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub origin: String,
    pub beat: u64,
    pub timestamp: u64,
}

/// Broadcasts a `heartbeat` message to every agent once per interval.
pub struct HeartbeatAgent {
    interval: Duration,
    max_beats: Option<u64>,
    beats: u64,
    last_heartbeat: Option<Timestamp>,
}

impl HeartbeatAgent {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_beats: None,
            beats: 0,
            last_heartbeat: None,
        }
    }

    /// Ends the agent after `max_beats` heartbeats.
    pub fn with_max_beats(mut self, max_beats: u64) -> Self {
        self.max_beats = Some(max_beats);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn last_heartbeat(&self) -> Option<Timestamp> {
        self.last_heartbeat
    }

    fn is_done(&self) -> bool {
        self.max_beats.is_some_and(|max| self.beats >= max)
    }
}

impl Default for HeartbeatAgent {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Activable for HeartbeatAgent {
    fn activate(&mut self, ctx: &AgentContext<'_>, _args: &[Value]) -> Status {
        ctx.agent().set_broadcast_feedback(false);
        debug!(
            agent = %ctx.address(),
            interval_ms = self.interval.as_millis() as u64,
            "HeartbeatAgent activated"
        );
        Status::ok()
    }

    fn live(&mut self, ctx: &AgentContext<'_>) -> Status {
        if self.is_done() {
            return ctx.kill_me();
        }

        let now = Timestamp::now();
        self.beats += 1;
        self.last_heartbeat = Some(now);
        let beat = Beat {
            origin: ctx.address().to_string(),
            beat: self.beats,
            timestamp: now.as_millis(),
        };
        let message = match Message::new(HEARTBEAT_KIND).with_json(&beat) {
            Ok(message) => message,
            Err(err) => return Status::failure(err.to_string()).with_provider(ctx.address().to_string()),
        };
        ctx.broadcast(message, &[]);
        debug!(agent = %ctx.address(), beat = self.beats, "Heartbeat emitted");

        if self.is_done() {
            return ctx.kill_me();
        }
        ctx.sleep(self.interval);
        Status::ok()
    }

    fn end(&mut self, ctx: &AgentContext<'_>) -> Status {
        debug!(agent = %ctx.address(), beats = self.beats, "HeartbeatAgent stopping");
        Status::ok()
    }
}
