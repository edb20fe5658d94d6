use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POOL_KEEP_ALIVE: Duration = Duration::from_secs(60);
pub const DEFAULT_TIMER_THREADS: usize = 2;

/// Kernel-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Suicide default for agents that never chose: `true` keeps them alive
    /// once they have nothing left to do.
    pub agent_keep_alive: bool,
    /// Delay before a stuck kernel kill falls back to `shutdown_now`.
    #[serde(with = "millis")]
    pub kill_timeout: Duration,
    /// Idle keep-alive of heavy-agent pool threads.
    #[serde(with = "millis")]
    pub pool_keep_alive: Duration,
    pub timer_threads: usize,
    pub buffered_mailboxes: bool,
    /// Pause between two live steps of a heavy agent. Zero only yields.
    #[serde(with = "millis")]
    pub heavy_loop_pause: Duration,
    pub application_name: Option<String>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            agent_keep_alive: false,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
            pool_keep_alive: DEFAULT_POOL_KEEP_ALIVE,
            timer_threads: DEFAULT_TIMER_THREADS,
            buffered_mailboxes: false,
            heavy_loop_pause: Duration::ZERO,
            application_name: None,
        }
    }
}

impl KernelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `HOLON_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("HOLON_AGENT_KEEP_ALIVE") {
            config.agent_keep_alive = parse_env("HOLON_AGENT_KEEP_ALIVE", &value)?;
        }
        if let Some(value) = lookup("HOLON_KERNEL_KILL_TIMEOUT_MS") {
            config.kill_timeout =
                Duration::from_millis(parse_env("HOLON_KERNEL_KILL_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = lookup("HOLON_POOL_KEEP_ALIVE_SECS") {
            config.pool_keep_alive =
                Duration::from_secs(parse_env("HOLON_POOL_KEEP_ALIVE_SECS", &value)?);
        }
        if let Some(value) = lookup("HOLON_BUFFERED_MAILBOXES") {
            config.buffered_mailboxes = parse_env("HOLON_BUFFERED_MAILBOXES", &value)?;
        }
        if let Some(value) = lookup("HOLON_APPLICATION_NAME") {
            let value = value.trim();
            if !value.is_empty() {
                config.application_name = Some(value.to_string());
            }
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_agent_keep_alive(mut self, keep_alive: bool) -> Self {
        self.agent_keep_alive = keep_alive;
        self
    }

    #[must_use]
    pub fn with_kill_timeout(mut self, timeout: Duration) -> Self {
        self.kill_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_pool_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.pool_keep_alive = keep_alive;
        self
    }

    #[must_use]
    pub fn with_timer_threads(mut self, threads: usize) -> Self {
        self.timer_threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_buffered_mailboxes(mut self, buffered: bool) -> Self {
        self.buffered_mailboxes = buffered;
        self
    }

    #[must_use]
    pub fn with_heavy_loop_pause(mut self, pause: Duration) -> Self {
        self.heavy_loop_pause = pause;
        self
    }

    #[must_use]
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| CoreError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
