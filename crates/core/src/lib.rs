pub mod config;
pub mod error;
pub mod id;
pub mod life;
pub mod message;
pub mod status;
pub mod time;

pub use config::KernelConfig;
pub use error::{CoreError, Result};
pub use id::{AgentAddress, MessageId};
pub use life::LifeState;
pub use message::Message;
pub use status::{guarded, MultipleStatus, Severity, Status, StatusCode};
pub use time::Timestamp;
