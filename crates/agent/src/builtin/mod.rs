pub mod heartbeat;
pub mod relay;

pub use heartbeat::{Beat, HeartbeatAgent, HEARTBEAT_KIND};
pub use relay::RelayAgent;
