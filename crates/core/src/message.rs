use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::id::{AgentAddress, MessageId};
use crate::time::Timestamp;

/// A message exchanged between agents.
///
/// `sender`, `receiver` and `creation_date` are stamped by the router when
/// the message is sent; callers normally leave them unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub kind: String,
    pub payload: Vec<u8>,
    pub sender: Option<AgentAddress>,
    pub receiver: Option<AgentAddress>,
    pub creation_date: Option<Timestamp>,
    /// Number of times the message was forwarded.
    pub hops: u32,
}

impl Message {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            kind: kind.into(),
            payload: Vec::new(),
            sender: None,
            receiver: None,
            creation_date: None,
            hops: 0,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> serde_json::Result<Self> {
        self.payload = serde_json::to_vec(value)?;
        Ok(self)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Copy for a new receiver: fresh id, routing fields cleared except the sender.
    pub fn forwarded(&self) -> Self {
        Self {
            id: MessageId::generate(),
            kind: self.kind.clone(),
            payload: self.payload.clone(),
            sender: self.sender,
            receiver: None,
            creation_date: None,
            hops: self.hops.saturating_add(1),
        }
    }
}
