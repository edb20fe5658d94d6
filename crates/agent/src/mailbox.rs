use std::collections::VecDeque;

use parking_lot::Mutex;

use holon_core::Message;

/// Per-agent inbound message queue.
///
/// A buffered mailbox holds new messages aside until the owner's next
/// [`Mailbox::sync`], so a behaviour step sees a stable inbox.
#[derive(Debug, Default)]
pub struct Mailbox {
    buffered: bool,
    inbox: Mutex<VecDeque<Message>>,
    incoming: Mutex<Vec<Message>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffered() -> Self {
        Self {
            buffered: true,
            ..Self::default()
        }
    }

    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    pub fn add(&self, message: Message) -> bool {
        if self.buffered {
            self.incoming.lock().push(message);
        } else {
            self.inbox.lock().push_back(message);
        }
        true
    }

    pub fn sync(&self) {
        if !self.buffered {
            return;
        }
        let incoming = std::mem::take(&mut *self.incoming.lock());
        if !incoming.is_empty() {
            self.inbox.lock().extend(incoming);
        }
    }

    pub fn take(&self) -> Option<Message> {
        self.inbox.lock().pop_front()
    }

    /// Takes the oldest message of the given kind.
    pub fn take_kind(&self, kind: &str) -> Option<Message> {
        let mut inbox = self.inbox.lock();
        let index = inbox.iter().position(|m| m.is_kind(kind))?;
        inbox.remove(index)
    }

    pub fn peek(&self) -> Option<Message> {
        self.inbox.lock().front().cloned()
    }

    pub fn drain(&self) -> Vec<Message> {
        self.inbox.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inbox.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbox.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inbox.lock().clear();
        self.incoming.lock().clear();
    }
}
