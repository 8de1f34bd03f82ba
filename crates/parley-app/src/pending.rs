//! Reply tracking for the typing indicator.
//!
//! Every submit gets a request id. Backends that echo `request_id` on their
//! replies clear exactly the request they answer; backends that do not echo
//! it clear everything outstanding on the next recognized event.

use std::collections::BTreeSet;

/// What the typing indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingIndicator {
    #[default]
    Idle,
    AwaitingReply,
}

#[derive(Debug, Default)]
pub struct PendingReplies {
    next_id: u64,
    outstanding: BTreeSet<u64>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request id without waiting on it.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Allocate an id and mark it as awaiting a reply.
    pub fn begin(&mut self) -> u64 {
        let id = self.next_id();
        self.outstanding.insert(id);
        id
    }

    /// Apply an inbound reply.
    ///
    /// `Some(id)` clears only that request (unknown ids are ignored);
    /// `None` clears every outstanding request.
    pub fn resolve(&mut self, request_id: Option<u64>) {
        match request_id {
            Some(id) => {
                self.outstanding.remove(&id);
            }
            None => self.outstanding.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.outstanding.clear();
    }

    pub fn is_awaiting(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn indicator(&self) -> TypingIndicator {
        if self.is_awaiting() {
            TypingIndicator::AwaitingReply
        } else {
            TypingIndicator::Idle
        }
    }
}
