//! Per-observer outgoing message queue.
//!
//! Messages are produced from two places: the orchestrator thread queues
//! control messages during pre-sync, and the observer's own encode task
//! queues the tick's synchronization bytes. A lock-free channel absorbs both
//! without contending with the encode fan-out; post-sync drains it into the
//! transport in FIFO order.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TryIter};

use crate::util::position::ChunkPoint;

/// Message owed to one observer's client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    /// This tick's synchronization byte run.
    SyncUpdate(Arc<[u8]>),
    /// The client must rebase its viewport on a new anchor chunk.
    ViewportRefresh { anchor: ChunkPoint },
}

#[derive(Debug)]
pub struct MessageQueue {
    tx: Sender<OutgoingMessage>,
    rx: Receiver<OutgoingMessage>,
}

impl MessageQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn push(&self, message: OutgoingMessage) {
        // The receiver lives in this struct, so the channel cannot
        // disconnect while `self` exists.
        let _ = self.tx.send(message);
    }

    /// Drains queued messages without blocking.
    pub fn drain(&self) -> TryIter<'_, OutgoingMessage> {
        self.rx.try_iter()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}
