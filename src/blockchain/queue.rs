//! FIFO queue of pending transactions
//!
//! Producers hold cloneable `PendingQueue` handles; the block assembler owns
//! the single `Inbox`. The backpressure policy is chosen when the queue is
//! created.

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::transaction::Transaction;

/// Errors returned to transaction producers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Pending queue is full (capacity {0})")]
    Full(usize),

    #[error("Pending queue is closed")]
    Closed,
}

/// What happens when producers outpace the miner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpressure {
    /// Never block, never reject; memory is the only limit
    #[default]
    Unbounded,
    /// Hold at most `n` transactions; producers wait for room
    Block(usize),
    /// Hold at most `n` transactions; extra submissions fail with `Full`
    Reject(usize),
}

#[derive(Debug, Clone)]
enum Sender {
    Unbounded(mpsc::UnboundedSender<Transaction>),
    Bounded(mpsc::Sender<Transaction>),
}

/// Producer handle for the pending-transaction queue
#[derive(Debug, Clone)]
pub struct PendingQueue {
    sender: Sender,
    policy: Backpressure,
}

/// Consumer end of the pending-transaction queue
#[derive(Debug)]
pub enum Inbox {
    Unbounded(mpsc::UnboundedReceiver<Transaction>),
    Bounded(mpsc::Receiver<Transaction>),
}

impl PendingQueue {
    /// Creates a queue with the given policy
    ///
    /// # Returns
    ///
    /// The producer handle and the single consumer end
    pub fn new(policy: Backpressure) -> (PendingQueue, Inbox) {
        match policy {
            Backpressure::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                (
                    PendingQueue {
                        sender: Sender::Unbounded(tx),
                        policy,
                    },
                    Inbox::Unbounded(rx),
                )
            }
            Backpressure::Block(capacity) | Backpressure::Reject(capacity) => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (
                    PendingQueue {
                        sender: Sender::Bounded(tx),
                        policy,
                    },
                    Inbox::Bounded(rx),
                )
            }
        }
    }

    pub fn policy(&self) -> Backpressure {
        self.policy
    }

    /// Submits a transaction from synchronous code
    ///
    /// With `Backpressure::Block` this parks the calling thread until there
    /// is room, so it must not be called from inside an async runtime; use
    /// `submit_async` there.
    pub fn submit(&self, transaction: Transaction) -> Result<(), QueueError> {
        match (&self.sender, self.policy) {
            (Sender::Unbounded(tx), _) => tx.send(transaction).map_err(|_| QueueError::Closed),
            (Sender::Bounded(tx), Backpressure::Block(_)) => {
                tx.blocking_send(transaction).map_err(|_| QueueError::Closed)
            }
            (Sender::Bounded(tx), _) => self.try_bounded(tx, transaction),
        }
    }

    /// Submits a transaction, waiting asynchronously for room when bounded
    pub async fn submit_async(&self, transaction: Transaction) -> Result<(), QueueError> {
        match (&self.sender, self.policy) {
            (Sender::Unbounded(tx), _) => tx.send(transaction).map_err(|_| QueueError::Closed),
            (Sender::Bounded(tx), Backpressure::Block(_)) => {
                tx.send(transaction).await.map_err(|_| QueueError::Closed)
            }
            (Sender::Bounded(tx), _) => self.try_bounded(tx, transaction),
        }
    }

    fn try_bounded(&self, tx: &mpsc::Sender<Transaction>, transaction: Transaction) -> Result<(), QueueError> {
        tx.try_send(transaction).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full(tx.max_capacity()),
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

impl Inbox {
    /// Waits for the next transaction on the current thread
    ///
    /// Returns `None` once every producer handle is dropped and the queue is
    /// drained. Must be called outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Transaction> {
        match self {
            Inbox::Unbounded(rx) => rx.blocking_recv(),
            Inbox::Bounded(rx) => rx.blocking_recv(),
        }
    }
}
