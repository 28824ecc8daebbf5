// Blockchain module
//
// This module contains the core ledger implementation including:
// - Block structure and canonical hashing
// - Chain store with snapshot reads
// - Transaction signing and verification (P-256)
// - Proof of work mining engine
// - Pending-transaction queue and the block assembler

pub mod assembler;
pub mod block;
pub mod chain;
pub mod crypto;
pub mod pow;
pub mod queue;
pub mod transaction;

// Re-export main components for easier access
pub use assembler::{AssemblerHandle, AssemblerStats, BlockAssembler};
pub use block::Block;
pub use chain::{Chain, ChainError, ChainStore, ChainWriter};
pub use crypto::{CryptoError, KeyPair};
pub use pow::{MiningStats, ProofOfWork};
pub use queue::{Backpressure, Inbox, PendingQueue, QueueError};
pub use transaction::Transaction;
