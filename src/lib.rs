//! Single-node proof-of-work ledger
//!
//! Signed transactions enter a FIFO queue, a single miner thread turns each
//! one into a proof-of-work block, and readers take consistent snapshots of
//! the chain at any time. `GET /chain` exposes the snapshot over HTTP.

pub mod api;
pub mod blockchain;
pub mod config;

pub use blockchain::{
    AssemblerHandle, AssemblerStats, Backpressure, Block, BlockAssembler, Chain, ChainError,
    ChainStore, ChainWriter, CryptoError, KeyPair, MiningStats, PendingQueue, ProofOfWork,
    QueueError, Transaction,
};
pub use config::Config;
