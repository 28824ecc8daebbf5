//! Startup parameters
//!
//! Every flag can also be given through a `POW_LEDGER_*` environment variable.

use clap::Parser;
use std::time::Duration;

use crate::blockchain::{Backpressure, ProofOfWork};

#[derive(Debug, Clone, Parser)]
#[command(name = "pow_ledger")]
#[command(about = "A single-node proof-of-work ledger", long_about = None)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "POW_LEDGER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "POW_LEDGER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Leading zero hex digits required in a block hash
    #[arg(long, env = "POW_LEDGER_DIFFICULTY", default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(1..=64))]
    pub difficulty: u8,

    /// Pause after each failed mining attempt, in milliseconds
    #[arg(long, env = "POW_LEDGER_THROTTLE_MS", default_value_t = 1)]
    pub throttle_ms: u64,

    /// Bound the pending queue to this many transactions (unbounded if unset)
    #[arg(long, env = "POW_LEDGER_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// With a bounded queue, reject submissions instead of waiting for room
    #[arg(long, env = "POW_LEDGER_REJECT_WHEN_FULL", requires = "queue_capacity")]
    pub reject_when_full: bool,
}

impl Config {
    pub fn backpressure(&self) -> Backpressure {
        match (self.queue_capacity, self.reject_when_full) {
            (None, _) => Backpressure::Unbounded,
            (Some(capacity), false) => Backpressure::Block(capacity),
            (Some(capacity), true) => Backpressure::Reject(capacity),
        }
    }

    pub fn proof_of_work(&self) -> ProofOfWork {
        ProofOfWork::new(self.difficulty as usize, Duration::from_millis(self.throttle_ms))
    }
}
