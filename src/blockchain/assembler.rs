//! Block assembly pipeline
//!
//! A single "miner" thread drains the pending queue in FIFO order. Each
//! transaction is authenticated, wrapped in a candidate block on top of the
//! current tail, mined and appended. Only this thread holds the
//! `ChainWriter`, so appends can never interleave.

use log::{error, info, warn};
use std::io;
use std::thread::{self, JoinHandle};

use super::block::Block;
use super::chain::ChainWriter;
use super::pow::ProofOfWork;
use super::queue::Inbox;
use super::transaction::Transaction;

/// Outcome counters for one assembler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Blocks mined and appended
    pub mined: u64,
    /// Transactions dropped because they failed authentication
    pub rejected: u64,
}

/// Builds one block per pending transaction
#[derive(Debug)]
pub struct BlockAssembler {
    inbox: Inbox,
    writer: ChainWriter,
    pow: ProofOfWork,
    stats: AssemblerStats,
}

/// Handle to the running miner thread
#[derive(Debug)]
pub struct AssemblerHandle {
    thread: JoinHandle<AssemblerStats>,
}

impl AssemblerHandle {
    /// Waits for the miner to drain the queue and stop
    ///
    /// The miner stops only after every `PendingQueue` handle is dropped.
    pub fn join(self) -> thread::Result<AssemblerStats> {
        self.thread.join()
    }
}

impl BlockAssembler {
    pub fn new(inbox: Inbox, writer: ChainWriter, pow: ProofOfWork) -> Self {
        BlockAssembler {
            inbox,
            writer,
            pow,
            stats: AssemblerStats::default(),
        }
    }

    /// Starts the miner on its own OS thread
    ///
    /// Mining is CPU-bound and blocks for the whole search, so it never runs
    /// on the async runtime.
    pub fn spawn(self) -> io::Result<AssemblerHandle> {
        let thread = thread::Builder::new()
            .name("miner".to_string())
            .spawn(move || self.run())?;

        Ok(AssemblerHandle { thread })
    }

    /// Processes transactions until the queue closes
    pub fn run(mut self) -> AssemblerStats {
        info!(
            "Block assembler started (difficulty {}, throttle {:?})",
            self.pow.difficulty(),
            self.pow.throttle()
        );

        while let Some(transaction) = self.inbox.blocking_recv() {
            self.process(transaction);
        }

        info!(
            "Pending queue closed; block assembler stopping ({} mined, {} rejected)",
            self.stats.mined, self.stats.rejected
        );
        self.stats
    }

    /// Handles a single dequeued transaction
    fn process(&mut self, transaction: Transaction) {
        info!(
            "New transaction received ({} -> {}, {})",
            transaction.from, transaction.to, transaction.amount
        );

        if let Err(err) = transaction.authenticate() {
            let kind = if err.is_malformed() { "malformed" } else { "unauthenticated" };
            warn!(
                "Rejecting {} transaction {} -> {}: {}",
                kind, transaction.from, transaction.to, err
            );
            self.stats.rejected += 1;
            return;
        }

        info!("Transaction authenticated, starting to mine");
        let tail = self.writer.tail();
        let mut block = Block::new(tail.index + 1, vec![transaction], tail.hash);
        self.pow.mine(&mut block);

        let index = block.index;
        match self.writer.append(block) {
            Ok(()) => {
                self.stats.mined += 1;
                info!("Appended block {}", index);
            }
            // Unreachable while this thread is the only writer
            Err(err) => error!("Failed to append block {}: {}", index, err),
        }
    }
}
