use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use pow_ledger::api;
use pow_ledger::{BlockAssembler, Chain, ChainStore, Config, KeyPair, PendingQueue, Transaction};

// Sign a demo transaction with a fresh key pair so the miner has work on startup
fn bootstrap_transaction() -> anyhow::Result<Transaction> {
    let keys = KeyPair::generate();
    let transaction = Transaction::signed("alice", "bob", 1000, &keys)
        .context("failed to sign bootstrap transaction")?;

    info!("Bootstrap signer public key: {}", hex::encode(keys.public_key()));
    Ok(transaction)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::parse();
    let pow = config.proof_of_work();

    // Create the chain with a mined genesis block
    let (store, writer) = ChainStore::new(Chain::genesis(&pow));

    // Start the single miner
    let (queue, inbox) = PendingQueue::new(config.backpressure());
    info!("Pending queue policy: {:?}", queue.policy());
    let miner = BlockAssembler::new(inbox, writer, pow)
        .spawn()
        .context("failed to start miner thread")?;

    queue.submit_async(bootstrap_transaction()?).await?;

    let chain = web::Data::new(store);
    info!("Starting HTTP server at http://{}:{}/chain", config.host, config.port);

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(chain.clone())
            .configure(api::configure_routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    // Closing the queue lets the miner finish its current block and exit
    drop(queue);
    match tokio::task::spawn_blocking(move || miner.join()).await? {
        Ok(stats) => info!("Miner stopped: {} blocks mined, {} rejected", stats.mined, stats.rejected),
        Err(_) => warn!("Miner thread panicked"),
    }

    Ok(())
}
