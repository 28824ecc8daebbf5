// API module
//
// This module contains the read-only HTTP surface of the ledger

pub mod handlers;
pub mod routes;

// Re-export main components for easier access
pub use routes::configure_routes;
