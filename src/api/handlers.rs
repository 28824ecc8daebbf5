use actix_web::{web, HttpResponse, Responder};

use crate::blockchain::ChainStore;

/// Shared read handle to the chain
pub type ChainData = web::Data<ChainStore>;

/// Get the full blockchain
///
/// Returns every block in chain order, read from a single snapshot so a
/// block being appended concurrently is either fully present or absent.
pub async fn get_chain(store: ChainData) -> impl Responder {
    let chain = store.snapshot();
    HttpResponse::Ok().json(chain.blocks())
}
