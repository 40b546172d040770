// ============================================================================
// Module : api
// ============================================================================
// Appels aux APIs externes de cotation
// ============================================================================

use std::future::Future;

use crate::models::{Asset, PriceRecord};

pub mod bitso; // Client pour l'API ticker de Bitso

pub use bitso::{build_ticker_url, parse_ticker, BitsoClient, FetchError};

/// Source de cotations interrogée par les pollers
///
/// CONCEPT RUST : impl Future dans un trait
/// - Le `+ Send` permet de lancer le poller avec tokio::spawn
/// - Les tests branchent une source scriptée à la place de Bitso
pub trait TickerSource: Send + Sync + 'static {
    /// Récupère la cotation courante d'un actif
    fn fetch(&self, asset: Asset) -> impl Future<Output = Result<PriceRecord, FetchError>> + Send;
}

impl TickerSource for BitsoClient {
    fn fetch(&self, asset: Asset) -> impl Future<Output = Result<PriceRecord, FetchError>> + Send {
        self.fetch_ticker(asset)
    }
}
