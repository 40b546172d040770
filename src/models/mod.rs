// ============================================================================
// Module : models
// ============================================================================
// Structures de données : actifs suivis et cotations
// ============================================================================

pub mod asset;        // Liste fixe des actifs (btc, eth, xrp)
pub mod price_record; // Cotation parsée + champs affichables

// Re-exports pour simplifier les imports
pub use asset::{Asset, UnknownAsset};
pub use price_record::{format_thousands, PriceRecord};
