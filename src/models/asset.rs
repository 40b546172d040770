// ============================================================================
// Enum : Asset
// ============================================================================
// Liste fixe des cryptomonnaies suivies (compilée, non configurable)
//
// CONCEPTS RUST :
// 1. Enum Copy + Hash : utilisable directement comme clé de HashMap
// 2. FromStr : parsing "btc" -> Asset::Btc
// 3. Display : affiche le code utilisé dans l'URL et les fichiers d'icône
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cryptomonnaie suivie par le tray
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Bitcoin (actif affiché au démarrage)
    #[default]
    Btc,
    /// Ethereum
    Eth,
    /// Ripple
    Xrp,
}

impl Asset {
    /// Tous les actifs suivis, dans l'ordre du menu
    pub const ALL: [Asset; 3] = [Asset::Btc, Asset::Eth, Asset::Xrp];

    /// Code de l'actif (ex: "btc"), utilisé dans l'URL et le nom de l'icône
    pub fn code(&self) -> &'static str {
        match self {
            Asset::Btc => "btc",
            Asset::Eth => "eth",
            Asset::Xrp => "xrp",
        }
    }

    /// Nom complet affiché dans le menu avant le premier fetch
    pub fn name(&self) -> &'static str {
        match self {
            Asset::Btc => "Bitcoin",
            Asset::Eth => "Ethereum",
            Asset::Xrp => "Ripple",
        }
    }

    /// Label court pour les items du menu (ex: "Btc: $1,234.5")
    pub fn short_label(&self) -> &'static str {
        match self {
            Asset::Btc => "Btc",
            Asset::Eth => "Eth",
            Asset::Xrp => "Xrp",
        }
    }

    /// Position dans le menu (0-based)
    pub fn index(&self) -> usize {
        Asset::ALL
            .iter()
            .position(|a| a == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Erreur de parsing d'un code d'actif inconnu
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("actif inconnu : {0}")]
pub struct UnknownAsset(pub String);

impl FromStr for Asset {
    type Err = UnknownAsset;

    /// Parse un code d'actif sans tenir compte de la casse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Asset::ALL
            .into_iter()
            .find(|a| a.code() == code)
            .ok_or_else(|| UnknownAsset(s.to_string()))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
