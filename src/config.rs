// ============================================================================
// Configuration
// ============================================================================
// Paramètres de l'application, fixés dans le code (pas de flags CLI, pas de
// variables d'environnement hormis RUST_LOG pour les logs)
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::models::Asset;

/// Endpoint ticker public de Bitso
pub const BITSO_API: &str = "https://api.bitso.com/v3/ticker/";

/// Devise de cotation (les prix sont exprimés en pesos mexicains)
pub const QUOTE_CURRENCY: &str = "mxn";

/// Limite de requêtes par minute côté Bitso
pub const BITSO_RATE_LIMIT_PER_MINUTE: u32 = 300;

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    /// URL de base de l'API ticker
    pub api_base: String,

    /// Devise de cotation ajoutée au code de l'actif ("btc" + "_mxn")
    pub quote_currency: String,

    /// Intervalle entre deux fetchs d'un même actif
    ///
    /// Contrainte : `assets × 60 / poll_interval` doit rester sous
    /// `rate_limit_per_minute`. Vérifié au démarrage (warning), pas à
    /// l'exécution.
    pub poll_interval: Duration,

    /// Délai entre le lancement de deux pollers (étale les premières requêtes)
    pub startup_stagger: Duration,

    /// Timeout d'une requête HTTP
    pub request_timeout: Duration,

    /// Répertoire des icônes (`<assets_dir>/<code>.ico`)
    pub assets_dir: PathBuf,

    /// Actif affiché au démarrage
    pub default_asset: Asset,

    /// Limite de requêtes par minute imposée par l'API
    pub rate_limit_per_minute: u32,

    /// Titre affiché tant qu'aucune cotation n'est disponible
    pub placeholder_title: String,

    /// Tooltip affiché tant qu'aucune cotation n'est disponible
    pub loading_tooltip: String,
}

impl Config {
    /// Nombre de requêtes par minute générées par les pollers
    pub fn requests_per_minute(&self) -> f64 {
        let secs = self.poll_interval.as_secs_f64();
        if secs == 0.0 {
            return f64::INFINITY;
        }
        Asset::ALL.len() as f64 * 60.0 / secs
    }

    /// Vérifie si la cadence des pollers respecte la limite de l'API
    pub fn within_rate_limit(&self) -> bool {
        self.requests_per_minute() <= f64::from(self.rate_limit_per_minute)
    }

    /// Valide la configuration
    ///
    /// Le dépassement de la limite de requêtes n'est pas une erreur ici :
    /// l'appelant le signale par un warning.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("L'intervalle de polling doit être strictement positif");
        }
        if self.quote_currency.trim().is_empty() {
            bail!("La devise de cotation ne peut pas être vide");
        }
        if self.api_base.trim().is_empty() {
            bail!("L'URL de l'API ne peut pas être vide");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: BITSO_API.to_string(),
            quote_currency: QUOTE_CURRENCY.to_string(),
            poll_interval: Duration::from_secs(10),
            startup_stagger: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
            assets_dir: PathBuf::from("assets"),
            default_asset: Asset::default(),
            rate_limit_per_minute: BITSO_RATE_LIMIT_PER_MINUTE,
            placeholder_title: "Bitso!".to_string(),
            loading_tooltip: "Loading data.".to_string(),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
