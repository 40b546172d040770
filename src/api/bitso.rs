// ============================================================================
// API Client : Bitso
// ============================================================================
// Récupère la dernière cotation d'un actif depuis l'API ticker de Bitso
//
// GET https://api.bitso.com/v3/ticker/?book=btc_mxn
// {
//   "success": true,
//   "payload": { "high": "...", "last": "...", "created_at": "...", ... }
// }
//
// Tous les champs numériques arrivent sous forme de strings.
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::models::{Asset, PriceRecord};

// ============================================================================
// Erreurs
// ============================================================================

/// Échec d'un fetch ticker
///
/// Aucune de ces erreurs n'est fatale : le poller les logue et réessaie au
/// tick suivant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Erreur réseau (DNS, connexion refusée, timeout)
    #[error("erreur réseau : {0}")]
    Transport(String),

    /// Statut HTTP d'erreur avec un corps illisible
    #[error("l'API a retourné une erreur : HTTP {0}")]
    Status(u16),

    /// Corps JSON invalide ou enveloppe inattendue
    #[error("réponse illisible : {0}")]
    Decode(String),

    /// Enveloppe valide mais `success: false`
    #[error("requête refusée par l'API : {0}")]
    Rejected(String),
}

impl FetchError {
    /// Nom court du type d'erreur, pour les logs structurés
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Decode(_) => "decode",
            FetchError::Rejected(_) => "rejected",
        }
    }
}

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================

/// Enveloppe de réponse : flag de succès + payload
#[derive(Debug, Deserialize)]
struct TickerEnvelope {
    success: bool,
    #[serde(default)]
    payload: Option<TickerPayload>,
    #[serde(default)]
    error: Option<ApiError>,
}

/// Détail d'erreur renvoyé quand `success` vaut false
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    code: String,
    message: String,
}

/// Cotation brute
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TickerPayload {
    book: String,
    high: String,
    last: String,
    created_at: String,
    volume: String,
    vwap: String,
    low: String,
    ask: String,
    bid: String,
}

impl TickerPayload {
    fn into_record(self) -> PriceRecord {
        PriceRecord::from_raw(
            &self.book,
            &self.last,
            &self.bid,
            &self.ask,
            &self.high,
            &self.low,
            &self.volume,
            &self.vwap,
            &self.created_at,
        )
    }
}

/// Décode le corps d'une réponse ticker en PriceRecord
///
/// - JSON invalide ou payload absent -> `FetchError::Decode`
/// - `success: false` -> `FetchError::Rejected`
pub fn parse_ticker(body: &[u8]) -> Result<PriceRecord, FetchError> {
    let envelope: TickerEnvelope =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if !envelope.success {
        let reason = match envelope.error {
            Some(err) if !err.message.is_empty() => format!("{} ({})", err.message, err.code),
            _ => "success=false".to_string(),
        };
        return Err(FetchError::Rejected(reason));
    }

    let payload = envelope
        .payload
        .ok_or_else(|| FetchError::Decode("payload manquant".to_string()))?;

    Ok(payload.into_record())
}

/// Construit l'URL ticker d'un actif
///
/// Concatène l'URL de base, le code de l'actif et la devise de cotation :
/// "https://api.bitso.com/v3/ticker/" + "?book=" + "btc" + "_mxn"
pub fn build_ticker_url(api_base: &str, asset: Asset, quote_currency: &str) -> String {
    format!("{}?book={}_{}", api_base, asset.code(), quote_currency)
}

// ============================================================================
// Client HTTP
// ============================================================================

/// Client de l'API ticker, partagé par tous les pollers
#[derive(Debug, Clone)]
pub struct BitsoClient {
    http: reqwest::Client,
    api_base: String,
    quote_currency: String,
}

impl BitsoClient {
    /// Crée le client HTTP (timeout + User-Agent) à partir de la config
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bitso-tray/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            quote_currency: config.quote_currency.clone(),
        })
    }

    /// URL ticker de l'actif
    pub fn ticker_url(&self, asset: Asset) -> String {
        build_ticker_url(&self.api_base, asset, &self.quote_currency)
    }

    /// Récupère la cotation courante d'un actif
    #[instrument(skip_all, fields(asset = %asset))]
    pub async fn fetch_ticker(&self, asset: Asset) -> Result<PriceRecord, FetchError> {
        let url = self.ticker_url(asset);
        debug!(url = %url, "Sending ticker request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        match parse_ticker(&body) {
            Ok(record) => {
                info!(last = %record.display_price, created = %record.updated_on, "Ticker fetched");
                Ok(record)
            }
            Err(FetchError::Decode(reason)) if !status.is_success() => {
                warn!(status = %status, reason = %reason, "Error status with undecodable body");
                Err(FetchError::Status(status.as_u16()))
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
