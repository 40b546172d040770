// ============================================================================
// Structure : PriceRecord
// ============================================================================
// Dernière cotation connue pour un actif, construite à partir d'une réponse
// de l'API ticker
//
// CONCEPTS RUST :
// 1. Immutabilité : un nouveau fetch produit un nouveau PriceRecord,
//    on ne modifie jamais un record existant
// 2. Option<f64> : l'API envoie des strings, un champ illisible devient None
// ============================================================================

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format fixe de `created_at` côté API (offset toujours "+00:00")
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f+00:00";

/// Format d'affichage de l'heure de mise à jour
const UPDATED_ON_FORMAT: &str = "%H:%M:%S";

/// Cotation d'un actif à un instant donné
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// Carnet d'ordres (ex: "btc_mxn")
    pub book: String,

    /// Dernier prix échangé
    pub last: Option<f64>,

    /// Meilleure offre d'achat
    pub bid: Option<f64>,

    /// Meilleure offre de vente
    pub ask: Option<f64>,

    /// Plus haut sur 24h
    pub high: Option<f64>,

    /// Plus bas sur 24h
    pub low: Option<f64>,

    /// Volume sur 24h
    pub volume: Option<f64>,

    /// Prix moyen pondéré par le volume
    pub vwap: Option<f64>,

    /// Horodatage de la cotation
    pub created_at: Option<DateTime<Utc>>,

    /// Prix affichable (ex: "50,000.5"), vide si `last` est illisible
    pub display_price: String,

    /// Heure affichable (ex: "12:00:00"), vide si `created_at` est illisible
    pub updated_on: String,
}

impl PriceRecord {
    /// Construit un record à partir des champs bruts (strings) de l'API
    ///
    /// Les champs dérivés (display_price, updated_on) sont calculés ici ;
    /// une valeur illisible donne un champ vide, jamais une erreur.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        book: &str,
        last: &str,
        bid: &str,
        ask: &str,
        high: &str,
        low: &str,
        volume: &str,
        vwap: &str,
        created_at: &str,
    ) -> Self {
        let last_value = parse_number(last);
        let created = parse_created_at(created_at);

        Self {
            book: book.to_string(),
            last: last_value,
            bid: parse_number(bid),
            ask: parse_number(ask),
            high: parse_number(high),
            low: parse_number(low),
            volume: parse_number(volume),
            vwap: parse_number(vwap),
            created_at: created,
            display_price: display_price(last_value),
            updated_on: display_time(created),
        }
    }
}

// ============================================================================
// Helpers de parsing et de formatage
// ============================================================================

/// Parse un nombre envoyé sous forme de string ("50000.5")
///
/// Retourne None pour une string vide, illisible, NaN ou infinie.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse `created_at` au format "2023-01-01T12:00:00+00:00"
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), CREATED_AT_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Rend un nombre avec des séparateurs de milliers
///
/// Utilise la représentation décimale la plus courte du f64, puis groupe
/// la partie entière par 3 : 50000.5 -> "50,000.5", -1234.0 -> "-1,234".
pub fn format_thousands(value: f64) -> String {
    let rendered = value.abs().to_string();
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }

    let len = int_part.len();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }

    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }

    out
}

/// Prix affichable, vide sans valeur
fn display_price(last: Option<f64>) -> String {
    last.map(format_thousands).unwrap_or_default()
}

/// Heure affichable (HH:MM:SS), vide sans horodatage
fn display_time(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|dt| dt.format(UPDATED_ON_FORMAT).to_string())
        .unwrap_or_default()
}

// ============================================================================
// Tests unitaires
// ============================================================================
