// ============================================================================
// État partagé : AppState
// ============================================================================
// Regroupe l'état global lu et écrit par les différentes tâches :
// - PriceStore : dernière cotation par actif (écrit par les pollers)
// - Selection : actif affiché dans le tray (écrit par les clics)
//
// CONCEPTS RUST :
// 1. Arc<AppState> : un seul état partagé entre tâches tokio et thread UI
// 2. RwLock : lectures concurrentes, écritures exclusives
// 3. Arc<PriceRecord> : remplacement atomique d'une entrée ; un lecteur voit
//    l'ancien record ou le nouveau, jamais un record à moitié écrit
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{Asset, PriceRecord};

// ============================================================================
// PriceStore
// ============================================================================

/// Dernière cotation connue par actif (pas d'historique)
///
/// Chaque poller n'écrit que sa propre clé ; le tray lit n'importe quelle clé.
#[derive(Debug, Default)]
pub struct PriceStore {
    records: RwLock<HashMap<Asset, Arc<PriceRecord>>>,
}

impl PriceStore {
    /// Crée un store vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la cotation d'un actif, retourne l'ancienne
    ///
    /// Un lock empoisonné (panic d'un autre thread pendant l'écriture) est
    /// récupéré : la map ne contient que des Arc complets.
    pub fn replace(&self, asset: Asset, record: PriceRecord) -> Option<Arc<PriceRecord>> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(asset, Arc::new(record))
    }

    /// Dernière cotation d'un actif (None si aucun fetch n'a encore réussi)
    pub fn get(&self, asset: Asset) -> Option<Arc<PriceRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.get(&asset).cloned()
    }

    /// Nombre d'actifs ayant au moins une cotation
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Vérifie si aucune cotation n'est encore disponible
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Actif actuellement affiché dans le tray
#[derive(Debug, Default)]
pub struct Selection {
    current: RwLock<Asset>,
}

impl Selection {
    /// Crée la sélection avec l'actif par défaut
    pub fn new(initial: Asset) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Actif sélectionné
    pub fn current(&self) -> Asset {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change l'actif sélectionné, retourne le précédent
    pub fn set(&self, asset: Asset) -> Asset {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, asset)
    }
}

// ============================================================================
// AppState
// ============================================================================

/// État partagé de l'application
#[derive(Debug, Default)]
pub struct AppState {
    /// Cotations par actif
    pub store: PriceStore,

    /// Actif affiché
    pub selection: Selection,
}

impl AppState {
    /// Crée l'état initial avec l'actif affiché par défaut
    pub fn new(default_asset: Asset) -> Self {
        Self {
            store: PriceStore::new(),
            selection: Selection::new(default_asset),
        }
    }

    /// Cotation de l'actif sélectionné, si disponible
    pub fn selected_record(&self) -> (Asset, Option<Arc<PriceRecord>>) {
        let asset = self.selection.current();
        (asset, self.store.get(asset))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
