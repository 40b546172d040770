// ============================================================================
// Icônes du tray
// ============================================================================
// Une icône par actif : <assets_dir>/<code>.ico
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::models::Asset;
use crate::tray::TrayError;

/// Contenu d'un fichier d'icône
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// Actif représenté
    pub asset: Asset,

    /// Fichier d'origine
    pub path: PathBuf,

    /// Octets bruts du fichier (.ico)
    pub bytes: Arc<[u8]>,
}

impl Icon {
    /// Taille du fichier en octets
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Vérifie si le fichier est vide
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Charge les icônes depuis le répertoire d'assets
///
/// Les icônes lues avec succès sont gardées en cache ; un fichier absent est
/// relu au prochain rendu.
#[derive(Debug, Clone)]
pub struct IconLoader {
    dir: PathBuf,
    cache: Arc<Mutex<HashMap<Asset, Icon>>>,
}

impl IconLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Répertoire des icônes
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Chemin de l'icône d'un actif (ex: assets/btc.ico)
    pub fn path_for(&self, asset: Asset) -> PathBuf {
        self.dir.join(format!("{}.ico", asset.code()))
    }

    /// Charge l'icône d'un actif
    pub fn load(&self, asset: Asset) -> Result<Icon, TrayError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(icon) = cache.get(&asset) {
            return Ok(icon.clone());
        }

        let path = self.path_for(asset);
        let bytes = std::fs::read(&path).map_err(|source| TrayError::MissingAsset {
            path: path.clone(),
            source,
        })?;
        debug!(asset = %asset, path = %path.display(), size = bytes.len(), "Icon loaded");

        let icon = Icon {
            asset,
            path,
            bytes: bytes.into(),
        };
        cache.insert(asset, icon.clone());
        Ok(icon)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
