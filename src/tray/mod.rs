// ============================================================================
// Module : tray
// ============================================================================
// Présentation du prix dans le tray : icône, titre, tooltip et menu d'actifs
// ============================================================================

use std::path::PathBuf;

use crate::models::Asset;

pub mod clicks;    // Un canal de clic par actif + tâche d'écoute
pub mod icon;      // Chargement des icônes par actif
pub mod presenter; // Rendu de l'état partagé vers le tray
pub mod surface;   // File de modifications + TraySurface

pub use clicks::{click_channels, ClickListener, ClickSenders};
pub use icon::{Icon, IconLoader};
pub use presenter::{Presenter, TrayView};
pub use surface::{drain_updates, MenuItem, TrayModel, TraySurface, TrayUpdate};

/// Erreurs de rendu du tray, toutes récupérées localement
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    /// Fichier d'icône absent ou illisible
    #[error("icône introuvable {} : {source}", .path.display())]
    MissingAsset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendu demandé avant le premier fetch réussi de l'actif
    #[error("aucune cotation disponible pour {0}")]
    EmptyStore(Asset),
}
