// ============================================================================
// Surface du tray
// ============================================================================
// Le toolkit de tray est mono-thread et non réentrant : les tâches n'y
// touchent jamais directement. Elles envoient des TrayUpdate dans une file
// (mpsc, un seul consommateur) que le thread UI applique sur sa surface.
// ============================================================================

use std::sync::mpsc::{Receiver, TryRecvError};

use crate::models::Asset;
use crate::tray::Icon;

/// Modification à appliquer sur le tray
#[derive(Debug, Clone, PartialEq)]
pub enum TrayUpdate {
    /// Icône principale
    Icon(Icon),

    /// Titre principal (ex: "$50,000.5")
    Title(String),

    /// Tooltip principal (ex: "Updated on 12:00:00")
    Tooltip(String),

    /// Label et tooltip de l'item de menu d'un actif
    Item {
        asset: Asset,
        label: String,
        tooltip: String,
    },
}

/// Opérations exposées par un toolkit de tray
pub trait TraySurface {
    fn set_icon(&mut self, icon: Icon);

    fn set_title(&mut self, title: &str);

    fn set_tooltip(&mut self, tooltip: &str);

    fn set_item(&mut self, asset: Asset, label: &str, tooltip: &str);

    /// Applique une modification reçue de la file
    fn apply(&mut self, update: TrayUpdate) {
        match update {
            TrayUpdate::Icon(icon) => self.set_icon(icon),
            TrayUpdate::Title(title) => self.set_title(&title),
            TrayUpdate::Tooltip(tooltip) => self.set_tooltip(&tooltip),
            TrayUpdate::Item { asset, label, tooltip } => self.set_item(asset, &label, &tooltip),
        }
    }
}

/// Applique toutes les modifications en attente, sans bloquer
///
/// Retourne le nombre de modifications appliquées.
pub fn drain_updates<S: TraySurface + ?Sized>(updates: &Receiver<TrayUpdate>, surface: &mut S) -> usize {
    let mut applied = 0;
    loop {
        match updates.try_recv() {
            Ok(update) => {
                surface.apply(update);
                applied += 1;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    applied
}

// ============================================================================
// TrayModel
// ============================================================================

/// Item du menu d'actifs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub asset: Asset,
    pub label: String,
    pub tooltip: String,
}

/// État courant du tray (icône, titre, tooltip, menu)
#[derive(Debug, Clone, PartialEq)]
pub struct TrayModel {
    pub icon: Option<Icon>,
    pub title: String,
    pub tooltip: String,
    pub items: Vec<MenuItem>,
}

impl TrayModel {
    /// Crée le tray initial : un item par actif, nommé d'après l'actif
    pub fn new(assets: &[Asset], title: &str, tooltip: &str) -> Self {
        Self {
            icon: None,
            title: title.to_string(),
            tooltip: tooltip.to_string(),
            items: assets
                .iter()
                .map(|&asset| MenuItem {
                    asset,
                    label: asset.name().to_string(),
                    tooltip: String::new(),
                })
                .collect(),
        }
    }

    /// Item de menu d'un actif
    pub fn item(&self, asset: Asset) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.asset == asset)
    }
}

impl TraySurface for TrayModel {
    fn set_icon(&mut self, icon: Icon) {
        self.icon = Some(icon);
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = tooltip.to_string();
    }

    fn set_item(&mut self, asset: Asset, label: &str, tooltip: &str) {
        if let Some(item) = self.items.iter_mut().find(|item| item.asset == asset) {
            item.label = label.to_string();
            item.tooltip = tooltip.to_string();
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
