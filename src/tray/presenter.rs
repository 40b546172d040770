// ============================================================================
// Tray Presenter
// ============================================================================
// Transforme l'état partagé (sélection + cotations) en modifications du tray
//
// Déclencheurs :
// - après chaque écriture d'un poller dans le PriceStore
// - après chaque changement de sélection (clic sur un item du menu)
//
// Le presenter lit lui-même la sélection : un poller peut demander un rendu
// sans savoir si son actif est celui affiché.
//
// Lecture de l'état et envoi des TrayUpdate se font sous un même verrou,
// partagé par tous les clones : les rendus arrivent dans la file dans
// l'ordre où ils ont lu la sélection.
// ============================================================================

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::config::Config;
use crate::models::{Asset, PriceRecord};
use crate::tray::{Icon, IconLoader, TrayError, TrayUpdate};

/// Résultat d'un rendu du tray principal
#[derive(Debug, Clone, PartialEq)]
pub struct TrayView {
    /// Actif rendu
    pub asset: Asset,

    /// Icône appliquée (None si le fichier est introuvable)
    pub icon: Option<Icon>,

    pub title: String,

    pub tooltip: String,
}

/// Titre principal pour une cotation (ex: "$50,000.5")
pub fn title_for(record: &PriceRecord) -> String {
    format!("${}", record.display_price)
}

/// Tooltip pour une cotation (ex: "Updated on 12:00:00")
pub fn tooltip_for(record: &PriceRecord) -> String {
    format!("Updated on {}", record.updated_on)
}

/// Label de l'item de menu d'un actif (ex: "Btc: $50,000.5")
pub fn item_label_for(asset: Asset, record: &PriceRecord) -> String {
    format!("{}: ${}", asset.short_label(), record.display_price)
}

/// Rendu du tray à partir de l'état partagé
#[derive(Debug, Clone)]
pub struct Presenter {
    state: Arc<AppState>,
    icons: IconLoader,
    updates: Sender<TrayUpdate>,
    render_lock: Arc<Mutex<()>>,
    placeholder_title: String,
    loading_tooltip: String,
}

impl Presenter {
    /// Crée un presenter qui pousse ses modifications dans `updates`
    pub fn new(state: Arc<AppState>, config: &Config, updates: Sender<TrayUpdate>) -> Self {
        Self {
            state,
            icons: IconLoader::new(config.assets_dir.clone()),
            updates,
            render_lock: Arc::new(Mutex::new(())),
            placeholder_title: config.placeholder_title.clone(),
            loading_tooltip: config.loading_tooltip.clone(),
        }
    }

    /// Crée un presenter et la file consommée par le thread UI
    pub fn channel(state: Arc<AppState>, config: &Config) -> (Self, Receiver<TrayUpdate>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(state, config, tx), rx)
    }

    /// État partagé lu par le presenter
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Sélectionne un actif puis redessine le tray
    pub fn select_asset(&self, asset: Asset) -> TrayView {
        let _guard = self.lock_render();
        let previous = self.state.selection.set(asset);
        info!(from = %previous, to = %asset, "Asset selected");
        self.render_locked()
    }

    /// Redessine l'icône, le titre et le tooltip de l'actif sélectionné
    ///
    /// Sans cotation pour cet actif, affiche le placeholder et "Loading data.".
    pub fn render(&self) -> TrayView {
        let _guard = self.lock_render();
        self.render_locked()
    }

    fn lock_render(&self) -> MutexGuard<'_, ()> {
        self.render_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rendu à appeler avec `render_lock` tenu
    fn render_locked(&self) -> TrayView {
        let (asset, record) = self.state.selected_record();

        let (title, tooltip) = match record.ok_or(TrayError::EmptyStore(asset)) {
            Ok(record) => (title_for(&record), tooltip_for(&record)),
            Err(e) => {
                debug!(reason = %e, "Rendering placeholder");
                (self.placeholder_title.clone(), self.loading_tooltip.clone())
            }
        };

        let icon = match self.icons.load(asset) {
            Ok(icon) => {
                self.send(TrayUpdate::Icon(icon.clone()));
                Some(icon)
            }
            Err(e) => {
                warn!(asset = %asset, error = %e, "Icon unavailable, keeping current icon");
                None
            }
        };

        self.send(TrayUpdate::Title(title.clone()));
        self.send(TrayUpdate::Tooltip(tooltip.clone()));

        TrayView {
            asset,
            icon,
            title,
            tooltip,
        }
    }

    /// Met à jour l'item de menu d'un actif, sélectionné ou non
    pub fn update_item(&self, asset: Asset, record: &PriceRecord) {
        self.send(TrayUpdate::Item {
            asset,
            label: item_label_for(asset, record),
            tooltip: tooltip_for(record),
        });
    }

    fn send(&self, update: TrayUpdate) {
        if self.updates.send(update).is_err() {
            debug!("Tray closed, update dropped");
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tray::{drain_updates, TrayModel, TraySurface};

    fn btc_record() -> PriceRecord {
        PriceRecord::from_raw("btc_mxn", "50000.5", "", "", "", "", "", "", "2023-01-01T12:00:00+00:00")
    }

    fn presenter() -> (Presenter, Receiver<TrayUpdate>) {
        let config = Config {
            assets_dir: std::env::temp_dir().join("bitso-tray-no-icons"),
            ..Config::default()
        };
        Presenter::channel(Arc::new(AppState::new(Asset::Btc)), &config)
    }

    #[test]
    fn test_render_selected_record() {
        let (presenter, rx) = presenter();
        presenter.state().store.replace(Asset::Btc, btc_record());

        let view = presenter.render();
        assert_eq!(view.asset, Asset::Btc);
        assert_eq!(view.title, "$50,000.5");
        assert_eq!(view.tooltip, "Updated on 12:00:00");

        let mut model = TrayModel::new(&Asset::ALL, "Bitso!", "Loading data.");
        drain_updates(&rx, &mut model);
        assert_eq!(model.title, "$50,000.5");
        assert_eq!(model.tooltip, "Updated on 12:00:00");
    }

    #[test]
    fn test_render_ignores_other_assets() {
        let (presenter, _rx) = presenter();
        presenter.state().store.replace(Asset::Btc, btc_record());
        presenter.state().store.replace(
            Asset::Xrp,
            PriceRecord::from_raw("xrp_mxn", "8.9", "", "", "", "", "", "", "2023-01-01T13:30:00+00:00"),
        );

        let view = presenter.select_asset(Asset::Xrp);
        assert_eq!(view.title, "$8.9");
        assert_eq!(view.tooltip, "Updated on 13:30:00");
    }

    #[test]
    fn test_select_before_first_fetch_shows_placeholder() {
        let (presenter, rx) = presenter();
        presenter.state().store.replace(Asset::Btc, btc_record());

        let view = presenter.select_asset(Asset::Eth);
        assert_eq!(view.asset, Asset::Eth);
        assert_eq!(view.title, "Bitso!");
        assert_eq!(view.tooltip, "Loading data.");
        assert_eq!(presenter.state().selection.current(), Asset::Eth);

        let mut model = TrayModel::new(&Asset::ALL, "", "");
        drain_updates(&rx, &mut model);
        assert_eq!(model.tooltip, "Loading data.");
    }

    #[test]
    fn test_missing_icon_does_not_fail_render() {
        let (presenter, rx) = presenter();
        let view = presenter.render();

        assert!(view.icon.is_none());
        let updates: Vec<_> = rx.try_iter().collect();
        assert!(!updates.iter().any(|u| matches!(u, TrayUpdate::Icon(_))));
        assert_eq!(updates.len(), 2);
    }

    #[test]
    fn test_icon_applied_when_present() {
        let dir = std::env::temp_dir().join(format!("bitso-tray-presenter-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("eth.ico"), [1u8, 2, 3]).unwrap();

        let config = Config {
            assets_dir: dir,
            ..Config::default()
        };
        let (presenter, rx) = Presenter::channel(Arc::new(AppState::new(Asset::Btc)), &config);

        let view = presenter.select_asset(Asset::Eth);
        assert_eq!(view.icon.map(|icon| icon.asset), Some(Asset::Eth));
        assert!(matches!(rx.try_recv(), Ok(TrayUpdate::Icon(_))));
    }

    #[test]
    fn test_update_item() {
        let (presenter, rx) = presenter();
        presenter.update_item(Asset::Btc, &btc_record());

        let mut model = TrayModel::new(&Asset::ALL, "", "");
        drain_updates(&rx, &mut model);
        let item = model.item(Asset::Btc).unwrap();
        assert_eq!(item.label, "Btc: $50,000.5");
        assert_eq!(item.tooltip, "Updated on 12:00:00");
    }

    // Un rendu concurrent ne doit jamais remettre le titre d'un actif
    // désélectionné après le titre de la nouvelle sélection
    #[test]
    fn test_concurrent_render_never_overtakes_selection() {
        for _ in 0..200 {
            let (presenter, rx) = presenter();
            presenter.state().store.replace(
                Asset::Btc,
                PriceRecord::from_raw("btc_mxn", "1", "", "", "", "", "", "", ""),
            );
            presenter.state().store.replace(
                Asset::Eth,
                PriceRecord::from_raw("eth_mxn", "2", "", "", "", "", "", "", ""),
            );

            let poller = presenter.clone();
            let handle = std::thread::spawn(move || {
                for _ in 0..50 {
                    poller.render();
                }
            });
            presenter.select_asset(Asset::Eth);
            handle.join().unwrap();

            let titles: Vec<String> = rx
                .try_iter()
                .filter_map(|update| match update {
                    TrayUpdate::Title(title) => Some(title),
                    _ => None,
                })
                .collect();
            let first_eth = titles.iter().position(|t| t == "$2").unwrap();
            assert!(titles[first_eth..].iter().all(|t| t == "$2"), "{:?}", titles);

            let mut model = TrayModel::new(&Asset::ALL, "", "");
            for title in titles {
                model.apply(TrayUpdate::Title(title));
            }
            assert_eq!(model.title, "$2");
        }
    }

    #[test]
    fn test_render_after_tray_closed() {
        let (presenter, rx) = presenter();
        drop(rx);
        let view = presenter.render();
        assert_eq!(view.tooltip, "Loading data.");
    }
}
