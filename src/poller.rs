// ============================================================================
// Poller par actif
// ============================================================================
// Une tâche tokio par actif suivi :
//
//   Fetching -> Updated -> (sleep) -> Fetching -> ...
//
// À chaque cycle : fetch -> remplacement dans le PriceStore -> label du menu
// -> rendu du tray principal. Un fetch en échec est logué et le cycle passe
// directement au sleep : la cotation précédente reste affichée.
//
// L'arrêt est observé pendant le sleep, via un canal watch.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::api::{FetchError, TickerSource};
use crate::config::Config;
use crate::models::Asset;
use crate::tray::Presenter;

/// Résultat d'un cycle de polling
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Nouvelle cotation stockée et affichée
    Updated,

    /// Fetch en échec, cotation précédente conservée
    Skipped(FetchError),
}

/// Poller d'un actif
pub struct Poller<S: TickerSource> {
    asset: Asset,
    source: Arc<S>,
    presenter: Presenter,
    interval: Duration,
}

impl<S: TickerSource> Poller<S> {
    pub fn new(asset: Asset, source: Arc<S>, presenter: Presenter, interval: Duration) -> Self {
        Self {
            asset,
            source,
            presenter,
            interval,
        }
    }

    /// Actif suivi par ce poller
    pub fn asset(&self) -> Asset {
        self.asset
    }

    /// Exécute un cycle : fetch, stockage, notification du tray
    pub async fn cycle(&self) -> CycleOutcome {
        match self.source.fetch(self.asset).await {
            Ok(record) => {
                self.presenter.state().store.replace(self.asset, record.clone());
                self.presenter.update_item(self.asset, &record);
                self.presenter.render();
                debug!("Price store updated");
                CycleOutcome::Updated
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Fetch failed, keeping previous price");
                CycleOutcome::Skipped(e)
            }
        }
    }

    /// Boucle de polling, jusqu'au signal d'arrêt
    ///
    /// Retourne le nombre de cycles exécutés.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut cycles = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.cycle().await;
            cycles += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    break;
                }
            }
        }

        info!(cycles, "Poller stopped");
        cycles
    }
}

/// Lance un poller par actif suivi
///
/// Les pollers partagent le PriceStore synchronisé ; le décalage entre deux
/// lancements étale seulement les premières requêtes vers l'API.
pub async fn spawn_pollers<S: TickerSource>(
    source: Arc<S>,
    presenter: Presenter,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<u64>> {
    let mut handles = Vec::with_capacity(Asset::ALL.len());

    for (i, asset) in Asset::ALL.into_iter().enumerate() {
        if i > 0 && !config.startup_stagger.is_zero() {
            tokio::time::sleep(config.startup_stagger).await;
        }

        let poller = Poller::new(asset, source.clone(), presenter.clone(), config.poll_interval);
        let span = tracing::info_span!("poller", asset = %asset);
        debug!(asset = %asset, "Spawning poller");
        handles.push(tokio::spawn(poller.run(shutdown.clone()).instrument(span)));
    }

    handles
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::future::Future;
    use std::sync::Mutex;

    use crate::api::parse_ticker;
    use crate::app::AppState;
    use crate::models::PriceRecord;
    use crate::tray::{drain_updates, TrayModel, TrayUpdate};

    /// Source scriptée : rejoue des corps de réponse par actif
    #[derive(Default)]
    struct ScriptedSource {
        bodies: Mutex<HashMap<Asset, VecDeque<Result<String, FetchError>>>>,
    }

    impl ScriptedSource {
        fn push(&self, asset: Asset, body: Result<String, FetchError>) {
            self.bodies
                .lock()
                .unwrap()
                .entry(asset)
                .or_default()
                .push_back(body);
        }
    }

    impl TickerSource for ScriptedSource {
        fn fetch(&self, asset: Asset) -> impl Future<Output = Result<PriceRecord, FetchError>> + Send {
            let next = self.bodies.lock().unwrap().get_mut(&asset).and_then(VecDeque::pop_front);
            async move {
                match next {
                    Some(Ok(body)) => parse_ticker(body.as_bytes()),
                    Some(Err(e)) => Err(e),
                    None => Err(FetchError::Transport("connection refused".to_string())),
                }
            }
        }
    }

    fn body(last: &str, created_at: &str) -> String {
        format!(
            r#"{{"success":true,"payload":{{"book":"btc_mxn","last":"{}","created_at":"{}","high":"1","low":"1","ask":"1","bid":"1","volume":"1","vwap":"1"}}}}"#,
            last, created_at
        )
    }

    fn setup() -> (Arc<ScriptedSource>, Presenter, std::sync::mpsc::Receiver<TrayUpdate>) {
        let config = Config {
            assets_dir: std::env::temp_dir().join("bitso-tray-no-icons"),
            ..Config::default()
        };
        let (presenter, rx) = Presenter::channel(Arc::new(AppState::new(Asset::Btc)), &config);
        (Arc::new(ScriptedSource::default()), presenter, rx)
    }

    #[tokio::test]
    async fn test_end_to_end_single_cycle() {
        let (source, presenter, rx) = setup();
        source.push(Asset::Btc, Ok(body("50000.5", "2023-01-01T12:00:00+00:00")));

        let poller = Poller::new(Asset::Btc, source, presenter.clone(), Duration::from_secs(10));
        assert_eq!(poller.cycle().await, CycleOutcome::Updated);

        let mut model = TrayModel::new(&Asset::ALL, "Bitso!", "Loading data.");
        drain_updates(&rx, &mut model);
        assert_eq!(model.title, "$50,000.5");
        assert_eq!(model.tooltip, "Updated on 12:00:00");
        assert_eq!(model.item(Asset::Btc).unwrap().label, "Btc: $50,000.5");
    }

    #[tokio::test]
    async fn test_latest_cycle_wins() {
        let (source, presenter, _rx) = setup();
        source.push(Asset::Eth, Ok(body("100", "2023-01-01T12:00:00+00:00")));
        source.push(Asset::Eth, Ok(body("200", "2023-01-01T12:00:10+00:00")));
        source.push(Asset::Eth, Ok(body("300", "2023-01-01T12:00:20+00:00")));

        let poller = Poller::new(Asset::Eth, source, presenter.clone(), Duration::from_secs(10));
        for _ in 0..3 {
            poller.cycle().await;
        }

        let record = presenter.state().store.get(Asset::Eth).unwrap();
        assert_eq!(record.last, Some(300.0));
        assert_eq!(record.updated_on, "12:00:20");
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_previous_record() {
        let (source, presenter, _rx) = setup();
        source.push(Asset::Btc, Ok(body("1000", "2023-01-01T12:00:00+00:00")));
        source.push(Asset::Btc, Ok("{not json".to_string()));

        let poller = Poller::new(Asset::Btc, source, presenter.clone(), Duration::from_secs(10));
        assert_eq!(poller.cycle().await, CycleOutcome::Updated);
        assert!(matches!(poller.cycle().await, CycleOutcome::Skipped(FetchError::Decode(_))));

        let record = presenter.state().store.get(Asset::Btc).unwrap();
        assert_eq!(record.display_price, "1,000");
    }

    #[tokio::test]
    async fn test_non_numeric_last_yields_empty_price() {
        let (source, presenter, _rx) = setup();
        source.push(Asset::Btc, Ok(body("abc", "2023-01-01T12:00:00+00:00")));
        source.push(Asset::Btc, Ok(body("42", "2023-01-01T12:00:10+00:00")));

        let poller = Poller::new(Asset::Btc, source, presenter.clone(), Duration::from_secs(10));
        assert_eq!(poller.cycle().await, CycleOutcome::Updated);
        assert_eq!(presenter.render().title, "$");

        assert_eq!(poller.cycle().await, CycleOutcome::Updated);
        assert_eq!(presenter.render().title, "$42");
    }

    #[tokio::test]
    async fn test_rejected_and_transport_errors_are_skipped() {
        let (source, presenter, _rx) = setup();
        source.push(Asset::Xrp, Ok(r#"{"success":false}"#.to_string()));
        source.push(Asset::Xrp, Err(FetchError::Transport("timeout".to_string())));

        let poller = Poller::new(Asset::Xrp, source, presenter.clone(), Duration::from_secs(10));
        assert!(matches!(poller.cycle().await, CycleOutcome::Skipped(FetchError::Rejected(_))));
        assert!(matches!(poller.cycle().await, CycleOutcome::Skipped(FetchError::Transport(_))));
        assert!(presenter.state().store.get(Asset::Xrp).is_none());
    }

    #[tokio::test]
    async fn test_unselected_asset_updates_menu_only() {
        let (source, presenter, rx) = setup();
        source.push(Asset::Eth, Ok(body("2500", "2023-01-01T09:15:00+00:00")));

        let poller = Poller::new(Asset::Eth, source, presenter.clone(), Duration::from_secs(10));
        poller.cycle().await;

        let mut model = TrayModel::new(&Asset::ALL, "Bitso!", "Loading data.");
        drain_updates(&rx, &mut model);
        assert_eq!(model.item(Asset::Eth).unwrap().label, "Eth: $2,500");
        assert_eq!(model.title, "Bitso!");
        assert_eq!(model.tooltip, "Loading data.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let (source, presenter, _rx) = setup();
        for _ in 0..5 {
            source.push(Asset::Btc, Ok(body("1", "2023-01-01T12:00:00+00:00")));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = Poller::new(Asset::Btc, source, presenter, Duration::from_secs(10));
        let task = tokio::spawn(poller.run(shutdown_rx));

        // Deux sleeps complets -> trois cycles
        tokio::time::sleep(Duration::from_secs(25)).await;
        shutdown_tx.send(true).unwrap();

        assert_eq!(task.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_pollers_covers_all_assets() {
        let (source, presenter, _rx) = setup();
        for asset in Asset::ALL {
            source.push(asset, Ok(body("7", "2023-01-01T12:00:00+00:00")));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = spawn_pollers(source, presenter.clone(), &Config::default(), shutdown_rx).await;
        assert_eq!(handles.len(), Asset::ALL.len());

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }

        for asset in Asset::ALL {
            assert!(presenter.state().store.get(asset).is_some());
        }
    }
}
