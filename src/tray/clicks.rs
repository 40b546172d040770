// ============================================================================
// Clics sur le menu du tray
// ============================================================================
// Un canal de clic par actif. Une tâche d'écoute fusionne les canaux et
// dispatche chaque clic vers Presenter::select_asset, ce qui sérialise les
// changements de sélection.
// ============================================================================

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};
use tracing::{debug, info};

use crate::models::Asset;
use crate::tray::Presenter;

/// Nombre de clics en attente par actif avant d'en ignorer
const CLICK_BUFFER: usize = 8;

/// Émetteurs de clics, côté thread UI
#[derive(Debug, Clone)]
pub struct ClickSenders {
    senders: HashMap<Asset, mpsc::Sender<()>>,
}

impl ClickSenders {
    /// Signale un clic sur l'item d'un actif (non bloquant)
    ///
    /// Retourne false si le clic n'a pas pu être transmis (file pleine ou
    /// écoute arrêtée).
    pub fn click(&self, asset: Asset) -> bool {
        match self.senders.get(&asset) {
            Some(sender) => sender.try_send(()).is_ok(),
            None => false,
        }
    }
}

/// Tâche d'écoute des clics
pub struct ClickListener {
    streams: StreamMap<Asset, ReceiverStream<()>>,
}

/// Crée un canal de clic par actif
pub fn click_channels(assets: &[Asset]) -> (ClickSenders, ClickListener) {
    let mut senders = HashMap::with_capacity(assets.len());
    let mut streams = StreamMap::with_capacity(assets.len());

    for &asset in assets {
        let (tx, rx) = mpsc::channel(CLICK_BUFFER);
        senders.insert(asset, tx);
        streams.insert(asset, ReceiverStream::new(rx));
    }

    (ClickSenders { senders }, ClickListener { streams })
}

impl ClickListener {
    /// Dispatche les clics jusqu'au signal d'arrêt
    ///
    /// S'arrête aussi quand tous les ClickSenders ont été droppés.
    /// Retourne le nombre de clics traités.
    pub async fn run(mut self, presenter: Presenter, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut handled = 0;

        loop {
            tokio::select! {
                next = self.streams.next() => match next {
                    Some((asset, ())) => {
                        debug!(asset = %asset, "Menu item clicked");
                        presenter.select_asset(asset);
                        handled += 1;
                    }
                    None => {
                        debug!("All click channels closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    break;
                }
            }
        }

        info!(clicks = handled, "Click listener stopped");
        handled
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
