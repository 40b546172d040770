// ============================================================================
// Bitso Tray
// ============================================================================
// Affiche le dernier prix d'une cryptomonnaie (btc, eth, xrp) dans un tray
// rendu dans le terminal. Les prix sont rafraîchis périodiquement depuis
// l'API ticker de Bitso.
//
// Threads :
// - thread principal : boucle UI (mono-thread, seul à toucher au tray)
// - runtime tokio : un poller par actif + la tâche d'écoute des clics
//
// Les tâches tokio ne modifient jamais le tray directement : elles poussent
// des TrayUpdate dans une file que la boucle UI applique à chaque tour.
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bitso_tray::api::BitsoClient;
use bitso_tray::app::AppState;
use bitso_tray::config::Config;
use bitso_tray::models::Asset;
use bitso_tray::poller::spawn_pollers;
use bitso_tray::tray::{click_channels, drain_updates, ClickSenders, Presenter, TrayModel, TrayUpdate};
use bitso_tray::ui::events::{
    is_click_event, is_down_event, is_quit_event, is_up_event, menu_index_from_event,
};
use bitso_tray::ui::{render, EventHandler, ReadFailures, TrayPanel};

/// Attente maximale des tâches tokio à la fermeture
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne sont pas visibles une fois le terminal en raw mode :
// les logs partent dans un fichier avec rotation quotidienne.
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/bitso-tray/logs
/// - macOS : ~/Library/Application Support/bitso-tray/logs
/// - Windows : C:\Users\<user>\AppData\Local\bitso-tray\logs
/// - sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("bitso-tray").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/bitso-tray/logs/bitso-tray.log.*
/// RUST_LOG=bitso_tray=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "bitso-tray.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitso_tray=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("Bitso tray starting up");

    let config = Config::default();
    config.validate().context("Configuration invalide")?;
    if !config.within_rate_limit() {
        warn!(
            requests_per_minute = config.requests_per_minute(),
            limit = config.rate_limit_per_minute,
            "Polling interval exceeds the API rate limit"
        );
    }

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let state = Arc::new(AppState::new(config.default_asset));
    let (presenter, updates) = Presenter::channel(state.clone(), &config);
    let client = Arc::new(BitsoClient::new(&config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (clicks, listener) = click_channels(&Asset::ALL);

    // Tray initial : icône de l'actif par défaut, titre et tooltip d'attente
    let mut panel = TrayPanel::new(TrayModel::new(
        &Asset::ALL,
        &config.placeholder_title,
        &config.loading_tooltip,
    ));
    presenter.render();

    info!("Spawning click listener and pollers");
    let listener_task = runtime.spawn(listener.run(presenter.clone(), shutdown_rx.clone()));
    let pollers_task = {
        let presenter = presenter.clone();
        let config = config.clone();
        let shutdown = shutdown_rx.clone();
        runtime.spawn(async move { spawn_pollers(client, presenter, &config, shutdown).await })
    };

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Starting UI loop");
    let result = run(&mut terminal, &mut panel, &updates, &state, &clicks, &EventHandler::new());

    // Arrêt : signal aux pollers et à l'écoute des clics, attente bornée
    info!("Shutting down background tasks");
    if shutdown_tx.send(true).is_err() {
        debug!("No background task left to notify");
    }
    drop(clicks);

    let joined = runtime.block_on(async {
        tokio::time::timeout(SHUTDOWN_GRACE, async {
            if let Ok(pollers) = pollers_task.await {
                for poller in pollers {
                    if let Err(e) = poller.await {
                        warn!(error = %e, "Poller task failed");
                    }
                }
            }
            if let Err(e) = listener_task.await {
                warn!(error = %e, "Click listener task failed");
            }
        })
        .await
    });
    if joined.is_err() {
        warn!("Background tasks did not stop in time");
    }
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Boucle UI
// ============================================================================
// À chaque tour :
//   1. applique les TrayUpdate en attente
//   2. dessine le tray
//   3. traite un événement clavier (ou un tick de 250ms)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    panel: &mut TrayPanel,
    updates: &Receiver<TrayUpdate>,
    state: &AppState,
    clicks: &ClickSenders,
    events: &EventHandler,
) -> Result<()> {
    let mut failures = ReadFailures::default();

    loop {
        let applied = drain_updates(updates, panel);
        if applied > 0 {
            debug!(applied, "Tray updates applied");
        }

        let selected = state.selection.current();
        terminal.draw(|frame| render(frame, panel, selected))?;

        let event = match events.next() {
            Ok(event) => {
                failures.reset();
                event
            }
            Err(e) => {
                warn!(error = %e, consecutive = failures.consecutive() + 1, "Failed to read terminal event");
                if failures.record() {
                    return Err(e.context("Lecture du terminal impossible"));
                }
                std::thread::sleep(events.tick_rate());
                continue;
            }
        };

        if is_quit_event(&event) {
            info!("User requested quit");
            break;
        } else if is_up_event(&event) {
            panel.move_up();
        } else if is_down_event(&event) {
            panel.move_down();
        } else if is_click_event(&event) {
            if let Some(asset) = panel.highlighted() {
                send_click(clicks, asset);
            }
        } else if let Some(index) = menu_index_from_event(&event) {
            if let Some(asset) = panel.asset_at(index) {
                send_click(clicks, asset);
            }
        }
    }

    Ok(())
}

/// Transmet un clic à la tâche d'écoute
fn send_click(clicks: &ClickSenders, asset: Asset) {
    if clicks.click(asset) {
        debug!(asset = %asset, "Click sent");
    } else {
        warn!(asset = %asset, "Click dropped");
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal (raw mode + écran alternatif)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
