// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier et le traduit en actions sur le menu du tray
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier : l'UI en profite pour appliquer les TrayUpdate en attente
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// Sans événement avant le timeout, retourne Ok(Event::Tick).
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl EventHandler {
    /// Durée d'un tick, aussi utilisée comme pause après une erreur de lecture
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Erreurs de lecture du terminal
// ============================================================================

/// Erreurs de lecture consécutives tolérées avant d'abandonner
pub const MAX_READ_FAILURES: u32 = 5;

/// Compte les erreurs de lecture consécutives du terminal
#[derive(Debug, Default)]
pub struct ReadFailures {
    consecutive: u32,
}

impl ReadFailures {
    /// Enregistre une erreur ; retourne true s'il faut abandonner
    pub fn record(&mut self) -> bool {
        self.consecutive += 1;
        self.consecutive >= MAX_READ_FAILURES
    }

    /// Une lecture a réussi
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

// ============================================================================
// Helpers : convertir un KeyEvent en action
// ============================================================================

/// 'q' ou Échap : quitter
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
    } else {
        false
    }
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// Entrée ou Espace : "clic" sur l'item en surbrillance
pub fn is_click_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
    } else {
        false
    }
}

/// Chiffre '1'..'9' : index (0-based) de l'item cliqué directement
pub fn menu_index_from_event(event: &Event) -> Option<usize> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return c
                .to_digit(10)
                .filter(|&d| d >= 1)
                .map(|d| d as usize - 1);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
