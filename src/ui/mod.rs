// ============================================================================
// Module : ui
// ============================================================================
// Rendu terminal du tray (ratatui + crossterm)
// ============================================================================

pub mod events;     // Gestion des événements clavier
pub mod tray_panel; // Barre du tray + menu des actifs

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler, ReadFailures};
pub use tray_panel::{render, TrayPanel};
