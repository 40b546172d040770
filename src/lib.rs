// ============================================================================
// Bitso Tray - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // API ticker Bitso
pub mod app;       // État partagé (PriceStore + Selection)
pub mod config;    // Paramètres de l'application
pub mod models;    // Structures de données
pub mod poller;    // Une tâche de polling par actif
pub mod tray;      // Presenter, icônes, clics, surface du tray
pub mod ui;        // Rendu terminal du tray
