// ============================================================================
// Tickerboard - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;       // Client Finnhub + trait QuoteProvider
pub mod app;       // Boucle principale et état de l'afficheur
pub mod config;    // Configuration par variables d'environnement
pub mod models;    // Cotation, rotation, minuteurs
pub mod render;    // Framebuffer, composition et fondus
pub mod ui;        // Présentation dans le terminal
