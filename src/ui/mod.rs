// ============================================================================
// Module : ui
// ============================================================================
// Présente les images dans le terminal et lit les touches d'arrêt
// ============================================================================

pub mod events;   // Gestion des événements clavier
pub mod terminal; // Rendu du framebuffer en demi-blocs

// Re-exports pour simplifier les imports
pub use events::{is_quit_key, EventHandler};
pub use terminal::{FrameWidget, TerminalDisplay};
