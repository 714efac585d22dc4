// ============================================================================
// Module : render
// ============================================================================
// Tout ce qui produit des pixels : mise en page du texte, framebuffer,
// composition d'un écran et fondu entre deux écrans.
// Aucune dépendance au terminal ni au réseau.
// ============================================================================

pub mod frame;      // Framebuffer 128x128
pub mod screen;     // Composition de l'écran d'un symbole
pub mod text;       // Retour à la ligne du texte
pub mod transition; // Fondu entre deux écrans

pub use frame::{Frame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use screen::{FrameRenderer, QuoteView, Scene, Theme};
pub use text::{wrap, TextMeasure};
pub use transition::{alpha_schedule, alpha_step, FadePhase, Transition, TICKS_PER_SECOND};
