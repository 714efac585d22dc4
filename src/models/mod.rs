// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod quote;    // Cotation + sens de variation
pub mod rotation; // Rotation circulaire des symboles
pub mod timer;    // Minuteurs à intervalle fixe

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use tickerboard::models::quote::Quote;
// On peut faire : use tickerboard::models::Quote;
pub use quote::{Polarity, Quote};
pub use rotation::SymbolRotation;
pub use timer::IntervalTimer;
