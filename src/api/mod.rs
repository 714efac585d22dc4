// ============================================================================
// Module : api
// ============================================================================
// Sources de cotations. La boucle principale ne connaît que le trait
// QuoteProvider : Finnhub en production, des faux fournisseurs en test.
// ============================================================================

pub mod finnhub; // Client API Finnhub

use anyhow::Result;

use crate::models::Quote;

// Re-export des types principaux
pub use finnhub::{FinnhubClient, FinnhubProvider};

/// Fournisseur de cotations et de statut de marché
///
/// CONCEPT RUST : Trait comme point d'injection
/// - Les appels sont bloquants : la boucle est mono-thread
/// - &mut self : un faux fournisseur peut compter ses appels
pub trait QuoteProvider {
    /// Cotation courante d'un symbole
    fn fetch_quote(&mut self, symbol: &str) -> Result<Quote>;

    /// true si la place boursière est ouverte
    fn fetch_market_open(&mut self) -> Result<bool>;
}
