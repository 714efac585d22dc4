// ============================================================================
// Structure : Quote
// ============================================================================
// Instantané du cours d'un symbole : prix courant et variation du jour
//
// CONCEPTS RUST :
// 1. Copy : Quote ne contient que des f64, la copier est gratuit
// 2. Enum sans données : Polarity représente le sens de la variation
// ============================================================================

use serde::{Deserialize, Serialize};

/// Sens de la variation du jour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Variation strictement positive
    Up,
    /// Variation nulle ou négative
    Down,
}

impl Polarity {
    /// Flèche affichée après le pourcentage
    pub fn indicator(&self) -> char {
        match self {
            Polarity::Up => '↑',
            Polarity::Down => '↓',
        }
    }

    /// Préfixe du montant : "+" en hausse, rien sinon
    /// (le signe "-" vient déjà du formatage du nombre)
    pub fn prefix(&self) -> &'static str {
        match self {
            Polarity::Up => "+",
            Polarity::Down => "",
        }
    }
}

/// Cotation d'un symbole telle que renvoyée par l'API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Prix courant
    pub current_price: f64,

    /// Variation absolue depuis la clôture précédente
    pub change: f64,

    /// Variation en pourcentage
    pub percent_change: f64,
}

impl Quote {
    pub fn new(current_price: f64, change: f64, percent_change: f64) -> Self {
        Self {
            current_price,
            change,
            percent_change,
        }
    }

    /// Sens de la variation
    ///
    /// Une variation nulle compte comme une baisse.
    pub fn polarity(&self) -> Polarity {
        if self.change > 0.0 {
            Polarity::Up
        } else {
            Polarity::Down
        }
    }

    /// Ligne de prix : "10.00 USD"
    pub fn price_line(&self) -> String {
        format!("{:.2} USD", self.current_price)
    }

    /// Ligne de variation : "+1.25 (6.67%) ↑ today"
    pub fn change_line(&self) -> String {
        let polarity = self.polarity();
        format!(
            "{}{:.2} ({:.2}%) {} today",
            polarity.prefix(),
            self.change,
            self.percent_change,
            polarity.indicator()
        )
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
