// ============================================================================
// Structure : SymbolRotation
// ============================================================================
// Liste fixe de symboles et index du symbole affiché
//
// Invariant : la liste n'est jamais vide et current_index < symbols.len()
// ============================================================================

use anyhow::{bail, Result};

/// Rotation circulaire sur une liste de symboles
#[derive(Debug, Clone)]
pub struct SymbolRotation {
    symbols: Vec<String>,
    current_index: usize,
}

impl SymbolRotation {
    /// Crée une rotation positionnée sur le premier symbole
    ///
    /// Une liste vide est refusée.
    pub fn new(symbols: Vec<String>) -> Result<Self> {
        if symbols.is_empty() {
            bail!("La liste de symboles est vide");
        }

        Ok(Self {
            symbols,
            current_index: 0,
        })
    }

    /// Symbole actuellement affiché
    pub fn current(&self) -> &str {
        &self.symbols[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index du symbole suivant (modulo la longueur)
    pub fn next_index(&self) -> usize {
        (self.current_index + 1) % self.symbols.len()
    }

    /// Symbole suivant, sans avancer
    pub fn peek_next(&self) -> &str {
        &self.symbols[self.next_index()]
    }

    /// Avance d'un cran et retourne le nouveau symbole courant
    pub fn advance(&mut self) -> &str {
        self.current_index = self.next_index();
        self.current()
    }

    /// Nombre de symboles en rotation
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_rotation_is_rejected() {
        assert!(SymbolRotation::new(Vec::new()).is_err());
    }

    #[test]
    fn test_advance_wraps_around() {
        let mut rotation = SymbolRotation::new(symbols(&["AAA", "BBB", "CCC"])).unwrap();
        assert_eq!(rotation.symbol_count(), 3);
        assert_eq!(rotation.current(), "AAA");
        assert_eq!(rotation.peek_next(), "BBB");

        for n in 1..=7 {
            rotation.advance();
            assert_eq!(rotation.current_index(), n % 3);
        }
        assert_eq!(rotation.current(), "BBB");
    }

    #[test]
    fn test_single_symbol_stays_put() {
        let mut rotation = SymbolRotation::new(symbols(&["VOO"])).unwrap();
        assert_eq!(rotation.advance(), "VOO");
        assert_eq!(rotation.current_index(), 0);
    }
}
