// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier du terminal sans bloquer
//
// CONCEPTS RUST :
// 1. Non-blocking I/O : poll() avec un timeout nul
// 2. Option : seules les touches pressées sont retenues
// 3. Error handling avec Result
//
// La boucle appelle quit_requested() à chaque tick, y compris pendant les
// fondus : l'arrêt est donc pris en compte en moins d'un tick.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self
    }

    /// Lit la prochaine touche pressée en attente (non bloquant)
    ///
    /// CONCEPT : poll(Duration::ZERO)
    /// - Retourne immédiatement si aucun événement n'attend
    /// - Le rythme de la boucle est géré par l'horloge, pas par poll()
    /// - Les autres événements (souris, redimensionnement) sont consommés
    pub fn poll(&self) -> Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                // On ne garde que Press pour éviter les doublons
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                _ => continue,
            }
        }
        Ok(None)
    }

    /// Vide la file d'événements ; true si une touche d'arrêt a été pressée
    pub fn quit_requested(&self) -> Result<bool> {
        let mut quit = false;
        while let Some(key) = self.poll()? {
            quit |= is_quit_key(&key);
        }
        Ok(quit)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Vérifie si la touche demande l'arrêt : 'q', Échap ou Ctrl-C
///
/// En raw mode, Ctrl-C n'envoie pas SIGINT : il arrive comme une touche.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_is_quit_key() {
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::empty())));
        assert!(is_quit_key(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::empty())));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));

        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::empty())));
        assert!(!is_quit_key(&key(KeyCode::Char('a'), KeyModifiers::empty())));
        assert!(!is_quit_key(&key(KeyCode::Enter, KeyModifiers::empty())));
    }
}
