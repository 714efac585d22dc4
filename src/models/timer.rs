// ============================================================================
// Structure : IntervalTimer
// ============================================================================
// Minuteur à intervalle fixe (dernier déclenchement + intervalle)
//
// CONCEPTS RUST :
// 1. Instant : horloge monotone, insensible aux changements d'heure système
// 2. Duration : durée typée (pas de secondes "flottantes" qui traînent)
//
// Le temps est toujours fourni par l'appelant : le minuteur ne lit jamais
// l'horloge lui-même, ce qui rend les tests déterministes.
// ============================================================================

use std::time::{Duration, Instant};

/// Minuteur qui se déclenche quand `now - last_fired >= interval`
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    last_fired: Instant,
    interval: Duration,
}

impl IntervalTimer {
    /// Crée un minuteur dont la période commence à `start`
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            last_fired: start,
            interval,
        }
    }

    /// Vérifie si l'intervalle est écoulé, sans réarmer
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_fired) >= self.interval
    }

    /// Réarme le minuteur à `now`
    pub fn reset(&mut self, now: Instant) {
        self.last_fired = now;
    }

    /// Déclenche au plus une fois : si l'intervalle est écoulé, réarme à `now`
    /// et retourne true. Un retard de plusieurs intervalles ne donne qu'un
    /// seul déclenchement.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.reset(now);
            true
        } else {
            false
        }
    }
}
