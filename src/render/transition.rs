// ============================================================================
// Transition : fondu entre deux écrans
// ============================================================================
// Phase 1 : un voile uni recouvre progressivement l'ancien écran (alpha 0 -> 255)
// Phase 2 : le voile se retire du nouvel écran (alpha 255 -> 0)
//
// CONCEPT RUST : Iterator
// - La transition ne dort pas et n'affiche rien elle-même
// - Chaque appel à next() produit l'image du tick suivant
// - La boucle principale l'avance d'un pas par tick, ce qui lui permet de
//   vérifier la demande d'arrêt entre deux images
// ============================================================================

use embedded_graphics::pixelcolor::Rgb888;

use crate::render::frame::Frame;

/// Cadence de l'animation (images par seconde)
pub const TICKS_PER_SECOND: u32 = 30;

/// Phase du fondu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Le voile recouvre l'ancien écran
    FadeOut,
    /// Le voile découvre le nouvel écran
    FadeIn,
}

/// Pas d'alpha pour une phase de `duration_seconds` secondes
///
/// max(1, 255 / (durée * 30)) : 8 pour une seconde.
pub fn alpha_step(duration_seconds: u32) -> u8 {
    let ticks = duration_seconds.max(1).saturating_mul(TICKS_PER_SECOND);
    (255 / ticks).max(1) as u8
}

/// Séquence complète (phase, alpha) du fondu
///
/// Avec un pas de 8 : 0, 8, ..., 248 puis 255, 247, ..., 7.
pub fn alpha_schedule(duration_seconds: u32) -> Vec<(FadePhase, u8)> {
    let step = alpha_step(duration_seconds) as usize;

    let fade_out = (0..=255u8).step_by(step).map(|a| (FadePhase::FadeOut, a));
    let fade_in = (0..=255u8).rev().step_by(step).map(|a| (FadePhase::FadeIn, a));

    fade_out.chain(fade_in).collect()
}

/// Fondu en cours entre deux Frames
#[derive(Debug, Clone)]
pub struct Transition {
    from: Frame,
    to: Frame,
    overlay: Rgb888,
    schedule: Vec<(FadePhase, u8)>,
    position: usize,
}

impl Transition {
    pub fn new(from: Frame, to: Frame, overlay: Rgb888, duration_seconds: u32) -> Self {
        Self {
            from,
            to,
            overlay,
            schedule: alpha_schedule(duration_seconds),
            position: 0,
        }
    }

    /// Nombre d'images restant à produire
    pub fn remaining(&self) -> usize {
        self.schedule.len() - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Consomme la transition et retourne l'écran d'arrivée
    pub fn into_target(self) -> Frame {
        self.to
    }
}

impl Iterator for Transition {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let &(phase, alpha) = self.schedule.get(self.position)?;
        self.position += 1;

        let base = match phase {
            FadePhase::FadeOut => &self.from,
            FadePhase::FadeIn => &self.to,
        };
        Some(base.with_overlay(self.overlay, alpha))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
