// ============================================================================
// Mise en page du texte
// ============================================================================
// Découpe un texte en lignes qui tiennent dans une largeur en pixels
//
// ALGORITHME (glouton) :
// - On part d'une ligne vide
// - Pour chaque mot, on essaie de l'ajouter (séparé par un espace)
// - Si la ligne tient dans max_width, on la garde
// - Sinon on valide la ligne courante et on repart avec ce mot
// - Pas de césure : un mot trop large occupe seul sa ligne et déborde
// ============================================================================

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::{renderer::TextRenderer, Baseline},
};

/// Mesure de texte en pixels pour une police donnée
///
/// CONCEPT RUST : Trait pour abstraire la police
/// - Les polices bitmap d'embedded-graphics en production
/// - Une mesure "1 caractère = N pixels" dans les tests
pub trait TextMeasure {
    /// Largeur du texte en pixels
    fn text_width(&self, text: &str) -> u32;

    /// Hauteur d'une ligne (avance verticale entre deux lignes)
    fn line_height(&self) -> u32;
}

impl TextMeasure for MonoFont<'_> {
    fn text_width(&self, text: &str) -> u32 {
        // La couleur n'influe pas sur la mesure
        MonoTextStyle::new(self, Rgb888::BLACK)
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn line_height(&self) -> u32 {
        self.character_size.height
    }
}

/// Découpe `text` en lignes d'au plus `max_width` pixels
///
/// # Exemple
/// "-0.50 (-4.76%) ↓ today" en 6 px/caractère sur 118 px
/// -> ["-0.50 (-4.76%) ↓", "today"]
pub fn wrap<M: TextMeasure + ?Sized>(text: &str, metric: &M, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if metric.text_width(&candidate) <= max_width {
            current = candidate;
        } else {
            // Un premier mot trop large ne doit pas produire de ligne vide
            if !current.is_empty() {
                lines.push(current);
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// ============================================================================
// Tests unitaires
// ============================================================================
