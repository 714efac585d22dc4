// ============================================================================
// Frame : image 128x128 prête à afficher
// ============================================================================
// Framebuffer RGB en mémoire. Implémente DrawTarget pour que les polices et
// primitives d'embedded-graphics puissent dessiner directement dedans.
//
// Une Frame n'est jamais modifiée après sa composition : le fondu produit
// de nouvelles Frames au lieu de retoucher l'ancienne.
// ============================================================================

use std::convert::Infallible;
use std::fmt;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

/// Largeur de l'afficheur en pixels
pub const DISPLAY_WIDTH: u32 = 128;

/// Hauteur de l'afficheur en pixels
pub const DISPLAY_HEIGHT: u32 = 128;

/// Image plein écran
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Rgb888>,
}

impl Frame {
    /// Crée une image unie
    pub fn filled(color: Rgb888) -> Self {
        Self {
            pixels: vec![color; (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize],
        }
    }

    /// Couleur du pixel (x, y), None hors de l'écran
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT {
            Some(self.pixels[(y * DISPLAY_WIDTH + x) as usize])
        } else {
            None
        }
    }

    /// Tous les pixels, ligne par ligne
    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    /// Nombre de pixels de la couleur donnée dans un rectangle
    pub fn count_in(&self, x: u32, y: u32, width: u32, height: u32, color: Rgb888) -> usize {
        let mut count = 0;
        for py in y..(y + height).min(DISPLAY_HEIGHT) {
            for px in x..(x + width).min(DISPLAY_WIDTH) {
                if self.pixel(px, py) == Some(color) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Recouvre l'image d'une couleur unie d'opacité `alpha` (0 = invisible,
    /// 255 = opaque) et retourne le résultat
    pub fn with_overlay(&self, overlay: Rgb888, alpha: u8) -> Frame {
        let pixels = self
            .pixels
            .iter()
            .map(|&base| blend(base, overlay, alpha))
            .collect();
        Frame { pixels }
    }
}

/// Mélange alpha d'un canal : base * (1 - a) + top * a, arrondi
fn blend_channel(base: u8, top: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((base as u32 * (255 - a) + top as u32 * a + 127) / 255) as u8
}

fn blend(base: Rgb888, top: Rgb888, alpha: u8) -> Rgb888 {
    Rgb888::new(
        blend_channel(base.r(), top.r(), alpha),
        blend_channel(base.g(), top.g(), alpha),
        blend_channel(base.b(), top.b(), alpha),
    )
}

// 16384 pixels dans un {:?} ne servent à personne
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &DISPLAY_WIDTH)
            .field("height", &DISPLAY_HEIGHT)
            .finish()
    }
}

// ============================================================================
// Intégration embedded-graphics
// ============================================================================
// CONCEPT RUST : Implémenter un trait d'une autre crate
// - OriginDimensions : la taille de la surface
// - DrawTarget : reçoit les pixels produits par Text, Triangle, Rectangle...
// - Error = Infallible : dessiner en mémoire ne peut pas échouer
// ============================================================================

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl DrawTarget for Frame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Les pixels hors écran sont ignorés (texte qui déborde)
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < DISPLAY_WIDTH
                && (point.y as u32) < DISPLAY_HEIGHT
            {
                let index = point.y as u32 * DISPLAY_WIDTH + point.x as u32;
                self.pixels[index as usize] = color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_filled_frame() {
        let frame = Frame::filled(Rgb888::WHITE);
        assert_eq!(frame.pixel(0, 0), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(127, 127), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(128, 0), None);
    }

    #[test]
    fn test_draw_clips_offscreen_pixels() {
        let mut frame = Frame::filled(Rgb888::WHITE);
        Rectangle::new(Point::new(120, 120), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.count_in(0, 0, 128, 128, Rgb888::RED), 64);
    }

    #[test]
    fn test_overlay_extremes() {
        let frame = Frame::filled(Rgb888::new(10, 20, 30));
        assert_eq!(frame.with_overlay(Rgb888::WHITE, 0), frame);
        assert_eq!(frame.with_overlay(Rgb888::WHITE, 255), Frame::filled(Rgb888::WHITE));
    }

    #[test]
    fn test_overlay_half() {
        let frame = Frame::filled(Rgb888::BLACK);
        let blended = frame.with_overlay(Rgb888::WHITE, 128);
        assert_eq!(blended.pixel(5, 5), Some(Rgb888::new(128, 128, 128)));
    }
}
