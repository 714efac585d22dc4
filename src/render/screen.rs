// ============================================================================
// Rendu de l'écran d'un symbole
// ============================================================================
// Compose l'image 128x128 d'un symbole à partir de sa cotation
//
// DISPOSITION :
// ┌────────────────────────┐
// │ AMPX                MC │  y=10 : symbole, badge "marché fermé"
// │                        │
// │ 10.00 USD              │  y=40 : prix
// │                        │
// │ -0.50 (-4.76%) ↓       │  y=70 : variation (retour à la ligne auto)
// │ today                ▪ │  coin : indicateur de données périmées
// └────────────────────────┘
//
// Le rendu se fait en deux temps :
// 1. compose() : construit une Scene (lignes de texte positionnées + couleurs)
// 2. Scene::rasterize() : dessine la Scene dans une Frame
// Les tests peuvent ainsi vérifier le texte sans décoder des pixels.
// ============================================================================

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_6X10, FONT_8X13, FONT_9X18_BOLD},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, Triangle},
    text::{Baseline, Text},
};

use crate::models::{Polarity, Quote};
use crate::render::frame::{Frame, DISPLAY_WIDTH};
use crate::render::text::{wrap, TextMeasure};

/// Marge gauche/droite
const MARGIN: i32 = 5;

/// Ordonnée de la ligne du symbole et du badge
const HEADER_Y: i32 = 10;

/// Ordonnée du bloc prix
const PRICE_Y: i32 = 40;

/// Ordonnée du bloc variation
const CHANGE_Y: i32 = 70;

/// Largeur disponible pour le texte
const TEXT_WIDTH: u32 = DISPLAY_WIDTH - 2 * MARGIN as u32;

/// Texte du badge "marché fermé"
pub const CLOSED_BADGE: &str = "MC";

/// Texte affiché quand aucune cotation n'a encore été obtenue
pub const NO_DATA: &str = "No data";

/// Côté du carré signalant des données périmées
const STALE_MARKER_SIZE: u32 = 4;

// ============================================================================
// Thème
// ============================================================================

/// Couleurs de l'afficheur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb888,
    pub symbol: Rgb888,
    /// Hausse
    pub positive: Rgb888,
    /// Baisse ou variation nulle
    pub negative: Rgb888,
    /// Badge "marché fermé"
    pub badge: Rgb888,
    /// Couleur du voile pendant le fondu
    pub overlay: Rgb888,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgb888::new(255, 255, 255),
            symbol: Rgb888::new(0, 0, 0),
            positive: Rgb888::new(19, 127, 54),
            negative: Rgb888::new(219, 44, 39),
            badge: Rgb888::new(218, 165, 32),
            overlay: Rgb888::new(255, 255, 255),
        }
    }
}

impl Theme {
    /// Couleur associée au sens de variation
    pub fn polarity_color(&self, polarity: Polarity) -> Rgb888 {
        match polarity {
            Polarity::Up => self.positive,
            Polarity::Down => self.negative,
        }
    }
}

// ============================================================================
// Scene : ce qui doit être dessiné
// ============================================================================

/// Police utilisée par une ligne de texte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    /// Symbole et badge (gras, grand)
    Header,
    /// Prix (moyen)
    Price,
    /// Variation (petit)
    Change,
}

impl FontRole {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            FontRole::Header => &FONT_9X18_BOLD,
            FontRole::Price => &FONT_8X13,
            FontRole::Change => &FONT_6X10,
        }
    }
}

/// Une ligne de texte positionnée (coin haut-gauche)
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub position: Point,
    pub font: FontRole,
    pub color: Rgb888,
}

/// Contenu complet d'un écran, avant rastérisation
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgb888,
    pub lines: Vec<TextLine>,
    /// Couleur du carré "données périmées", None si les données sont fraîches
    pub stale_marker: Option<Rgb888>,
}

impl Scene {
    /// Première ligne dont le texte est exactement `text`
    pub fn line(&self, text: &str) -> Option<&TextLine> {
        self.lines.iter().find(|line| line.text == text)
    }

    /// Textes de toutes les lignes, dans l'ordre de dessin
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// Dessine la scène dans une nouvelle Frame
    pub fn rasterize(&self) -> Frame {
        let mut frame = Frame::filled(self.background);

        for line in &self.lines {
            draw_line(&mut frame, line);
        }

        if let Some(color) = self.stale_marker {
            let size = STALE_MARKER_SIZE;
            let corner = Point::new(
                (DISPLAY_WIDTH - size) as i32 - 3,
                (crate::render::frame::DISPLAY_HEIGHT - size) as i32 - 3,
            );
            infallible(
                Rectangle::new(corner, Size::new(size, size))
                    .into_styled(PrimitiveStyle::with_fill(color))
                    .draw(&mut frame),
            );
        }

        frame
    }
}

/// Dessine une ligne de texte
///
/// Les flèches ↑/↓ n'existent pas dans les polices bitmap ASCII : elles sont
/// dessinées comme un triangle plein dans la cellule du caractère.
fn draw_line(frame: &mut Frame, line: &TextLine) {
    let font = line.font.font();
    let style = MonoTextStyle::new(font, line.color);
    let advance = (font.character_size.width + font.character_spacing) as i32;

    let mut x = line.position.x;
    let y = line.position.y;
    let mut segment = String::new();

    for c in line.text.chars() {
        if c == '↑' || c == '↓' {
            x = flush_segment(frame, &mut segment, x, y, style, advance);
            draw_arrow(frame, c == '↑', Point::new(x, y), font.character_size, line.color);
            x += advance;
        } else {
            segment.push(c);
        }
    }

    flush_segment(frame, &mut segment, x, y, style, advance);
}

/// Dessine le texte accumulé et retourne l'abscisse suivante
fn flush_segment(
    frame: &mut Frame,
    segment: &mut String,
    x: i32,
    y: i32,
    style: MonoTextStyle<'static, Rgb888>,
    advance: i32,
) -> i32 {
    if segment.is_empty() {
        return x;
    }

    infallible(Text::with_baseline(segment.as_str(), Point::new(x, y), style, Baseline::Top).draw(frame));
    let next = x + advance * segment.chars().count() as i32;
    segment.clear();
    next
}

fn draw_arrow(frame: &mut Frame, up: bool, cell: Point, size: Size, color: Rgb888) {
    let w = size.width as i32;
    let h = size.height as i32;
    let top = cell.y + h / 5;
    let bottom = cell.y + h * 3 / 4;
    let (left, right, middle) = (cell.x, cell.x + w - 1, cell.x + (w - 1) / 2);

    let triangle = if up {
        Triangle::new(Point::new(middle, top), Point::new(left, bottom), Point::new(right, bottom))
    } else {
        Triangle::new(Point::new(left, top), Point::new(right, top), Point::new(middle, bottom))
    };

    infallible(
        triangle
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(frame),
    );
}

/// Dessiner dans une Frame ne peut pas échouer
fn infallible<T>(result: Result<T, std::convert::Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

// ============================================================================
// FrameRenderer
// ============================================================================

/// Données nécessaires pour composer un écran
#[derive(Debug, Clone, Copy)]
pub struct QuoteView<'a> {
    pub symbol: &'a str,
    /// None tant qu'aucune cotation n'a été obtenue pour ce symbole
    pub quote: Option<&'a Quote>,
    pub market_open: bool,
    /// true si la dernière requête a échoué et que la cotation est ancienne
    pub stale: bool,
}

/// Compose les écrans à partir des cotations
///
/// Fonction pure : mêmes entrées, mêmes pixels.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    theme: Theme,
}

impl FrameRenderer {
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Rendu d'un symbole avec une cotation fraîche
    pub fn render(&self, symbol: &str, quote: &Quote, market_open: bool) -> Frame {
        self.render_view(&QuoteView {
            symbol,
            quote: Some(quote),
            market_open,
            stale: false,
        })
    }

    /// Rendu complet (cotation absente ou périmée comprise)
    pub fn render_view(&self, view: &QuoteView<'_>) -> Frame {
        self.compose(view).rasterize()
    }

    /// Construit la Scene d'un écran
    pub fn compose(&self, view: &QuoteView<'_>) -> Scene {
        let theme = &self.theme;
        let mut lines = Vec::new();

        // Symbole en haut à gauche
        lines.push(TextLine {
            text: view.symbol.to_string(),
            position: Point::new(MARGIN, HEADER_Y),
            font: FontRole::Header,
            color: theme.symbol,
        });

        // Badge "MC" aligné à droite si le marché est fermé
        if !view.market_open {
            let width = FontRole::Header.font().text_width(CLOSED_BADGE) as i32;
            lines.push(TextLine {
                text: CLOSED_BADGE.to_string(),
                position: Point::new(DISPLAY_WIDTH as i32 - width - MARGIN, HEADER_Y),
                font: FontRole::Header,
                color: theme.badge,
            });
        }

        match view.quote {
            Some(quote) => {
                let color = theme.polarity_color(quote.polarity());
                push_wrapped(&mut lines, &quote.price_line(), FontRole::Price, PRICE_Y, color);
                push_wrapped(&mut lines, &quote.change_line(), FontRole::Change, CHANGE_Y, color);
            }
            None => {
                push_wrapped(&mut lines, NO_DATA, FontRole::Price, PRICE_Y, theme.negative);
            }
        }

        Scene {
            background: theme.background,
            lines,
            stale_marker: view.stale.then_some(theme.negative),
        }
    }
}

/// Ajoute un bloc de texte découpé en lignes à partir de l'ordonnée `y`
fn push_wrapped(lines: &mut Vec<TextLine>, text: &str, font: FontRole, y: i32, color: Rgb888) {
    let metric = font.font();
    let mut y = y;

    for text in wrap(text, metric, TEXT_WIDTH) {
        lines.push(TextLine {
            text,
            position: Point::new(MARGIN, y),
            font,
            color,
        });
        y += metric.line_height() as i32;
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
