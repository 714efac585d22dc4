// ============================================================================
// Affichage dans le terminal
// ============================================================================
// Présente le framebuffer 128x128 dans un terminal avec ratatui
//
// CONCEPT : Demi-blocs Unicode
// - Une cellule du terminal affiche le caractère '▀'
// - La couleur du texte (fg) colore la moitié haute : pixel (x, 2y)
// - La couleur du fond (bg) colore la moitié basse : pixel (x, 2y + 1)
// - 128x128 pixels tiennent donc dans 128 colonnes x 64 lignes
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
    Terminal,
};

use crate::app::Display;
use crate::render::{Frame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::ui::events::EventHandler;

/// Caractère demi-bloc supérieur
const UPPER_HALF_BLOCK: &str = "▀";

// ============================================================================
// Widget
// ============================================================================

/// Widget ratatui qui dessine une Frame, centrée dans la zone
///
/// CONCEPT RUST : Lifetime 'a
/// - Le widget emprunte la Frame le temps du rendu, sans la copier
pub struct FrameWidget<'a> {
    frame: &'a Frame,
}

impl<'a> FrameWidget<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Tronque si le terminal est plus petit que l'afficheur
        let cols = (DISPLAY_WIDTH as u16).min(area.width);
        let rows = (DISPLAY_HEIGHT.div_ceil(2) as u16).min(area.height);

        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let top = self.frame.pixel(col as u32, row as u32 * 2);
                let bottom = self.frame.pixel(col as u32, row as u32 * 2 + 1);

                let cell = buf.get_mut(x0 + col, y0 + row);
                cell.set_symbol(UPPER_HALF_BLOCK);
                if let Some(color) = top {
                    cell.set_fg(to_color(color));
                }
                if let Some(color) = bottom {
                    cell.set_bg(to_color(color));
                }
            }
        }
    }
}

fn to_color(color: Rgb888) -> Color {
    Color::Rgb(color.r(), color.g(), color.b())
}

// ============================================================================
// Display terminal
// ============================================================================

/// Afficheur plein terminal (raw mode + écran alternatif)
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    events: EventHandler,
}

impl TerminalDisplay {
    /// Configure le terminal en mode TUI
    ///
    /// CONCEPT : Alternate screen
    /// - Écran secondaire qui ne pollue pas l'historique
    /// - Quand on quitte, l'écran précédent est restauré
    pub fn open() -> Result<Self> {
        enable_raw_mode().context("Échec de l'activation du raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .context("Échec du passage sur l'écran alternatif")?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))
            .context("Échec de l'initialisation du terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            events: EventHandler::new(),
        })
    }

    /// Restaure le terminal à son état normal
    ///
    /// Appelé dans main() même si la boucle s'est terminée en erreur.
    pub fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Display for TerminalDisplay {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.terminal
            .draw(|f| {
                let area = f.size();
                f.render_widget(FrameWidget::new(frame), area);
            })
            .context("Échec du rendu dans le terminal")?;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool> {
        self.events.quit_requested()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
