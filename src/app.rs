// ============================================================================
// Structure : App
// ============================================================================
// État de la boucle principale de l'afficheur
//
// CONCEPTS RUST :
// 1. State Management : tout l'état (minuteurs, index, écran) dans une struct
// 2. Enum pour state machine : Phase::Idle / Phase::Transitioning
// 3. Traits comme points d'injection : QuoteProvider, Display, Clock
//
// MACHINE À ÉTATS :
//
//   Idle ──(minuteur switch)──> Transitioning ──(fondu terminé)──> Idle
//     │                                                (index + 1)
//     └─(minuteur refresh, marché ouvert)─> re-rendu sur place
//
// À chaque tick en Idle, les minuteurs sont évalués dans un ordre fixe :
// market-check, refresh, switch. Chacun se déclenche au plus une fois.
// Pendant un fondu, aucun minuteur n'est évalué.
// ============================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::QuoteProvider;
use crate::config::Config;
use crate::models::{IntervalTimer, Quote, SymbolRotation};
use crate::render::{Frame, FrameRenderer, QuoteView, Transition, TICKS_PER_SECOND};

// ============================================================================
// Points d'injection
// ============================================================================

/// Surface d'affichage + source de la demande d'arrêt
pub trait Display {
    /// Affiche une image
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Vide les événements en attente, true si l'arrêt a été demandé
    fn quit_requested(&mut self) -> Result<bool>;
}

/// Horloge de la boucle
///
/// CONCEPT : Temps injecté
/// - SystemClock en production (vrai sommeil)
/// - Une horloge manuelle dans les tests (le temps avance sans attendre)
pub trait Clock {
    fn now(&self) -> Instant;

    /// Attend jusqu'à `deadline` (retour immédiat si déjà passée)
    fn sleep_until(&mut self, deadline: Instant);
}

/// Horloge système
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

// ============================================================================
// Réglages
// ============================================================================

/// Intervalles de la boucle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub refresh_interval: Duration,
    pub market_check_interval: Duration,
    pub switch_interval: Duration,
    pub fade_seconds: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
            market_check_interval: Duration::from_secs(300),
            switch_interval: Duration::from_secs(30),
            fade_seconds: 1,
        }
    }
}

impl From<&Config> for LoopSettings {
    fn from(config: &Config) -> Self {
        Self {
            refresh_interval: config.refresh_interval,
            market_check_interval: config.market_check_interval,
            switch_interval: config.switch_interval,
            fade_seconds: config.fade_seconds,
        }
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Fondu vers le symbole suivant
#[derive(Debug)]
struct PendingSwitch {
    transition: Transition,
    /// Le nouvel écran affiche-t-il une cotation périmée ?
    stale: bool,
}

/// État de la machine
#[derive(Debug)]
enum Phase {
    /// Un seul écran affiché, en attente des minuteurs
    Idle,
    /// Fondu en cours entre l'écran courant et le suivant
    Transitioning(Box<PendingSwitch>),
}

/// État principal de l'afficheur
pub struct App {
    /// Indique si la boucle doit continuer à tourner
    running: bool,

    settings: LoopSettings,
    renderer: FrameRenderer,
    rotation: SymbolRotation,

    /// Dernier statut connu du marché
    market_open: bool,

    /// Dernière cotation valide de chaque symbole
    /// CONCEPT : Last-known-good
    /// - Une requête en échec ne vide pas l'écran
    /// - On réaffiche la dernière cotation avec un indicateur "périmé"
    quotes: HashMap<String, Quote>,

    /// La cotation de l'écran courant est-elle périmée ?
    stale: bool,

    /// Écran courant (hors fondu)
    current_frame: Frame,

    refresh_timer: IntervalTimer,
    market_timer: IntervalTimer,
    switch_timer: IntervalTimer,

    phase: Phase,

    /// Nombre de fondus menés à terme
    completed_switches: u64,
}

impl App {
    /// Démarre l'afficheur : statut du marché, première cotation, premier écran
    ///
    /// Les trois minuteurs démarrent à `now`. Les erreurs réseau ne sont pas
    /// fatales : l'écran affiche "No data" jusqu'à la prochaine réussite.
    pub fn start<P: QuoteProvider>(
        settings: LoopSettings,
        renderer: FrameRenderer,
        rotation: SymbolRotation,
        provider: &mut P,
        now: Instant,
    ) -> Self {
        let market_open = match provider.fetch_market_open() {
            Ok(open) => open,
            Err(e) => {
                warn!(error = ?e, "Initial market status check failed, assuming closed");
                false
            }
        };

        let placeholder = Frame::filled(renderer.theme().background);

        let mut app = Self {
            running: true,
            settings,
            renderer,
            rotation,
            market_open,
            quotes: HashMap::new(),
            stale: false,
            current_frame: placeholder,
            refresh_timer: IntervalTimer::new(settings.refresh_interval, now),
            market_timer: IntervalTimer::new(settings.market_check_interval, now),
            switch_timer: IntervalTimer::new(settings.switch_interval, now),
            phase: Phase::Idle,
            completed_switches: 0,
        };

        let symbol = app.rotation.current().to_string();
        app.stale = !app.load_quote(provider, &symbol);
        app.current_frame = app.render_symbol(&symbol, app.stale);

        info!(%symbol, market_open, symbols = app.rotation.symbol_count(), "Ticker board started");
        app
    }

    /// Une itération de la boucle : fait avancer l'état et retourne
    /// l'image à afficher
    pub fn tick<P: QuoteProvider>(&mut self, now: Instant, provider: &mut P) -> Frame {
        // ========================================
        // Fondu en cours : une image par tick
        // ========================================
        if let Phase::Transitioning(pending) = &mut self.phase {
            if let Some(frame) = pending.transition.next() {
                return frame;
            }
            self.finish_switch();
            return self.current_frame.clone();
        }

        // ========================================
        // Idle : minuteurs dans l'ordre fixe
        // ========================================
        if !self.market_open && self.market_timer.fire_if_due(now) {
            self.check_market(provider);
        }

        if self.market_open && self.refresh_timer.fire_if_due(now) {
            self.refresh(provider);
        }

        if self.switch_timer.fire_if_due(now) {
            self.begin_switch(provider);
            if let Phase::Transitioning(pending) = &mut self.phase {
                if let Some(frame) = pending.transition.next() {
                    return frame;
                }
            }
        }

        self.current_frame.clone()
    }

    /// Met à jour le statut du marché (conserve l'ancien en cas d'erreur)
    fn check_market<P: QuoteProvider>(&mut self, provider: &mut P) {
        match provider.fetch_market_open() {
            Ok(open) => {
                if open != self.market_open {
                    info!(open, "Market status changed");
                }
                self.market_open = open;
            }
            Err(e) => warn!(error = ?e, "Market status check failed, keeping previous status"),
        }
    }

    /// Rafraîchit la cotation du symbole courant et le re-rend sur place
    fn refresh<P: QuoteProvider>(&mut self, provider: &mut P) {
        let symbol = self.rotation.current().to_string();
        debug!(%symbol, "Refreshing quote");

        self.stale = !self.load_quote(provider, &symbol);
        self.current_frame = self.render_symbol(&symbol, self.stale);
    }

    /// Prépare l'écran du symbole suivant et lance le fondu
    fn begin_switch<P: QuoteProvider>(&mut self, provider: &mut P) {
        let next = self.rotation.peek_next().to_string();
        debug!(from = %self.rotation.current(), to = %next, "Switching symbol");

        let stale = !self.load_quote(provider, &next);
        let next_frame = self.render_symbol(&next, stale);

        let transition = Transition::new(
            self.current_frame.clone(),
            next_frame,
            self.renderer.theme().overlay,
            self.settings.fade_seconds,
        );

        self.phase = Phase::Transitioning(Box::new(PendingSwitch { transition, stale }));
    }

    /// Fin du fondu : le symbole suivant devient le courant
    fn finish_switch(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        if let Phase::Transitioning(pending) = phase {
            let PendingSwitch { transition, stale } = *pending;
            self.current_frame = transition.into_target();
            self.stale = stale;
            self.rotation.advance();
            self.completed_switches += 1;
            info!(symbol = %self.rotation.current(), index = self.rotation.current_index(), "Switched symbol");
        }
    }

    /// Interroge le fournisseur ; true si une cotation fraîche a été obtenue
    fn load_quote<P: QuoteProvider>(&mut self, provider: &mut P, symbol: &str) -> bool {
        match provider.fetch_quote(symbol) {
            Ok(quote) => {
                self.quotes.insert(symbol.to_string(), quote);
                true
            }
            Err(e) => {
                warn!(%symbol, error = ?e, "Quote fetch failed, keeping last known quote");
                false
            }
        }
    }

    /// Rend l'écran d'un symbole à partir de la dernière cotation connue
    fn render_symbol(&self, symbol: &str, stale: bool) -> Frame {
        self.renderer.render_view(&QuoteView {
            symbol,
            quote: self.quotes.get(symbol),
            market_open: self.market_open,
            stale,
        })
    }

    /// Demande l'arrêt de la boucle
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si la boucle doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning(_))
    }

    pub fn current_symbol(&self) -> &str {
        self.rotation.current()
    }

    pub fn current_index(&self) -> usize {
        self.rotation.current_index()
    }

    pub fn current_frame(&self) -> &Frame {
        &self.current_frame
    }

    pub fn market_open(&self) -> bool {
        self.market_open
    }

    /// La cotation affichée est-elle périmée ?
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Dernière cotation valide d'un symbole
    pub fn last_quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    pub fn completed_switches(&self) -> u64 {
        self.completed_switches
    }
}

// ============================================================================
// Boucle principale
// ============================================================================
// CONCEPT : Game Loop
// - À chaque itération :
//   1. Vérifier la demande d'arrêt (aussi pendant les fondus)
//   2. Mettre à jour l'état (tick)
//   3. Afficher l'image
//   4. Attendre le prochain tick (30 par seconde)
// ============================================================================

/// Exécute la boucle jusqu'à la demande d'arrêt
pub fn run<D, P, C>(app: &mut App, display: &mut D, provider: &mut P, clock: &mut C) -> Result<()>
where
    D: Display,
    P: QuoteProvider,
    C: Clock,
{
    let period = Duration::from_secs(1) / TICKS_PER_SECOND;
    let mut next_tick = clock.now();

    while app.is_running() {
        if display.quit_requested()? {
            info!(transitioning = app.is_transitioning(), "Quit requested");
            app.quit();
            break;
        }

        let frame = app.tick(clock.now(), provider);
        display.present(&frame)?;

        // Pas de rattrapage : un tick en retard repart de maintenant
        next_tick += period;
        let now = clock.now();
        if next_tick < now {
            next_tick = now;
        }
        clock.sleep_until(next_tick);
    }

    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Faux fournisseur : cotations fixes, compte les appels
    struct FakeProvider {
        quotes: HashMap<String, Quote>,
        market_open: bool,
        fail: bool,
        quote_calls: usize,
        market_calls: usize,
    }

    impl FakeProvider {
        fn new(market_open: bool) -> Self {
            let mut quotes = HashMap::new();
            quotes.insert("AAA".to_string(), Quote::new(10.0, -0.5, -4.76));
            quotes.insert("BBB".to_string(), Quote::new(20.0, 1.25, 6.67));
            Self {
                quotes,
                market_open,
                fail: false,
                quote_calls: 0,
                market_calls: 0,
            }
        }
    }

    impl QuoteProvider for FakeProvider {
        fn fetch_quote(&mut self, symbol: &str) -> Result<Quote> {
            self.quote_calls += 1;
            if self.fail {
                bail!("network down");
            }
            match self.quotes.get(symbol) {
                Some(quote) => Ok(*quote),
                None => bail!("unknown symbol {}", symbol),
            }
        }

        fn fetch_market_open(&mut self) -> Result<bool> {
            self.market_calls += 1;
            if self.fail {
                bail!("network down");
            }
            Ok(self.market_open)
        }
    }

    fn rotation() -> SymbolRotation {
        SymbolRotation::new(vec!["AAA".to_string(), "BBB".to_string()]).unwrap()
    }

    fn start(provider: &mut FakeProvider, now: Instant) -> App {
        start_with(LoopSettings::default(), provider, now)
    }

    fn start_with(settings: LoopSettings, provider: &mut FakeProvider, now: Instant) -> App {
        App::start(settings, FrameRenderer::default(), rotation(), provider, now)
    }

    /// Réglages sans rotation pendant la durée d'un test
    fn without_switch() -> LoopSettings {
        LoopSettings {
            switch_interval: Duration::from_secs(3600),
            ..LoopSettings::default()
        }
    }

    /// Fait tourner les ticks à 30 Hz entre `from` et `to`
    fn drive(app: &mut App, provider: &mut FakeProvider, from: Instant, to: Instant) {
        let period = Duration::from_secs(1) / TICKS_PER_SECOND;
        let mut now = from;
        while now <= to {
            app.tick(now, provider);
            now += period;
        }
    }

    #[test]
    fn test_start_renders_first_symbol() {
        let mut provider = FakeProvider::new(false);
        let t0 = Instant::now();
        let app = start(&mut provider, t0);

        assert!(app.is_running());
        assert_eq!(app.current_symbol(), "AAA");
        assert!(!app.market_open());
        assert!(!app.is_stale());
        assert_eq!(provider.quote_calls, 1);
        assert_eq!(provider.market_calls, 1);

        let expected = FrameRenderer::default().render("AAA", &Quote::new(10.0, -0.5, -4.76), false);
        assert!(*app.current_frame() == expected);
    }

    #[test]
    fn test_refresh_skipped_while_market_closed() {
        let mut provider = FakeProvider::new(false);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);

        drive(&mut app, &mut provider, t0, t0 + Duration::from_secs(29));
        assert_eq!(provider.quote_calls, 1);
    }

    #[test]
    fn test_refresh_fires_while_market_open() {
        let mut provider = FakeProvider::new(true);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);

        // 5 s, 10 s, ..., 25 s : 5 rafraîchissements
        drive(&mut app, &mut provider, t0, t0 + Duration::from_secs(27));
        assert_eq!(provider.quote_calls, 1 + 5);
    }

    #[test]
    fn test_market_check_only_while_closed() {
        let mut provider = FakeProvider::new(true);
        let t0 = Instant::now();
        let mut app = start_with(without_switch(), &mut provider, t0);
        app.tick(t0 + Duration::from_secs(301), &mut provider);
        assert_eq!(provider.market_calls, 1);

        let mut provider = FakeProvider::new(false);
        let mut app = start_with(without_switch(), &mut provider, t0);
        app.tick(t0 + Duration::from_secs(299), &mut provider);
        assert_eq!(provider.market_calls, 1);
        app.tick(t0 + Duration::from_secs(300), &mut provider);
        assert_eq!(provider.market_calls, 2);
    }

    #[test]
    fn test_market_opening_enables_refresh() {
        let mut provider = FakeProvider::new(false);
        let t0 = Instant::now();
        let mut app = start_with(without_switch(), &mut provider, t0);

        provider.market_open = true;
        // Même tick : market-check puis refresh (en retard depuis longtemps)
        app.tick(t0 + Duration::from_secs(300), &mut provider);
        assert!(app.market_open());
        assert_eq!(provider.quote_calls, 2);
    }

    #[test]
    fn test_switch_runs_transition_then_advances() {
        let mut provider = FakeProvider::new(true);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);
        let switch_at = t0 + Duration::from_secs(30);

        app.tick(switch_at, &mut provider);
        assert!(app.is_transitioning());
        // L'index n'avance qu'à la fin du fondu
        assert_eq!(app.current_index(), 0);

        // Pendant le fondu, aucun minuteur : pas de refresh
        let calls = provider.quote_calls;
        for i in 1..64 {
            app.tick(switch_at + Duration::from_millis(33 * i), &mut provider);
            assert!(app.is_transitioning());
        }
        assert_eq!(provider.quote_calls, calls);

        app.tick(switch_at + Duration::from_secs(3), &mut provider);
        assert!(!app.is_transitioning());
        assert_eq!(app.current_symbol(), "BBB");
        assert_eq!(app.completed_switches(), 1);

        let expected = FrameRenderer::default().render("BBB", &Quote::new(20.0, 1.25, 6.67), true);
        assert!(*app.current_frame() == expected);
    }

    #[test]
    fn test_rotation_index_after_n_switches() {
        let mut provider = FakeProvider::new(false);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);

        // 5 fondus complets (30, 60, 90, 120, 150 s)
        drive(&mut app, &mut provider, t0, t0 + Duration::from_secs(155));
        assert_eq!(app.completed_switches(), 5);
        assert_eq!(app.current_index(), 5 % 2);
    }

    #[test]
    fn test_failed_refresh_keeps_last_quote() {
        let mut provider = FakeProvider::new(true);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);

        provider.fail = true;
        app.tick(t0 + Duration::from_secs(5), &mut provider);

        assert!(app.is_stale());
        assert_eq!(app.last_quote("AAA"), Some(&Quote::new(10.0, -0.5, -4.76)));

        let renderer = FrameRenderer::default();
        let quote = Quote::new(10.0, -0.5, -4.76);
        let expected = renderer.render_view(&QuoteView {
            symbol: "AAA",
            quote: Some(&quote),
            market_open: true,
            stale: true,
        });
        assert!(*app.current_frame() == expected);

        // La requête suivante réussit : l'indicateur disparaît
        provider.fail = false;
        app.tick(t0 + Duration::from_secs(10), &mut provider);
        assert!(!app.is_stale());
    }

    #[test]
    fn test_failed_market_check_keeps_status() {
        let mut provider = FakeProvider::new(false);
        let t0 = Instant::now();
        let mut app = start(&mut provider, t0);

        provider.fail = true;
        app.tick(t0 + Duration::from_secs(300), &mut provider);
        assert!(!app.market_open());
        assert_eq!(provider.market_calls, 2);
    }

    #[test]
    fn test_startup_failure_shows_no_data() {
        let mut provider = FakeProvider::new(true);
        provider.fail = true;
        let t0 = Instant::now();
        let app = start(&mut provider, t0);

        assert!(app.is_stale());
        assert!(!app.market_open());
        assert_eq!(app.last_quote("AAA"), None);

        let expected = FrameRenderer::default().render_view(&QuoteView {
            symbol: "AAA",
            quote: None,
            market_open: false,
            stale: true,
        });
        assert!(*app.current_frame() == expected);
    }

    #[test]
    fn test_app_quit() {
        let mut provider = FakeProvider::new(true);
        let mut app = start(&mut provider, Instant::now());
        assert!(app.is_running());

        app.quit();
        assert!(!app.is_running());
    }
}
