// ============================================================================
// Tickerboard - Afficheur de cotations
// ============================================================================
// Fait tourner une liste de symboles boursiers sur un écran 128x128
// simulé dans le terminal, avec un fondu entre deux symboles.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Boucle cadencée : 30 images par seconde, un seul thread
// 3. Async dans sync : le client HTTP tourne dans un runtime tokio local
// 4. Restauration du terminal même en cas d'erreur
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use tickerboard::api::FinnhubProvider;
use tickerboard::app::{run, App, Clock, LoopSettings, SystemClock};
use tickerboard::config::Config;
use tickerboard::models::SymbolRotation;
use tickerboard::render::FrameRenderer;
use tickerboard::ui::TerminalDisplay;

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/tickerboard/logs
/// - macOS : ~/Library/Application Support/tickerboard/logs
/// - Sinon : ./logs
fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tickerboard").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/tickerboard/logs/tickerboard.log
/// RUST_LOG=tickerboard=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "tickerboard.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour tickerboard, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickerboard=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Logging avant tout le reste ; un échec n'est pas fatal
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("Tickerboard starting up");

    // Une configuration invalide arrête tout avant d'ouvrir le terminal
    let config = Config::from_env().context("Configuration invalide")?;
    info!(
        symbols = ?config.symbols,
        exchange = %config.exchange,
        refresh = ?config.refresh_interval,
        market_check = ?config.market_check_interval,
        switch = ?config.switch_interval,
        fade_seconds = config.fade_seconds,
        "Configuration loaded"
    );

    let mut provider = FinnhubProvider::from_config(&config)?;
    let rotation = SymbolRotation::new(config.symbols.clone())?;

    // Premier statut du marché et première cotation, avant le TUI
    println!("📊 Chargement de {}...", rotation.current());
    let mut clock = SystemClock;
    let mut app = App::start(
        LoopSettings::from(&config),
        FrameRenderer::default(),
        rotation,
        &mut provider,
        clock.now(),
    );

    debug!("Setting up terminal");
    let mut display = TerminalDisplay::open()?;

    info!("Starting event loop");
    let result = run(&mut app, &mut display, &mut provider, &mut clock);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    display.restore()?;

    match &result {
        Ok(_) => info!(
            switches = app.completed_switches(),
            "Application exited normally"
        ),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}
