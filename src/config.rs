// ============================================================================
// Configuration
// ============================================================================
// Lit la configuration depuis les variables d'environnement
//
// CONCEPTS RUST :
// 1. thiserror : erreurs typées avec messages générés par #[error(...)]
// 2. Closures génériques : from_lookup() accepte n'importe quelle source
//    de clés (l'environnement en prod, une HashMap dans les tests)
//
// Toute erreur de configuration est fatale : le programme s'arrête avant
// d'ouvrir l'écran.
// ============================================================================

use std::time::Duration;

use thiserror::Error;

/// Variable contenant le jeton d'accès Finnhub
pub const TOKEN_VAR: &str = "FINNHUB_API_KEY";
pub const SYMBOLS_VAR: &str = "TICKERBOARD_SYMBOLS";
pub const EXCHANGE_VAR: &str = "TICKERBOARD_EXCHANGE";
pub const API_URL_VAR: &str = "TICKERBOARD_API_URL";
pub const REFRESH_VAR: &str = "TICKERBOARD_REFRESH_SECS";
pub const MARKET_CHECK_VAR: &str = "TICKERBOARD_MARKET_CHECK_SECS";
pub const SWITCH_VAR: &str = "TICKERBOARD_SWITCH_SECS";
pub const FADE_VAR: &str = "TICKERBOARD_FADE_SECS";

/// Durée maximale d'une phase de fondu, en secondes
pub const MAX_FADE_SECS: u64 = 60;

pub const DEFAULT_SYMBOLS: &[&str] = &["AMPX", "VOO", "JPM"];
pub const DEFAULT_EXCHANGE: &str = "US";
pub const DEFAULT_API_URL: &str = "https://finnhub.io/api/v1";

/// Erreurs de configuration (fatales au démarrage)
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Aucun jeton d'accès fourni
    #[error("Jeton d'accès manquant : définissez FINNHUB_API_KEY")]
    MissingToken,

    /// La liste de symboles ne contient aucun symbole
    #[error("La liste de symboles (TICKERBOARD_SYMBOLS) est vide")]
    EmptySymbols,

    /// Symbole contenant des caractères interdits
    #[error("Symbole invalide : {0:?}")]
    InvalidSymbol(String),

    /// Valeur numérique illisible ou nulle
    #[error("Valeur invalide pour {key} : {value:?} (entier > 0 attendu)")]
    InvalidNumber { key: &'static str, value: String },
}

/// Configuration complète de l'afficheur
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Jeton d'accès à l'API
    pub token: String,

    /// Symboles à faire tourner, dans l'ordre
    pub symbols: Vec<String>,

    /// Code de la place boursière pour le statut du marché (ex: "US")
    pub exchange: String,

    /// URL de base de l'API
    pub api_url: String,

    /// Rafraîchissement de la cotation (marché ouvert uniquement)
    pub refresh_interval: Duration,

    /// Vérification du statut du marché (marché fermé uniquement)
    pub market_check_interval: Duration,

    /// Passage au symbole suivant
    pub switch_interval: Duration,

    /// Durée de chaque phase du fondu, en secondes entières
    pub fade_seconds: u32,
}

impl Config {
    /// Charge la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration depuis une fonction de recherche de clés
    ///
    /// CONCEPT RUST : Generic avec trait bound
    /// - F: Fn(&str) -> Option<String> accepte closures et fonctions
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let symbols = match lookup(SYMBOLS_VAR) {
            Some(raw) => parse_symbols(&raw)?,
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };

        let exchange = lookup(EXCHANGE_VAR)
            .map(|e| e.trim().to_uppercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string());

        let api_url = lookup(API_URL_VAR)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            symbols,
            exchange,
            api_url,
            refresh_interval: Duration::from_secs(parse_number(&lookup, REFRESH_VAR, 5)?),
            market_check_interval: Duration::from_secs(parse_number(&lookup, MARKET_CHECK_VAR, 300)?),
            switch_interval: Duration::from_secs(parse_number(&lookup, SWITCH_VAR, 30)?),
            fade_seconds: parse_number_max(&lookup, FADE_VAR, 1, MAX_FADE_SECS)? as u32,
        })
    }
}

/// Découpe une liste "AAPL, voo ,JPM" en symboles majuscules
pub fn parse_symbols(raw: &str) -> Result<Vec<String>, ConfigError> {
    let symbols: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(ConfigError::EmptySymbols);
    }

    if let Some(bad) = symbols.iter().find(|s| !is_valid_symbol(s)) {
        return Err(ConfigError::InvalidSymbol(bad.clone()));
    }

    Ok(symbols)
}

fn is_valid_symbol(symbol: &str) -> bool {
    symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | ':'))
}

fn parse_number<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_number_max(lookup, key, default, u32::MAX as u64)
}

/// Entier strictement positif, borné par `max`
fn parse_number_max<F>(
    lookup: &F,
    key: &'static str,
    default: u64,
    max: u64,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 && value <= max => Ok(value),
            _ => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_token_only() {
        let config = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc")])).unwrap();

        assert_eq!(config.token, "abc");
        assert_eq!(config.symbols, vec!["AMPX", "VOO", "JPM"]);
        assert_eq!(config.exchange, "US");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.market_check_interval, Duration::from_secs(300));
        assert_eq!(config.switch_interval, Duration::from_secs(30));
        assert_eq!(config.fade_seconds, 1);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[])),
            Err(ConfigError::MissingToken)
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[(TOKEN_VAR, "   ")])),
            Err(ConfigError::MissingToken)
        );
    }

    #[test]
    fn test_symbols_are_normalized() {
        let config = Config::from_lookup(lookup_from(&[
            (TOKEN_VAR, "abc"),
            (SYMBOLS_VAR, " aapl, brk.b ,,msft "),
        ]))
        .unwrap();

        assert_eq!(config.symbols, vec!["AAPL", "BRK.B", "MSFT"]);
    }

    #[test]
    fn test_empty_symbol_list_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (SYMBOLS_VAR, " , ,")]));
        assert_eq!(result, Err(ConfigError::EmptySymbols));
    }

    #[test]
    fn test_invalid_symbol_is_rejected() {
        assert_eq!(
            parse_symbols("AAPL,BAD SYMBOL"),
            Err(ConfigError::InvalidSymbol("BAD SYMBOL".to_string()))
        );
    }

    #[test]
    fn test_invalid_interval_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (SWITCH_VAR, "0")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidNumber {
                key: SWITCH_VAR,
                value: "0".to_string()
            })
        );

        let result = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (FADE_VAR, "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidNumber { key: FADE_VAR, .. })));
    }

    #[test]
    fn test_fade_duration_is_bounded() {
        let config = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (FADE_VAR, "60")])).unwrap();
        assert_eq!(config.fade_seconds, 60);

        let result = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (FADE_VAR, "200000000")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidNumber {
                key: FADE_VAR,
                value: "200000000".to_string()
            })
        );

        // Les autres intervalles gardent la borne u32
        let config = Config::from_lookup(lookup_from(&[(TOKEN_VAR, "abc"), (SWITCH_VAR, "200000000")])).unwrap();
        assert_eq!(config.switch_interval, Duration::from_secs(200_000_000));
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            (TOKEN_VAR, "abc"),
            (API_URL_VAR, "http://localhost:8080/api/"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/api");
    }
}
