// ============================================================================
// API Client : Finnhub
// ============================================================================
// Récupère la cotation d'un symbole et le statut du marché depuis Finnhub
//
// CONCEPTS RUST :
// 1. async/await : le client reqwest est asynchrone
// 2. Result<T, E> : gestion d'erreurs avec contexte (anyhow)
// 3. Serde : désérialisation JSON automatique
// 4. block_on : FinnhubProvider expose une interface bloquante à la boucle
// ============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::api::QuoteProvider;
use crate::config::Config;
use crate::models::Quote;

// ============================================================================
// Structures pour parser la réponse JSON de Finnhub
// ============================================================================
// Finnhub utilise des noms de champs d'une ou deux lettres :
// c = prix courant, d = variation, dp = variation en %, t = horodatage
//
// Les champs sont en Option : Finnhub renvoie null pour un symbole inconnu,
// on transforme ça en erreur explicite plutôt qu'en échec de parsing opaque.
// ============================================================================

/// Réponse de /quote
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "c")]
    current_price: Option<f64>,
    #[serde(rename = "d")]
    change: Option<f64>,
    #[serde(rename = "dp")]
    percent_change: Option<f64>,
    #[serde(rename = "t")]
    timestamp: Option<i64>,
}

/// Réponse de /stock/market-status
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")] // "isOpen" -> is_open
struct MarketStatusResponse {
    #[serde(default)]
    is_open: Option<bool>,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    holiday: Option<String>,
}

// ============================================================================
// Client asynchrone
// ============================================================================

/// Client HTTP Finnhub
///
/// Le client reqwest est construit une seule fois et réutilisé
/// (pool de connexions partagé entre les requêtes).
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinnhubClient {
    /// Crée un client pour l'URL de base donnée (ex: "https://finnhub.io/api/v1")
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tickerboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Récupère la cotation d'un symbole
    ///
    /// # Arguments
    /// * `symbol` - Symbole du ticker (ex: "AAPL", "VOO")
    ///
    /// # Retourne
    /// * `Result<Quote>` - Cotation ou erreur (réseau, HTTP, JSON, champ manquant)
    #[instrument(skip(self))]
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = build_quote_url(&self.base_url, symbol, &self.token);
        debug!(url = %redact(&url, &self.token), "Built Finnhub quote URL");

        let body = self.get_json(&url).await?;
        let quote = parse_quote(body, symbol)?;

        info!(
            price = quote.current_price,
            change = quote.change,
            percent = quote.percent_change,
            "Successfully fetched quote"
        );
        Ok(quote)
    }

    /// Récupère le statut d'ouverture de la place boursière
    ///
    /// Un champ "isOpen" absent ou null signifie marché fermé.
    #[instrument(skip(self))]
    pub async fn fetch_market_open(&self, exchange: &str) -> Result<bool> {
        let url = build_market_status_url(&self.base_url, exchange, &self.token);
        debug!(url = %redact(&url, &self.token), "Built Finnhub market status URL");

        let body = self.get_json(&url).await?;
        let open = parse_market_status(body)?;

        info!(open, "Successfully fetched market status");
        Ok(open)
    }

    /// GET + vérification du statut HTTP + lecture du JSON brut
    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP vers Finnhub")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Finnhub returned error status");
            anyhow::bail!("Finnhub a retourné une erreur : HTTP {}", status);
        }

        response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse Finnhub")
    }
}

/// URL de /quote
fn build_quote_url(base_url: &str, symbol: &str, token: &str) -> String {
    format!("{}/quote?symbol={}&token={}", base_url, symbol, token)
}

/// URL de /stock/market-status
fn build_market_status_url(base_url: &str, exchange: &str, token: &str) -> String {
    format!("{}/stock/market-status?exchange={}&token={}", base_url, exchange, token)
}

/// Masque le jeton avant de logger une URL
fn redact(url: &str, token: &str) -> String {
    if token.is_empty() {
        url.to_string()
    } else {
        url.replace(token, "***")
    }
}

/// Convertit le JSON de /quote en Quote
///
/// Les trois champs c, d et dp sont obligatoires.
fn parse_quote(body: serde_json::Value, symbol: &str) -> Result<Quote> {
    let response: QuoteResponse =
        serde_json::from_value(body).context("Réponse /quote mal formée")?;

    let current_price = response
        .current_price
        .with_context(|| format!("Champ 'c' manquant dans la cotation de {}", symbol))?;
    let change = response
        .change
        .with_context(|| format!("Champ 'd' manquant dans la cotation de {}", symbol))?;
    let percent_change = response
        .percent_change
        .with_context(|| format!("Champ 'dp' manquant dans la cotation de {}", symbol))?;

    if let Some(as_of) = response.timestamp.and_then(|t| DateTime::from_timestamp(t, 0)) {
        debug!(%as_of, "Quote timestamp");
    }

    Ok(Quote::new(current_price, change, percent_change))
}

/// Convertit le JSON de /stock/market-status en booléen
fn parse_market_status(body: serde_json::Value) -> Result<bool> {
    let response: MarketStatusResponse =
        serde_json::from_value(body).context("Réponse /stock/market-status mal formée")?;

    debug!(
        session = ?response.session,
        holiday = ?response.holiday,
        "Market status details"
    );

    Ok(response.is_open.unwrap_or(false))
}

// ============================================================================
// Adaptateur bloquant
// ============================================================================
// CONCEPT RUST : Async dans sync
// - La boucle d'affichage est synchrone et mono-thread
// - On garde un runtime tokio et on exécute chaque requête avec block_on()
// - Une requête lente bloque donc l'affichage, comme attendu
// ============================================================================

/// Fournisseur de cotations Finnhub utilisé par la boucle principale
pub struct FinnhubProvider {
    runtime: tokio::runtime::Runtime,
    client: FinnhubClient,
    exchange: String,
}

impl FinnhubProvider {
    pub fn new(client: FinnhubClient, exchange: impl Into<String>) -> Result<Self> {
        // Runtime mono-thread : tout reste sur le thread de la boucle
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Échec de la création du runtime tokio")?;

        Ok(Self {
            runtime,
            client,
            exchange: exchange.into(),
        })
    }

    /// Construit le fournisseur à partir de la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = FinnhubClient::new(config.api_url.clone(), config.token.clone())?;
        Self::new(client, config.exchange.clone())
    }
}

impl QuoteProvider for FinnhubProvider {
    fn fetch_quote(&mut self, symbol: &str) -> Result<Quote> {
        self.runtime.block_on(self.client.fetch_quote(symbol))
    }

    fn fetch_market_open(&mut self) -> Result<bool> {
        self.runtime
            .block_on(self.client.fetch_market_open(&self.exchange))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
