use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::agents::RepairAgent;
use crate::error::{AppError, Result};
use crate::ifixit::{IfixitClient, IfixitConfig, DEFAULT_API_URL, DEFAULT_IMAGE_URL};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ifixit: IfixitConfig,
    pub keep_alive: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ifixit = IfixitConfig {
            timeout: Duration::from_secs(parse_or(&lookup, "IFIXIT_TIMEOUT_SECS", 15)?),
            ..IfixitConfig::default()
        }
        .with_api_url(lookup("IFIXIT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()))
        .with_image_url(lookup("IFIXIT_IMAGE_URL").unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()));

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            ifixit,
            keep_alive: Duration::from_secs(parse_or(&lookup, "SSE_KEEP_ALIVE_SECS", 15)?),
        })
    }
}

fn parse_or<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}

// ============================================================================
// Application state
// ============================================================================

pub struct AppState {
    pub agent: Arc<RepairAgent>,
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let client = IfixitClient::new(config.ifixit.clone())?;
        Ok(Self {
            agent: Arc::new(RepairAgent::new(Arc::new(client))),
            keep_alive: config.keep_alive,
        })
    }
}

pub fn app_init() -> Result<(Config, Arc<AppState>)> {
    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded");

    let state = Arc::new(AppState::new(&config)?);
    log::info!("✅ iFixit client ready ({})", config.ifixit.api_url);

    Ok((config, state))
}
