// src/config.rs
//! Application configuration: TOML file + environment overrides.
//!
//! Lookup order:
//! 1. `.env` (via dotenvy, best-effort)
//! 2. `TONE_RISK_CONFIG` or `config/tone_risk.toml`; a missing file means defaults,
//!    a file that fails to parse is an error
//! 3. `TONE_RISK_HOST` / `TONE_RISK_PORT` overrides
//! 4. `OPENAI_API_KEY` for the provider key (never read from the file)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, io, path::Path};

use crate::store::DEFAULT_CAPACITY;

pub const DEFAULT_CONFIG_PATH: &str = "config/tone_risk.toml";
pub const ENV_CONFIG_PATH: &str = "TONE_RISK_CONFIG";
pub const ENV_HOST: &str = "TONE_RISK_HOST";
pub const ENV_PORT: &str = "TONE_RISK_PORT";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub provider: ProviderConfig,
    pub emergency: EmergencyConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    pub kind: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub daily_request_limit: u32,
    pub daily_token_limit: u64,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: "mock".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 10,
            daily_request_limit: 500,
            daily_token_limit: 200_000,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    pub cooldown_secs: i64,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 900,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON lines instead of the compact human format.
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Full load used by the binary.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load_from_file(&path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Parse a TOML file; a missing file yields defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("read config {}", path.display()));
            }
        };
        let cfg = Self::from_toml_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(raw)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = env::var(ENV_HOST) {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }
        if let Some(port) = env::var(ENV_PORT)
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
        {
            self.server.port = port;
        }
        self.provider.api_key = env::var(ENV_API_KEY).unwrap_or_default();
        self.sanitize();
    }

    fn sanitize(&mut self) {
        let d = AppConfig::default();
        if self.server.port == 0 {
            self.server.port = d.server.port;
        }
        if self.store.capacity == 0 {
            self.store.capacity = d.store.capacity;
        }
        if self.provider.timeout_secs == 0 {
            self.provider.timeout_secs = d.provider.timeout_secs;
        }
        if self.emergency.cooldown_secs < 0 {
            self.emergency.cooldown_secs = 0;
        }
        self.provider.kind = self.provider.kind.trim().to_ascii_lowercase();
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
