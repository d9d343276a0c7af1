use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::external::gemini::DEFAULT_MODEL;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Limits applied to every outbound call (model, places).
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalConfig {
    pub timeout_secs: u64,
    pub max_concurrency: usize,
    pub retry_backoff_ms: u64,
}

impl ExternalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub model_path: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub maps_api_key: String,
    pub ocr_language: String,
    pub external: ExternalConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).with_context(|| format!("{key} must be set"));
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());
        let number = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: or("JWT_ISSUER", "nutriscore"),
            audience: or("JWT_AUDIENCE", "nutriscore-users"),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };

        let external = ExternalConfig {
            timeout_secs: number("EXTERNAL_TIMEOUT_SECS", 30).max(1),
            max_concurrency: number("EXTERNAL_MAX_CONCURRENCY", 16).max(1) as usize,
            retry_backoff_ms: number("EXTERNAL_RETRY_BACKOFF_MS", 500),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt,
            model_path: or("MODEL_PATH", "models/nutrition_density.json"),
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: or("GEMINI_MODEL", DEFAULT_MODEL),
            maps_api_key: required("GOOGLE_MAPS_API_KEY")?,
            ocr_language: or("OCR_LANGUAGE", "eng"),
            external,
        })
    }
}
