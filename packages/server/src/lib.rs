//! API server core: configuration and route wiring.

pub mod routes;

use anyhow::{Context, Result};

/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When absent, /crawl collects pages but skips classification.
    pub gemini_api_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => 8000,
        };

        Ok(Self {
            database_url,
            gemini_api_key,
            port,
        })
    }
}

pub use routes::build_app;
