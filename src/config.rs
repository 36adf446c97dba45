use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub omdb_api_key: Option<String>,
    pub omdb_base_url: String,
    pub omdb_rps: u32,
    pub database_url: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()).parse().context("PORT")?;

        let omdb_api_key = std::env::var("OMDB_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let omdb_base_url = std::env::var("OMDB_BASE_URL")
            .unwrap_or_else(|_| "http://www.omdbapi.com/".to_string());

        let omdb_rps: u32 =
            std::env::var("OMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://reelshelf.db?mode=rwc".to_string());

        let http_timeout_secs: u64 =
            std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(30);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            omdb_api_key,
            omdb_base_url,
            omdb_rps,
            database_url,
            http_timeout_secs,
        })
    }
}
