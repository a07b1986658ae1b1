//! Server configuration loaded from the environment.

use std::io;

use cloudproof_core::MAX_WINDOW_DAYS;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UI_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Listener, CORS and window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub ui_origins: Vec<String>,
    /// Trailing window for heatmap requests without `days` or `span`.
    pub default_days: u32,
}

impl ServerConfig {
    /// Build config from `CLOUDPROOF_*` environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> io::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("CLOUDPROOF_HOST")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("CLOUDPROOF_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| invalid(format!("CLOUDPROOF_PORT must be a u16 number: {err}")))?,
            None => DEFAULT_PORT,
        };
        let origins =
            lookup("CLOUDPROOF_UI_ORIGINS").unwrap_or_else(|| DEFAULT_UI_ORIGINS.to_string());
        let default_days = match lookup("CLOUDPROOF_DEFAULT_DAYS") {
            Some(raw) => parse_days(&raw)?,
            None => MAX_WINDOW_DAYS,
        };
        Ok(Self {
            host,
            port,
            ui_origins: parse_origins(&origins),
            default_days,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_days(raw: &str) -> io::Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Ok(days),
        _ => Err(invalid(format!(
            "CLOUDPROOF_DEFAULT_DAYS must be between 1 and {MAX_WINDOW_DAYS}, got {raw:?}"
        ))),
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}
