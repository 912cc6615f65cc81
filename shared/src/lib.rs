pub mod api;

use crate::error::{ConfigError, InitializationError};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::fmt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const ENV_VAR_PREFIX: &str = "MAP_SYNC__";
pub const SETTINGS_FILE: &str = "Settings.toml";

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub view: Option<ViewConfig>,
    pub server: Option<ServerConfig>,
}

/// Which upstream payload shape the configured URL serves.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Stations,
    Parkings,
}

impl SourceKind {
    pub const fn default_interval_seconds(self) -> u64 {
        match self {
            SourceKind::Stations => 30,
            SourceKind::Parkings => 60,
        }
    }

    pub const fn default_view(self) -> ViewConfig {
        match self {
            SourceKind::Stations => ViewConfig {
                latitude: 50.63297,
                longitude: 3.057520,
                zoom: 13,
                fit_padding: 50,
                fit_max_zoom: 13,
            },
            SourceKind::Parkings => ViewConfig {
                latitude: 50.62925,
                longitude: 3.057256,
                zoom: 13,
                fit_padding: 50,
                fit_max_zoom: 13,
            },
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Stations => f.write_str("stations"),
            SourceKind::Parkings => f.write_str("parkings"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub url: String,
    pub interval_seconds: Option<u64>,
    pub low_stock_threshold: Option<u32>,
}

impl SourceConfig {
    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
            .unwrap_or_else(|| self.kind.default_interval_seconds())
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

/// Fallback framing used when no facility can be fitted, plus the
/// options passed along with `fitBounds`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub fit_padding: u32,
    pub fit_max_zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Config {
    pub fn view(&self) -> ViewConfig {
        self.view.unwrap_or_else(|| self.source.kind.default_view())
    }

    pub fn bind_addr(&self) -> &str {
        self.server
            .as_ref()
            .map_or(DEFAULT_BIND_ADDR, |s| s.bind_addr.as_str())
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Toml::file(SETTINGS_FILE))
        .merge(Env::prefixed(ENV_VAR_PREFIX).split("__"))
        .extract::<Config>()?;

    if config.source.interval_seconds() == 0 {
        return Err(ConfigError::ZeroInterval);
    }
    Ok(config)
}

pub mod error {
    use thiserror::Error;
    use tracing::dispatcher::SetGlobalDefaultError;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("failed to load configuration: {0}")]
        Figment(#[from] figment::Error),
        #[error("source.interval_seconds must be greater than zero")]
        ZeroInterval,
    }

    #[derive(Debug, Error)]
    pub enum InitializationError {
        #[error(transparent)]
        Tracing(#[from] SetGlobalDefaultError),
        #[error(transparent)]
        Config(#[from] ConfigError),
    }
}

pub fn init_tracing() -> Result<(), InitializationError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub async fn shutdown_listener(token: Option<CancellationToken>) {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(name: "signal.sigterm.unavailable", error = ?e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(name: "signal.ctrlc.received", "received Ctrl+C signal, shutting down"),
        () = terminate => info!(name: "signal.sigterm.received", "received SIGTERM signal, shutting down"),
    }

    if let Some(token) = token {
        token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn loads_settings_file_and_applies_kind_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE,
                r#"
                [source]
                kind = "parkings"
                url = "http://localhost:8000/parkings"
                "#,
            )?;

            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.source.kind, SourceKind::Parkings);
            assert_eq!(config.source.interval_seconds(), 60);
            assert_eq!(config.source.low_stock_threshold(), 5);
            assert_eq!(config.view(), SourceKind::Parkings.default_view());
            assert_eq!(config.bind_addr(), DEFAULT_BIND_ADDR);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_settings_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE,
                r#"
                [source]
                kind = "stations"
                url = "http://localhost:8000/api/stations"
                "#,
            )?;
            jail.set_env("MAP_SYNC__SOURCE__INTERVAL_SECONDS", "10");
            jail.set_env("MAP_SYNC__SOURCE__LOW_STOCK_THRESHOLD", "3");

            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.source.kind, SourceKind::Stations);
            assert_eq!(config.source.interval_seconds(), 10);
            assert_eq!(config.source.low_stock_threshold(), 3);
            Ok(())
        });
    }

    #[test]
    fn zero_interval_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE,
                r#"
                [source]
                kind = "stations"
                url = "http://localhost:8000/api/stations"
                interval_seconds = 0
                "#,
            )?;
            assert!(matches!(load_config(), Err(ConfigError::ZeroInterval)));

            jail.set_env("MAP_SYNC__SOURCE__INTERVAL_SECONDS", "15");
            let config = load_config().map_err(|e| e.to_string())?;
            assert_eq!(config.source.interval_seconds(), 15);
            Ok(())
        });
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE,
                r#"
                [source]
                kind = "scooters"
                url = "http://localhost:8000/scooters"
                "#,
            )?;

            assert!(load_config().is_err());
            Ok(())
        });
    }
}
