use std::env::VarError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Application Configuration - Environment Variables
// ============================================================================
//
// DATABASE_URL              required
// LEDGER_BACKEND            postgres | memory        (postgres)
// LEDGER_CLAIM_LEASE_SECS   handler lease            (300)
// DATABASE_MAX_CONNECTIONS                           (5)
// WEBHOOK_BIND                                       (0.0.0.0:8080)
// WEBHOOK_PATH                                       (/webhook/core-usuarios)
// HUB_BROKERS                                        (127.0.0.1:9092)
// HUB_ACK_TOPIC                                      (hub.acks)
// HUB_SOURCE                                         (users)
// HUB_ACK_TIMEOUT_MS                                 (2000)
// METRICS_PORT                                       (9090)
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres,
    Memory,
}

impl FromStr for LedgerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(LedgerBackend::Postgres),
            "memory" => Ok(LedgerBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub ledger_backend: LedgerBackend,
    pub ledger_claim_lease: Duration,
    pub webhook_bind: SocketAddr,
    pub webhook_path: String,
    pub hub_brokers: String,
    pub hub_ack_topic: String,
    pub hub_source: String,
    pub hub_ack_timeout: Duration,
    pub metrics_port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Read configuration through `reader` instead of the process environment
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let database_url =
            reader("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;

        let webhook_path = var_or(&reader, "WEBHOOK_PATH", "/webhook/core-usuarios");
        if !webhook_path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "WEBHOOK_PATH",
                format!("'{webhook_path}' must start with '/'"),
            ));
        }

        Ok(Self {
            database_url,
            database_max_connections: parse_var(&reader, "DATABASE_MAX_CONNECTIONS", "5")?,
            ledger_backend: parse_var(&reader, "LEDGER_BACKEND", "postgres")?,
            ledger_claim_lease: Duration::from_secs(parse_var(
                &reader,
                "LEDGER_CLAIM_LEASE_SECS",
                "300",
            )?),
            webhook_bind: parse_var(&reader, "WEBHOOK_BIND", "0.0.0.0:8080")?,
            webhook_path,
            hub_brokers: var_or(&reader, "HUB_BROKERS", "127.0.0.1:9092"),
            hub_ack_topic: var_or(&reader, "HUB_ACK_TOPIC", "hub.acks"),
            hub_source: var_or(&reader, "HUB_SOURCE", "users"),
            hub_ack_timeout: Duration::from_millis(parse_var(&reader, "HUB_ACK_TIMEOUT_MS", "2000")?),
            metrics_port: parse_var(&reader, "METRICS_PORT", "9090")?,
        })
    }
}

fn var_or<F>(reader: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, VarError>,
{
    reader(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T, F>(reader: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(reader, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key, e.to_string()))
}
