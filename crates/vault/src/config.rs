//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which [`crate::storage::RecordRepository`] backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// Single SQLite file at [`Config::database_path`].
    Sqlite,
}

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// AES-256 key as text; its UTF-8 encoding must be exactly 32 bytes. **Required.**
    pub encryption_key: String,

    /// CBC IV as text; its UTF-8 encoding must be exactly 16 bytes. **Required.**
    pub initialization_vector: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Storage backend.
    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,

    /// SQLite database file, used when `storage_backend` is `sqlite`.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// OTLP endpoint for span export. Spans are not exported when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_database_path() -> String {
    "vault.db".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    ///
    /// Key and IV lengths are checked again, authoritatively, when the cipher
    /// is built; here they only need to be present.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.encryption_key, "ENCRYPTION_KEY")?;
        ensure_non_empty(&self.initialization_vector, "INITIALIZATION_VECTOR")?;

        if self.storage_backend == StorageBackend::Sqlite {
            ensure_non_empty(&self.database_path, "DATABASE_PATH")?;
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("initialization_vector", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("storage_backend", &self.storage_backend)
            .field("database_path", &self.database_path)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
