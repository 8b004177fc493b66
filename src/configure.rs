use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub listen_addr: String,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
    /// Storage backend: "memory" or "sled".
    pub storage: String,
    pub data_dir: String,
    /// Bounded wait for a group's write region before failing retryable.
    pub lock_timeout_ms: u64,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("listen_addr", "0.0.0.0:8080")?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/splitledger.log")?
        .set_default("storage", "memory")?
        .set_default("data_dir", "data/splitledger")?
        .set_default("lock_timeout_ms", 5000_i64)?
        // Add configuration from a file, if present
        .add_source(File::with_name("config/config").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("APP"))
        .build()?;

    s.try_deserialize()
}
