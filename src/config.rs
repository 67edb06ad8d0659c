use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::constants::{
    CONFIG_FILE_NAME, DEFAULT_CLEANED_DIR, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RAW_DIR,
    DEFAULT_STORE_PATH, ENV_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local; contents are lost on exit
    Memory,
    /// JSON Lines file shared between processes
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    pub raw_dir: PathBuf,
    pub cleaned_dir: PathBuf,
    pub export_cleaned: bool,
    pub max_workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub etl: EtlConfig,
}

impl AppConfig {
    /// Layer built-in defaults, `water-quality.toml` in the working directory,
    /// an explicit config file, then `WQ_`-prefixed environment variables
    /// (`WQ_SERVER__PORT=8080`, `WQ_STORE__BACKEND=memory`).
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("store.backend", "file")?
            .set_default("store.path", DEFAULT_STORE_PATH)?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("etl.raw_dir", DEFAULT_RAW_DIR)?
            .set_default("etl.cleaned_dir", DEFAULT_CLEANED_DIR)?
            .set_default("etl.export_cleaned", true)?
            .set_default("etl.max_workers", num_cpus::get() as u64)?
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
