//! JSON config-file adapter.
//!
//! Implements [`ConfigPort`] by reading a [`BridgeConfig`] from a JSON
//! file.  Missing fields take their defaults; the result is validated
//! before it is handed out.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::BridgeConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<BridgeConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError(e),
        })?;
        let cfg: BridgeConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
