use crate::domain::CalculationType;
use crate::generator::GeneratorOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine settings read from an optional JSON file. Every field may be
/// omitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    pub generator: GeneratorOptions,
    /// Categorization used before any file is loaded.
    pub default_calculation_type: CalculationType,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("failed to read engine config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse engine config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_engine_config(config_path: impl AsRef<Path>) -> Result<EngineConfig, EngineConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| EngineConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| EngineConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
