use super::CliError;
use anyhow::Context;
use fresco_core::{
    EditingSession, EngineConfig, LoadOutcome, ParameterCatalog, PotentialTypeRegistry,
    load_engine_config,
};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the stderr subscriber. `RUST_LOG` overrides the `-v` count.
pub(super) fn init_logging(verbosity: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let filter = if quiet {
        EnvFilter::new(level.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact();

    // Already installed when the CLI runs more than once in one process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

pub(super) fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => Ok(load_engine_config(path).map_err(anyhow::Error::from)?),
        None => Ok(EngineConfig::default()),
    }
}

pub(super) fn read_namelist(path: &Path) -> Result<String, CliError> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read namelist '{}'", path.display()))?;
    Ok(text)
}

pub(super) fn write_output(path: &Path, content: &str) -> Result<(), CliError> {
    fresco_core::serialization::write_text_artifact(path, content).map_err(CliError::Engine)?;
    info!(path = %path.display(), bytes = content.len(), "wrote namelist");
    Ok(())
}

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode JSON output")?;
    println!("{rendered}");
    Ok(())
}

/// Read-only engine tables plus the CLI's config, shared by every command.
pub(super) struct EngineContext {
    pub(super) catalog: ParameterCatalog,
    pub(super) registry: PotentialTypeRegistry,
    pub(super) config: EngineConfig,
}

impl EngineContext {
    pub(super) fn new(config: &EngineConfig) -> Self {
        Self {
            catalog: ParameterCatalog::fresco(),
            registry: PotentialTypeRegistry::standard(),
            config: config.clone(),
        }
    }

    pub(super) fn session(&self) -> EditingSession<'_> {
        EditingSession::new(
            &self.catalog,
            &self.registry,
            self.config.default_calculation_type,
        )
        .with_options(self.config.generator.clone())
    }

    /// Reads and loads a file into a fresh session.
    pub(super) fn open(&self, path: &Path) -> Result<(EditingSession<'_>, LoadOutcome), CliError> {
        let text = read_namelist(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read namelist");
        let mut session = self.session();
        let outcome = session.load(&text).map_err(CliError::Engine)?;
        Ok((session, outcome))
    }
}

pub(super) fn compile_pattern(pattern: &str) -> Result<GlobMatcher, CliError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| CliError::Usage(format!("invalid file pattern '{pattern}': {source}")))
}

/// Files under `root` whose name matches `matcher`, sorted by path.
pub(super) fn collect_matching_files(
    root: &Path,
    matcher: &GlobMatcher,
) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(directory) = pending.pop() {
        let entries = fs::read_dir(&directory)
            .with_context(|| format!("failed to list directory '{}'", directory.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to list directory '{}'", directory.display()))?;
            let path = entry.path();
            // Symlinked directories are not followed.
            let file_type = entry
                .file_type()
                .with_context(|| format!("failed to inspect '{}'", path.display()))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if matcher.is_match(entry.file_name()) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
