//! Option file loading and saving.
//!
//! Options are layered: built-in defaults, then the system file, then the
//! user file. Each file is a partial JSON object. A file that is missing is
//! skipped silently; one that cannot be read or parsed is skipped with a
//! warning, and its problems are returned for the front end to show.

use std::path::Path;

use sage_types::config::{ModelCatalog, Options, OptionsLayer, default_available_models};
use sage_types::error::ConfigError;

use crate::filesystem::SagePaths;

/// Read one layer. `Ok(None)` when the file does not exist.
async fn read_layer(path: &Path) -> Result<Option<OptionsLayer>, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config at {}, skipping", path.display());
            return Ok(None);
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    serde_json::from_str::<OptionsLayer>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
}

/// Load options from defaults, the system file, and the user file.
///
/// Never fails: every problem is logged and returned alongside the options.
pub async fn load_options(paths: &SagePaths) -> (Options, Vec<ConfigError>) {
    let mut options = Options::default();
    let mut problems = Vec::new();

    for path in [&paths.system_config_file, &paths.user_config_file] {
        match read_layer(path).await {
            Ok(Some(layer)) => {
                for problem in options.apply_layer(layer) {
                    tracing::warn!("{}: {problem}", path.display());
                    problems.push(problem);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("{err}, using previous values");
                problems.push(err);
            }
        }
    }

    (options, problems)
}

/// Write the whole options record to the user file as pretty JSON.
pub async fn save_options(paths: &SagePaths, options: &Options) -> Result<(), ConfigError> {
    let path = &paths.user_config_file;
    let write_err = |reason: String| ConfigError::Write {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_err(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(options).map_err(|e| write_err(e.to_string()))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| write_err(e.to_string()))?;

    tracing::info!("options saved to {}", path.display());
    Ok(())
}

/// Load the model catalog, falling back to the built-in list.
pub async fn load_available_models(paths: &SagePaths) -> Vec<String> {
    let path = &paths.models_file;
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read {}: {err}, using built-in models", path.display());
            }
            return default_available_models();
        }
    };

    match serde_json::from_str::<ModelCatalog>(&content) {
        Ok(catalog) if !catalog.available_models.is_empty() => catalog.available_models,
        Ok(_) => default_available_models(),
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using built-in models", path.display());
            default_available_models()
        }
    }
}
