use crate::cli::{args::ExperimentOverrides, global::GlobalArgs};
use cellhts_layout::LayoutRegistry;
use std::fs;
use std::path::PathBuf;

/// Expands `~` and resolves a user-supplied configuration path.
fn resolve_config_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let expanded = shellexpand::tilde(path);
    let canonical = fs::canonicalize(expanded.as_ref())
        .map_err(|e| format!("Cannot access config file '{}': {}", path, e))?;
    if !canonical.is_file() {
        return Err(format!("Config path '{}' is not a file", path).into());
    }
    Ok(canonical)
}

/// Load the registry named by `--config`, or the layered default search path
pub fn load_registry(global: &GlobalArgs) -> Result<LayoutRegistry, Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => {
            let path = resolve_config_path(path)?;
            tracing::debug!(path = %path.display(), "loading layout config");
            LayoutRegistry::load_from_file(&path)
        }
        None => LayoutRegistry::load_with_overrides(),
    }
}

/// Registry with command-line experiment settings applied
pub fn with_overrides(config: &LayoutRegistry, overrides: &ExperimentOverrides) -> LayoutRegistry {
    let mut registry = config.clone();
    let experiment = &mut registry.experiment;

    if !overrides.methods.is_empty() {
        experiment.methods = overrides.methods.clone();
    }
    if !overrides.params.is_empty() {
        experiment.parameters = overrides.params.clone();
    }
    if let Some(name) = &overrides.experiment {
        experiment.name = name.clone();
    }
    if let Some(count) = overrides.replicate_count {
        experiment.replicate_count = count;
    }

    registry
}
