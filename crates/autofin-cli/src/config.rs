use std::fs;
use std::path::Path;

use autofin_core::EngineConfig;

/// Load and validate the engine configuration.
///
/// Files ending in `.yaml` / `.yml` are read as YAML, anything else as JSON.
/// Without a path the built-in defaults are used.
pub fn load_engine_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let file = Path::new(path);
    let contents = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read config '{}': {}", file.display(), e))?;

    let is_yaml = matches!(
        file.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let config: EngineConfig = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", file.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", file.display(), e))?
    };

    config.validate()?;
    tracing::debug!(path = %file.display(), "loaded engine config");
    Ok(config)
}
