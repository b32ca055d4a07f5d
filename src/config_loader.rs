//! Config assembly: TOML file, defaults, then environment-variable override
//! for secrets. Mirrors `cameronspears-cosmos::config::Config::load`'s
//! file-then-env precedence, adapted to TOML since `EngineConfig` is a
//! nested structure rather than a flat key/value map.

use std::path::Path;

use critique_engine::EngineConfig;
use critique_providers::ModelConfig;

/// Reads `path` if it exists; a missing file yields pure defaults rather
/// than an error, since `init` is optional and `review` should work against
/// an unconfigured repo with sane fallbacks.
pub fn load(path: &Path) -> anyhow::Result<EngineConfig> {
    let mut config = if path.exists() {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)?
    } else {
        EngineConfig::default()
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// `provider.api_key` follows the `MR_REVIEWER_CACHE_DIR`-style escape hatch:
/// an env var always wins over whatever the file holds, so credentials
/// never need to live on disk.
fn apply_env_overrides(config: &mut EngineConfig) {
    if let Ok(key) = std::env::var("CRITIQUE_API_KEY") {
        config.provider.api_key = Some(key);
    }
    if let Ok(url) = std::env::var("CRITIQUE_BASE_URL") {
        config.provider.base_url = url;
    }
}

/// `ProviderConfig` has no `top_p`/`max_retries` knobs (the config schema
/// never surfaces per-provider retry tuning); `ModelConfig` needs both, so
/// defaults from `critique_providers::config`'s own fallbacks are used here.
pub fn to_model_config(provider: &critique_engine::config::ProviderConfig) -> ModelConfig {
    ModelConfig {
        provider: provider.name,
        model: provider.model.clone(),
        endpoint: provider.base_url.clone(),
        api_key: provider.api_key.clone(),
        max_tokens: provider.max_tokens,
        temperature: provider.temperature,
        top_p: 0.95,
        timeout_secs: provider.timeout_secs,
        max_retries: 2,
    }
}

/// Engine and memory crates each own a `MemoryConfig`/`HebbianConfig` pair
/// to avoid a cross-crate dependency cycle (see DESIGN.md); the CLI is the
/// one place that knows about both and converts.
pub fn to_memory_config(memory: &critique_engine::config::MemoryConfig) -> critique_memory::MemoryConfig {
    critique_memory::MemoryConfig {
        enabled: memory.enabled,
        dir: memory.dir.clone(),
        working_size: memory.working_size,
        session_capacity: critique_memory::MemoryConfig::default().session_capacity,
        session_ttl_secs: memory.session_ttl_secs,
        semantic_search: memory.semantic_search,
        hebbian: critique_memory::HebbianConfig {
            decay_rate: memory.hebbian.decay_rate as f32,
            min_activation: memory.hebbian.min_activation as f32,
        },
    }
}

pub const DEFAULT_CONFIG_FILE: &str = ".critique.toml";

pub fn default_config_toml() -> String {
    let config = EngineConfig::default();
    toml::to_string_pretty(&config).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load(Path::new("/nonexistent/does-not-exist.toml")).unwrap();
        assert_eq!(config.provider.model, EngineConfig::default().provider.model);
    }

    #[test]
    fn env_override_wins_over_file_value() {
        std::env::set_var("CRITIQUE_API_KEY", "from-env");
        let mut config = EngineConfig::default();
        config.provider.api_key = Some("from-file".to_string());
        apply_env_overrides(&mut config);
        assert_eq!(config.provider.api_key.as_deref(), Some("from-env"));
        std::env::remove_var("CRITIQUE_API_KEY");
    }
}
