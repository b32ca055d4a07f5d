use critique_engine::config::EngineConfig;

pub fn show(config: &EngineConfig) -> String {
    toml::to_string_pretty(config).unwrap_or_else(|_| "# failed to serialize config".to_string())
}
