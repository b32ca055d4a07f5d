use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HebbianConfig {
    pub decay_rate: f32,
    pub min_activation: f32,
}

impl Default for HebbianConfig {
    fn default() -> Self {
        Self { decay_rate: 0.05, min_activation: 0.05 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub dir: String,
    pub working_size: usize,
    pub session_capacity: usize,
    pub session_ttl_secs: u64,
    pub semantic_search: bool,
    pub hebbian: HebbianConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: ".critique-memory".to_string(),
            working_size: 100,
            session_capacity: 500,
            session_ttl_secs: 3600,
            semantic_search: false,
            hebbian: HebbianConfig::default(),
        }
    }
}
