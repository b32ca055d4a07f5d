//! Subcommand implementations. Each function owns its own engine wiring
//! (no ambient state across commands), per SPEC_FULL.md's "construct once,
//! pass explicit handles" design note.

pub mod config_cmd;
pub mod fix;
pub mod history;
pub mod init;
pub mod recall;
pub mod review;
pub mod search;
pub mod stats;

use std::path::{Path, PathBuf};

use critique_engine::config::EngineConfig;
use critique_engine::CacheHandle;
use critique_providers::ProviderClient;
use critique_rules::Rules;

use crate::config_loader;

pub fn history_db_path(config: &EngineConfig) -> PathBuf {
    Path::new(&config.git.repo_path).join(".critique-history.sqlite3")
}

pub fn build_provider(config: &EngineConfig) -> anyhow::Result<ProviderClient> {
    Ok(ProviderClient::from_config(config_loader::to_model_config(&config.provider))?)
}

pub fn build_rules(config: &EngineConfig) -> anyhow::Result<Rules> {
    let dir = Path::new(&config.rules.rules_dir);
    if !dir.exists() {
        return Ok(Rules::default());
    }
    Ok(Rules::load(dir)?)
}

pub fn build_cache(config: &EngineConfig) -> CacheHandle {
    CacheHandle::new(&config.cache)
}

pub async fn build_memory(config: &EngineConfig) -> anyhow::Result<critique_memory::MemoryHandle> {
    let memory_config = config_loader::to_memory_config(&config.memory);
    Ok(critique_memory::MemoryHandle::new(&memory_config).await?)
}
