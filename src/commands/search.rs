use critique_engine::config::EngineConfig;
use critique_memory::{MemoryHandle, SearchHit};
use critique_providers::ProviderClient;

use crate::config_loader;

pub async fn run(config: &EngineConfig, query: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>> {
    let memory_config = config_loader::to_memory_config(&config.memory);
    let handle = MemoryHandle::new(&memory_config).await?;

    let provider: Option<ProviderClient> = if memory_config.semantic_search {
        ProviderClient::from_config(config_loader::to_model_config(&config.provider)).ok()
    } else {
        None
    };

    match handle {
        MemoryHandle::Noop(noop) => Ok(noop.search(provider.as_ref(), query, limit).await),
        MemoryHandle::Active(store) => Ok(store.search(provider.as_ref(), query, limit).await?),
    }
}
