use critique_history::{GlobalStats, HistoryStore};

pub async fn run(store_path: String) -> anyhow::Result<GlobalStats> {
    let store = HistoryStore::open(store_path).await?;
    let stats = store.get_stats().await?;
    store.close().await?;
    Ok(stats)
}
