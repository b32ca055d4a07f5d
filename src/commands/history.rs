use critique_history::{FileHistory, GlobalStats, HistoryRecord, HistoryStore, SearchQuery};

use crate::cli::HistoryCommand;

pub enum HistoryOutcome {
    Search { records: Vec<HistoryRecord>, total: u64 },
    File(FileHistory),
    Stats(GlobalStats),
    Resolved(i64),
}

pub async fn run(store_path: String, command: &HistoryCommand) -> anyhow::Result<HistoryOutcome> {
    let store = HistoryStore::open(store_path).await?;
    let outcome = match command {
        HistoryCommand::Search { text, file_glob, author, resolved, limit, offset } => {
            let query = SearchQuery {
                text: text.clone(),
                file_glob: file_glob.clone(),
                author: author.clone(),
                resolved: *resolved,
                limit: *limit,
                offset: *offset,
                ..Default::default()
            };
            let (records, total) = store.search(query).await?;
            HistoryOutcome::Search { records, total }
        }
        HistoryCommand::File { path } => HistoryOutcome::File(store.get_file_history(path.clone()).await?),
        HistoryCommand::Stats => HistoryOutcome::Stats(store.get_stats().await?),
        HistoryCommand::Resolve { id } => {
            store.mark_resolved(*id).await?;
            HistoryOutcome::Resolved(*id)
        }
    };
    store.close().await?;
    Ok(outcome)
}
