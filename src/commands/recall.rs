use critique_commits::{CommitAnalysis, CommitStore, RecallQuery};

pub async fn run(repo_path: &str, text: Option<String>, file: Option<String>, author: Option<String>) -> anyhow::Result<Vec<CommitAnalysis>> {
    let store = CommitStore::new(repo_path);
    let query = RecallQuery { text, file_path: file, author, ..Default::default() };
    Ok(store.recall(query).await?)
}
