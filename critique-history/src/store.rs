//! `HistoryStore`: the §4.7 contract over a single SQLite file.

use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;

use crate::db::open_db;
use crate::errors::HistoryResult;
use crate::model::{
    issue_type_from_str, issue_type_to_str, severity_from_str, severity_to_str, FileHistory, GlobalStats, HistoryRecord, SearchQuery,
    SeverityDistribution, TypeDistribution,
};

pub struct HistoryStore {
    conn: Connection,
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let created_at: i64 = row.get("created_at")?;
    Ok(HistoryRecord {
        id: row.get("id")?,
        commit_hash: row.get("commit_hash")?,
        file_path: row.get("file_path")?,
        line: row.get::<_, Option<i64>>("line")?.map(|v| v as u32),
        severity: severity_from_str(&row.get::<_, String>("severity")?),
        issue_type: issue_type_from_str(&row.get::<_, String>("issue_type")?),
        message: row.get("message")?,
        suggestion: row.get("suggestion")?,
        author: row.get("author")?,
        branch: row.get("branch")?,
        created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_else(Utc::now),
        resolved: row.get::<_, i64>("resolved")? != 0,
    })
}

impl HistoryStore {
    pub async fn open(path: impl Into<String>) -> HistoryResult<Self> {
        let path = path.into();
        let conn = open_db(&path).await?;
        Ok(Self { conn })
    }

    pub async fn insert(&self, record: HistoryRecord) -> HistoryResult<i64> {
        let id = self
            .conn
            .call(move |db| {
                db.execute(
                    "INSERT INTO history_records
                        (commit_hash, file_path, line, severity, issue_type, message, suggestion, author, branch, created_at, resolved)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    rusqlite::params![
                        record.commit_hash,
                        record.file_path,
                        record.line.map(|v| v as i64),
                        severity_to_str(record.severity),
                        issue_type_to_str(record.issue_type),
                        record.message,
                        record.suggestion,
                        record.author,
                        record.branch,
                        record.created_at.timestamp(),
                        record.resolved as i64,
                    ],
                )?;
                Ok(db.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn mark_resolved(&self, id: i64) -> HistoryResult<()> {
        self.conn
            .call(move |db| {
                db.execute("UPDATE history_records SET resolved = 1 WHERE id = ?1", rusqlite::params![id])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn search(&self, query: SearchQuery) -> HistoryResult<(Vec<HistoryRecord>, u64)> {
        let result = self
            .conn
            .call(move |db| {
                let mut sql = String::from("SELECT h.* FROM history_records h");
                let mut conditions = Vec::new();
                let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

                if let Some(text) = &query.text {
                    sql.push_str(" JOIN history_fts f ON f.rowid = h.id");
                    conditions.push("history_fts MATCH ?".to_string());
                    params.push(Box::new(text.clone()));
                }
                if let Some(glob) = &query.file_glob {
                    conditions.push("h.file_path GLOB ?".to_string());
                    params.push(Box::new(glob.clone()));
                }
                if let Some(author) = &query.author {
                    conditions.push("h.author = ?".to_string());
                    params.push(Box::new(author.clone()));
                }
                if let Some(severity) = query.severity {
                    conditions.push("h.severity = ?".to_string());
                    params.push(Box::new(severity_to_str(severity).to_string()));
                }
                if let Some(issue_type) = query.issue_type {
                    conditions.push("h.issue_type = ?".to_string());
                    params.push(Box::new(issue_type_to_str(issue_type).to_string()));
                }
                if let Some(branch) = &query.branch {
                    conditions.push("h.branch = ?".to_string());
                    params.push(Box::new(branch.clone()));
                }
                if let Some(since) = query.since {
                    conditions.push("h.created_at >= ?".to_string());
                    params.push(Box::new(since.timestamp()));
                }
                if let Some(until) = query.until {
                    conditions.push("h.created_at <= ?".to_string());
                    params.push(Box::new(until.timestamp()));
                }
                if let Some(resolved) = query.resolved {
                    conditions.push("h.resolved = ?".to_string());
                    params.push(Box::new(resolved as i64));
                }

                if !conditions.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&conditions.join(" AND "));
                }

                let count_sql = format!("SELECT COUNT(*) FROM ({sql})");
                let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
                let total: i64 = db.query_row(&count_sql, param_refs.as_slice(), |r| r.get(0))?;

                sql.push_str(" ORDER BY h.created_at DESC LIMIT ? OFFSET ?");
                params.push(Box::new(query.limit as i64));
                params.push(Box::new(query.offset as i64));
                let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

                let mut stmt = db.prepare(&sql)?;
                let rows = stmt.query_map(param_refs.as_slice(), row_to_record)?;
                let records: Vec<HistoryRecord> = rows.collect::<rusqlite::Result<_>>()?;
                Ok((records, total as u64))
            })
            .await?;
        Ok(result)
    }

    pub async fn get_file_history(&self, path: impl Into<String>) -> HistoryResult<FileHistory> {
        let path = path.into();
        let history = self
            .conn
            .call(move |db| {
                let mut stmt = db.prepare("SELECT * FROM history_records WHERE file_path = ?1")?;
                let rows = stmt.query_map(rusqlite::params![path], row_to_record)?;
                let records: Vec<HistoryRecord> = rows.collect::<rusqlite::Result<_>>()?;

                let mut severity_distribution = SeverityDistribution::default();
                let mut type_distribution = TypeDistribution::default();
                let mut resolved = 0u64;
                let mut first: Option<DateTime<Utc>> = None;
                let mut last: Option<DateTime<Utc>> = None;

                for record in &records {
                    match record.severity {
                        critique_providers::Severity::Info => severity_distribution.info += 1,
                        critique_providers::Severity::Warning => severity_distribution.warning += 1,
                        critique_providers::Severity::Error => severity_distribution.error += 1,
                        critique_providers::Severity::Critical => severity_distribution.critical += 1,
                    }
                    match record.issue_type {
                        critique_providers::IssueType::Bug => type_distribution.bug += 1,
                        critique_providers::IssueType::Security => type_distribution.security += 1,
                        critique_providers::IssueType::Performance => type_distribution.performance += 1,
                        critique_providers::IssueType::Style => type_distribution.style += 1,
                        critique_providers::IssueType::BestPractice => type_distribution.best_practice += 1,
                    }
                    if record.resolved {
                        resolved += 1;
                    }
                    first = Some(first.map_or(record.created_at, |f| f.min(record.created_at)));
                    last = Some(last.map_or(record.created_at, |l| l.max(record.created_at)));
                }

                let review_rounds = records.iter().map(|r| r.commit_hash.clone()).collect::<std::collections::HashSet<_>>().len() as u64;

                Ok(FileHistory {
                    file_path: path,
                    total: records.len() as u64,
                    resolved,
                    pending: records.len() as u64 - resolved,
                    review_rounds,
                    first_reviewed_at: first,
                    last_reviewed_at: last,
                    severity_distribution,
                    type_distribution,
                })
            })
            .await?;
        Ok(history)
    }

    pub async fn get_stats(&self) -> HistoryResult<GlobalStats> {
        let stats = self
            .conn
            .call(|db| {
                let total_records: i64 = db.query_row("SELECT COUNT(*) FROM history_records", [], |r| r.get(0))?;
                let total_resolved: i64 = db.query_row("SELECT COUNT(*) FROM history_records WHERE resolved = 1", [], |r| r.get(0))?;
                let files_touched: i64 = db.query_row("SELECT COUNT(DISTINCT file_path) FROM history_records", [], |r| r.get(0))?;

                let mut distribution = SeverityDistribution::default();
                for sev in ["info", "warning", "error", "critical"] {
                    let count: i64 = db.query_row("SELECT COUNT(*) FROM history_records WHERE severity = ?1", rusqlite::params![sev], |r| r.get(0))?;
                    match sev {
                        "info" => distribution.info = count as u64,
                        "warning" => distribution.warning = count as u64,
                        "error" => distribution.error = count as u64,
                        _ => distribution.critical = count as u64,
                    }
                }

                Ok(GlobalStats {
                    total_records: total_records as u64,
                    total_resolved: total_resolved as u64,
                    total_pending: (total_records - total_resolved) as u64,
                    files_touched: files_touched as u64,
                    severity_distribution: distribution,
                })
            })
            .await?;
        Ok(stats)
    }

    pub async fn close(self) -> HistoryResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_providers::{Issue, IssueType, Severity};

    fn sample_issue(severity: Severity) -> Issue {
        Issue { issue_type: IssueType::Bug, severity, message: "SQL injection risk".to_string(), suggestion: Some("parameterize".to_string()), fixed_code: None, location: None, root_cause: None }
    }

    #[tokio::test]
    async fn insert_then_search_round_trips() {
        let store = HistoryStore::open(":memory:").await.unwrap();
        let record = HistoryRecord::from_issue(&sample_issue(Severity::Critical), "src/db.rs", Some("abc123"), Some("main"));
        let id = store.insert(record).await.unwrap();
        assert!(id > 0);

        let (records, total) = store.search(SearchQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_path, "src/db.rs");
    }

    #[tokio::test]
    async fn full_text_search_matches_message() {
        let store = HistoryStore::open(":memory:").await.unwrap();
        store.insert(HistoryRecord::from_issue(&sample_issue(Severity::Error), "a.rs", None, None)).await.unwrap();

        let query = SearchQuery { text: Some("injection".to_string()), ..Default::default() };
        let (records, total) = store.search(query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn mark_resolved_updates_flag() {
        let store = HistoryStore::open(":memory:").await.unwrap();
        let id = store.insert(HistoryRecord::from_issue(&sample_issue(Severity::Warning), "a.rs", None, None)).await.unwrap();
        store.mark_resolved(id).await.unwrap();

        let query = SearchQuery { resolved: Some(true), ..Default::default() };
        let (records, total) = store.search(query).await.unwrap();
        assert_eq!(total, 1);
        assert!(records[0].resolved);
    }

    #[tokio::test]
    async fn file_history_rollup_counts_by_severity() {
        let store = HistoryStore::open(":memory:").await.unwrap();
        store.insert(HistoryRecord::from_issue(&sample_issue(Severity::Critical), "a.rs", Some("c1"), None)).await.unwrap();
        store.insert(HistoryRecord::from_issue(&sample_issue(Severity::Warning), "a.rs", Some("c2"), None)).await.unwrap();

        let history = store.get_file_history("a.rs").await.unwrap();
        assert_eq!(history.total, 2);
        assert_eq!(history.severity_distribution.critical, 1);
        assert_eq!(history.severity_distribution.warning, 1);
        assert_eq!(history.review_rounds, 2);
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let store = HistoryStore::open(":memory:").await.unwrap();
        for _ in 0..5 {
            store.insert(HistoryRecord::from_issue(&sample_issue(Severity::Info), "a.rs", None, None)).await.unwrap();
        }
        let query = SearchQuery { limit: 2, ..Default::default() };
        let (records, total) = store.search(query).await.unwrap();
        assert!(records.len() <= 2);
        assert!(total >= records.len() as u64);
    }
}
