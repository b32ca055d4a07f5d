//! `run_review`: turns a review request into an `AggregateResult`.
//!
//! Mirrors `mr-reviewer::lib::run_review`'s numbered-steps shape and its
//! `tracing::info!`-per-step instrumentation. Handles (cache, history,
//! commit store) are constructed once by the caller and passed in by
//! reference/value rather than held as ambient state, per the "avoid
//! ambient state" design note.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use critique_diff::{acquire, Diff, ReviewMode};
use critique_providers::{ProviderClient, ReviewRequest};
use critique_rules::Rules;

use crate::cache_handle::CacheHandle;
use crate::config::EngineConfig;
use crate::errors::{EngineResult, FileReviewError};
use crate::fingerprint;
use crate::language::detect_language;
use crate::model::{AggregateResult, FileResult, SeverityTotals};
use crate::pool::WorkerPool;
use crate::selection::select_files;

/// What the caller wants reviewed; mirrors the CLI's `mode`/`commit`/
/// `branch`/`files` inputs from §6.
pub enum ReviewInput {
    Staged,
    Commit(String),
    Range { from: String, to: String },
    Branch,
    Files(Vec<String>),
}

fn acquire_diff(config: &EngineConfig, input: &ReviewInput) -> EngineResult<(Diff, ReviewMode, Option<String>, Option<String>)> {
    let repo_path = Path::new(&config.git.repo_path);
    let (diff, mode, refs) = match input {
        ReviewInput::Staged => {
            let (diff, refs) = acquire::acquire_staged(repo_path)?;
            (diff, ReviewMode::Staged, refs)
        }
        ReviewInput::Commit(commit_ref) => {
            let (diff, refs) = acquire::acquire_commit(repo_path, commit_ref)?;
            (diff, ReviewMode::Commit, refs)
        }
        ReviewInput::Range { from, to } => {
            let (diff, refs) = acquire::acquire_range(repo_path, from, to)?;
            (diff, ReviewMode::Commit, refs)
        }
        ReviewInput::Branch => {
            let (diff, refs) = acquire::acquire_branch(repo_path, &config.git.base_branch)?;
            (diff, ReviewMode::Branch, refs)
        }
        ReviewInput::Files(paths) => {
            let owned: Vec<std::path::PathBuf> = paths.iter().map(std::path::PathBuf::from).collect();
            let (diff, refs) = acquire::acquire_files(&owned)?;
            (diff, ReviewMode::Files, refs)
        }
    };
    Ok((diff, mode, refs.base, refs.head))
}

/// Runs the full pipeline described in §4.5. Per-file provider/cache/
/// history/commit-store errors are recorded on the per-file result and
/// never abort the run; only acquisition/parsing errors (or a health-check
/// failure before the first call) return `Err`.
pub async fn run_review(
    config: &EngineConfig,
    input: ReviewInput,
    provider: &ProviderClient,
    rules: &Rules,
    cache: &CacheHandle,
    history: Option<&critique_history::HistoryStore>,
    commit_store: Option<&critique_commits::CommitStore>,
    memory: Option<&critique_memory::MemoryHandle>,
    cancel: CancellationToken,
) -> EngineResult<AggregateResult> {
    let started_at = Utc::now();
    let t0 = Instant::now();

    info!("engine: step1 acquisition + parsing");
    let (diff, mode, base, head) = acquire_diff(config, &input)?;

    info!(files = diff.files.len(), "engine: step2 parsed");

    info!("engine: step3 selection");
    let selected = select_files(&diff, &config.git.ignore_patterns, &config.review.include_globs);
    debug!(selected = selected.len(), total = diff.files.len(), "engine: selection complete");

    let active_rules = rules.apply_preset(config.rules.preset_tag());

    let concurrency = config.resolved_concurrency();
    let mut pool: WorkerPool<(usize, FileResult)> = WorkerPool::new(concurrency, cancel.clone());
    info!(workers = concurrency, "engine: step7 worker pool ready");

    let mut slots: Vec<Option<FileResult>> = (0..selected.len()).map(|_| None).collect();
    let mut submitted = 0usize;

    for (index, file) in selected.iter().enumerate() {
        if cancel.is_cancelled() {
            slots[index] = Some(FileResult::cancelled(file.display_path(), "unknown"));
            continue;
        }

        let language = detect_language(file.display_path());
        let diff_text = file.to_diff_text();

        info!(file = file.display_path(), "engine: step4 language detected");

        let matches = Rules::matches(&active_rules, &diff_text, &language);
        let pre_seeds: Vec<String> = matches.iter().map(|m| format!("[{:?}] {}: {}", m.severity, m.rule_name, m.matched_text)).collect();
        debug!(file = file.display_path(), rule_matches = matches.len(), "engine: step5 pre-filter");

        let fingerprint = fingerprint::compute(provider_name(provider), provider_model(provider), &diff_text, &language);

        if let Some(cached) = cache.get(&fingerprint).await {
            debug!(file = file.display_path(), "engine: step6 cache hit");
            slots[index] = Some(FileResult::succeeded(file.display_path(), language, cached, true));
            continue;
        }

        let path = file.display_path().to_string();
        let context = if pre_seeds.is_empty() { None } else { Some(pre_seeds.join("\n")) };
        let request = ReviewRequest { file_path: path.clone(), language: language.clone(), diff_payload: diff_text, context, fingerprint: fingerprint.clone() };
        let provider = provider.clone_handle();
        let cache = cache.clone();
        let min_severity = config.review.min_severity;
        let max_issues = config.review.max_issues;
        let fingerprint_owned = fingerprint.clone();
        let task_cancel = cancel.clone();

        let task: crate::pool::Task<(usize, FileResult)> = Box::new(move || {
            Box::pin(async move {
                let call_started = Instant::now();
                let outcome: Result<_, FileReviewError> = tokio::select! {
                    result = provider.review(&request) => result.map_err(|err| FileReviewError::from(&err)),
                    _ = task_cancel.cancelled() => Err(FileReviewError::Cancelled),
                };
                debug!(latency_ms = call_started.elapsed().as_millis(), "engine: step7/8 provider call complete");
                match outcome {
                    Ok(mut response) => {
                        response.issues.retain(|issue| issue.severity >= min_severity);
                        if let Some(max) = max_issues {
                            response.issues.truncate(max as usize);
                        }
                        cache.set(&fingerprint_owned, response.clone()).await;
                        crate::pool::Outcome::ok((index, FileResult::succeeded(path, language, response, false)))
                    }
                    Err(file_err) => {
                        warn!(file = %path, error = %file_err, "engine: provider call failed for file");
                        crate::pool::Outcome::err((index, FileResult::failed(path, language, file_err)))
                    }
                }
            })
        });

        if pool.submit(task).await.is_err() {
            warn!("engine: pool rejected submission, pool is shutting down");
            break;
        }
        submitted += 1;
    }

    for _ in 0..submitted {
        if let Some((index, result)) = pool.output().recv().await {
            slots[index] = Some(result);
        }
    }
    pool.stop().await;

    info!("engine: step9 aggregation");
    let mut severity_totals = SeverityTotals::default();
    let mut score_sum = 0.0f64;
    let mut score_count = 0u32;
    let mut total_issues = 0u32;

    let files: Vec<FileResult> = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.unwrap_or_else(|| FileResult::cancelled(selected.get(index).map(|f| f.display_path()).unwrap_or("<unknown>"), "unknown")))
        .collect();

    for file in &files {
        if let Some(response) = &file.response {
            score_sum += response.score as f64;
            score_count += 1;
            for issue in &response.issues {
                severity_totals.record(issue.severity);
                total_issues += 1;
            }

            if let Some(history) = history {
                for issue in &response.issues {
                    let record = critique_history::HistoryRecord::from_issue(issue, &file.path, head.as_deref(), None);
                    if let Err(err) = history.insert(record).await {
                        warn!(%err, file = %file.path, "engine: step10 history insert failed, continuing");
                    }
                }
            }

            if let Some(memory) = memory {
                for issue in &response.issues {
                    let tags = vec![file.path.clone(), format!("{:?}", issue.issue_type).to_lowercase()];
                    memory.remember(critique_memory::MemoryKind::Issue, issue.message.clone(), tags.clone(), issue_importance(issue.severity)).await;
                    if let Some(fixed_code) = &issue.fixed_code {
                        memory.remember(critique_memory::MemoryKind::Fix, fixed_code.clone(), tags, issue_importance(issue.severity)).await;
                    }
                }
            }
        }
    }

    if matches!(mode, ReviewMode::Commit) {
        if let (Some(commit_store), Some(hash)) = (commit_store, head.as_deref()) {
            let analyzed_files: Vec<critique_commits::AnalyzedFile> = files
                .iter()
                .map(|f| critique_commits::AnalyzedFile {
                    path: f.path.clone(),
                    language: f.language.clone(),
                    score: f.response.as_ref().map(|r| r.score),
                    issues: f.issues().to_vec(),
                })
                .collect();
            let analysis = critique_commits::CommitAnalysis::from_aggregate(hash, &analyzed_files, provider_name(provider), provider_model(provider));
            if let Err(err) = commit_store.store(&analysis).await {
                warn!(%err, "engine: step10 commit-analysis archive write failed, continuing");
            }
        }
    }

    let overall_score = if score_count > 0 { Some(score_sum / score_count as f64) } else { None };

    info!(elapsed_ms = t0.elapsed().as_millis(), total_issues, "engine: run complete");

    Ok(AggregateResult {
        total_files: files.len() as u32,
        total_issues,
        severity_totals,
        overall_score,
        mode,
        base,
        head,
        files,
        started_at,
        finished_at: Utc::now(),
    })
}

/// Maps severity to the importance score memory uses for promotion/decay;
/// critical findings clear the long-term promotion bar sooner than info-level noise.
fn issue_importance(severity: critique_providers::Severity) -> f32 {
    use critique_providers::Severity;
    match severity {
        Severity::Info => 0.2,
        Severity::Warning => 0.4,
        Severity::Error => 0.6,
        Severity::Critical => 0.9,
    }
}

fn provider_name(provider: &ProviderClient) -> &'static str {
    match provider {
        ProviderClient::Ollama(_) => "ollama",
        ProviderClient::OpenAiCompatible(_) => "openai_compatible",
        ProviderClient::Gemini(_) => "gemini",
    }
}

fn provider_model(provider: &ProviderClient) -> &str {
    provider.model()
}

impl crate::config::RulesConfig {
    pub fn preset_tag(&self) -> &'static str {
        match self.preset {
            crate::config::Preset::Minimal => critique_rules::PRESET_MINIMAL,
            crate::config::Preset::Standard => critique_rules::PRESET_STANDARD,
            crate::config::Preset::Strict => critique_rules::PRESET_STRICT,
        }
    }
}

impl ProviderClient {
    /// Cheap clone for moving into a worker task: every variant wraps a
    /// `reqwest::Client`, itself `Arc`-backed internally, so this is not a
    /// deep copy of connection state.
    fn clone_handle(&self) -> ProviderClient {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, RulesConfig};

    #[test]
    fn preset_tag_maps_to_rules_crate_constants() {
        let mut cfg = RulesConfig::default();
        cfg.preset = Preset::Strict;
        assert_eq!(cfg.preset_tag(), critique_rules::PRESET_STRICT);
        cfg.preset = Preset::Minimal;
        assert_eq!(cfg.preset_tag(), critique_rules::PRESET_MINIMAL);
    }
}
