use std::path::Path;

use critique_engine::config::EngineConfig;
use critique_engine::pipeline::{run_review, ReviewInput};
use critique_engine::AggregateResult;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::{FormatArg, ModeArg, PresetArg, ReviewArgs};
use crate::commands::{build_cache, build_memory, build_provider, build_rules, history_db_path};
use crate::config_loader;

pub fn apply_overrides(config: &mut EngineConfig, args: &ReviewArgs, repo_override: Option<&Path>) {
    if let Some(repo) = repo_override {
        config.git.repo_path = repo.to_string_lossy().into_owned();
    }
    if let Some(provider) = &args.provider {
        match provider.as_str() {
            "ollama" => config.provider.name = critique_providers::ProviderKind::Ollama,
            "openai_compatible" | "openai" => config.provider.name = critique_providers::ProviderKind::OpenAiCompatible,
            "gemini" => config.provider.name = critique_providers::ProviderKind::Gemini,
            other => warn!(provider = other, "cli: unrecognized --provider value, keeping config default"),
        }
    }
    if let Some(model) = &args.model {
        config.provider.model = model.clone();
    }
    if let Some(format) = args.format {
        config.output.format = match format {
            FormatArg::Markdown => critique_engine::config::OutputFormat::Markdown,
            FormatArg::Json => critique_engine::config::OutputFormat::Json,
            FormatArg::Sarif => critique_engine::config::OutputFormat::Sarif,
        };
    }
    if let Some(preset) = args.preset {
        config.rules.preset = match preset {
            PresetArg::Minimal => critique_engine::config::Preset::Minimal,
            PresetArg::Standard => critique_engine::config::Preset::Standard,
            PresetArg::Strict => critique_engine::config::Preset::Strict,
        };
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.review.max_concurrency = max_concurrency;
    }
    if args.no_cache {
        config.cache.enabled = false;
    }
    if !args.include.is_empty() {
        config.review.include_globs = args.include.clone();
    }
    if !args.exclude.is_empty() {
        config.git.ignore_patterns.extend(args.exclude.iter().cloned());
    }
}

fn to_review_input(args: &ReviewArgs) -> anyhow::Result<ReviewInput> {
    Ok(match args.mode {
        ModeArg::Staged => ReviewInput::Staged,
        ModeArg::Commit => {
            let commit = args.commit.clone().ok_or_else(|| anyhow::anyhow!("--mode commit requires --commit <ref>"))?;
            ReviewInput::Commit(commit)
        }
        ModeArg::Branch => ReviewInput::Branch,
        ModeArg::Files => {
            if args.files.is_empty() {
                anyhow::bail!("--mode files requires at least one file path");
            }
            ReviewInput::Files(args.files.clone())
        }
    })
}

pub async fn run(config: EngineConfig, args: ReviewArgs) -> anyhow::Result<AggregateResult> {
    let provider = build_provider(&config)?;
    let rules = build_rules(&config)?;
    let cache = build_cache(&config);
    let history = critique_history::HistoryStore::open(history_db_path(&config).to_string_lossy().into_owned()).await?;
    let commit_store = critique_commits::CommitStore::new(&config.git.repo_path);
    let memory = build_memory(&config).await?;

    let cancel = CancellationToken::new();
    let deadline_cancel = cancel.clone();
    let deadline = std::time::Duration::from_secs(config.review.deadline_secs);
    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        deadline_cancel.cancel();
    });

    let input = to_review_input(&args)?;
    let result = run_review(&config, input, &provider, &rules, &cache, Some(&history), Some(&commit_store), Some(&memory), cancel).await?;
    history.close().await?;
    Ok(result)
}
