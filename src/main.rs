mod cli;
mod config_loader;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).compact().init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(|| config_loader::DEFAULT_CONFIG_FILE.into());
    let mut config = config_loader::load(&config_path)?;
    if let Some(repo) = &cli.repo {
        config.git.repo_path = repo.to_string_lossy().into_owned();
    }

    match cli.command {
        Command::Review(args) => {
            commands::review::apply_overrides(&mut config, &args, cli.repo.as_deref());
            let format = args.format.map(Into::into).unwrap_or(config.output.format);
            let include_code = config.output.include_code;
            let out = args.out.clone();
            let result = commands::review::run(config, args).await?;
            let rendered = output::render(&result, format, include_code);
            emit(&rendered, out.as_deref())?;
            Ok(exit_for_result(&result))
        }
        Command::Commit { commit, format } => {
            let args = cli::ReviewArgs {
                mode: cli::ModeArg::Commit,
                commit: Some(commit),
                files: Vec::new(),
                format,
                out: None,
                include: Vec::new(),
                exclude: Vec::new(),
                provider: None,
                model: None,
                max_concurrency: None,
                no_cache: false,
                preset: None,
            };
            commands::review::apply_overrides(&mut config, &args, cli.repo.as_deref());
            let format = format.map(Into::into).unwrap_or(config.output.format);
            let include_code = config.output.include_code;
            let result = commands::review::run(config, args).await?;
            let rendered = output::render(&result, format, include_code);
            emit(&rendered, None)?;
            Ok(exit_for_result(&result))
        }
        Command::Fix { from, file, issue } => {
            let applied = commands::fix::run(&from, &file, issue)?;
            println!("applied {applied} fix(es) to {file}");
            Ok(ExitCode::SUCCESS)
        }
        Command::History(sub) => {
            let store_path = commands::history_db_path(&config).to_string_lossy().into_owned();
            let outcome = commands::history::run(store_path, &sub).await?;
            print_history_outcome(&outcome);
            Ok(ExitCode::SUCCESS)
        }
        Command::Recall { text, file, author } => {
            let analyses = commands::recall::run(&config.git.repo_path, text, file, author).await?;
            println!("{}", serde_json::to_string_pretty(&analyses)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Search { query, limit } => {
            let hits = commands::search::run(&config, &query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats => {
            let store_path = commands::history_db_path(&config).to_string_lossy().into_owned();
            let stats = commands::stats::run(store_path).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(cli::ConfigCommand::Show) => {
            println!("{}", commands::config_cmd::show(&config));
            Ok(ExitCode::SUCCESS)
        }
        Command::Init { dir } => {
            let written = commands::init::run(&dir)?;
            for path in &written {
                println!("wrote {path}");
            }
            if written.is_empty() {
                println!("nothing to do: config and rules already present");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            println!("critique {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        Command::Export { commit, out } => {
            let analyses = commands::recall::run(&config.git.repo_path, None, None, None).await?;
            let analysis = analyses
                .into_iter()
                .find(|a| a.commit_hash == commit)
                .ok_or_else(|| anyhow::anyhow!("no archived analysis for commit {commit}"))?;
            std::fs::write(&out, serde_json::to_string_pretty(&analysis)?)?;
            println!("exported {commit} to {}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Doc | Command::Changelog | Command::Plan | Command::McpServe => {
            eprintln!("{}", "not implemented: this command is named in the surface but has no backing engine operation".yellow());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn emit(rendered: &str, out: Option<&std::path::Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => std::fs::write(path, rendered).map_err(Into::into),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

fn exit_for_result(result: &critique_engine::AggregateResult) -> ExitCode {
    if result.has_critical_issue() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_history_outcome(outcome: &commands::history::HistoryOutcome) {
    use commands::history::HistoryOutcome;
    match outcome {
        HistoryOutcome::Search { records, total } => {
            println!("{total} total match(es)");
            println!("{}", serde_json::to_string_pretty(records).unwrap_or_default());
        }
        HistoryOutcome::File(history) => println!("{}", serde_json::to_string_pretty(history).unwrap_or_default()),
        HistoryOutcome::Stats(stats) => println!("{}", serde_json::to_string_pretty(stats).unwrap_or_default()),
        HistoryOutcome::Resolved(id) => println!("marked issue {id} resolved"),
    }
}

impl From<cli::FormatArg> for critique_engine::config::OutputFormat {
    fn from(value: cli::FormatArg) -> Self {
        match value {
            cli::FormatArg::Markdown => critique_engine::config::OutputFormat::Markdown,
            cli::FormatArg::Json => critique_engine::config::OutputFormat::Json,
            cli::FormatArg::Sarif => critique_engine::config::OutputFormat::Sarif,
        }
    }
}
