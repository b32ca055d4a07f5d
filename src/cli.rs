//! Argument parsing for the `critique` binary.
//!
//! Grounded on `clap`'s derive API as used across the example pack
//! (`cameronspears-cosmos::main` and numerous `other_examples` manifests);
//! the teacher crate itself has no CLI surface to imitate directly since
//! `mr-ai-backend` is a pure HTTP service.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "critique", about = "LLM-assisted code review", version)]
pub struct Cli {
    /// Path to a TOML config file. Defaults to `.critique.toml` in the repo root.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository path; overrides `git.repo_path` from config.
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Staged,
    Commit,
    Branch,
    Files,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Markdown,
    Json,
    Sarif,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    Minimal,
    Standard,
    Strict,
}

#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// What to review.
    #[arg(long, value_enum, default_value = "staged")]
    pub mode: ModeArg,

    /// Commit reference, required when `--mode commit`.
    #[arg(long)]
    pub commit: Option<String>,

    /// Explicit file list, required when `--mode files`.
    pub files: Vec<String>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write the rendered report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long)]
    pub include: Vec<String>,

    #[arg(long)]
    pub exclude: Vec<String>,

    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub max_concurrency: Option<usize>,

    #[arg(long)]
    pub no_cache: bool,

    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Full-text/filtered search over past review findings.
    Search {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        file_glob: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        resolved: Option<bool>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Per-file rollup: severity/type distribution, review rounds.
    File { path: String },
    /// Global counters across the whole history store.
    Stats,
    /// Mark a finding resolved by its row id.
    Resolve { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the fully-resolved config (file + env overrides + defaults).
    Show,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the review engine against the working tree or a commit.
    Review(ReviewArgs),

    /// Sugar for `review --mode commit`.
    Commit {
        #[arg(long)]
        commit: String,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Apply a previously-reported issue's suggested fix to the working copy.
    Fix {
        /// Path to a JSON-serialized `AggregateResult` or `CommitAnalysis` produced by `review`/`commit`.
        #[arg(long)]
        from: PathBuf,
        /// File path (as reported in the result) to apply fixes for.
        #[arg(long)]
        file: String,
        /// Only apply the fix at this 0-based issue index within the file; default applies all.
        #[arg(long)]
        issue: Option<usize>,
    },

    #[command(subcommand)]
    History(HistoryCommand),

    /// Retrieve archived commit analyses by query.
    Recall {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },

    /// Search cognitive memory (requires `memory.enabled = true`).
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Review + history combined counters.
    Stats,

    #[command(subcommand)]
    Config(ConfigCommand),

    /// Write a default config file and rule set scaffold.
    Init {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print version information and exit.
    Version,

    /// Not implemented: these are named in the command surface but left to
    /// external collaborators (no engine operation backs them yet).
    Doc,
    Changelog,
    Plan,
    Export {
        #[arg(long)]
        commit: String,
        #[arg(long)]
        out: PathBuf,
    },
    McpServe,
}
