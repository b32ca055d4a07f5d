//! Uniform `Review`/`GenerateCommitMessage`/`Chat`/`GetEmbedding`/`HealthCheck`
//! capability set over Ollama, OpenAI-compatible, and Gemini back-ends,
//! dispatched through a single value-level enum.

pub mod client;
pub mod config;
pub mod errors;
pub mod gemini;
pub mod health;
pub mod json_extract;
pub mod model;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod retry;
pub mod telemetry;

pub use client::ProviderClient;
pub use config::{ModelConfig, ProviderKind};
pub use errors::{ProviderError, ProviderResult};
pub use model::{HealthStatus, Issue, IssueType, ReviewRequest, ReviewResponse, RootCause, Severity, SourceLocation};
