//! Crate-scoped tracing layer, mirroring `ai-llm-service::telemetry`.
//!
//! `critique-cli` composes one layer per crate (this one among them) into a
//! single subscriber so `RUST_LOG=critique_providers=debug` narrows
//! verbosity to just this subsystem.

use chrono::Utc;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{filter, Registry};

pub const TARGET_PREFIX: &str = "critique_providers";

#[derive(Clone, Copy, Default)]
pub struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().to_rfc3339())
    }
}

pub fn layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_filter(filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX)))
}

/// Convenience constructor used only by this crate's own tests; real
/// binaries build their subscriber once in `critique-cli`.
#[allow(dead_code)]
fn test_registry() -> Registry {
    Registry::default()
}
