//! Thin wrapper invoked once before the first review call.
//!
//! `check` never fails: transport/auth/parse errors are folded into a
//! `HealthStatus { ok: false, .. }` rather than propagated, matching
//! `ai-llm-service::health_service`'s contract that the probe itself is
//! infallible even though the underlying provider call is not.

use tracing::warn;

use crate::client::ProviderClient;
use crate::model::HealthStatus;

pub struct HealthService;

impl HealthService {
    pub async fn check(client: &ProviderClient) -> HealthStatus {
        let status = client.health_check().await;
        if !status.ok {
            warn!(provider = %status.provider, endpoint = %status.endpoint, "providers: health check failed");
        }
        status
    }
}
