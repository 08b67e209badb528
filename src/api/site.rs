//! Client for the gateway's own page data routes.

use std::sync::Arc;
use std::time::Duration;

use crate::api::types::Catalog;
use crate::api::{send_json, ApiError};
use crate::resilience::CancellationSource;

#[derive(Debug, Clone)]
pub struct SiteApi {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
    cancellation: Arc<dyn CancellationSource>,
}

impl SiteApi {
    pub fn new(
        client: reqwest::Client,
        base: impl Into<String>,
        timeout: Duration,
        cancellation: Arc<dyn CancellationSource>,
    ) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            timeout,
            cancellation,
        }
    }

    /// Equipment, accepted file types and the upload base, from `/c`.
    pub async fn fetch_catalog(&self) -> Result<Catalog, ApiError> {
        let request = self.client.get(format!("{}/c", self.base));
        send_json(self.cancellation.as_ref(), self.timeout, request).await
    }
}
