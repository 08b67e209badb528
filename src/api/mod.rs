//! Data-fetching clients for the backend.
//!
//! Two distinct clients, chosen by where the caller runs:
//! - [`InternalApi`]: trusted server-side code inside the deployment network.
//!   Talks to the internal base URL, including `/graphql`.
//! - [`PublicApi`]: browser-side callers. Talks to the public base URL with
//!   the session token, and can only submit photos and edits.
//!
//! [`SiteApi`] reads the gateway's own page data, for clients outside the
//! browser.
//!
//! Both put every call under a deadline from the injected cancellation source.

pub mod graphql;
pub mod internal;
pub mod public;
pub mod site;
pub mod types;

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::resilience::{with_deadline, CancellationSource};

pub use internal::InternalApi;
pub use public::PublicApi;
pub use site::SiteApi;

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The cancellation signal fired first.
    #[error("request aborted after {0:?}")]
    Aborted(Duration),

    /// Connection, protocol, or body decoding failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend answered {0}")]
    Status(StatusCode),

    /// The GraphQL response carried errors or no data.
    #[error("graphql: {0}")]
    GraphQl(String),

    /// A successful response lacked an expected value.
    #[error("response missing {0}")]
    Missing(&'static str),
}

impl ApiError {
    /// Aborts and network failures, as opposed to backend rejections.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Aborted(_) | ApiError::Network(_))
    }
}

/// Send a request and require a success status, all under one deadline.
pub(crate) async fn send(
    source: &dyn CancellationSource,
    timeout: Duration,
    request: RequestBuilder,
) -> Result<Response, ApiError> {
    let response = with_deadline(source, timeout, request.send())
        .await
        .map_err(|aborted| ApiError::Aborted(aborted.0))??;
    if !response.status().is_success() {
        return Err(ApiError::Status(response.status()));
    }
    Ok(response)
}

/// Like [`send`], then decode the body as JSON within the same deadline.
pub(crate) async fn send_json<T: DeserializeOwned>(
    source: &dyn CancellationSource,
    timeout: Duration,
    request: RequestBuilder,
) -> Result<T, ApiError> {
    with_deadline(source, timeout, async {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json::<T>().await?)
    })
    .await
    .map_err(|aborted| ApiError::Aborted(aborted.0))?
}
