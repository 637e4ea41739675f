//! Preferred mirror lookup.
//!
//! The Apache `closer.lua` endpoint answers `?preferred=true` with the base
//! URL of a nearby mirror as plain text.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::types::{FetchError, FetchResult};
use super::urls::parse_mirror_url;

/// Resolves the base URL that release paths are appended to.
#[async_trait]
pub trait MirrorResolver: Send + Sync {
    async fn preferred_mirror(&self) -> FetchResult<Url>;
}

/// Queries the Apache mirror-resolution service over HTTP.
#[derive(Debug, Clone)]
pub struct ApacheMirrorResolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl ApacheMirrorResolver {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl MirrorResolver for ApacheMirrorResolver {
    async fn preferred_mirror(&self) -> FetchResult<Url> {
        debug!("Resolving preferred mirror via {}", self.endpoint);

        let response = self.client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Mirror(format!(
                "{} answered with status {}: {}",
                self.endpoint,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response.text().await?;
        let mirror = parse_mirror_url(&body)?;
        debug!("Preferred mirror: {}", mirror);
        Ok(mirror)
    }
}

/// A resolver that always returns the same answer.
///
/// `None` simulates an unreachable mirror service.
#[derive(Debug, Clone, Default)]
pub struct StaticMirror(pub Option<Url>);

#[async_trait]
impl MirrorResolver for StaticMirror {
    async fn preferred_mirror(&self) -> FetchResult<Url> {
        self.0
            .clone()
            .ok_or_else(|| FetchError::Mirror("no mirror available".to_string()))
    }
}
