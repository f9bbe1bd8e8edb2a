//! Thin JSON client over `reqwest` with bearer authentication.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use synctime_core::config::api::ApiConfig;
use synctime_core::error::AppError;
use synctime_core::result::AppResult;

use crate::dto::Envelope;

/// Shared HTTP client bound to one API base URL and token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "API request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET` a JSON body, unwrapping an optional `data` envelope.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.into_inner())
    }

    /// `GET` a JSON body without envelope handling.
    pub async fn get_raw<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Send a request with an optional JSON body and discard the response body.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> AppResult<()> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await?.error_for_status()?;
        Ok(())
    }
}

/// Reject an empty id list before it reaches the network.
pub(crate) fn require_ids<T>(ids: &[T], operation: &str) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::validation(format!(
            "{operation} requires at least one id"
        )));
    }
    Ok(())
}
