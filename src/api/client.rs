//! Drawscape HTTP client.
//!
//! Thin wrapper over `reqwest`. Every call funnels through `request`, which
//! checks the status and decodes the body as text, JSON, or raw bytes.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::config::DrawscapeConfig;
use super::types::{ApiError, CreatedArtboard, RenderPayload, SchematicDetail, SchematicSummary};

/// How a response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Text,
    Json,
    Binary,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Text(String),
    Json(serde_json::Value),
    Binary(Vec<u8>),
}

impl ApiBody {
    fn into_text(self) -> Result<String, ApiError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Ok(value.to_string()),
            Self::Binary(bytes) => String::from_utf8(bytes).map_err(|e| ApiError::Parse(e.to_string())),
        }
    }

    fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Self::Json(value) => value,
            other => serde_json::from_str(&other.into_text()?).map_err(|e| ApiError::Parse(e.to_string()))?,
        };
        serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct DrawscapeClient {
    http: reqwest::Client,
    base_url: String,
}

impl DrawscapeClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if `reqwest` rejects the settings.
    pub fn new(config: &DrawscapeConfig) -> Result<Self, ApiError> {
        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Already-absolute URLs pass through.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Issue a request and decode the body as `kind`.
    ///
    /// # Errors
    ///
    /// Transport failures map to [`ApiError::Request`], non-2xx statuses to
    /// [`ApiError::Response`], and undecodable bodies to [`ApiError::Parse`].
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        kind: ResponseKind,
    ) -> Result<ApiBody, ApiError> {
        let url = self.endpoint(path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        debug!(%method, %url, status, "drawscape response");

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Response { status, body });
        }

        match kind {
            ResponseKind::Text => response
                .text()
                .await
                .map(ApiBody::Text)
                .map_err(|e| ApiError::Request(e.to_string())),
            ResponseKind::Binary => response
                .bytes()
                .await
                .map(|b| ApiBody::Binary(b.to_vec()))
                .map_err(|e| ApiError::Request(e.to_string())),
            ResponseKind::Json => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ApiError::Request(e.to_string()))?;
                serde_json::from_str(&text)
                    .map(ApiBody::Json)
                    .map_err(|e| ApiError::Parse(e.to_string()))
            }
        }
    }

    /// `POST /artboard/render`, body returned as raw text.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn render_text(&self, payload: &RenderPayload) -> Result<String, ApiError> {
        self.request(Method::POST, "artboard/render", Some(payload), ResponseKind::Text)
            .await?
            .into_text()
    }

    /// `GET` an absolute or relative URL as text.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        self.request::<()>(Method::GET, url, None, ResponseKind::Text)
            .await?
            .into_text()
    }

    /// `GET` an absolute or relative URL as raw bytes.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        match self
            .request::<()>(Method::GET, url, None, ResponseKind::Binary)
            .await?
        {
            ApiBody::Binary(bytes) => Ok(bytes),
            other => Ok(other.into_text()?.into_bytes()),
        }
    }

    /// `GET /schematics`.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn schematics(&self) -> Result<Vec<SchematicSummary>, ApiError> {
        self.request::<()>(Method::GET, "schematics", None, ResponseKind::Json)
            .await?
            .into_json()
    }

    /// `GET /schematics/{id}`.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn schematic(&self, id: &str) -> Result<SchematicDetail, ApiError> {
        let url = self.schematic_endpoint(id)?;
        self.request::<()>(Method::GET, &url, None, ResponseKind::Json)
            .await?
            .into_json()
    }

    /// `schematics/{id}` under the base URL, with `id` escaped as a single
    /// path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the base URL cannot carry a path.
    pub fn schematic_endpoint(&self, id: &str) -> Result<String, ApiError> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| ApiError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Request(format!("base url cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push("schematics")
            .push(id);
        Ok(url.into())
    }

    /// `POST /artboards` with a staged configuration.
    ///
    /// # Errors
    ///
    /// See [`DrawscapeClient::request`].
    pub async fn create_artboard(&self, payload: &RenderPayload) -> Result<CreatedArtboard, ApiError> {
        self.request(Method::POST, "artboards", Some(payload), ResponseKind::Json)
            .await?
            .into_json()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
