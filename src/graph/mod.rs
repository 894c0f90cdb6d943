pub mod dto;
pub mod token;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::{Credentials, GraphEndpoints, REQUEST_TIMEOUT};
use crate::error::AppError;

pub use token::TokenManager;

/// Successful Graph response.
#[derive(Debug)]
pub struct GraphResponse {
    pub status: StatusCode,
    pub etag: Option<String>,
    pub body: Value,
}

impl GraphResponse {
    pub fn json<T: DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(self.body)
            .map_err(|e| AppError::Parse(format!("unexpected Graph payload: {}", e)))
    }

    /// Concurrency token: the ETag header, else the body's `@odata.etag`.
    pub fn concurrency_token(&self) -> Option<String> {
        self.etag
            .clone()
            .or_else(|| {
                self.body
                    .get("@odata.etag")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .filter(|etag| !etag.is_empty())
    }
}

pub struct GraphClient {
    client: Client,
    base_url: String,
    tokens: TokenManager,
}

impl GraphClient {
    pub fn new(credentials: Credentials, endpoints: &GraphEndpoints) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            tokens: TokenManager::new(client.clone(), credentials, endpoints),
            base_url: endpoints.graph_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn get(&self, path: &str) -> Result<GraphResponse, AppError> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.get(path).await?.json()
    }

    /// Issues one Graph call. A 401 invalidates the token and the call is
    /// repeated exactly once; any other non-2xx status is returned as an error.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        if_match: Option<&str>,
    ) -> Result<GraphResponse, AppError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("Making {} request to: {}", method, url);

        let mut response = self.send(&method, &url, body, if_match).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Token rejected for {}, refreshing", url);
            self.tokens.invalidate().await;
            self.tokens.authenticate().await?;
            response = self.send(&method, &url, body, if_match).await?;
        }

        let status = response.status();
        debug!("Response status: {}", status);
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;

        if !status.is_success() {
            error!("HTTP error {} for {} {}", status, method, url);
            error!("Response body: {}", text);
            return Err(AppError::Graph {
                status: status.as_u16(),
                url,
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| AppError::Parse(format!("invalid JSON from {}: {}", url, e)))?
        };

        Ok(GraphResponse { status, etag, body })
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        if_match: Option<&str>,
    ) -> Result<reqwest::Response, AppError> {
        let token = self.tokens.bearer().await?;

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");
        if let Some(etag) = if_match {
            request = request.header("If-Match", etag);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}
