use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use urlencoding::encode as url_encode;

use crate::config::{Credentials, GraphEndpoints};
use crate::error::AppError;
use crate::graph::dto::{TokenClaims, TokenResponse};

/// Client-credentials token cache. The token has no tracked expiry; callers
/// invalidate it when Graph answers 401.
pub struct TokenManager {
    client: Client,
    credentials: Credentials,
    authority: String,
    scope: String,
    token: RwLock<Option<String>>,
}

impl TokenManager {
    pub fn new(client: Client, credentials: Credentials, endpoints: &GraphEndpoints) -> Self {
        Self {
            client,
            credentials,
            authority: endpoints.authority.trim_end_matches('/').to_string(),
            scope: endpoints.scope.clone(),
            token: RwLock::new(None),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.credentials.tenant_id
    }

    /// Acquires a fresh token and stores it, replacing any cached one.
    pub async fn authenticate(&self) -> Result<String, AppError> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.authority, self.credentials.tenant_id);
        let form = format!(
            "client_id={}&client_secret={}&grant_type=client_credentials&scope={}",
            url_encode(&self.credentials.client_id),
            url_encode(&self.credentials.client_secret),
            url_encode(&self.scope)
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!("invalid token response ({}): {}", status, body);
            AppError::Parse(format!("invalid token response: {}", e))
        })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                info!("Successfully authenticated with Microsoft Graph");
                if let Some(expires_in) = parsed.expires_in {
                    debug!("Token expires in {} seconds", expires_in);
                }
                log_token_claims(&token);

                *self.token.write().await = Some(token.clone());
                Ok(token)
            }
            _ => {
                let code = parsed.error.unwrap_or_else(|| format!("http_{}", status.as_u16()));
                let description = parsed.error_description.unwrap_or_default();
                error!("Failed to acquire token: {} - {}", code, description);
                Err(AppError::Authentication { code, description })
            }
        }
    }

    /// Cached token, authenticating first when none is held.
    pub async fn bearer(&self) -> Result<String, AppError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }
        self.authenticate().await
    }

    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}

fn log_token_claims(token: &str) {
    match decode_claims(token) {
        Some(claims) => {
            if let Some(roles) = &claims.roles {
                info!("Token has application roles: {:?}", roles);
            }
            if let Some(scp) = &claims.scp {
                info!("Token has delegated scopes: {}", scp);
            }
            debug!("Token issued for app: {}", claims.appid.as_deref().unwrap_or("unknown"));
        }
        None => debug!("Could not decode token claims"),
    }
}

pub(crate) fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
