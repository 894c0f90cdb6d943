use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Endpoints the Graph client talks to.
#[derive(Clone, Debug)]
pub struct GraphEndpoints {
    pub graph_base: String,
    pub authority: String,
    pub scope: String,
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self {
            graph_base: DEFAULT_GRAPH_BASE.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub credentials: Credentials,
    pub plan_name: String,
    pub endpoints: GraphEndpoints,
    pub poll_interval: Duration,
    pub bind_addr: SocketAddr,
}

impl PlannerConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let client_id = required("PLANNER_CLIENT_ID")?;
        let client_secret = required("PLANNER_CLIENT_SECRET")?;
        let tenant_id = required("PLANNER_TENANT_ID")?;
        let plan_name = required("PLANNER_PLAN_NAME")?;

        let poll_secs = match env::var("PLANNER_POLL_INTERVAL_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("PLANNER_POLL_INTERVAL_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let bind_addr = env::var("PLANNER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("PLANNER_BIND_ADDR is invalid: {}", e)))?;

        let defaults = GraphEndpoints::default();
        let endpoints = GraphEndpoints {
            graph_base: env::var("GRAPH_BASE_URL").unwrap_or(defaults.graph_base),
            authority: env::var("GRAPH_AUTHORITY_URL").unwrap_or(defaults.authority),
            scope: defaults.scope,
        };

        Ok(Self {
            credentials: Credentials {
                client_id,
                client_secret,
                tenant_id,
            },
            plan_name,
            endpoints,
            poll_interval: Duration::from_secs(poll_secs),
            bind_addr,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} is not set", key))),
    }
}
