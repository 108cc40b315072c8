use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::Policy;
use crate::rate_limit::RateLimiter;

// Where the outbound API key comes from. Resolved per request, so a
// missing key is reported on the request rather than at startup.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Env(String),
    Static(Option<String>),
}

impl CredentialSource {
    pub fn resolve(&self) -> Option<String> {
        let value = match self {
            CredentialSource::Env(var) => std::env::var(var).ok(),
            CredentialSource::Static(value) => value.clone(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    // For logs: never the value itself
    pub fn describe(&self) -> String {
        match self {
            CredentialSource::Env(var) => format!("environment variable {var}"),
            CredentialSource::Static(_) => "static configuration".to_string(),
        }
    }
}

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,
    pub policy: Policy,
    pub completion: Arc<dyn CompletionClient>,
    pub credential: CredentialSource,
}

impl AppState {
    pub fn new(
        policy: Policy,
        completion: Arc<dyn CompletionClient>,
        credential: CredentialSource,
    ) -> Self {
        Self {
            limiter: RateLimiter::in_memory(policy.window),
            policy,
            completion,
            credential,
        }
    }
}
