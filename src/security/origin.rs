//! Origin admission.
//!
//! # Responsibilities
//! - Hold the fixed allow-list of browser origins
//! - Decide, per request, whether the declared `Origin` is admitted
//!
//! # Design Decisions
//! - Exact string equality only: no wildcards, no subdomains, case-sensitive
//! - A missing `Origin` is admitted without echo; CORS only constrains browsers

use std::collections::HashSet;

use crate::config::CorsConfig;

/// Immutable set of admitted origins.
#[derive(Debug, Clone)]
pub struct AllowList {
    origins: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    /// Admitted origins, sorted.
    pub fn origins(&self) -> Vec<&str> {
        let mut origins: Vec<&str> = self.origins.iter().map(String::as_str).collect();
        origins.sort_unstable();
        origins
    }
}

/// Per-request admission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsDecision {
    /// Admitted. `echo_origin` is `None` when the request carried no `Origin`.
    Allowed { echo_origin: Option<String> },
    Denied,
}

impl CorsDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, CorsDecision::Denied)
    }

    pub fn echo_origin(&self) -> Option<&str> {
        match self {
            CorsDecision::Allowed { echo_origin } => echo_origin.as_deref(),
            CorsDecision::Denied => None,
        }
    }
}

/// Evaluates declared origins against the allow-list.
#[derive(Debug, Clone)]
pub struct OriginGate {
    allow_list: AllowList,
    fallback_origin: Option<String>,
}

impl OriginGate {
    pub fn new(allow_list: AllowList, fallback_origin: Option<String>) -> Self {
        Self {
            allow_list,
            fallback_origin,
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(
            AllowList::new(config.allowed_origins.iter().cloned()),
            config.fallback_origin.clone(),
        )
    }

    pub fn evaluate(&self, origin: Option<&str>) -> CorsDecision {
        match origin {
            None => CorsDecision::Allowed { echo_origin: None },
            Some(origin) if self.allow_list.contains(origin) => CorsDecision::Allowed {
                echo_origin: Some(origin.to_string()),
            },
            Some(origin) => {
                tracing::warn!(origin = %origin, "Origin rejected");
                metrics::counter!("gateway_cors_denied_total").increment(1);
                CorsDecision::Denied
            }
        }
    }

    /// Allow-origin value to send for `decision`: the echo, else the fallback.
    pub fn allow_origin_for<'a>(&'a self, decision: &'a CorsDecision) -> Option<&'a str> {
        decision
            .echo_origin()
            .or(self.fallback_origin.as_deref())
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}
