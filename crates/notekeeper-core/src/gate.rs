//! Per-request authentication gate.
//!
//! The gate runs before every handler and ends in exactly one of two ways:
//! forward (optionally with a verified identity) or reject. The decision
//! order is fixed:
//!
//! 1. public path rules, checked before any header parsing;
//! 2. `Authorization: Bearer <token>` must be present (else 400);
//! 3. the token must parse and verify (else 400);
//! 4. the token must be valid for its subject right now (else 401).

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::Identity;
use crate::token::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// PATH POLICY
// =============================================================================

/// A single `(prefix, bypass)` entry of the path policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    pub prefix: String,
    /// `true` lets matching requests through without a token.
    pub bypass: bool,
}

impl PathRule {
    pub fn public(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            bypass: true,
        }
    }

    pub fn protected(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            bypass: false,
        }
    }

    /// Segment-aware prefix match: `/a/b` matches `/a/b` and `/a/b/c`, not `/a/bc`.
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
            None => false,
        }
    }
}

/// Ordered table of path rules; the first match decides, unmatched paths are protected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPolicy {
    rules: Vec<PathRule>,
}

impl PathPolicy {
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self { rules }
    }

    /// Registration, login and health are public; API docs only when enabled.
    pub fn with_defaults(docs_enabled: bool) -> Self {
        let mut rules = vec![
            PathRule::public("/api/users/register"),
            PathRule::public("/api/users/login"),
            PathRule::public("/health"),
        ];
        if docs_enabled {
            rules.push(PathRule::public("/swagger-ui"));
            rules.push(PathRule::public("/api-docs"));
        }
        Self { rules }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.bypass)
            .unwrap_or(false)
    }
}

// =============================================================================
// DECISIONS
// =============================================================================

/// Why the gate stopped a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No `Authorization` header, or not a `Bearer` credential.
    MissingOrInvalidHeader,
    /// The bearer value is not a token signed with our key.
    MalformedToken,
    /// Authentic token that is expired or does not match its subject.
    InvalidOrExpiredToken,
}

impl GateRejection {
    /// Malformed input (400-class) as opposed to rejected credentials (401-class).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, GateRejection::InvalidOrExpiredToken)
    }

    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::MissingOrInvalidHeader => "Authorization header missing or invalid",
            GateRejection::MalformedToken => "Malformed token",
            GateRejection::InvalidOrExpiredToken => "Invalid or expired token",
        }
    }
}

/// Outcome of [`AuthGate::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Public path; forwarded without identity.
    Public,
    /// Protected path with a verified identity.
    Authenticated(Identity),
    Rejected(GateRejection),
}

// =============================================================================
// GATE
// =============================================================================

/// Stateless request gate combining the path policy with the token codec.
#[derive(Debug, Clone)]
pub struct AuthGate {
    policy: PathPolicy,
    codec: TokenCodec,
}

impl AuthGate {
    pub fn new(policy: PathPolicy, codec: TokenCodec) -> Self {
        Self { policy, codec }
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Classify a request by path and raw `Authorization` header value.
    pub fn evaluate(
        &self,
        path: &str,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if self.policy.is_public(path) {
            debug!(subsystem = "auth", component = "gate", path, decision = "forward", "Public path");
            return GateDecision::Public;
        }

        let token = match authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) {
            Some(token) => token.trim(),
            None => return self.reject(path, GateRejection::MissingOrInvalidHeader),
        };

        let subject = match self.codec.extract_subject(token) {
            Ok(subject) => subject,
            Err(_) => return self.reject(path, GateRejection::MalformedToken),
        };

        match self.codec.is_valid(token, &subject, now) {
            Ok(true) => {
                debug!(
                    subsystem = "auth",
                    component = "gate",
                    path,
                    user = %subject,
                    decision = "forward",
                    "Request authenticated"
                );
                GateDecision::Authenticated(subject)
            }
            Ok(false) => self.reject(path, GateRejection::InvalidOrExpiredToken),
            Err(_) => self.reject(path, GateRejection::MalformedToken),
        }
    }

    fn reject(&self, path: &str, rejection: GateRejection) -> GateDecision {
        warn!(
            subsystem = "auth",
            component = "gate",
            path,
            decision = "reject",
            reason = rejection.message(),
            "Request rejected"
        );
        GateDecision::Rejected(rejection)
    }
}
