//! Key verification types, traits, and reusable verifier implementations.

use std::fmt;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pinned, boxed, `Send` future used as the return type for async verification.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Configuration errors that can occur during key verification.
///
/// Transport failures are deliberately absent: an unreachable provider is an
/// [`Verdict::Unverifiable`] outcome, not an error. Errors here mean the
/// caller asked for something the registry cannot do at all.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The HTTP client could not be initialised.
    #[error("failed to initialize HTTP client: {0}")]
    ClientInit(String),

    /// An HTTP request to the provider's API failed.
    ///
    /// Raised by individual verifiers; the registry converts this into an
    /// `Unverifiable` outcome before it reaches callers.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No provider is registered under the requested identifier.
    #[error("no provider registered for id: {provider_id}")]
    UnknownProvider {
        /// The identifier that has no registered provider.
        provider_id: String,
    },

    /// The provider exists but does not support live verification.
    #[error("provider '{provider_id}' does not support live verification")]
    Unsupported {
        /// The identifier of the provider without a verifier.
        provider_id: String,
    },
}

/// Three-way outcome of a live key check.
///
/// `Unverifiable` is distinct from `Invalid`: a timeout or DNS failure says
/// nothing about whether the key works, and must never be collapsed into a
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The provider accepted the key.
    Valid,
    /// The provider rejected the key as unauthenticated (401/403).
    Invalid,
    /// The check could not be completed; the key's status is unknown.
    Unverifiable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Unverifiable => write!(f, "unverifiable"),
        }
    }
}

/// The recorded result of verifying one candidate key.
///
/// Immutable once created; outcomes are appended to history, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Whether the key is valid, invalid, or could not be checked.
    pub verdict: Verdict,
    /// When the verification request completed.
    pub checked_at: DateTime<Utc>,
    /// The transport failure that prevented verification, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_error: Option<Box<str>>,
    /// Optional human-readable detail (provider name, HTTP status).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Box<str>>,
}

impl VerificationOutcome {
    /// Creates an outcome indicating the key is live.
    #[must_use]
    pub fn valid(detail: &str) -> Self {
        Self {
            verdict: Verdict::Valid,
            checked_at: Utc::now(),
            transport_error: None,
            detail: Some(detail.into()),
        }
    }

    /// Creates an outcome indicating the provider rejected the key.
    #[must_use]
    pub fn invalid(provider: &str) -> Self {
        Self {
            verdict: Verdict::Invalid,
            checked_at: Utc::now(),
            transport_error: None,
            detail: Some(format!("{provider} rejected the key").into()),
        }
    }

    /// Creates an outcome indicating the check could not be completed.
    #[must_use]
    pub fn unverifiable(transport_error: &str) -> Self {
        Self {
            verdict: Verdict::Unverifiable,
            checked_at: Utc::now(),
            transport_error: Some(transport_error.into()),
            detail: None,
        }
    }

    /// Classifies an HTTP response status under the uniform decision rule.
    ///
    /// An authentication rejection (401/403) means the key is dead. Anything
    /// else - success, quota errors, server errors - means the provider
    /// recognised the credential, or at least did not reject it, and the key
    /// is treated as valid.
    #[must_use]
    pub fn from_status(provider: &str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::invalid(provider),
            code => Self::valid(&format!("{provider} responded with status {code}")),
        }
    }
}

/// Trait for providers that can live-check a detected key.
pub trait KeyVerifier: Send + Sync {
    /// Checks the key against the provider's API and returns an outcome.
    ///
    /// The request must be idempotent and side-effect-free: a metadata read,
    /// never anything that consumes the target account's paid resources.
    fn verify<'a>(
        &'a self,
        client: &'a reqwest::Client,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>>;
}

/// Verifier for providers that take the key in an `Authorization` header.
///
/// Covers the common `Bearer <key>` scheme and variants like `Token <key>`.
#[derive(Debug)]
pub struct BearerVerifier {
    /// Display name of the provider, used in outcome details.
    pub provider: &'static str,
    /// The metadata endpoint queried during verification.
    pub api_url: &'static str,
    /// Authorization scheme prefix (`"Bearer"` for most providers).
    pub scheme: &'static str,
}

impl KeyVerifier for BearerVerifier {
    fn verify<'a>(
        &'a self,
        client: &'a reqwest::Client,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>> {
        Box::pin(async move {
            let response = client
                .get(self.api_url)
                .header("Authorization", format!("{} {secret}", self.scheme))
                .header("User-Agent", crate::USER_AGENT)
                .send()
                .await?;

            Ok(VerificationOutcome::from_status(self.provider, response.status()))
        })
    }
}

/// Verifier for providers that take the key in a custom header.
#[derive(Debug)]
pub struct HeaderVerifier {
    /// Display name of the provider, used in outcome details.
    pub provider: &'static str,
    /// The metadata endpoint queried during verification.
    pub api_url: &'static str,
    /// Name of the header carrying the key (e.g. `"x-api-key"`).
    pub header: &'static str,
    /// Additional fixed headers the provider requires.
    pub extra_headers: &'static [(&'static str, &'static str)],
}

impl KeyVerifier for HeaderVerifier {
    fn verify<'a>(
        &'a self,
        client: &'a reqwest::Client,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>> {
        Box::pin(async move {
            let mut request = client
                .get(self.api_url)
                .header(self.header, secret)
                .header("User-Agent", crate::USER_AGENT);

            for (name, value) in self.extra_headers {
                request = request.header(*name, *value);
            }

            let response = request.send().await?;

            Ok(VerificationOutcome::from_status(self.provider, response.status()))
        })
    }
}

/// Verifier for providers that take the key as a URL query parameter.
#[derive(Debug)]
pub struct QueryParamVerifier {
    /// Display name of the provider, used in outcome details.
    pub provider: &'static str,
    /// The metadata endpoint queried during verification.
    pub api_url: &'static str,
    /// Name of the query parameter carrying the key (e.g. `"key"`).
    pub param: &'static str,
}

impl KeyVerifier for QueryParamVerifier {
    fn verify<'a>(
        &'a self,
        client: &'a reqwest::Client,
        secret: &'a str,
    ) -> BoxFuture<'a, Result<VerificationOutcome, VerifyError>> {
        Box::pin(async move {
            let response = client
                .get(self.api_url)
                .query(&[(self.param, secret)])
                .header("User-Agent", crate::USER_AGENT)
                .send()
                .await?;

            Ok(VerificationOutcome::from_status(self.provider, response.status()))
        })
    }
}
