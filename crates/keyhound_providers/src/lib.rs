//! Detection rules and verification providers for keyhound.
//!
//! This crate declares the rule set used to classify leaked AI-provider API
//! keys (as data, not code) and the per-provider verification procedures used
//! to live-check whether a detected key is still active.

mod provider;
/// Key detection providers, one module per AI service.
pub mod providers;
mod registry;
mod rule;
mod verify;

pub use provider::Provider;
pub use registry::ProviderRegistry;
pub use rule::{Confidence, ParseConfidenceError, RuleDef};
pub use verify::{
    BearerVerifier, BoxFuture, HeaderVerifier, KeyVerifier, QueryParamVerifier, Verdict, VerificationOutcome,
    VerifyError,
};

/// HTTP `User-Agent` header sent on every outbound request.
pub(crate) const USER_AGENT: &str = concat!("keyhound/", env!("CARGO_PKG_VERSION"));
