//! Types representing detected key candidates.
//!
//! The central type is [`Candidate`], which carries everything the runner
//! needs to persist and verify a detected key: the captured secret (masked
//! everywhere except [`SecretText::expose`]), its location, the rule that
//! matched, and the stable [`KeyId`] used to track the key across runs.

mod secret;
mod span;

use std::fmt;
use std::sync::Arc;

pub use secret::SecretText;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
pub use span::Span;

use crate::rule::Confidence;

const KEY_ID_LENGTH: usize = 12;
const KEY_ID_BYTES: usize = KEY_ID_LENGTH / 2;

/// Stable identifier for a key, derived from provider id and secret content.
///
/// The same secret attributed to the same provider always produces the same
/// id, regardless of where it was found, so records from different harvest
/// runs converge onto one entry.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(Box<str>);

impl KeyId {
    /// Creates a key id by hashing the provider id and secret fingerprint.
    #[must_use]
    pub fn new(provider_id: &str, secret: &SecretText) -> Self {
        let hash_bytes = compute_id_hash(provider_id, secret);
        Self(hex::encode(hash_bytes).into())
    }

    /// Returns the hex string representation of this id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn compute_id_hash(provider_id: &str, secret: &SecretText) -> [u8; KEY_ID_BYTES] {
    let mut hasher = Sha256::new();
    hasher.update(provider_id.as_bytes());
    hasher.update(secret.fingerprint().to_le_bytes());
    let hash = hasher.finalize();
    #[expect(
        clippy::expect_used,
        reason = "SHA-256 always produces 32 bytes; slicing first 6 is infallible"
    )]
    hash[..KEY_ID_BYTES].try_into().expect("SHA-256 produces 32 bytes")
}

/// Where a harvested blob came from.
///
/// Free-form: the harvester fills in a repository slug and a file path, but
/// any source/location pair that helps a human find the leak again is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// The searched corpus, e.g. a repository slug like `"acme/backend"`.
    pub source: Box<str>,
    /// Location within the source, e.g. a file path or HTML URL.
    pub location: Box<str>,
}

impl Origin {
    /// Creates an origin from a source and a location within it.
    #[must_use]
    pub fn new(source: &str, location: &str) -> Self {
        Self {
            source: source.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.location)
    }
}

/// A single detected key candidate in a harvested blob.
///
/// Produced by the classification pipeline after context validation and
/// overlap resolution, so every candidate in a result set covers a distinct
/// region of the blob.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Stable identifier derived from the provider id and secret content.
    pub key_id: KeyId,
    /// Identifier of the rule that matched (e.g. `"anthropic/api-key"`).
    pub rule_id: Arc<str>,
    /// Identifier of the provider the key belongs to.
    pub provider: Arc<str>,
    /// Confidence tier inherited from the matching rule.
    pub confidence: Confidence,
    /// The captured secret, masked everywhere except `expose`.
    pub secret: SecretText,
    /// Line, column, and byte offsets of the match.
    pub span: Span,
    /// Registration index of the matching rule, used to break dedup ties.
    pub rule_order: usize,
    /// Where the blob containing this candidate came from.
    pub origin: Origin,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}]",
            self.origin, self.span, self.rule_id, self.confidence,
        )
    }
}
