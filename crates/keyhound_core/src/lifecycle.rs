//! Key status lifecycle driven by verification outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use keyhound_providers::{Verdict, VerificationOutcome};
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, KeyId, Origin};
use crate::rule::Confidence;

/// Verification state of a tracked key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Never successfully verified.
    #[default]
    Unknown,
    /// The provider accepted the key on the most recent check.
    Valid,
    /// The provider rejected the key on the most recent check.
    Invalid,
    /// Confirmed rotated or deleted. Terminal: no outcome changes it.
    Revoked,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Revoked => "revoked",
        };
        write!(f, "{s}")
    }
}

/// Why an outcome left a record untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedReason {
    /// The check could not reach the provider; the prior state stands.
    Unverifiable,
    /// A newer check has already been applied to this record.
    Stale,
    /// The record is revoked, which no outcome overrides.
    Revoked,
}

/// Result of applying an event to a [`KeyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record changed; callers should persist the new state.
    Applied {
        /// Status before the event.
        from: KeyStatus,
        /// Status after the event.
        to: KeyStatus,
    },
    /// The record was left untouched.
    Unchanged(UnchangedReason),
}

impl Transition {
    /// Returns `true` if the record was modified.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// A tracked key with its public-safe metadata and verification state.
///
/// Contains only what the metadata store may hold: the raw secret is not
/// here and never will be. Records converge across harvest runs through
/// their [`KeyId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Stable identifier derived from provider id and secret content.
    pub key_id: KeyId,
    /// Identifier of the provider the key belongs to.
    pub provider: Box<str>,
    /// Confidence tier inherited from the matching rule.
    pub confidence: Confidence,
    /// Where the key was first seen.
    pub origin: Origin,
    /// Current verification state.
    pub status: KeyStatus,
    /// When the key was first recorded.
    pub first_seen: DateTime<Utc>,
    /// Timestamp of the newest verification outcome applied so far.
    pub last_verified: Option<DateTime<Utc>>,
}

impl KeyRecord {
    /// Creates an unverified record from a classified candidate.
    #[must_use]
    pub fn from_candidate(candidate: &Candidate, first_seen: DateTime<Utc>) -> Self {
        Self {
            key_id: candidate.key_id.clone(),
            provider: candidate.provider.as_ref().into(),
            confidence: candidate.confidence,
            origin: candidate.origin.clone(),
            status: KeyStatus::Unknown,
            first_seen,
            last_verified: None,
        }
    }

    /// Applies a verification outcome to this record.
    ///
    /// Valid and Invalid verdicts move the record to the matching status and
    /// stamp `last_verified` with the outcome's `checked_at`. Unverifiable
    /// outcomes never change anything. An outcome whose `checked_at` is not
    /// newer than `last_verified` is ignored, so outcomes applied out of
    /// order converge on the state of the newest check regardless of arrival
    /// order. Revoked is terminal.
    pub fn apply_outcome(&mut self, outcome: &VerificationOutcome) -> Transition {
        if self.status == KeyStatus::Revoked {
            return Transition::Unchanged(UnchangedReason::Revoked);
        }

        let to = match outcome.verdict {
            Verdict::Valid => KeyStatus::Valid,
            Verdict::Invalid => KeyStatus::Invalid,
            Verdict::Unverifiable => {
                return Transition::Unchanged(UnchangedReason::Unverifiable);
            }
        };

        if let Some(last) = self.last_verified
            && outcome.checked_at <= last
        {
            return Transition::Unchanged(UnchangedReason::Stale);
        }

        let from = self.status;
        self.status = to;
        self.last_verified = Some(outcome.checked_at);

        Transition::Applied { from, to }
    }

    /// Returns the record to `Unknown` and clears the verification history.
    pub fn reset(&mut self) {
        self.status = KeyStatus::Unknown;
        self.last_verified = None;
    }

    /// Marks the key as revoked. Terminal: subsequent outcomes are ignored.
    pub fn revoke(&mut self) -> Transition {
        if self.status == KeyStatus::Revoked {
            return Transition::Unchanged(UnchangedReason::Revoked);
        }

        let from = self.status;
        self.status = KeyStatus::Revoked;
        Transition::Applied {
            from,
            to: KeyStatus::Revoked,
        }
    }
}
