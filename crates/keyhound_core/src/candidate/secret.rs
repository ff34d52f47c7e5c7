use std::fmt;

use sha2::{Digest, Sha256};

/// Secrets shorter than this are fully masked.
const FULL_MASK_THRESHOLD: usize = 12;

/// Secrets at or above this length show 4-character bookends instead of 2.
const PARTIAL_MASK_THRESHOLD: usize = 24;

/// Mask for short secrets (fully hidden).
const MASK_DOTS_8: &str = "••••••••";

/// Mask for medium/long secrets (with visible bookends).
const MASK_DOTS_12: &str = "••••••••••••";

/// Prefix prepended to the hex-encoded SHA-256 hash in `SecretText::hash_hex`.
const HASH_PREFIX: &str = "sha256:";

/// A captured secret that masks itself everywhere except [`SecretText::expose`].
///
/// At construction the raw value is hashed into a fingerprint (for stable
/// [`super::KeyId`] generation) and masked for display. The raw value is
/// retained because live verification and the restricted vault both need it,
/// but it never leaks through `Debug`, `Display`, or any accessor other than
/// the explicitly named `expose`.
#[derive(Clone)]
pub struct SecretText {
    /// The raw captured value. Only reachable through `expose`.
    raw: Box<str>,
    /// Display-safe representation with bookend characters and masked middle.
    masked: Box<str>,
    /// Truncated hash used for fast equality checks and `super::KeyId` generation.
    fingerprint: u64,
    /// Full `sha256:<hex>` hash string.
    full_hash: Box<str>,
}

impl SecretText {
    /// Captures a raw secret, computing its fingerprint and masked form.
    #[must_use]
    #[expect(
        clippy::missing_panics_doc,
        reason = "SHA-256 always produces 32 bytes; the expect is infallible"
    )]
    pub fn new(raw: &str) -> Self {
        let hash = Sha256::digest(raw.as_bytes());
        #[expect(
            clippy::expect_used,
            reason = "SHA-256 always produces 32 bytes; slicing first 8 is infallible"
        )]
        let hash_bytes: [u8; 8] = hash[..8].try_into().expect("SHA-256 produces 32 bytes");

        Self {
            raw: raw.into(),
            fingerprint: u64::from_le_bytes(hash_bytes),
            masked: mask_raw(raw).into(),
            full_hash: format!("{HASH_PREFIX}{}", hex::encode(hash)).into(),
        }
    }

    /// Returns the raw secret value.
    ///
    /// Call sites are the audit trail for where raw secrets flow: live
    /// verification requests and the restricted vault, nothing else.
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.raw
    }

    /// Returns the masked representation (e.g. `sk-a••••••••••••Xy4z`).
    #[inline]
    #[must_use]
    pub fn as_masked(&self) -> &str {
        &self.masked
    }

    /// Returns a `u64` fingerprint derived from the first 8 bytes of the
    /// SHA-256 hash.
    #[inline]
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Returns the full `sha256:<hex>` hash string.
    #[inline]
    #[must_use]
    pub fn hash_hex(&self) -> &str {
        &self.full_hash
    }
}

impl fmt::Debug for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretText")
            .field("masked", &self.masked)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked)
    }
}

fn mask_raw(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let char_count = chars.len();

    if char_count < FULL_MASK_THRESHOLD {
        MASK_DOTS_8.to_string()
    } else if char_count < PARTIAL_MASK_THRESHOLD {
        // Show 2-character bookends
        let prefix: String = chars[..2].iter().collect();
        let suffix: String = chars[char_count - 2..].iter().collect();
        format!("{prefix}{MASK_DOTS_8}{suffix}")
    } else {
        // Show 4-character bookends
        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[char_count - 4..].iter().collect();
        format!("{prefix}{MASK_DOTS_12}{suffix}")
    }
}
