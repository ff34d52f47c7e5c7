//! Rule definition types for key detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid confidence string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfidenceError {
    invalid_value: Box<str>,
}

impl ParseConfidenceError {
    fn new(value: &str) -> Self {
        Self {
            invalid_value: value.into(),
        }
    }

    /// Returns the invalid value that caused the parse failure.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseConfidenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid confidence '{}': expected one of 'low', 'medium', 'high'",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseConfidenceError {}

/// Declared reliability of a detection rule absent surrounding context.
///
/// Variants are ordered ascending (`Low < Medium < High`) so classification
/// priority and threshold filtering can use plain comparisons. A rule's tier
/// describes the rule itself: a high-tier rule matches a format specific
/// enough that a hit is almost certainly a real key, while a low-tier rule
/// matches a format indistinguishable from generic hex/base64 text and
/// relies on context keywords for disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The format is generic; context keywords are the only disambiguator.
    Low,
    /// The format is distinctive but shared with other services.
    Medium,
    /// The format is unique to one provider.
    High,
}

impl Confidence {
    /// All confidence tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Confidence {
    type Err = ParseConfidenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseConfidenceError::new(s)),
        }
    }
}

/// A single rule definition for detecting one provider key format.
///
/// Rules are pure data: adding a provider never touches matching logic.
/// Every regex is `\b`-anchored on both ends with explicit length bounds so
/// a truncated key, or a window inside a longer alphanumeric run, never
/// matches.
#[derive(Debug, Clone)]
pub struct RuleDef {
    /// Unique identifier in `"provider/name"` format (e.g. `"anthropic/api-key"`).
    pub id: &'static str,
    /// Identifier of the owning provider, used for verification dispatch.
    pub provider: &'static str,
    /// Short human-readable name (e.g. `"Anthropic API Key"`).
    pub name: &'static str,
    /// Longer description of what this rule detects.
    pub description: &'static str,
    /// Declared reliability tier of this rule.
    pub confidence: Confidence,
    /// The regular expression used to match this key format.
    pub regex: &'static str,
    /// Literal keywords for Aho-Corasick pre-filtering.
    pub keywords: &'static [&'static str],
    /// Keywords that must appear near a match for it to be retained.
    /// Empty means no context check.
    pub context_keywords: &'static [&'static str],
    /// Minimum number of distinct `context_keywords` required in the window.
    pub min_context_matches: usize,
    /// Whether this rule is enabled by default.
    pub default_enabled: bool,
    /// Whether matches from this rule can be live-verified.
    pub verifiable: bool,
}

/// Creates a `RuleDef`, defaulting the context and verification fields.
///
/// Context fields default to no requirement; `verifiable` defaults to `false`.
#[macro_export]
macro_rules! rule {
    (
        id: $id:expr,
        provider: $provider:expr,
        name: $name:expr,
        description: $description:expr,
        confidence: $confidence:expr,
        regex: $regex:expr,
        keywords: $keywords:expr,
        default_enabled: $enabled:expr $(,)?
    ) => {
        $crate::rule! {
            id: $id,
            provider: $provider,
            name: $name,
            description: $description,
            confidence: $confidence,
            regex: $regex,
            keywords: $keywords,
            context_keywords: &[],
            min_context_matches: 1,
            default_enabled: $enabled,
            verifiable: false,
        }
    };
    (
        id: $id:expr,
        provider: $provider:expr,
        name: $name:expr,
        description: $description:expr,
        confidence: $confidence:expr,
        regex: $regex:expr,
        keywords: $keywords:expr,
        default_enabled: $enabled:expr,
        verifiable: $verifiable:expr $(,)?
    ) => {
        $crate::rule! {
            id: $id,
            provider: $provider,
            name: $name,
            description: $description,
            confidence: $confidence,
            regex: $regex,
            keywords: $keywords,
            context_keywords: &[],
            min_context_matches: 1,
            default_enabled: $enabled,
            verifiable: $verifiable,
        }
    };
    (
        id: $id:expr,
        provider: $provider:expr,
        name: $name:expr,
        description: $description:expr,
        confidence: $confidence:expr,
        regex: $regex:expr,
        keywords: $keywords:expr,
        context_keywords: $context:expr,
        min_context_matches: $min_context:expr,
        default_enabled: $enabled:expr $(,)?
    ) => {
        $crate::rule! {
            id: $id,
            provider: $provider,
            name: $name,
            description: $description,
            confidence: $confidence,
            regex: $regex,
            keywords: $keywords,
            context_keywords: $context,
            min_context_matches: $min_context,
            default_enabled: $enabled,
            verifiable: false,
        }
    };
    (
        id: $id:expr,
        provider: $provider:expr,
        name: $name:expr,
        description: $description:expr,
        confidence: $confidence:expr,
        regex: $regex:expr,
        keywords: $keywords:expr,
        context_keywords: $context:expr,
        min_context_matches: $min_context:expr,
        default_enabled: $enabled:expr,
        verifiable: $verifiable:expr $(,)?
    ) => {
        $crate::rule::RuleDef {
            id: $id,
            provider: $provider,
            name: $name,
            description: $description,
            confidence: $confidence,
            regex: $regex,
            keywords: $keywords,
            context_keywords: $context,
            min_context_matches: $min_context,
            default_enabled: $enabled,
            verifiable: $verifiable,
        }
    };
}
