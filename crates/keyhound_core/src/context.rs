//! Context-keyword validation for low-specificity rules.

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::rule::Rule;
use crate::text::window_around;

/// Characters inspected on each side of a match for context keywords.
pub const CONTEXT_RADIUS: usize = 200;

/// Checks whether a match is surrounded by the vocabulary its rule requires.
///
/// Rules whose key format is generic (bare hex, dash-separated tokens)
/// declare `context_keywords`; a match from such a rule only survives when
/// enough distinct keywords occur within the window around it. Rules with no
/// context requirement always pass.
#[derive(Debug, Clone, Copy)]
pub struct ContextValidator {
    radius: usize,
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextValidator {
    /// Creates a validator with the default [`CONTEXT_RADIUS`] window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            radius: CONTEXT_RADIUS,
        }
    }

    /// Creates a validator with an explicit window radius in characters.
    #[must_use]
    pub const fn with_radius(radius: usize) -> Self {
        Self { radius }
    }

    /// Returns `true` if the match at `byte_start..byte_end` satisfies the
    /// rule's context requirement.
    ///
    /// The window extends `radius` characters before and after the match,
    /// clamped to the blob bounds, and is compared case-insensitively. Each
    /// declared keyword counts at most once no matter how often it repeats.
    #[must_use]
    pub fn validate(&self, rule: &Rule, content: &str, byte_start: usize, byte_end: usize) -> bool {
        if rule.context_keywords.is_empty() {
            return true;
        }

        let window = window_around(content, byte_start, byte_end, self.radius).to_lowercase();
        let distinct = rule
            .context_keywords
            .iter()
            .filter(|keyword| window.contains(keyword.as_ref()))
            .count();

        let passed = distinct >= rule.min_context_matches;

        #[cfg(feature = "tracing")]
        if !passed {
            debug!(
                rule_id = %rule.id,
                distinct,
                required = rule.min_context_matches,
                "match dropped by context validation"
            );
        }

        passed
    }
}
