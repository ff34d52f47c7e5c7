//! The classification pipeline that turns blobs into candidates.

use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::binary::is_binary_content;
use crate::candidate::{Candidate, KeyId, Origin, SecretText, Span};
use crate::context::ContextValidator;
use crate::dedup::dedup_candidates;
use crate::rule::{Rule, RuleLibrary};

/// Classification engine that matches harvested blobs against a [`RuleLibrary`].
///
/// The pipeline uses Aho-Corasick keyword pre-filtering to skip rules whose
/// keywords are absent from the blob, runs full regex matching on the rules
/// that could plausibly match, drops matches that fail their rule's context
/// requirement, and resolves overlapping survivors so each region of the
/// blob yields at most one candidate. Binary content is detected and skipped.
pub struct ClassificationPipeline {
    library: RuleLibrary,
    validator: ContextValidator,
}

impl std::fmt::Debug for ClassificationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationPipeline")
            .field("rules", &self.library.len())
            .finish_non_exhaustive()
    }
}

impl ClassificationPipeline {
    /// Creates a pipeline with the default context window.
    #[must_use]
    pub const fn new(library: RuleLibrary) -> Self {
        Self {
            library,
            validator: ContextValidator::new(),
        }
    }

    /// Replaces the context validator (used to shrink the window in tests).
    #[must_use]
    pub const fn with_validator(mut self, validator: ContextValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Returns the underlying rule library.
    #[must_use]
    pub const fn library(&self) -> &RuleLibrary {
        &self.library
    }

    /// Returns the total number of rules in the library.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.library.len()
    }

    /// Classifies `content` and returns deduplicated candidates in blob order.
    ///
    /// Binary content yields no candidates. Matches that fail context
    /// validation are dropped silently (debug-logged under the `tracing`
    /// feature); they are filtering decisions, not errors.
    #[must_use]
    pub fn classify(&self, content: &str, origin: &Origin) -> Vec<Candidate> {
        if is_binary_content(content) {
            #[cfg(feature = "tracing")]
            debug!("skipping binary blob");
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for rule_idx in self.library.rules_for(content) {
            let Some(rule) = self.library.get_by_index(rule_idx) else {
                continue;
            };

            self.match_rule_into(content, origin, rule, rule_idx, &mut candidates);
        }

        dedup_candidates(&mut candidates);
        candidates
    }

    fn match_rule_into(
        &self,
        content: &str,
        origin: &Origin,
        rule: &Rule,
        rule_idx: usize,
        candidates: &mut Vec<Candidate>,
    ) {
        for mat in rule.regex.find_iter(content) {
            if !self.validator.validate(rule, content, mat.start(), mat.end()) {
                continue;
            }

            let candidate = create_candidate(content, origin, rule, rule_idx, mat.start(), mat.end());

            #[cfg(feature = "tracing")]
            trace!(rule_id = %rule.id, line = candidate.span.line, "match");

            candidates.push(candidate);
        }
    }
}

fn create_candidate(
    content: &str,
    origin: &Origin,
    rule: &Rule,
    rule_idx: usize,
    byte_start: usize,
    byte_end: usize,
) -> Candidate {
    let secret = SecretText::new(&content[byte_start..byte_end]);
    #[expect(
        clippy::expect_used,
        reason = "regex match indices are always valid UTF-8 boundaries"
    )]
    let span = Span::from_byte_range(content, byte_start, byte_end)
        .expect("regex match indices are always valid UTF-8 boundaries");

    Candidate {
        key_id: KeyId::new(&rule.provider, &secret),
        rule_id: Arc::clone(&rule.id),
        provider: Arc::clone(&rule.provider),
        confidence: rule.confidence,
        secret,
        span,
        rule_order: rule_idx,
        origin: origin.clone(),
    }
}
