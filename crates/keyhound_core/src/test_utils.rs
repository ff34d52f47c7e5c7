//! Test utilities for `keyhound_core` (compiled only during testing).

use std::sync::Arc;

use regex::Regex;

use crate::candidate::{Candidate, KeyId, Origin, SecretText, Span};
use crate::rule::{Confidence, Rule};

fn base_rule(id: &str, regex: &str) -> Rule {
    Rule {
        id: id.into(),
        provider: "test".into(),
        name: "Test Rule".into(),
        description: "Test".into(),
        confidence: Confidence::High,
        regex: Regex::new(regex).unwrap(),
        keywords: vec![].into(),
        context_keywords: vec![].into(),
        min_context_matches: 1,
        default_enabled: true,
        verifiable: false,
    }
}

pub fn make_rule(id: &str, regex: &str, keywords: &[&str]) -> Rule {
    Rule {
        keywords: keywords.iter().map(|&s| s.into()).collect(),
        ..base_rule(id, regex)
    }
}

pub fn make_rule_with_confidence(id: &str, regex: &str, confidence: Confidence) -> Rule {
    Rule {
        confidence,
        ..base_rule(id, regex)
    }
}

pub fn make_rule_with_context(id: &str, regex: &str, context: &[&str], min_context_matches: usize) -> Rule {
    Rule {
        context_keywords: context.iter().map(|&s| s.to_lowercase().into()).collect(),
        min_context_matches,
        ..base_rule(id, regex)
    }
}

pub fn make_candidate(rule_id: &str, provider: &str, secret_value: &str, byte_start: usize, byte_end: usize) -> Candidate {
    let secret = SecretText::new(secret_value);
    Candidate {
        key_id: KeyId::new(provider, &secret),
        rule_id: rule_id.into(),
        provider: Arc::from(provider),
        confidence: Confidence::High,
        secret,
        span: Span::new(1, 1, byte_start, byte_end),
        rule_order: 0,
        origin: Origin::new("test/repo", "test.txt"),
    }
}

pub fn make_candidate_at(
    rule_id: &str,
    confidence: Confidence,
    rule_order: usize,
    byte_start: usize,
    byte_end: usize,
) -> Candidate {
    Candidate {
        confidence,
        rule_order,
        ..make_candidate(rule_id, "test", &format!("secret-{rule_id}"), byte_start, byte_end)
    }
}
