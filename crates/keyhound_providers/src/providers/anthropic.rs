//! Anthropic key patterns and verification.

use crate::verify::HeaderVerifier;

const API_URL: &str = "https://api.anthropic.com/v1/models";

static VERIFIER: HeaderVerifier = HeaderVerifier {
    provider: "Anthropic",
    api_url: API_URL,
    header: "x-api-key",
    extra_headers: &[("anthropic-version", "2023-06-01")],
};

crate::declare_provider!(
    AnthropicProvider,
    id: "anthropic",
    name: "Anthropic",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "anthropic/api-key",
            provider: "anthropic",
            name: "Anthropic API Key",
            description: "Grants access to Claude models with billing.",
            confidence: Confidence::High,
            regex: r"\b(sk-ant-api03-[a-zA-Z0-9_-]{80,120})\b",
            keywords: &["sk-ant-"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);

#[cfg(test)]
mod pattern_tests {
    use regex::Regex;

    fn regex() -> Regex {
        Regex::new(r"\b(sk-ant-api03-[a-zA-Z0-9_-]{80,120})\b").unwrap()
    }

    #[test]
    fn matches_full_length_key() {
        let key = format!("sk-ant-api03-{}", "aB3_-".repeat(19)); // 95 chars after prefix
        assert!(regex().is_match(&key));
    }

    #[test]
    fn rejects_truncated_key_shown_in_docs() {
        assert!(!regex().is_match("sk-ant-api03-AbCdEf123..."));
    }

    #[test]
    fn rejects_admin_key_prefix() {
        let key = format!("sk-ant-admin01-{}", "a".repeat(95));
        assert!(!regex().is_match(&key));
    }
}
