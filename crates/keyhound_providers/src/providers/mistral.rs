//! Mistral key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.mistral.ai/v1/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "Mistral",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    MistralProvider,
    id: "mistral",
    name: "Mistral",
    verifier: VERIFIER,
    rules: [
        // Mistral keys are bare 32-char alphanumerics with no prefix, so
        // the rule is low tier and only fires near the provider's name.
        crate::rule! {
            id: "mistral/api-key",
            provider: "mistral",
            name: "Mistral API Key",
            description: "Grants access to Mistral and Codestral models.",
            confidence: Confidence::Low,
            regex: r"\b([a-zA-Z0-9]{32})\b",
            keywords: &["mistral", "codestral"],
            context_keywords: &["mistral", "codestral"],
            min_context_matches: 1,
            default_enabled: true,
            verifiable: true,
        },
    ],
);
