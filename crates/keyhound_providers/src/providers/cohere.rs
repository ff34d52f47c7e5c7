//! Cohere key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.cohere.com/v1/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "Cohere",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    CohereProvider,
    id: "cohere",
    name: "Cohere",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "cohere/api-key",
            provider: "cohere",
            name: "Cohere API Key",
            description: "Grants access to Cohere's generation and embed APIs.",
            confidence: Confidence::Low,
            regex: r"\b([a-zA-Z0-9]{40})\b",
            keywords: &["cohere"],
            context_keywords: &["cohere"],
            min_context_matches: 1,
            default_enabled: true,
            verifiable: true,
        },
    ],
);
