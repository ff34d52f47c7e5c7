//! Groq key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.groq.com/openai/v1/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "Groq",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    GroqProvider,
    id: "groq",
    name: "Groq",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "groq/api-key",
            provider: "groq",
            name: "Groq API Key",
            description: "Grants access to Groq's hosted inference API.",
            confidence: Confidence::High,
            regex: r"\b(gsk_[a-zA-Z0-9]{52})\b",
            keywords: &["gsk_"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
