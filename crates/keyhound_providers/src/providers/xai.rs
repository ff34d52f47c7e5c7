//! xAI key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.x.ai/v1/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "xAI",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    XaiProvider,
    id: "xai",
    name: "xAI",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "xai/api-key",
            provider: "xai",
            name: "xAI API Key",
            description: "Grants access to Grok models via the xAI API.",
            confidence: Confidence::High,
            regex: r"\b(xai-[a-zA-Z0-9]{60,100})\b",
            keywords: &["xai-"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
