//! OpenRouter key patterns and verification.

use crate::verify::BearerVerifier;

// GET /api/v1/key reports the key's own limits, so it authenticates the
// key without touching any model endpoint.
const API_URL: &str = "https://openrouter.ai/api/v1/key";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "OpenRouter",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    OpenRouterProvider,
    id: "openrouter",
    name: "OpenRouter",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "openrouter/api-key",
            provider: "openrouter",
            name: "OpenRouter API Key",
            description: "Routes to many hosted models on one billing account.",
            confidence: Confidence::High,
            regex: r"\b(sk-or-v1-[a-f0-9]{64})\b",
            keywords: &["sk-or-"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
