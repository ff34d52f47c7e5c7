//! Google Gemini key patterns and verification.

use crate::verify::QueryParamVerifier;

// Gemini authenticates with a ?key= query parameter rather than a header.
const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

static VERIFIER: QueryParamVerifier = QueryParamVerifier {
    provider: "Google Gemini",
    api_url: API_URL,
    param: "key",
};

crate::declare_provider!(
    GeminiProvider,
    id: "gemini",
    name: "Google Gemini",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "gemini/api-key",
            provider: "gemini",
            name: "Google AI API Key",
            description: "Google AI Studio key, shared with other Google APIs.",
            confidence: Confidence::High,
            regex: r"\b(AIza[0-9A-Za-z_-]{35})\b",
            keywords: &["AIza"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
