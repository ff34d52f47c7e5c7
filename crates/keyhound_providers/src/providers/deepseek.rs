//! DeepSeek key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.deepseek.com/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "DeepSeek",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    DeepSeekProvider,
    id: "deepseek",
    name: "DeepSeek",
    verifier: VERIFIER,
    rules: [
        // DeepSeek keys are 32 lowercase hex chars behind a plain "sk-"
        // prefix, a shape shared with several other services, so the rule
        // stays medium tier and requires the provider name nearby.
        crate::rule! {
            id: "deepseek/api-key",
            provider: "deepseek",
            name: "DeepSeek API Key",
            description: "Grants access to DeepSeek chat and reasoner models.",
            confidence: Confidence::Medium,
            regex: r"\b(sk-[a-f0-9]{32})\b",
            keywords: &["sk-"],
            context_keywords: &["deepseek"],
            min_context_matches: 1,
            default_enabled: true,
            verifiable: true,
        },
    ],
);
