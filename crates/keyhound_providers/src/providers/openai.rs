//! OpenAI key patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.openai.com/v1/models";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "OpenAI",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    OpenAiProvider,
    id: "openai",
    name: "OpenAI",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "openai/project-key",
            provider: "openai",
            name: "OpenAI Project Key",
            description: "Project-scoped key for the OpenAI API.",
            confidence: Confidence::High,
            regex: r"\b(sk-proj-[A-Za-z0-9_-]{40,160})\b",
            keywords: &["sk-proj-"],
            default_enabled: true,
            verifiable: true,
        },
        crate::rule! {
            id: "openai/api-key",
            provider: "openai",
            name: "OpenAI API Key",
            description: "Legacy user-scoped key for the OpenAI API.",
            confidence: Confidence::High,
            regex: r"\b(sk-[A-Za-z0-9]{40,64})\b",
            keywords: &["sk-"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
