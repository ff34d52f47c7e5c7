//! Perplexity key patterns.

// Perplexity has no cheap unauthenticated-safe endpoint to probe, so keys
// are detected but never live-verified.
crate::declare_provider!(
    PerplexityProvider,
    id: "perplexity",
    name: "Perplexity",
    rules: [
        crate::rule! {
            id: "perplexity/api-key",
            provider: "perplexity",
            name: "Perplexity API Key",
            description: "Grants access to the Perplexity Sonar API.",
            confidence: Confidence::High,
            regex: r"\b(pplx-[a-zA-Z0-9]{48})\b",
            keywords: &["pplx-"],
            default_enabled: true,
        },
    ],
);
