//! Catch-all patterns for prefixed API keys with no dedicated rule.

// No verifier: there is no provider to dispatch a generic hit against.
crate::declare_provider!(
    GenericProvider,
    id: "generic",
    name: "Generic",
    rules: [
        // Empty keyword list means this rule runs on every document, so the
        // context gate is what keeps its false-positive rate tolerable.
        crate::rule! {
            id: "generic/prefixed-key",
            provider: "generic",
            name: "Generic Prefixed API Key",
            description: "Dash-separated token near credential vocabulary.",
            confidence: Confidence::Low,
            regex: r"\b([A-Za-z]{2,8}-[A-Za-z0-9]{24,64})\b",
            keywords: &[],
            context_keywords: &["api_key", "apikey", "token", "secret", "authorization"],
            min_context_matches: 1,
            default_enabled: true,
        },
    ],
);
