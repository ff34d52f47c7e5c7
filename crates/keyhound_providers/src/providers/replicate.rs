//! Replicate token patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://api.replicate.com/v1/account";

// Replicate uses "Token <key>" rather than the usual "Bearer" scheme.
static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "Replicate",
    api_url: API_URL,
    scheme: "Token",
};

crate::declare_provider!(
    ReplicateProvider,
    id: "replicate",
    name: "Replicate",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "replicate/api-token",
            provider: "replicate",
            name: "Replicate API Token",
            description: "Grants access to model runs and deployments.",
            confidence: Confidence::High,
            regex: r"\b(r8_[a-zA-Z0-9]{37})\b",
            keywords: &["r8_"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
