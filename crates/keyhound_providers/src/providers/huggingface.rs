//! Hugging Face token patterns and verification.

use crate::verify::BearerVerifier;

const API_URL: &str = "https://huggingface.co/api/whoami-v2";

static VERIFIER: BearerVerifier = BearerVerifier {
    provider: "Hugging Face",
    api_url: API_URL,
    scheme: "Bearer",
};

crate::declare_provider!(
    HuggingFaceProvider,
    id: "huggingface",
    name: "Hugging Face",
    verifier: VERIFIER,
    rules: [
        crate::rule! {
            id: "huggingface/user-token",
            provider: "huggingface",
            name: "Hugging Face User Access Token",
            description: "May grant write access to models and datasets.",
            confidence: Confidence::High,
            regex: r"\b(hf_[a-zA-Z0-9]{34,40})\b",
            keywords: &["hf_"],
            default_enabled: true,
            verifiable: true,
        },
    ],
);
