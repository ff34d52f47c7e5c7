//! Builtin providers for key detection and verification.

mod anthropic;
mod cohere;
mod deepseek;
mod gemini;
mod generic;
mod groq;
mod huggingface;
mod mistral;
mod openai;
mod openrouter;
mod perplexity;
mod replicate;
mod xai;

use crate::provider::Provider;

/// Returns all builtin providers, one per supported service.
///
/// The order here is load-bearing: it is the registration order used to
/// break dedup ties within a confidence tier, so providers whose key
/// formats extend a shared literal prefix (`sk-ant-`, `sk-or-` over plain
/// `sk-`) must appear before the provider owning the shorter prefix.
#[must_use]
pub fn builtin_providers() -> Vec<&'static dyn Provider> {
    vec![
        &anthropic::AnthropicProvider,
        &openrouter::OpenRouterProvider,
        &openai::OpenAiProvider,
        &deepseek::DeepSeekProvider,
        &gemini::GeminiProvider,
        &groq::GroqProvider,
        &huggingface::HuggingFaceProvider,
        &perplexity::PerplexityProvider,
        &replicate::ReplicateProvider,
        &xai::XaiProvider,
        &mistral::MistralProvider,
        &cohere::CohereProvider,
        &generic::GenericProvider,
    ]
}
