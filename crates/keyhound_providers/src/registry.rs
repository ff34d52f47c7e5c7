//! Provider registry and verification dispatch.

use std::collections::HashMap;
use std::time::Duration;

use crate::USER_AGENT;
use crate::provider::Provider;
use crate::providers::builtin_providers;
use crate::rule::RuleDef;
use crate::verify::{VerificationOutcome, VerifyError};

/// All outbound verification requests carry this timeout; a slower provider
/// is reported as unverifiable rather than blocking the pipeline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Central registry of all builtin providers.
///
/// Maps provider identifiers to their rule definitions and verifiers, and
/// optionally holds an HTTP client for live verification. This is the single
/// dispatch point for `verify`: given a provider id and a raw secret, it
/// resolves the provider's verification procedure and classifies the result.
pub struct ProviderRegistry {
    providers: Vec<&'static dyn Provider>,
    by_id: HashMap<&'static str, usize>,
    client: Option<reqwest::Client>,
}

impl ProviderRegistry {
    /// Creates a registry pre-loaded with all builtin providers.
    ///
    /// Registration order is priority order: within a confidence tier, rules
    /// from earlier providers win dedup ties, so providers with longer
    /// literal prefixes are registered before providers sharing that prefix.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_providers(builtin_providers())
    }

    /// Creates a registry from an explicit provider set.
    ///
    /// [`builtin`](Self::builtin) is this constructor applied to every
    /// builtin provider; an explicit set is useful for embedding a
    /// restricted provider list.
    #[must_use]
    pub fn from_providers(providers: Vec<&'static dyn Provider>) -> Self {
        let by_id = providers.iter().enumerate().map(|(idx, p)| (p.id(), idx)).collect();

        Self {
            providers,
            by_id,
            client: None,
        }
    }

    /// Creates a registry with an HTTP client for live verification,
    /// using the default request timeout.
    pub fn with_verification() -> Result<Self, VerifyError> {
        Self::with_verification_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a verification-capable registry with an explicit timeout.
    pub fn with_verification_timeout(timeout: Duration) -> Result<Self, VerifyError> {
        let mut registry = Self::builtin();
        registry.enable_verification(timeout)?;
        Ok(registry)
    }

    /// Attaches an HTTP client so this registry can perform live checks.
    pub fn enable_verification(&mut self, timeout: Duration) -> Result<(), VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VerifyError::ClientInit(e.to_string()))?;

        self.client = Some(client);
        Ok(())
    }

    /// Returns an iterator over every rule definition across all providers.
    pub fn all_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.providers.iter().flat_map(|p| p.rules().iter())
    }

    /// Returns the total number of rules across all providers.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.providers.iter().map(|p| p.rules().len()).sum()
    }

    /// Looks up a provider by its identifier.
    #[must_use]
    pub fn provider(&self, provider_id: &str) -> Option<&'static dyn Provider> {
        self.by_id.get(provider_id).map(|&idx| self.providers[idx])
    }

    /// Returns `true` if the given provider supports live verification.
    #[must_use]
    pub fn supports_verification(&self, provider_id: &str) -> bool {
        self.provider(provider_id).is_some_and(|p| p.verifier().is_some())
    }

    /// Verifies a secret against the provider registered under `provider_id`.
    ///
    /// Transport failures (timeout, connection refused, malformed response)
    /// come back as an `Ok` outcome with [`crate::Verdict::Unverifiable`];
    /// only configuration problems - an unknown provider, a provider without
    /// a verifier, or a registry built without a client - are errors.
    pub async fn verify(&self, provider_id: &str, secret: &str) -> Result<VerificationOutcome, VerifyError> {
        let client = self.client.as_ref().ok_or_else(|| {
            VerifyError::ClientInit("registry not initialized with verification support".to_string())
        })?;

        let provider = self.provider(provider_id).ok_or_else(|| VerifyError::UnknownProvider {
            provider_id: provider_id.to_string(),
        })?;

        let verifier = provider.verifier().ok_or_else(|| VerifyError::Unsupported {
            provider_id: provider_id.to_string(),
        })?;

        match verifier.verify(client, secret).await {
            Ok(outcome) => Ok(outcome),
            Err(VerifyError::Http(e)) => Ok(VerificationOutcome::unverifiable(&e.to_string())),
            Err(other) => Err(other),
        }
    }

    /// Returns the underlying slice of registered providers.
    #[must_use]
    pub fn providers(&self) -> &[&'static dyn Provider] {
        &self.providers
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field("rule_count", &self.rule_count())
            .field("has_client", &self.client.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{BearerVerifier, Verdict};

    #[test]
    fn builtin_registry_has_rules() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.rule_count() > 0);
    }

    #[test]
    fn builtin_registry_has_providers() {
        let registry = ProviderRegistry::builtin();
        assert!(!registry.providers().is_empty());
    }

    #[test]
    fn provider_ids_are_unique() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.by_id.len(), registry.providers().len());
    }

    #[test]
    fn supports_verification_for_anthropic() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.supports_verification("anthropic"));
    }

    #[test]
    fn does_not_support_verification_for_unknown_provider() {
        let registry = ProviderRegistry::builtin();
        assert!(!registry.supports_verification("nonexistent"));
    }

    #[test]
    fn every_verifiable_rule_belongs_to_a_provider_with_verifier() {
        let registry = ProviderRegistry::builtin();
        for rule in registry.all_rules() {
            if rule.verifiable {
                assert!(
                    registry.supports_verification(rule.provider),
                    "rule {} is verifiable but provider {} has no verifier",
                    rule.id,
                    rule.provider
                );
            }
        }
    }

    #[test]
    fn all_rules_returns_every_rule() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.all_rules().count(), registry.rule_count());
    }

    #[test]
    fn default_is_equivalent_to_builtin() {
        let default_registry = ProviderRegistry::default();
        let builtin_registry = ProviderRegistry::builtin();

        assert_eq!(default_registry.rule_count(), builtin_registry.rule_count());
        assert_eq!(default_registry.providers().len(), builtin_registry.providers().len());
    }

    #[tokio::test]
    async fn verify_without_client_is_a_configuration_error() {
        let registry = ProviderRegistry::builtin();
        let result = registry.verify("anthropic", "sk-ant-test").await;
        assert!(matches!(result, Err(VerifyError::ClientInit(_))));
    }

    #[tokio::test]
    async fn verify_unknown_provider_is_a_configuration_error() {
        let registry = ProviderRegistry::with_verification().unwrap();
        let result = registry.verify("nonexistent", "key").await;
        assert!(matches!(result, Err(VerifyError::UnknownProvider { .. })));
    }

    #[tokio::test]
    async fn verify_provider_without_verifier_is_unsupported() {
        let registry = ProviderRegistry::with_verification().unwrap();
        let result = registry.verify("generic", "some-token").await;
        assert!(matches!(result, Err(VerifyError::Unsupported { .. })));
    }

    struct UnroutableProvider;

    static UNROUTABLE_VERIFIER: BearerVerifier = BearerVerifier {
        provider: "Unroutable",
        // Port 1 is never listening; the request fails at the transport layer.
        api_url: "http://127.0.0.1:1/v1/models",
        scheme: "Bearer",
    };

    impl Provider for UnroutableProvider {
        fn id(&self) -> &'static str {
            "unroutable"
        }

        fn name(&self) -> &'static str {
            "Unroutable"
        }

        fn rules(&self) -> &'static [RuleDef] {
            &[]
        }

        fn verifier(&self) -> Option<&dyn crate::verify::KeyVerifier> {
            Some(&UNROUTABLE_VERIFIER)
        }
    }

    #[tokio::test]
    async fn verify_maps_transport_failure_to_unverifiable() {
        let mut registry = ProviderRegistry::from_providers(vec![&UnroutableProvider]);
        registry.enable_verification(Duration::from_secs(1)).unwrap();

        let outcome = registry.verify("unroutable", "sk-test").await.unwrap();
        assert_eq!(outcome.verdict, Verdict::Unverifiable);
        assert!(outcome.transport_error.is_some());
    }
}
