//! Provider trait for rule definitions.

use crate::rule::RuleDef;
use crate::verify::KeyVerifier;

/// A provider of key detection rules.
///
/// Each provider contributes one or more `RuleDef` entries and optionally a
/// `KeyVerifier` for live-checking detected keys.
pub trait Provider: Send + Sync {
    /// Returns the unique identifier for this provider (e.g. `"anthropic"`).
    fn id(&self) -> &'static str;

    /// Returns the human-readable display name (e.g. `"Anthropic"`).
    fn name(&self) -> &'static str;

    /// Returns the static slice of rule definitions this provider contributes.
    fn rules(&self) -> &'static [RuleDef];

    /// Returns an optional verifier for live-checking keys matched by this provider.
    fn verifier(&self) -> Option<&dyn KeyVerifier> {
        None
    }
}

/// Generates a `Provider` implementation with optional `KeyVerifier` support.
///
/// Creates a unit struct, implements `Provider` for it, and emits basic tests
/// asserting the provider has rules and they all declare the provider's id.
#[macro_export]
macro_rules! declare_provider {
    (
        $struct_name:ident,
        id: $id:expr,
        name: $display_name:expr,
        verifier: $verifier:ident,
        rules: [$($rule:expr),+ $(,)?] $(,)?
    ) => {
        use $crate::provider::Provider;
        use $crate::rule::{Confidence, RuleDef};

        static RULES: &[RuleDef] = &[$($rule),+];

        #[doc = concat!("Key detection provider for ", $display_name, " with live verification.")]
        pub struct $struct_name;

        impl Provider for $struct_name {
            fn id(&self) -> &'static str {
                $id
            }

            fn name(&self) -> &'static str {
                $display_name
            }

            fn rules(&self) -> &'static [RuleDef] {
                RULES
            }

            fn verifier(&self) -> Option<&dyn $crate::verify::KeyVerifier> {
                Some(&$verifier)
            }
        }

        #[cfg(test)]
        mod provider_tests {
            use super::*;

            #[test]
            fn provider_has_rules() {
                assert!(!$struct_name.rules().is_empty());
            }

            #[test]
            fn all_rules_declare_owning_provider() {
                for rule in $struct_name.rules() {
                    assert_eq!(rule.provider, $id);
                }
            }

            #[test]
            fn provider_has_verifier() {
                assert!($struct_name.verifier().is_some());
            }
        }
    };

    (
        $struct_name:ident,
        id: $id:expr,
        name: $display_name:expr,
        rules: [$($rule:expr),+ $(,)?] $(,)?
    ) => {
        use $crate::provider::Provider;
        use $crate::rule::{Confidence, RuleDef};

        static RULES: &[RuleDef] = &[$($rule),+];

        #[doc = concat!("Key detection provider for ", $display_name, ".")]
        pub struct $struct_name;

        impl Provider for $struct_name {
            fn id(&self) -> &'static str {
                $id
            }

            fn name(&self) -> &'static str {
                $display_name
            }

            fn rules(&self) -> &'static [RuleDef] {
                RULES
            }
        }

        #[cfg(test)]
        mod provider_tests {
            use super::*;

            #[test]
            fn provider_has_rules() {
                assert!(!$struct_name.rules().is_empty());
            }

            #[test]
            fn all_rules_declare_owning_provider() {
                for rule in $struct_name.rules() {
                    assert_eq!(rule.provider, $id);
                }
            }
        }
    };
}
