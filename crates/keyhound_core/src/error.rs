use thiserror::Error;

/// Errors that can occur when compiling a detection rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule's regular expression failed to compile.
    #[error("invalid regex in rule '{id}': {source}")]
    InvalidRegex {
        /// Identifier of the rule that failed (e.g. `"anthropic/api-key"`).
        id: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },
}

/// Top-level error type for the keyhound detection pipeline.
///
/// Unifies errors from rule compilation, configuration loading, and
/// persistence into a single type for callers that orchestrate the full
/// workflow.
#[derive(Debug, Error)]
pub enum KeyhoundError {
    /// A rule failed to compile.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Configuration could not be read, parsed, or written.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A persistence backend rejected an operation.
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}
