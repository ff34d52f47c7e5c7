//! Convenience re-exports of the most commonly used types.

pub use crate::candidate::{Candidate, KeyId, Origin, SecretText, Span};
pub use crate::classify::ClassificationPipeline;
pub use crate::config::{Config, ConfigError, CustomRule};
pub use crate::context::ContextValidator;
pub use crate::dedup::dedup_candidates;
pub use crate::error::{KeyhoundError, RuleError};
pub use crate::lifecycle::{KeyRecord, KeyStatus, Transition, UnchangedReason};
pub use crate::rule::{Confidence, Rule, RuleLibrary};
pub use crate::store::{MemoryStore, MetadataStore, SecretVault, StoreError};
