//! Core detection and lifecycle engine for keyhound.
//!
//! This crate classifies harvested text blobs into leaked-key candidates and
//! tracks each key's verification status over time. It is designed to be
//! embedded in the CLI hunter, CI jobs, and reporting tools.
//!
//! # Main Types
//!
//! - [`RuleLibrary`] - Compiled detection rules with keyword pre-filtering
//! - [`ClassificationPipeline`] - Turns a text blob into deduplicated [`Candidate`]s
//! - [`KeyRecord`] - Per-key status lifecycle driven by verification outcomes
//! - [`MetadataStore`] / [`SecretVault`] - Persistence seams; raw secrets only
//!   ever reach the vault
//! - [`Config`] - User configuration loaded from `.keyhound.toml`
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors that library
//! consumers can match on:
//!
//! - [`RuleError`] - Rule compilation failures
//! - [`ConfigError`] - Configuration loading/parsing failures
//! - [`StoreError`] - Persistence backend failures
//! - [`KeyhoundError`] - Top-level error enum combining the above
//!
//! The CLI crate (`keyhound_cli`) uses `anyhow` for error propagation.

/// Binary content detection heuristics.
pub mod binary;
/// Candidate, span, and masked-secret types.
pub mod candidate;
/// The classification pipeline that turns blobs into candidates.
pub mod classify;
/// User configuration loaded from `.keyhound.toml`.
pub mod config;
/// Context-keyword validation for low-specificity rules.
pub mod context;
/// Overlap resolution between competing candidates.
pub mod dedup;
/// Error types for rule compilation, configuration, and persistence.
pub mod error;
pub(crate) mod fs_util;
/// Key status lifecycle driven by verification outcomes.
pub mod lifecycle;
/// Common re-exports for internal use.
pub mod prelude;
/// Compiled rules and the keyword-indexed rule library.
pub mod rule;
/// Persistence traits and the in-memory reference store.
pub mod store;
#[cfg(test)]
pub(crate) mod test_utils;
/// Text utilities for line boundaries and context windows.
pub mod text;

pub use candidate::{Candidate, KeyId, Origin, SecretText, Span};
pub use classify::ClassificationPipeline;
pub use config::{Config, ConfigError, CustomRule};
pub use context::ContextValidator;
pub use dedup::dedup_candidates;
pub use error::{KeyhoundError, RuleError};
pub use lifecycle::{KeyRecord, KeyStatus, Transition, UnchangedReason};
pub use rule::{Confidence, Rule, RuleLibrary};
pub use store::{MemoryStore, MetadataStore, SecretVault, StoreError};

/// Default filename for keyhound configuration.
pub const CONFIG_FILENAME: &str = ".keyhound.toml";
