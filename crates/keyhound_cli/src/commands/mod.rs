//! CLI command handlers.

/// Harvest, classify, persist, and verify leaked keys.
pub mod hunt;
/// Project initialisation and `.keyhound.toml` creation.
pub mod init;
/// Rule listing and inspection.
pub mod rules;
/// One-off verification of a single key.
pub mod verify;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;
