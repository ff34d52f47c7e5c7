use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::rule::{Confidence, Rule};

/// Environment variable holding the code-search API token.
///
/// The token never lives in `.keyhound.toml`; a config file is routinely
/// committed, the token must not be.
pub const TOKEN_ENV: &str = "KEYHOUND_GITHUB_TOKEN";

/// Project-level configuration loaded from `.keyhound.toml`.
///
/// Controls which queries are hunted, how hard the harvester leans on the
/// search API, and which rules participate in classification. All fields
/// default to conservative values so an empty file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Code-search queries to harvest, in execution order.
    #[serde(default)]
    pub queries: Vec<String>,

    /// Maximum result pages fetched per query.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Results per page requested from the search API.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Minimum delay between successive page fetches, in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Number of concurrent verification workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Timeout for each code-search request, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Timeout for each outbound verification request, in seconds.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,

    /// Minimum confidence tier for reported candidates.
    ///
    /// Defaults to `Low`, reporting everything; raise it to cut noise from
    /// context-gated generic rules.
    #[serde(default = "default_minimum_confidence")]
    pub minimum_confidence: Confidence,

    /// Built-in rule ids to disable (e.g. `"generic/prefixed-key"`).
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// User-defined detection rules.
    #[serde(default, rename = "rules")]
    pub custom_rules: Vec<CustomRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            max_pages: default_max_pages(),
            per_page: default_per_page(),
            page_delay_ms: default_page_delay_ms(),
            workers: default_workers(),
            search_timeout_secs: default_search_timeout_secs(),
            verify_timeout_secs: default_verify_timeout_secs(),
            minimum_confidence: default_minimum_confidence(),
            disabled_rules: Vec::new(),
            custom_rules: Vec::new(),
        }
    }
}

const fn default_max_pages() -> u32 {
    3
}

const fn default_per_page() -> u32 {
    50
}

const fn default_page_delay_ms() -> u64 {
    2000
}

const fn default_workers() -> usize {
    4
}

const fn default_search_timeout_secs() -> u64 {
    10
}

const fn default_verify_timeout_secs() -> u64 {
    10
}

const fn default_minimum_confidence() -> Confidence {
    Confidence::Low
}

/// A user-defined detection rule declared in `.keyhound.toml`.
///
/// Custom rules are compiled into [`Rule`] instances at startup and
/// participate in classification alongside the built-in providers, under
/// the `"custom"` provider id (which has no live verifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    /// Unique identifier, conventionally prefixed with `"custom/"`.
    pub id: String,
    /// Human-readable name shown in output.
    pub name: String,
    /// Regular expression used to match the key format.
    pub regex: String,
    /// Confidence tier assigned to candidates from this rule.
    pub confidence: Confidence,
    /// Optional longer description. Falls back to `name` if absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Aho-Corasick pre-filter keywords. If non-empty, the rule is only
    /// tested against blobs that contain at least one keyword.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Keywords that must appear near a match for it to be retained.
    #[serde(default)]
    pub context_keywords: Vec<String>,
    /// Minimum number of distinct context keywords required in the window.
    #[serde(default = "default_min_context_matches")]
    pub min_context_matches: usize,
}

const fn default_min_context_matches() -> usize {
    1
}

impl CustomRule {
    /// Compiles this definition into a [`Rule`] ready for classification.
    ///
    /// Returns `RuleError::InvalidRegex` if the regex is malformed.
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let regex = Regex::new(&self.regex).map_err(|source| RuleError::InvalidRegex {
            id: self.id.clone(),
            source,
        })?;

        Ok(Rule {
            id: self.id.as_str().into(),
            provider: "custom".into(),
            name: self.name.as_str().into(),
            description: self.description.as_deref().unwrap_or(&self.name).into(),
            confidence: self.confidence,
            regex,
            keywords: self.keywords.iter().map(|s| s.as_str().into()).collect(),
            context_keywords: self.context_keywords.iter().map(|s| s.to_lowercase().into()).collect(),
            min_context_matches: self.min_context_matches,
            default_enabled: true,
            verifiable: false,
        })
    }
}

impl Config {
    /// Creates a default configuration with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a `.keyhound.toml` file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = read_file(path)?;
        parse_toml(path, &content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Atomically writes this configuration to a `.keyhound.toml` file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serialise_toml(self)?;
        write_file(path, &content)
    }

    /// Serialises this configuration to a pretty-printed TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        serialise_toml(self)
    }

    /// Compiles the effective rule set: built-ins minus `disabled_rules`,
    /// plus all custom rules, preserving registration order.
    pub fn compile_rules(&self) -> Result<Vec<Rule>, RuleError> {
        let mut rules = crate::rule::RuleLibrary::builtin_rules()?;
        rules.retain(|rule| !self.disabled_rules.iter().any(|id| id.as_str() == rule.id.as_ref()));

        for custom in &self.custom_rules {
            rules.push(custom.compile()?);
        }

        Ok(rules)
    }

    /// Reads the code-search API token from [`TOKEN_ENV`], if set and non-empty.
    #[must_use]
    pub fn github_token() -> Option<String> {
        std::env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty())
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    crate::fs_util::atomic_write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_toml(path: &Path, content: &str) -> Result<Config, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn serialise_toml(config: &Config) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize { source })
}

/// Errors that can occur when reading, parsing, serialising, or writing
/// a `.keyhound.toml` configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config '{path}': {source}")]
    Read {
        /// Path to the config file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML or unexpected values.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// Path to the config file that could not be parsed.
        path: PathBuf,
        /// The underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// The in-memory configuration could not be serialised to TOML.
    #[error("failed to serialise config: {source}")]
    Serialize {
        /// The underlying TOML serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// The config file could not be written to disk.
    #[error("failed to write config '{path}': {source}")]
    Write {
        /// Path to the config file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_has_conservative_harvest_limits() {
        let config = Config::default();
        assert!(config.queries.is_empty());
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.per_page, 50);
        assert_eq!(config.page_delay_ms, 2000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.search_timeout_secs, 10);
        assert_eq!(config.verify_timeout_secs, 10);
        assert_eq!(config.minimum_confidence, Confidence::Low);
        assert!(config.disabled_rules.is_empty());
        assert!(config.custom_rules.is_empty());
    }

    #[test]
    fn from_toml_returns_defaults_for_empty_string() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.max_pages, 3);
        assert!(config.queries.is_empty());
    }

    #[test]
    fn from_toml_parses_queries_and_limits() {
        let toml = r#"
            queries = ["sk-ant-api03- language:python", "AIza in:file"]
            max_pages = 5
            per_page = 100
            page_delay_ms = 500
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.queries.len(), 2);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.page_delay_ms, 500);
    }

    #[test]
    fn from_toml_parses_timeouts_independently() {
        let toml = r#"
            search_timeout_secs = 30
            verify_timeout_secs = 5
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.search_timeout_secs, 30);
        assert_eq!(config.verify_timeout_secs, 5);
    }

    #[test]
    fn from_toml_parses_minimum_confidence() {
        let config = Config::from_toml(r#"minimum_confidence = "high""#).unwrap();
        assert_eq!(config.minimum_confidence, Confidence::High);
    }

    #[test]
    fn from_toml_rejects_unknown_confidence_value() {
        assert!(Config::from_toml(r#"minimum_confidence = "certain""#).is_err());
    }

    #[test]
    fn from_toml_parses_disabled_rules_list() {
        let toml = r#"disabled_rules = ["generic/prefixed-key", "cohere/api-key"]"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.disabled_rules.len(), 2);
    }

    #[test]
    fn from_toml_parses_custom_rule_with_defaults() {
        let toml = r#"
            [[rules]]
            id = "custom/acme-token"
            name = "Acme Token"
            regex = '\bacme_[a-z0-9]{40}\b'
            confidence = "high"
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.custom_rules.len(), 1);

        let rule = &config.custom_rules[0];
        assert_eq!(rule.id, "custom/acme-token");
        assert_eq!(rule.confidence, Confidence::High);
        assert!(rule.keywords.is_empty());
        assert_eq!(rule.min_context_matches, 1);
    }

    #[test]
    fn from_toml_rejects_malformed_toml_syntax() {
        assert!(Config::from_toml("this is { not valid toml").is_err());
    }

    #[test]
    fn load_returns_default_config_when_file_not_found() {
        let config = Config::load(Path::new("/nonexistent/path/.keyhound.toml")).unwrap();
        assert!(config.queries.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".keyhound.toml");

        let mut config = Config::default();
        config.queries.push("sk-ant-api03- language:python".to_string());
        config.max_pages = 7;
        config.save(&path).unwrap();

        let restored = Config::load(&path).unwrap();
        assert_eq!(restored.queries, config.queries);
        assert_eq!(restored.max_pages, 7);
    }

    #[test]
    fn custom_rule_compile_succeeds_with_valid_regex() {
        let rule = CustomRule {
            id: "custom/acme".into(),
            name: "Acme".into(),
            regex: r"\bacme_[a-z0-9]{40}\b".into(),
            confidence: Confidence::High,
            description: None,
            keywords: vec!["acme_".into()],
            context_keywords: vec![],
            min_context_matches: 1,
        };

        let compiled = rule.compile().unwrap();
        assert_eq!(compiled.provider.as_ref(), "custom");
        assert!(!compiled.verifiable);
        assert!(compiled.regex.is_match(&format!("acme_{}", "a1".repeat(20))));
    }

    #[test]
    fn custom_rule_compile_fails_with_unclosed_bracket() {
        let rule = CustomRule {
            id: "custom/broken".into(),
            name: "Broken".into(),
            regex: "[unclosed".into(),
            confidence: Confidence::Low,
            description: None,
            keywords: vec![],
            context_keywords: vec![],
            min_context_matches: 1,
        };

        assert!(rule.compile().is_err());
    }

    #[test]
    fn custom_rule_compile_uses_name_when_description_absent() {
        let rule = CustomRule {
            id: "custom/named".into(),
            name: "My Rule Name".into(),
            regex: "X".into(),
            confidence: Confidence::Low,
            description: None,
            keywords: vec![],
            context_keywords: vec![],
            min_context_matches: 1,
        };

        let compiled = rule.compile().unwrap();
        assert_eq!(compiled.description.as_ref(), "My Rule Name");
    }

    #[test]
    fn custom_rule_compile_lowercases_context_keywords() {
        let rule = CustomRule {
            id: "custom/ctx".into(),
            name: "Ctx".into(),
            regex: "X".into(),
            confidence: Confidence::Low,
            description: None,
            keywords: vec![],
            context_keywords: vec!["Acme".into(), "TOKEN".into()],
            min_context_matches: 2,
        };

        let compiled = rule.compile().unwrap();
        let keywords: Vec<&str> = compiled.context_keywords.iter().map(AsRef::as_ref).collect();
        assert_eq!(keywords, ["acme", "token"]);
    }

    #[test]
    fn compile_rules_removes_disabled_builtins() {
        let mut config = Config::default();
        config.disabled_rules.push("generic/prefixed-key".to_string());

        let rules = config.compile_rules().unwrap();
        assert!(rules.iter().all(|r| r.id.as_ref() != "generic/prefixed-key"));
        assert!(rules.iter().any(|r| r.id.as_ref() == "anthropic/api-key"));
    }

    #[test]
    fn compile_rules_appends_custom_rules_after_builtins() {
        let config = Config::from_toml(
            r#"
            [[rules]]
            id = "custom/acme"
            name = "Acme"
            regex = 'acme_[a-z]{8}'
            confidence = "medium"
        "#,
        )
        .unwrap();

        let rules = config.compile_rules().unwrap();
        let last = rules.last().unwrap();
        assert_eq!(last.id.as_ref(), "custom/acme");
    }

    #[test]
    fn compile_rules_fails_fast_on_invalid_custom_regex() {
        let config = Config::from_toml(
            r#"
            [[rules]]
            id = "custom/broken"
            name = "Broken"
            regex = '[broken'
            confidence = "low"
        "#,
        )
        .unwrap();

        assert!(config.compile_rules().is_err());
    }

    #[test]
    fn config_error_includes_path_in_display() {
        let error = ConfigError::Read {
            path: PathBuf::from("/etc/keyhound.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert!(error.to_string().contains("/etc/keyhound.toml"));
    }
}
