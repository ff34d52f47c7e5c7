//! Compiled rules and the keyword-indexed rule library.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use aho_corasick::AhoCorasick;
use regex::Regex;

use crate::error::RuleError;

pub use keyhound_providers::{Confidence, RuleDef};

/// A compiled detection rule ready for classification.
///
/// Each rule combines a compiled regular expression with metadata used for
/// reporting (confidence tier, description), performance (keywords for
/// Aho-Corasick pre-filtering), and context validation.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identifier in `"provider/name"` format (e.g. `"anthropic/api-key"`).
    pub id: Arc<str>,
    /// Identifier of the owning provider, used for verification dispatch.
    pub provider: Arc<str>,
    /// Short human-readable name shown in output.
    pub name: Box<str>,
    /// Longer description of what the rule detects.
    pub description: Box<str>,
    /// Confidence tier assigned to candidates from this rule.
    pub confidence: Confidence,
    /// Compiled regular expression that matches the key format.
    pub regex: Regex,
    /// Case-insensitive keywords for Aho-Corasick pre-filtering. If non-empty,
    /// the rule is only tested against content that contains at least one keyword.
    pub keywords: Box<[Box<str>]>,
    /// Lowercased keywords that must appear near a match for it to survive
    /// context validation. Empty means no context requirement.
    pub context_keywords: Box<[Box<str>]>,
    /// Minimum number of distinct `context_keywords` required in the window.
    pub min_context_matches: usize,
    /// Whether the rule is active by default. Disabled rules must be
    /// explicitly opted in via configuration.
    pub default_enabled: bool,
    /// Whether candidates from this rule can be live-verified.
    pub verifiable: bool,
}

impl Rule {
    /// Compiles a static rule definition into a runnable rule.
    pub fn from_def(def: &RuleDef) -> Result<Self, RuleError> {
        let regex = Regex::new(def.regex).map_err(|source| RuleError::InvalidRegex {
            id: def.id.to_string(),
            source,
        })?;

        Ok(Self {
            id: Arc::from(def.id),
            provider: Arc::from(def.provider),
            name: def.name.into(),
            description: def.description.into(),
            confidence: def.confidence,
            regex,
            keywords: def.keywords.iter().map(|&k| k.into()).collect(),
            context_keywords: def.context_keywords.iter().map(|k| k.to_lowercase().into()).collect(),
            min_context_matches: def.min_context_matches,
            default_enabled: def.default_enabled,
            verifiable: def.verifiable,
        })
    }
}

/// Indexed collection of [`Rule`]s with Aho-Corasick pre-filtering.
///
/// The library builds a keyword automaton at construction time so that the
/// classification pipeline can cheaply determine which rules to evaluate for
/// a given blob, and hands back the surviving rules in classification
/// priority order (confidence tier descending, registration order within a
/// tier).
pub struct RuleLibrary {
    rules: Vec<Rule>,
    keyword_automaton: Option<AhoCorasick>,
    keyword_to_rules: Vec<Vec<usize>>,
    rules_without_keywords: Vec<usize>,
}

impl fmt::Debug for RuleLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleLibrary")
            .field("rules", &self.rules.len())
            .field("rules_without_keywords", &self.rules_without_keywords.len())
            .finish_non_exhaustive()
    }
}

impl RuleLibrary {
    /// Creates a library containing all built-in provider rules.
    pub fn builtin() -> Result<Self, RuleError> {
        Ok(Self::new(Self::builtin_rules()?))
    }

    /// Compiles the built-in provider rule definitions, in registration order.
    ///
    /// Registration order matters: it breaks dedup ties within a confidence
    /// tier, and the provider set is ordered so that rules with longer
    /// literal prefixes come before rules sharing a shorter prefix.
    pub fn builtin_rules() -> Result<Vec<Rule>, RuleError> {
        let registry = keyhound_providers::ProviderRegistry::builtin();
        registry.all_rules().map(Rule::from_def).collect()
    }

    /// Creates a library from a list of rules, building the keyword index.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        let keyword_index = build_keyword_index(&rules);
        let keyword_automaton = build_automaton(&keyword_index.keywords);

        Self {
            rules,
            keyword_automaton,
            keyword_to_rules: keyword_index.keyword_to_rules,
            rules_without_keywords: keyword_index.rules_without_keywords,
        }
    }

    /// Returns all rules as a slice, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns an iterator over rules that are enabled by default.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.default_enabled)
    }

    /// Looks up a rule by its id string (e.g. `"anthropic/api-key"`).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.as_ref() == id)
    }

    /// Looks up a rule by its registration index.
    #[must_use]
    pub fn get_by_index(&self, idx: usize) -> Option<&Rule> {
        self.rules.get(idx)
    }

    /// Returns the total number of rules (both enabled and disabled).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the library contains no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selects the rules worth running against `content` and returns their
    /// registration indices in classification priority order.
    ///
    /// A rule is selected when one of its keywords occurs in `content`
    /// (case-insensitive), or unconditionally when it declares no keywords.
    /// Disabled rules are never selected. The result is ordered by
    /// confidence tier descending, ties broken by registration order, which
    /// is the order the dedup pass relies on.
    #[must_use]
    pub fn rules_for(&self, content: &str) -> Vec<usize> {
        let mut selected = vec![false; self.rules.len()];

        for &idx in &self.rules_without_keywords {
            selected[idx] = true;
        }

        if let Some(automaton) = &self.keyword_automaton {
            for mat in automaton.find_iter(content) {
                let keyword_idx = mat.pattern().as_usize();
                for &rule_idx in &self.keyword_to_rules[keyword_idx] {
                    selected[rule_idx] = true;
                }
            }
        }

        let mut indices: Vec<usize> = selected
            .iter()
            .enumerate()
            .filter_map(|(idx, &on)| on.then_some(idx))
            .collect();

        indices.sort_by(|&a, &b| {
            self.rules[b]
                .confidence
                .cmp(&self.rules[a].confidence)
                .then_with(|| a.cmp(&b))
        });

        indices
    }
}

struct KeywordIndex {
    keywords: Vec<String>,
    keyword_to_rules: Vec<Vec<usize>>,
    rules_without_keywords: Vec<usize>,
}

fn build_keyword_index(rules: &[Rule]) -> KeywordIndex {
    let mut keywords = Vec::new();
    let mut keyword_to_rules = Vec::new();
    let mut rules_without_keywords = Vec::new();
    let mut keyword_positions: HashMap<String, usize> = HashMap::new();

    for (rule_idx, rule) in rules.iter().enumerate() {
        if !rule.default_enabled {
            continue;
        }

        if rule.keywords.is_empty() {
            rules_without_keywords.push(rule_idx);
        } else {
            index_rule_keywords(
                rule_idx,
                rule,
                &mut keywords,
                &mut keyword_to_rules,
                &mut keyword_positions,
            );
        }
    }

    KeywordIndex {
        keywords,
        keyword_to_rules,
        rules_without_keywords,
    }
}

fn index_rule_keywords(
    rule_idx: usize,
    rule: &Rule,
    keywords: &mut Vec<String>,
    keyword_to_rules: &mut Vec<Vec<usize>>,
    keyword_positions: &mut HashMap<String, usize>,
) {
    for keyword in &rule.keywords {
        let keyword_str = keyword.to_string();

        if let Some(&existing_idx) = keyword_positions.get(&keyword_str) {
            keyword_to_rules[existing_idx].push(rule_idx);
        } else {
            let new_idx = keywords.len();
            keyword_positions.insert(keyword_str.clone(), new_idx);
            keywords.push(keyword_str);
            keyword_to_rules.push(vec![rule_idx]);
        }
    }
}

fn build_automaton(keywords: &[String]) -> Option<AhoCorasick> {
    if keywords.is_empty() {
        return None;
    }

    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(aho_corasick::MatchKind::LeftmostLongest)
        .build(keywords)
        .ok()
}
