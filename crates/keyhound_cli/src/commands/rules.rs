//! Rules command - lists available detection rules.

use std::collections::HashMap;

use console::style;
use keyhound_core::prelude::*;

use crate::ui::{colors, confidence_style, print_command_header, truncate_with_ellipsis};

const NAME_TRUNCATE_WIDTH: usize = 35;

const TIER_ORDER: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

/// Lists built-in detection rules, optionally filtered by provider or tier.
pub fn run(provider_filter: Option<&str>, tier_filter: Option<Confidence>, verbose: bool) -> super::Result {
    print_command_header("rules");

    let library = RuleLibrary::builtin()?;
    let rules = filter_rules(library.rules(), provider_filter, tier_filter);

    if rules.is_empty() {
        print_no_matches(provider_filter, tier_filter);
        return Ok(());
    }

    print_count(rules.len());

    if verbose {
        print_verbose(&rules);
    } else {
        print_table(&rules);
    }

    Ok(())
}

fn filter_rules<'a>(rules: &'a [Rule], provider: Option<&str>, tier: Option<Confidence>) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|r| matches_provider(r, provider) && matches_tier(r, tier))
        .collect()
}

fn matches_provider(rule: &Rule, filter: Option<&str>) -> bool {
    filter.is_none_or(|p| rule.provider.as_ref().eq_ignore_ascii_case(p))
}

fn matches_tier(rule: &Rule, filter: Option<Confidence>) -> bool {
    filter.is_none_or(|t| rule.confidence == t)
}

fn print_count(count: usize) {
    println!("{}", colors::muted().apply_to(format!("{count} rules")));
}

fn print_no_matches(provider: Option<&str>, tier: Option<Confidence>) {
    let mut filters = Vec::new();
    if let Some(p) = provider {
        filters.push(format!("--provider {p}"));
    }
    if let Some(t) = tier {
        filters.push(format!("--tier {t}"));
    }

    if filters.is_empty() {
        println!(
            "{} {}",
            colors::muted().apply_to("○"),
            colors::secondary().apply_to("no rules")
        );
    } else {
        println!(
            "{} {} {}",
            colors::muted().apply_to("○"),
            colors::secondary().apply_to("no rules match"),
            colors::emphasis().apply_to(filters.join(" "))
        );
    }
}

fn print_table(rules: &[&Rule]) {
    let grouped = group_by_tier(rules);

    for tier in TIER_ORDER {
        if let Some(tier_rules) = grouped.get(&tier) {
            print_tier_section(tier, tier_rules);
        }
    }
}

fn group_by_tier<'a>(rules: &[&'a Rule]) -> HashMap<Confidence, Vec<&'a Rule>> {
    let mut result: HashMap<Confidence, Vec<&Rule>> = HashMap::new();

    for rule in rules {
        result.entry(rule.confidence).or_default().push(rule);
    }

    result
}

fn print_tier_section(tier: Confidence, rules: &[&Rule]) {
    let tier_style = confidence_style(tier);

    println!();
    println!(
        "{} {}",
        tier_style.apply_to(tier.to_string()),
        colors::muted().apply_to(format!("({})", rules.len()))
    );

    for rule in rules {
        print_rule_row(rule);
    }
}

fn print_rule_row(rule: &Rule) {
    let verified_marker = if rule.verifiable {
        colors::success().apply_to("●").to_string()
    } else {
        colors::muted().apply_to("○").to_string()
    };

    println!(
        "  {} {}  {}",
        verified_marker,
        colors::accent().apply_to(&rule.id),
        colors::secondary().apply_to(truncate_with_ellipsis(&rule.name, NAME_TRUNCATE_WIDTH))
    );
}

fn print_verbose(rules: &[&Rule]) {
    for rule in rules {
        print_rule_detail(rule);
    }
}

fn print_rule_detail(rule: &Rule) {
    let tier_style = confidence_style(rule.confidence);

    println!();
    println!(
        "{} {} {} {}",
        style(rule.id.as_ref()).bold(),
        colors::muted().apply_to("·"),
        tier_style.apply_to(rule.confidence.to_string()),
        if rule.verifiable {
            colors::success().apply_to("· verifiable").to_string()
        } else {
            String::new()
        }
    );

    println!("  {}", colors::secondary().apply_to(rule.description.as_ref()));
    println!(
        "  {} {}",
        colors::muted().apply_to("regex"),
        colors::emphasis().apply_to(rule.regex.as_str())
    );

    if !rule.context_keywords.is_empty() {
        let keywords: Vec<&str> = rule.context_keywords.iter().map(AsRef::as_ref).collect();
        println!(
            "  {} {} {}",
            colors::muted().apply_to("context"),
            colors::emphasis().apply_to(keywords.join(", ")),
            colors::muted().apply_to(format!("(min {})", rule.min_context_matches))
        );
    }
}
