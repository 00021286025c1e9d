//! Filter rules: ordered (pattern, action) records applied to the symbol
//! table by one dispatcher.
//!
//! Patterns are regular expressions matched against the full qualified name
//! of every symbol; a pattern must cover the entire name to fire. Rule
//! effects are monotonic within a run: nothing here ever reverts a flag set
//! by an earlier rule.

use std::fmt;

use regex::Regex;

use crate::symbols::{Namespace, SymbolKind};

/// What a matching rule does to a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Clear the symbol's `generate` flag.
    Ignore,
    /// Set `is_final` on method symbols; a no-op for every other kind.
    NoCallback,
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAction::Ignore => write!(f, "ignore"),
            FilterAction::NoCallback => write!(f, "no-callback"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// A compiled (pattern, action) record.
#[derive(Debug, Clone)]
pub struct FilterRule {
    pattern: String,
    action: FilterAction,
    regex: Regex,
}

impl FilterRule {
    /// Compile a rule, anchoring the pattern so it must match the entire
    /// qualified name. Compilation failure names the offending pattern.
    pub fn new(pattern: &str, action: FilterAction) -> Result<Self, FilterError> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            action,
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn action(&self) -> FilterAction {
        self.action
    }

    pub fn is_match(&self, full_name: &str) -> bool {
        self.regex.is_match(full_name)
    }
}

/// Compile ignore rules followed by no-callback rules, preserving the
/// caller-declared group order.
pub fn compile_rules(
    ignore: &[String],
    no_callback: &[String],
) -> Result<Vec<FilterRule>, FilterError> {
    let mut rules = Vec::with_capacity(ignore.len() + no_callback.len());
    for pattern in ignore {
        rules.push(FilterRule::new(pattern, FilterAction::Ignore)?);
    }
    for pattern in no_callback {
        rules.push(FilterRule::new(pattern, FilterAction::NoCallback)?);
    }
    Ok(rules)
}

/// Match count for one applied rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatches {
    pub pattern: String,
    pub action: FilterAction,
    pub matched: usize,
}

/// Apply every rule, in order, to every symbol in the table.
pub fn apply_rules(namespace: &mut Namespace, rules: &[FilterRule]) -> Vec<RuleMatches> {
    rules
        .iter()
        .map(|rule| {
            let mut matched = 0;
            namespace.visit_symbols_mut(&mut |symbol| {
                if !rule.is_match(&symbol.full_name) {
                    return;
                }
                matched += 1;
                match rule.action {
                    FilterAction::Ignore => symbol.generate = false,
                    FilterAction::NoCallback => {
                        if let SymbolKind::Method { is_final, .. } = &mut symbol.kind {
                            *is_final = true;
                        }
                    }
                }
            });
            tracing::debug!(
                pattern = %rule.pattern,
                action = %rule.action,
                matched,
                "filter rule applied"
            );
            RuleMatches {
                pattern: rule.pattern.clone(),
                action: rule.action,
                matched,
            }
        })
        .collect()
}
