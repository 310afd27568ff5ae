//! File name matching.
//!
//! # Responsibilities
//! - Decide whether a file name qualifies as a servable handler
//! - Literal rules test substring containment
//! - Pattern rules test a regex match anywhere in the name
//!
//! # Design Decisions
//! - Rules combine with OR semantics, first hit wins
//! - No rules supplied means the fallback rule `\w+_`
//! - An explicitly empty rule list matches nothing

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Rules used when the caller supplies none.
static FALLBACK_RULES: LazyLock<Vec<MatchRule>> =
    LazyLock::new(|| vec![MatchRule::Pattern(compile(r"\w+_"))]);

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern is valid")
}

/// A single match rule.
///
/// In TOML a plain string is a literal and `{ pattern = "..." }` is a regex.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawRule")]
pub enum MatchRule {
    Literal(String),
    Pattern(Regex),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRule {
    Literal(String),
    Pattern { pattern: String },
}

impl TryFrom<RawRule> for MatchRule {
    type Error = regex::Error;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        match raw {
            RawRule::Literal(s) => Ok(MatchRule::Literal(s)),
            RawRule::Pattern { pattern } => MatchRule::pattern(&pattern),
        }
    }
}

impl MatchRule {
    pub fn literal(s: impl Into<String>) -> Self {
        MatchRule::Literal(s.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(MatchRule::Pattern)
    }

    /// Returns true if the file name satisfies this rule.
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            MatchRule::Literal(s) => file_name.contains(s.as_str()),
            MatchRule::Pattern(re) => re.is_match(file_name),
        }
    }
}

/// Default rules of the root directory: `\w+_\w+`, `scookie`, `zebra`.
pub fn default_rules() -> Vec<MatchRule> {
    vec![
        MatchRule::Pattern(compile(r"\w+_\w+")),
        MatchRule::literal("scookie"),
        MatchRule::literal("zebra"),
    ]
}

/// Returns true if any rule matches `file_name`.
pub fn matches(file_name: &str, rules: Option<&[MatchRule]>) -> bool {
    rules
        .unwrap_or(FALLBACK_RULES.as_slice())
        .iter()
        .any(|rule| rule.matches(file_name))
}
