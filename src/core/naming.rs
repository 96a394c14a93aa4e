//! Part-name convention validation
//!
//! A naming rule is a positional grammar over the `_`-separated tokens of a
//! part's display name: `R_10kOhm_MF_SMD` splits into four tokens, each
//! checked by the predicate configured for its position. Rules for the
//! stock resistor and capacitor conventions are built in; arbitrary rules
//! load from a YAML file keyed by category pk.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::registry::EnumerationSource;
use crate::entities::{CategoryId, SelectionListId};

/// Selection list pks of the stock conventions
pub const RESISTOR_TYPE_LIST: SelectionListId = SelectionListId(15);
pub const DIELECTRIC_LIST: SelectionListId = SelectionListId(16);
pub const MOUNTING_LIST: SelectionListId = SelectionListId(17);

const DELIMITER: char = '_';

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid decimal pattern"))
}

/// Per-position check within a naming rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPredicate {
    /// Exact string equality
    Literal(String),

    /// Non-negative decimal followed by one of the unit suffixes
    /// (a bare number when no units are configured)
    Quantity { units: Vec<String> },

    /// Membership in a server-side selection list
    Enumeration(SelectionListId),
}

impl TokenPredicate {
    fn check(&self, token: &str, source: &dyn EnumerationSource) -> bool {
        match self {
            TokenPredicate::Literal(expected) => token == expected,
            TokenPredicate::Quantity { units } => quantity_matches(token, units),
            TokenPredicate::Enumeration(list) => {
                // An unreachable registry degrades to "no match" for this
                // position; it must never abort the surrounding batch.
                source
                    .enumeration_values(*list)
                    .map(|values| values.contains(token))
                    .unwrap_or(false)
            }
        }
    }
}

fn quantity_matches(token: &str, units: &[String]) -> bool {
    if units.is_empty() {
        return decimal_pattern().is_match(token);
    }
    units.iter().any(|unit| {
        token
            .strip_suffix(unit.as_str())
            .is_some_and(|number| decimal_pattern().is_match(number))
    })
}

/// A positional grammar for part names within one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    pub positions: Vec<TokenPredicate>,
}

impl NamingRule {
    /// Stock convention: `R_<value>Ohm_<type>_<mounting>`
    pub fn resistor() -> Self {
        Self {
            positions: vec![
                TokenPredicate::Literal("R".to_string()),
                TokenPredicate::Quantity {
                    units: ["ROhm", "kOhm", "MOhm", "mOhm"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                TokenPredicate::Enumeration(RESISTOR_TYPE_LIST),
                TokenPredicate::Enumeration(MOUNTING_LIST),
            ],
        }
    }

    /// Stock convention: `C_<value>F_<voltage>V_<dielectric>_<mounting>`
    pub fn capacitor() -> Self {
        Self {
            positions: vec![
                TokenPredicate::Literal("C".to_string()),
                TokenPredicate::Quantity {
                    units: ["uF", "mF", "pF", "nF"].iter().map(|s| s.to_string()).collect(),
                },
                TokenPredicate::Quantity {
                    units: vec!["V".to_string()],
                },
                TokenPredicate::Enumeration(DIELECTRIC_LIST),
                TokenPredicate::Enumeration(MOUNTING_LIST),
            ],
        }
    }

    /// Check a part name against this rule
    ///
    /// Missing tokens fail their position; trailing tokens beyond the rule's
    /// last position are ignored. Tokens are compared as-is, neither trimmed
    /// nor case-folded.
    pub fn check(&self, name: &str, source: &dyn EnumerationSource) -> NameVerdict {
        let tokens: Vec<&str> = name.split(DELIMITER).collect();
        let results = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, predicate)| {
                tokens
                    .get(i)
                    .is_some_and(|token| predicate.check(token, source))
            })
            .collect();
        NameVerdict { results }
    }
}

/// Per-position outcome of one name check
#[derive(Debug, Clone)]
pub struct NameVerdict {
    results: Vec<bool>,
}

impl NameVerdict {
    /// Compliant iff every position passed
    pub fn is_compliant(&self) -> bool {
        self.results.iter().all(|&passed| passed)
    }

    /// Zero-based index of the first failing position
    pub fn first_failure(&self) -> Option<usize> {
        self.results.iter().position(|&passed| !passed)
    }

    pub fn results(&self) -> &[bool] {
        &self.results
    }
}

/// Naming rules keyed by category, loadable from a YAML file
///
/// ```yaml
/// rules:
///   81:
///     positions:
///       - !literal R
///       - !quantity { units: [ROhm, kOhm, MOhm, mOhm] }
///       - !enumeration 15
///       - !enumeration 17
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: BTreeMap<CategoryId, NamingRule>,
}

impl RuleSet {
    pub fn load(path: &Path) -> Result<Self, RuleSetError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RuleSetError::Io(path.display().to_string(), e))?;
        serde_yml::from_str(&contents).map_err(|e| RuleSetError::Parse(path.display().to_string(), e))
    }

    pub fn get(&self, category: CategoryId) -> Option<&NamingRule> {
        self.rules.get(&category)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("cannot read rules file {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("cannot parse rules file {0}: {1}")]
    Parse(String, #[source] serde_yml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::MemoryRegistry;

    fn registry() -> MemoryRegistry {
        MemoryRegistry::new()
            .with_enumeration(RESISTOR_TYPE_LIST, ["MF", "CF", "WW", "MO"])
            .with_enumeration(DIELECTRIC_LIST, ["X7R", "C0G", "Y5V"])
            .with_enumeration(MOUNTING_LIST, ["SMD", "TH"])
    }

    #[test]
    fn test_compliant_resistor_name() {
        let rule = NamingRule::resistor();
        assert!(rule.check("R_10kOhm_MF_SMD", &registry()).is_compliant());
        assert!(rule.check("R_0.47ROhm_WW_TH", &registry()).is_compliant());
    }

    #[test]
    fn test_bare_unit_prefix_is_rejected() {
        // "10k" is not a value: the convention requires the full unit suffix.
        let rule = NamingRule::resistor();
        let verdict = rule.check("R_10k_MF_SMD", &registry());
        assert!(!verdict.is_compliant());
        assert_eq!(verdict.first_failure(), Some(1));
    }

    #[test]
    fn test_missing_tokens_fail_their_positions() {
        let rule = NamingRule::resistor();
        let verdict = rule.check("R_10kOhm", &registry());
        assert!(!verdict.is_compliant());
        assert_eq!(verdict.results(), &[true, true, false, false]);
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        let rule = NamingRule::resistor();
        assert!(rule
            .check("R_10kOhm_MF_SMD_0805_EXTRA", &registry())
            .is_compliant());
    }

    #[test]
    fn test_tokens_are_not_case_folded() {
        let rule = NamingRule::resistor();
        assert!(!rule.check("r_10kOhm_MF_SMD", &registry()).is_compliant());
        assert!(!rule.check("R_10kOhm_mf_SMD", &registry()).is_compliant());
    }

    #[test]
    fn test_compliant_capacitor_name() {
        let rule = NamingRule::capacitor();
        assert!(rule.check("C_10uF_63V_X7R_SMD", &registry()).is_compliant());
        assert!(rule.check("C_4.7nF_100V_C0G_TH", &registry()).is_compliant());
    }

    #[test]
    fn test_capacitor_voltage_must_be_numeric() {
        let rule = NamingRule::capacitor();
        let verdict = rule.check("C_10uF_63W_X7R_SMD", &registry());
        assert_eq!(verdict.first_failure(), Some(2));
    }

    #[test]
    fn test_registry_outage_degrades_to_noncompliant() {
        let source = MemoryRegistry::unreachable();
        let rule = NamingRule::resistor();
        let verdict = rule.check("R_10kOhm_MF_SMD", &source);
        assert!(!verdict.is_compliant());
        // Positions that do not depend on the registry still pass.
        assert_eq!(verdict.results(), &[true, true, false, false]);
    }

    #[test]
    fn test_value_not_in_enumeration_fails() {
        let rule = NamingRule::resistor();
        let verdict = rule.check("R_10kOhm_XX_SMD", &registry());
        assert_eq!(verdict.first_failure(), Some(2));
    }

    #[test]
    fn test_quantity_without_units_accepts_bare_decimal() {
        let predicate = TokenPredicate::Quantity { units: vec![] };
        let source = MemoryRegistry::new();
        assert!(predicate.check("470", &source));
        assert!(predicate.check("4.7", &source));
        assert!(!predicate.check("4.7.1", &source));
        assert!(!predicate.check("-4", &source));
    }

    #[test]
    fn test_rule_set_yaml_round_trip() {
        let mut rules = BTreeMap::new();
        rules.insert(CategoryId(81), NamingRule::resistor());
        let set = RuleSet { rules };

        let yaml = serde_yml::to_string(&set).unwrap();
        let parsed: RuleSet = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.get(CategoryId(81)), Some(&NamingRule::resistor()));
        assert!(parsed.get(CategoryId(82)).is_none());
    }
}
