//! Hardening checks
//!
//! Substring rules evaluated against the retrieved running configuration.
//! Evaluation is pure; printing is left to the caller.

pub mod rules;

pub use rules::{default_rules, HardeningRule, HardeningTemplate};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl CheckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckOutcome::Pass => "PASS",
            CheckOutcome::Fail => "FAIL",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub name: String,
    pub pattern: String,
    pub outcome: CheckOutcome,
}

impl RuleResult {
    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Pass
    }

    /// `[PASS] name` / `[FAIL] name`
    pub fn report_line(&self) -> String {
        format!("[{}] {}", self.outcome, self.name)
    }
}

/// Evaluate every rule against `config_text`, preserving rule order
pub fn check_hardening(config_text: &str, rules: &[HardeningRule]) -> Vec<RuleResult> {
    rules
        .iter()
        .map(|rule| RuleResult {
            name: rule.name.clone(),
            pattern: rule.pattern.clone(),
            outcome: if rule.is_satisfied_by(config_text) {
                CheckOutcome::Pass
            } else {
                CheckOutcome::Fail
            },
        })
        .collect()
}
