use crate::scoring::RuleSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rule set used when neither the command line nor the tournament names one
    #[serde(default)]
    pub rule_set: Option<String>,

    /// Custom rule sets; a custom set shadows a built-in one of the same name
    #[serde(default)]
    pub rule_sets: Vec<RuleSet>,
}
