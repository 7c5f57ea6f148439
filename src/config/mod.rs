mod schema;

pub use schema::Config;

use crate::scoring::{RuleSet, BRASILIA};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/stage-tally/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("stage-tally"))
}

/// Get the default config file path (~/.config/stage-tally/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/stage-tally/config.yaml) and falls back to built-in defaults
///   when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| {
            format!(
                "Failed to parse config: invalid YAML in {}",
                config_path.display()
            )
        })
}

/// Parse configuration from YAML text.
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_saphyr::from_str(content)?;
    Ok(config)
}

/// Pick the rule set to score with.
///
/// Precedence: command line, tournament file, config file, built-in default.
/// Custom rule sets in the config shadow built-ins with the same name.
pub fn resolve_rule_set(
    config: &Config,
    cli_choice: Option<&str>,
    tournament_choice: Option<&str>,
) -> Result<RuleSet> {
    let name = cli_choice
        .or(tournament_choice)
        .or(config.rule_set.as_deref())
        .unwrap_or(BRASILIA)
        .trim();

    if let Some(custom) = config
        .rule_sets
        .iter()
        .find(|r| r.name.trim().eq_ignore_ascii_case(name))
    {
        return Ok(custom.clone());
    }

    RuleSet::builtin(name).with_context(|| {
        let mut known: Vec<String> = config.rule_sets.iter().map(|r| r.name.clone()).collect();
        known.push(BRASILIA.to_string());
        format!("Unknown rule set '{}'. Known rule sets: {}", name, known.join(", "))
    })
}
