use clap::{Parser, Subcommand, ValueEnum};
use stage_tally::config::Config;
use stage_tally::scoring::RuleSet;
use stage_tally::standings::Tournament;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank a tournament's entries (per category unless --category is given)
    Standings {
        /// Tournament JSON file
        file: PathBuf,

        /// Only rank this category
        #[arg(long)]
        category: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show how each stage score of one competitor was reached
    Breakdown {
        /// Tournament JSON file
        file: PathBuf,

        /// Competitor name or entry id
        competitor: String,
    },
    /// Print the effective rule set as YAML
    Rules,
}

#[derive(Parser, Debug)]
#[command(name = "stage-tally")]
#[command(about = "Score and rank multi-stage judged competitions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/stage-tally/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Rule set to score with (overrides tournament and config)
    #[arg(short, long, global = true)]
    rules: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_tournament_or_exit(file: &Path) -> Tournament {
    match stage_tally::standings::load_tournament(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

/// Pick the rule set (CLI, then tournament, then config) and validate it.
fn resolve_rules_or_exit(
    config: &Config,
    cli_rules: Option<&str>,
    tournament_rules: Option<&str>,
    verbose: bool,
) -> RuleSet {
    let rules = match stage_tally::config::resolve_rule_set(config, cli_rules, tournament_rules) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = stage_tally::scoring::validate_rules(&rules) {
        eprintln!("Rule set errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if verbose {
        eprintln!("Scoring with rule set '{}'", rules.name);
    }
    rules
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match stage_tally::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!("Loaded {} custom rule sets from config", config.rule_sets.len());
    }

    let cli_rules = cli.rules.as_deref();
    let use_colors = stage_tally::output::should_use_colors();

    match cli.command {
        Commands::Standings {
            file,
            category,
            format,
            output,
        } => {
            // Tournament first: it may name its own rule set
            let tournament = load_tournament_or_exit(&file);
            let rules = resolve_rules_or_exit(
                &config,
                cli_rules,
                tournament.rule_set.as_deref(),
                cli.verbose,
            );

            let stages = tournament.number_of_stages;
            let groups = match &category {
                Some(c) => {
                    let entries = stage_tally::standings::filter_category(&tournament.entries, c);
                    let standings = stage_tally::standings::rank(&entries, stages, &rules);
                    vec![(c.trim().to_string(), standings)]
                }
                None => {
                    stage_tally::standings::rank_by_category(&tournament.entries, stages, &rules)
                        .into_iter()
                        .collect()
                }
            };

            if cli.verbose {
                let ranked: usize = groups.iter().map(|(_, s)| s.len()).sum();
                eprintln!(
                    "Ranked {} entries in {} categories over {} stages",
                    ranked,
                    groups.len(),
                    stages
                );
            }

            // Colors only make sense on a terminal
            let colored = use_colors && output.is_none();
            let rendered = match format {
                Format::Table => groups
                    .iter()
                    .map(|(name, standings)| {
                        format!(
                            "{}\n{}",
                            name,
                            stage_tally::output::format_standings_table(
                                standings,
                                rules.precision,
                                colored
                            )
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                Format::Tsv => groups
                    .iter()
                    .map(|(_, standings)| {
                        stage_tally::output::format_tsv(standings, rules.precision)
                    })
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
                Format::Json => {
                    let all: Vec<_> = groups.into_iter().flat_map(|(_, s)| s).collect();
                    match stage_tally::output::format_json(&all) {
                        Ok(json) => json,
                        Err(e) => {
                            eprintln!("Output error: {:#}", e);
                            std::process::exit(EXIT_INPUT);
                        }
                    }
                }
            };

            match output {
                Some(path) => {
                    if let Err(e) = stage_tally::standings::write_output(&path, &rendered) {
                        eprintln!("Output error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                    if cli.verbose {
                        eprintln!("Wrote {}", path.display());
                    }
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Breakdown { file, competitor } => {
            let tournament = load_tournament_or_exit(&file);
            let rules = resolve_rules_or_exit(
                &config,
                cli_rules,
                tournament.rule_set.as_deref(),
                cli.verbose,
            );

            let wanted = competitor.trim();
            let entry = tournament.entries.iter().find(|e| {
                e.id.as_deref() == Some(wanted) || e.competitor.trim().eq_ignore_ascii_case(wanted)
            });
            let Some(entry) = entry else {
                eprintln!("No entry named '{}' in {}", wanted, tournament.name);
                std::process::exit(EXIT_INPUT);
            };

            println!(
                "{}",
                stage_tally::output::format_breakdown(
                    &entry.competitor,
                    &entry.stage_breakdowns(&rules),
                    rules.precision,
                    use_colors
                )
            );

            let notes = entry.effective_notes(&rules);
            let summary = rules.summary(&notes, tournament.number_of_stages);
            println!(
                "  Total: {}",
                stage_tally::output::format_score(summary.total_score, rules.precision)
            );
        }
        Commands::Rules => {
            let rules = resolve_rules_or_exit(&config, cli_rules, None, cli.verbose);
            match serde_saphyr::to_string(&rules) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => {
                    eprintln!("Failed to render rule set: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
    }

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}
