//! CLI command definitions and handlers

mod init;
mod validate;

use crate::package::PriorityTier;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a `path=tier` priority override
fn parse_priority(s: &str) -> Result<(String, PriorityTier), String> {
    let (path, tier) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not in path=tier form", s))?;
    let path = path.trim().trim_start_matches("./");
    if path.is_empty() {
        return Err(format!("'{}' has an empty path", s));
    }
    let tier = tier.parse::<PriorityTier>().map_err(|e| e.to_string())?;
    Ok((path.to_string(), tier))
}

/// skillcheck - static validator and quality scorer for capability packages
///
/// Checks a SKILL.md package for broken references, orphaned files, token
/// cost, security-sensitive patterns and content budgets, then scores it.
#[derive(Parser, Debug)]
#[command(name = "skillcheck")]
#[command(
    version,
    about = "Validate and score capability packages (SKILL.md + scripts/ + references/)",
    long_about = "skillcheck loads a capability package, checks every cross-reference, \
estimates its token cost under progressive disclosure, scans scripts and code \
examples for security-sensitive patterns, enforces per-file budgets, and combines \
all findings into a 100-point quality score.\n\n\
Packages are read, never executed or modified.",
    after_help = "\
Examples:
  skillcheck validate ./my-skill                   Full report
  skillcheck validate ./skills/* --format json     Batch mode, JSON array
  skillcheck validate . --fail-under 80            Stricter CI gate
  skillcheck tokens ./my-skill --volume 5000       Cost projection
  skillcheck scan ./my-skill --severity high       Security findings only
  skillcheck init --output skillcheck.toml         Write a default config

Exit codes: 0 pass, 1 findings or score below threshold, 2 load failure"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: one per CPU)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and score one or more packages
    #[command(after_help = "\
Examples:
  skillcheck validate ./my-skill
  skillcheck validate ./a ./b --format json -o report.json
  skillcheck validate . --priority references/api.md=critical")]
    Validate {
        /// Package directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Config file (default: skillcheck.toml or .skillcheckrc.json in each package)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Monthly invocation volume for cost projection
        #[arg(long)]
        volume: Option<u64>,

        /// Minimum passing score
        #[arg(long)]
        fail_under: Option<f64>,

        /// Priority tier override, repeatable (path=critical|important|optional)
        #[arg(long, value_parser = parse_priority)]
        priority: Vec<(String, PriorityTier)>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show token tiers, scenario costs and recommendations
    Tokens {
        /// Package directory
        path: PathBuf,

        /// Monthly invocation volume for cost projection
        #[arg(long)]
        volume: Option<u64>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Config file (default: discovered in the package)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Run the security scanner only
    Scan {
        /// Package directory
        path: PathBuf,

        /// Minimum severity to report (critical, high, medium, low, info)
        #[arg(long, value_parser = ["critical", "high", "medium", "low", "info"])]
        severity: Option<String>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Config file (default: discovered in the package)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Print a commented default skillcheck.toml
    Init {
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },
}

/// Size the global rayon pool before any parallel work starts.
fn configure_workers(workers: Option<usize>) {
    let Some(n) = workers else {
        return;
    };
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        warn!("Could not size worker pool to {}: {}", n, e);
    }
}

/// Write rendered output to a file, or stdout when no file is given.
pub(crate) fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    use anyhow::Context;
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// Run the CLI. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    configure_workers(cli.workers);

    match cli.command {
        Commands::Validate {
            paths,
            format,
            config,
            volume,
            fail_under,
            priority,
            output,
        } => validate::run(validate::ValidateArgs {
            paths,
            format: format.parse()?,
            config,
            volume,
            fail_under,
            priorities: priority.into_iter().collect(),
            output,
        }),

        Commands::Tokens {
            path,
            volume,
            format,
            config,
        } => validate::run_tokens(&path, volume, format.parse()?, config.as_deref()),

        Commands::Scan {
            path,
            severity,
            format,
            config,
        } => {
            let min_severity = severity
                .as_deref()
                .map(str::parse::<crate::models::Severity>)
                .transpose()?;
            validate::run_scan(&path, min_severity, format.parse()?, config.as_deref())
        }

        Commands::Init { output, force } => init::run(output.as_deref(), force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(
            parse_priority("./references/api.md=critical").unwrap(),
            ("references/api.md".to_string(), PriorityTier::Critical)
        );
        assert!(parse_priority("references/api.md").is_err());
        assert!(parse_priority("=optional").is_err());
        assert!(parse_priority("a.md=urgent").is_err());
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4").unwrap(), 4);
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
    }

    #[test]
    fn test_validate_args_parse() {
        let cli = Cli::try_parse_from([
            "skillcheck",
            "validate",
            "a",
            "b",
            "--format",
            "json",
            "--priority",
            "scripts/x.py=important",
            "--fail-under",
            "80",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate {
                paths,
                format,
                priority,
                fail_under,
                ..
            } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(format, "json");
                assert_eq!(priority[0].1, PriorityTier::Important);
                assert_eq!(fail_under, Some(80.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.log_level, "warn");
    }
}
