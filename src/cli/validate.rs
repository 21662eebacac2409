//! Validate, tokens and scan command handlers

use super::write_output;
use crate::config::{load_config_file, load_validation_config, ValidationConfig};
use crate::models::{sort_findings, Finding, FindingsSummary, Severity};
use crate::package::{load_package, LoadOptions, Package, PriorityTier};
use crate::pipeline::{
    batch_exit_code, ConfigOverrides, ErrorResponse, ValidationRequest, ValidationResponse,
    Validator, EXIT_FAIL, EXIT_LOAD_ERROR, EXIT_PASS,
};
use crate::reporters::{self, OutputFormat};
use crate::security::scan_package;
use crate::tokens::estimate_package;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub struct ValidateArgs {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    pub volume: Option<u64>,
    pub fail_under: Option<f64>,
    pub priorities: BTreeMap<String, PriorityTier>,
    pub output: Option<PathBuf>,
}

/// Explicit `--config` file, read once and shared by every package.
fn explicit_config(path: Option<&Path>) -> Result<Option<ValidationConfig>> {
    path.map(|p| load_config_file(p).with_context(|| format!("Invalid config {}", p.display())))
        .transpose()
}

/// A directory `--output` gets `<stem>-report.<ext>` inside it.
fn output_path(output: &Path, format: OutputFormat, stem: &str) -> PathBuf {
    if output.is_dir() {
        output.join(format!("{}-report.{}", stem, reporters::file_extension(format)))
    } else {
        output.to_path_buf()
    }
}

fn create_progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=>-"));
    bar.set_message("validating");
    bar
}

pub fn run(args: ValidateArgs) -> Result<i32> {
    let start = Instant::now();
    let config = explicit_config(args.config.as_deref())?;
    let overrides = ConfigOverrides {
        monthly_volume: args.volume,
        pass_threshold: args.fail_under,
        priorities: args.priorities,
    };

    let requests: Vec<ValidationRequest> = args
        .paths
        .iter()
        .map(|path| {
            let request = ValidationRequest::new(path).with_overrides(overrides.clone());
            match &config {
                Some(config) => request.with_config(config.clone()),
                None => request,
            }
        })
        .collect();

    let validator = Validator::new();

    let (rendered, exit_code, stem) = if let [request] = requests.as_slice() {
        let response = validator.validate(request);
        let stem = response
            .report()
            .map_or_else(|| "skillcheck".to_string(), |r| r.package_name.clone());
        (
            reporters::report_with_format(&response, args.format)?,
            response.exit_code(),
            stem,
        )
    } else {
        let show_progress =
            args.format == OutputFormat::Text && console::Term::stderr().is_term();
        let bar = show_progress.then(|| create_progress_bar(requests.len()));
        let responses = validator.validate_batch_with(&requests, |_| {
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        });
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        (
            reporters::report_batch(&responses, args.format)?,
            batch_exit_code(&responses),
            "skillcheck".to_string(),
        )
    };

    let output = args
        .output
        .as_deref()
        .map(|path| output_path(path, args.format, &stem));
    write_output(&rendered, output.as_deref())?;
    if let Some(path) = &output {
        eprintln!(
            "{} Report written to {}",
            console::style("✓").green(),
            console::style(path.display()).cyan()
        );
    }

    info!(
        "Validated {} package(s) in {:.2}s",
        requests.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(exit_code)
}

/// Resolve config and load the package, or print the error response.
fn load_for_command(
    path: &Path,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<std::result::Result<(Package, ValidationConfig), i32>> {
    let config = match explicit_config(config)? {
        Some(config) => config,
        None => load_validation_config(path),
    };
    let options = LoadOptions {
        priority_overrides: config.budget.priorities.clone(),
    };
    match load_package(path, &options) {
        Ok(package) => Ok(Ok((package, config))),
        Err(err) => {
            let response = ValidationResponse::Error(ErrorResponse::from(&err));
            write_output(&reporters::report_with_format(&response, format)?, None)?;
            Ok(Err(EXIT_LOAD_ERROR))
        }
    }
}

pub fn run_tokens(
    path: &Path,
    volume: Option<u64>,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<i32> {
    let (package, mut config) = match load_for_command(path, config, format)? {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };
    if let Some(volume) = volume {
        config.tokens.monthly_volume = volume;
    }
    let tokens = estimate_package(&package, &config.tokens);
    write_output(
        &reporters::tokens_report(&package.name, &tokens, format)?,
        None,
    )?;
    Ok(EXIT_PASS)
}

/// Security findings at or above `min_severity`, worst first.
pub(crate) fn filter_findings(mut findings: Vec<Finding>, min_severity: Option<Severity>) -> Vec<Finding> {
    if let Some(min) = min_severity {
        findings.retain(|f| f.severity >= min);
    }
    sort_findings(&mut findings);
    findings
}

pub fn run_scan(
    path: &Path,
    min_severity: Option<Severity>,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<i32> {
    let (package, config) = match load_for_command(path, config, format)? {
        Ok(loaded) => loaded,
        Err(code) => return Ok(code),
    };
    let report = scan_package(&package, &config.security);
    info!(
        "Scanned {} files ({} lines)",
        report.files_scanned, report.lines_scanned
    );
    let findings = filter_findings(report.findings, min_severity);
    write_output(
        &reporters::findings_report(&package.name, &findings, format)?,
        None,
    )?;
    Ok(if FindingsSummary::from_findings(&findings).has_blocking() {
        EXIT_FAIL
    } else {
        EXIT_PASS
    })
}
