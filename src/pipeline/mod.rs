//! Validation pipeline
//!
//! Orchestrates one validation run:
//! 1. Load the package (fatal on failure)
//! 2. Run the reference validator, token estimator, security scanner,
//!    budget tracker and manifest checks concurrently
//! 3. Sort findings and score them
//! 4. Assemble the response object
//!
//! Every run builds its model fresh; nothing is cached between runs.

use crate::budget::{track_budgets, BudgetResult};
use crate::checks::{CheckContext, CheckEngine};
use crate::config::{load_validation_config, ValidationConfig};
use crate::error::LoadError;
use crate::models::{sort_findings, Finding, FindingsSummary};
use crate::package::{load_package, LoadOptions, PriorityTier};
use crate::references::validate_references;
use crate::scoring::{QualityReport, QualityScorer};
use crate::security::scan_package;
use crate::tokens::{estimate_package, TokenReport};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Process exit code: report produced, pass thresholds met
pub const EXIT_PASS: i32 = 0;
/// Report produced, but a high-or-worse finding or a score under threshold
pub const EXIT_FAIL: i32 = 1;
/// The package could not be loaded
pub const EXIT_LOAD_ERROR: i32 = 2;

/// Caller overrides layered on top of the package's config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub monthly_volume: Option<u64>,
    pub pass_threshold: Option<f64>,
    pub priorities: BTreeMap<String, PriorityTier>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: ValidationConfig) -> ValidationConfig {
        if let Some(volume) = self.monthly_volume {
            config.tokens.monthly_volume = volume;
        }
        if let Some(threshold) = self.pass_threshold {
            config.scoring.pass_threshold = threshold;
        }
        config.budget.priorities.extend(
            self.priorities
                .iter()
                .map(|(path, tier)| (path.clone(), *tier)),
        );
        config
    }
}

/// One package to validate.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub root: PathBuf,
    /// `None` discovers `skillcheck.toml` / `.skillcheckrc.json` in the package root
    pub config: Option<ValidationConfig>,
    pub overrides: ConfigOverrides,
}

impl ValidationRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Effective config for this run, checked and with weights normalised.
    pub fn resolve_config(&self) -> anyhow::Result<ValidationConfig> {
        let base = match &self.config {
            Some(config) => config.clone(),
            None => load_validation_config(&self.root),
        };
        self.overrides.apply(base).prepare()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub edges: usize,
    pub broken: usize,
    pub orphans: Vec<String>,
    pub entrypoints: Vec<String>,
}

/// Full result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub package_name: String,
    pub findings: Vec<Finding>,
    pub summary: FindingsSummary,
    pub token_estimate: TokenReport,
    pub budget: Vec<BudgetResult>,
    pub references: ReferenceSummary,
    pub score: QualityReport,
    pub exit_code: i32,
}

/// Fatal load failure. Carries no partial results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
}

impl ErrorResponse {
    /// A config that fails its invariants is as fatal as a missing package.
    pub fn config(err: &anyhow::Error) -> Self {
        Self {
            error_type: "ConfigError".to_string(),
            message: format!("{:#}", err),
        }
    }
}

impl From<&LoadError> for ErrorResponse {
    fn from(err: &LoadError) -> Self {
        Self {
            error_type: err.error_type().to_string(),
            message: err.to_string(),
        }
    }
}

/// Response object handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResponse {
    Success(Box<ValidationReport>),
    Error(ErrorResponse),
}

impl ValidationResponse {
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidationResponse::Success(report) => report.exit_code,
            ValidationResponse::Error(_) => EXIT_LOAD_ERROR,
        }
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ValidationResponse::Success(report) => Some(report.as_ref()),
            ValidationResponse::Error(_) => None,
        }
    }
}

/// Runs validations with one check set.
pub struct Validator {
    engine: CheckEngine,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            engine: CheckEngine::with_default_checks(),
        }
    }

    /// Replace the manifest check set.
    pub fn with_engine(mut self, engine: CheckEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Validate one package.
    pub fn validate(&self, request: &ValidationRequest) -> ValidationResponse {
        let config = match request.resolve_config() {
            Ok(config) => config,
            Err(err) => {
                warn!("Invalid config for {}: {:#}", request.root.display(), err);
                return ValidationResponse::Error(ErrorResponse::config(&err));
            }
        };
        match self.run(&request.root, &config) {
            Ok(report) => ValidationResponse::Success(Box::new(report)),
            Err(err) => {
                debug!("Load failed for {}: {}", request.root.display(), err);
                ValidationResponse::Error(ErrorResponse::from(&err))
            }
        }
    }

    /// Validate many packages in parallel. Results keep input order.
    pub fn validate_batch(&self, requests: &[ValidationRequest]) -> Vec<ValidationResponse> {
        self.validate_batch_with(requests, |_| {})
    }

    /// Like [`Self::validate_batch`], calling `on_done` as each package finishes.
    pub fn validate_batch_with<F>(&self, requests: &[ValidationRequest], on_done: F) -> Vec<ValidationResponse>
    where
        F: Fn(&ValidationResponse) + Sync,
    {
        info!("Validating {} packages", requests.len());
        requests
            .par_iter()
            .map(|request| {
                let response = self.validate(request);
                on_done(&response);
                response
            })
            .collect()
    }

    /// Load, analyze and score. Only loading can fail.
    pub fn run(&self, root: &Path, config: &ValidationConfig) -> Result<ValidationReport, LoadError> {
        info!("Validating package at {}", root.display());
        let options = LoadOptions {
            priority_overrides: config.budget.priorities.clone(),
        };
        let package = load_package(root, &options)?;

        let ctx = CheckContext {
            package: &package,
            config,
        };
        let ((references, tokens), (security, (budget, checks))) = rayon::join(
            || {
                rayon::join(
                    || validate_references(&package, &config.references),
                    || estimate_package(&package, &config.tokens),
                )
            },
            || {
                rayon::join(
                    || scan_package(&package, &config.security),
                    || rayon::join(|| track_budgets(&package, &config.budget), || self.engine.run(&ctx)),
                )
            },
        );

        let reference_summary = ReferenceSummary {
            edges: references.edges.len(),
            broken: references.edges.iter().filter(|e| e.is_broken()).count(),
            orphans: references.orphans,
            entrypoints: references.entrypoints,
        };

        let mut findings: Vec<Finding> = references
            .findings
            .into_iter()
            .chain(security.findings)
            .chain(budget.findings)
            .chain(checks)
            .collect();
        sort_findings(&mut findings);

        let score = QualityScorer::new(config).calculate(&package, &findings);
        let summary = FindingsSummary::from_findings(&findings);
        let exit_code = if score.passed { EXIT_PASS } else { EXIT_FAIL };

        info!(
            "Validated '{}': {} findings, score {:.2} ({})",
            package.name,
            findings.len(),
            score.total,
            score.grade
        );

        Ok(ValidationReport {
            package_name: package.name.clone(),
            findings,
            summary,
            token_estimate: tokens,
            budget: budget.results,
            references: reference_summary,
            score,
            exit_code,
        })
    }
}

/// Validate one package with default checks.
pub fn validate(request: &ValidationRequest) -> ValidationResponse {
    Validator::new().validate(request)
}

/// Worst exit code across a batch.
pub fn batch_exit_code(responses: &[ValidationResponse]) -> i32 {
    responses
        .iter()
        .map(ValidationResponse::exit_code)
        .max()
        .unwrap_or(EXIT_PASS)
}
