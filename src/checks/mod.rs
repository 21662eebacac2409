//! Rule-based manifest checks
//!
//! This module defines:
//! - `Check` trait that every manifest check implements
//! - `CheckEngine`, which runs registered checks in parallel
//! - the default check set (structure, content and style rules)

mod content;
mod manifest;
mod style;

pub use content::{
    DescriptionLengthCheck, EmptyBodyCheck, HeadingDensityCheck, LongBodyCheck, MissingExampleCheck,
    ReferenceTocCheck, TriggerPhraseCheck,
};
pub use manifest::{BodyWithoutReferencesCheck, NameFormatCheck, RequiredFieldsCheck, RootScriptsCheck};
pub use style::WeakPhraseCheck;

use crate::config::ValidationConfig;
use crate::models::{Finding, FindingCategory};
use crate::package::Package;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Everything a check may look at.
pub struct CheckContext<'a> {
    pub package: &'a Package,
    pub config: &'a ValidationConfig,
}

/// A single manifest rule.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct MyCheck;
///
/// impl Check for MyCheck {
///     fn name(&self) -> &'static str {
///         "my-check"
///     }
///
///     fn description(&self) -> &'static str {
///         "Flags my specific manifest problem"
///     }
///
///     fn category(&self) -> FindingCategory {
///         FindingCategory::Content
///     }
///
///     fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
///         vec![]
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Unique identifier, also used as the finding rule id
    fn name(&self) -> &'static str;

    /// Human-readable description of what this check finds
    fn description(&self) -> &'static str;

    /// Category every finding of this check belongs to
    fn category(&self) -> FindingCategory;

    /// Run the check. Content problems are findings, never errors.
    fn run(&self, ctx: &CheckContext) -> Vec<Finding>;
}

/// Runs registered checks over one package
#[derive(Default)]
pub struct CheckEngine {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with every built-in check registered
    pub fn with_default_checks() -> Self {
        let mut engine = Self::new();
        engine.register_all(default_checks());
        engine
    }

    pub fn register(&mut self, check: Arc<dyn Check>) {
        debug!("Registering check: {}", check.name());
        self.checks.push(check);
    }

    pub fn register_all(&mut self, checks: impl IntoIterator<Item = Arc<dyn Check>>) {
        for check in checks {
            self.register(check);
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run all checks and collect findings in registration order.
    pub fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        debug!(
            "Running {} checks: {}",
            self.check_count(),
            self.check_names().join(", ")
        );
        let results: Vec<Vec<Finding>> = self
            .checks
            .par_iter()
            .map(|check| {
                let findings = check.run(ctx);
                debug!("Check {} produced {} findings", check.name(), findings.len());
                findings
            })
            .collect();

        results.into_iter().flatten().collect()
    }
}

/// All built-in checks
pub fn default_checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(RequiredFieldsCheck),
        Arc::new(NameFormatCheck),
        Arc::new(RootScriptsCheck),
        Arc::new(BodyWithoutReferencesCheck),
        Arc::new(DescriptionLengthCheck),
        Arc::new(TriggerPhraseCheck),
        Arc::new(HeadingDensityCheck),
        Arc::new(MissingExampleCheck),
        Arc::new(LongBodyCheck),
        Arc::new(ReferenceTocCheck),
        Arc::new(EmptyBodyCheck),
        Arc::new(WeakPhraseCheck),
    ]
}

/// Finding builder shared by the checks.
pub(crate) fn check_finding(
    check: &dyn Check,
    severity: crate::models::Severity,
    message: impl Into<String>,
) -> Finding {
    Finding::new(check.name(), check.category(), severity, message)
}
