//! skillcheck - static validator and quality scorer for capability packages
//!
//! A capability package is a directory with a `SKILL.md` manifest (YAML
//! front matter plus a Markdown body) and optional `scripts/`, `references/`
//! and `assets/` directories. Validation loads the package once, runs the
//! analyzers over the immutable model, and scores the merged findings.
//!
//! ```no_run
//! use skillcheck::{validate, ValidationRequest};
//!
//! let response = validate(&ValidationRequest::new("./my-skill"));
//! std::process::exit(response.exit_code());
//! ```

pub mod budget;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod package;
pub mod pipeline;
pub mod references;
pub mod reporters;
pub mod scoring;
pub mod security;
pub mod tokens;

pub use error::LoadError;
pub use models::{Finding, FindingCategory, Severity};
pub use pipeline::{
    validate, ConfigOverrides, ValidationReport, ValidationRequest, ValidationResponse, Validator,
};
