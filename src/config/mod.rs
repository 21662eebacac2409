//! Configuration module for skillcheck
//!
//! This module handles:
//! - Package-level configuration (skillcheck.toml)
//! - Scoring weights, penalties and grade bands
//! - Style, budget, token and security policy

mod project_config;

pub use project_config::{
    BudgetConfig,
    CategoryWeights,
    GradeBands,
    ReferencesConfig,
    ScoringConfig,
    SecurityConfig,
    SeverityPenalties,
    StyleConfig,
    TierMinLines,
    TierPaidWeights,
    TierTokenCeilings,
    TokenConfig,
    ValidationConfig,
    load_config_file,
    load_validation_config,
    CONFIG_FILE_NAMES,
    DEFAULT_CONFIG_TOML,
    DEFAULT_IMPERATIVE_VERBS,
};
