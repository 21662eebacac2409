//! Token and cost estimation
//!
//! Sizes are approximate: one token is taken to be four characters. This is
//! a fixed heuristic, not a tokenizer, and it is applied uniformly so results
//! are comparable across packages.
//!
//! Content is split into three disclosure tiers:
//!
//! | Tier | Content | Paid |
//! |------|---------|------|
//! | metadata | front matter | always |
//! | body | manifest body | when the package is selected |
//! | reference | each `references/` file | when that file is read |

mod scenarios;

pub use scenarios::{project_costs, CostTable, ScenarioCost, ScenarioCosts, Scenarios};

use crate::config::TokenConfig;
use crate::package::{FileRole, Package};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Characters per estimated token
pub const CHARS_PER_TOKEN: f64 = 4.0;

/// Output estimate for a helper script invocation
pub const SCRIPT_OUTPUT_TOKENS: usize = 200;

/// Estimate tokens for a text unit: `max(1, round(chars / 4))`, or 0 when empty.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    ((chars as f64 / CHARS_PER_TOKEN).round() as usize).max(1)
}

/// Disclosure tier of a text unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureTier {
    Metadata,
    Body,
    Reference,
}

/// Size estimate for one unit of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEstimate {
    pub tier: DisclosureTier,
    /// File the estimate covers (manifest for metadata/body)
    pub file: String,
    pub tokens: usize,
    pub chars: usize,
    pub lines: usize,
}

impl TokenEstimate {
    fn of(tier: DisclosureTier, file: &str, text: &str) -> Self {
        Self {
            tier,
            file: file.to_string(),
            tokens: estimate_tokens(text),
            chars: text.chars().count(),
            lines: text.lines().count(),
        }
    }
}

/// Full token report for a package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub metadata: usize,
    pub body: usize,
    /// Per reference file, keyed by relative path
    pub references: BTreeMap<String, usize>,
    pub references_total: usize,
    pub scenarios: Scenarios,
    /// Typical load plus the smallest reference
    pub with_reference: usize,
    pub costs: ScenarioCosts,
    /// Helper scripts with their fixed output estimate; never counted in tiers
    pub scripts: BTreeMap<String, usize>,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub estimates: Vec<TokenEstimate>,
}

/// Compute tiers, scenarios, costs and recommendations.
pub fn estimate_package(package: &Package, config: &TokenConfig) -> TokenReport {
    let manifest = package.manifest_path.as_str();
    let mut estimates = vec![
        TokenEstimate::of(DisclosureTier::Metadata, manifest, &package.front_matter.raw),
        TokenEstimate::of(DisclosureTier::Body, manifest, &package.body),
    ];

    let mut references = BTreeMap::new();
    for file in package.files_with_role(FileRole::Reference) {
        let Some(text) = file.text.as_deref() else {
            continue;
        };
        let estimate = TokenEstimate::of(DisclosureTier::Reference, &file.path, text);
        references.insert(file.path.clone(), estimate.tokens);
        estimates.push(estimate);
    }

    let scripts: BTreeMap<String, usize> = package
        .files_with_role(FileRole::Script)
        .map(|f| (f.path.clone(), SCRIPT_OUTPUT_TOKENS))
        .collect();

    let metadata = estimates[0].tokens;
    let body = estimates[1].tokens;
    let references_total: usize = references.values().sum();
    let smallest_reference = references.values().copied().min().unwrap_or(0);

    let scenarios = Scenarios {
        idle: metadata,
        typical: metadata + body,
        worst: metadata + body + references_total,
    };
    let with_reference = scenarios.typical + smallest_reference;
    let costs = project_costs(&scenarios, with_reference, &CostTable::from(config));
    let recommendations = recommendations(body, &references, scenarios.typical);

    debug!(
        "Token tiers for '{}': metadata={}, body={}, references={} ({} files)",
        package.name,
        metadata,
        body,
        references_total,
        references.len()
    );

    TokenReport {
        metadata,
        body,
        references,
        references_total,
        scenarios,
        with_reference,
        costs,
        scripts,
        recommendations,
        estimates,
    }
}

fn recommendations(body: usize, references: &BTreeMap<String, usize>, typical: usize) -> Vec<String> {
    let mut recs = Vec::new();
    let total: usize = references.values().sum();

    if total > body * 2 {
        recs.push(format!(
            "References ({total} tokens) are more than twice the manifest body ({body} tokens); consider splitting them further"
        ));
    }
    for (name, tokens) in references {
        if *tokens > 1000 {
            recs.push(format!("{name} is large ({tokens} tokens); consider splitting it"));
        }
    }

    if recs.is_empty() {
        if typical < 500 {
            recs.push(format!(
                "Excellent efficiency ({typical} tokens typical); no optimization needed"
            ));
        } else {
            recs.push("Token efficiency looks good; no optimization needed".to_string());
        }
    }
    recs
}
