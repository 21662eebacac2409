//! Scenario projection and cost model

use crate::config::TokenConfig;
use serde::Serialize;

/// Tokens loaded under each usage scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenarios {
    /// Metadata only
    pub idle: usize,
    /// Metadata + body
    pub typical: usize,
    /// Metadata + body + every reference
    pub worst: usize,
}

/// Pricing inputs, rates in currency per million tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    pub input_rate: f64,
    pub output_rate: f64,
    pub output_ratio: f64,
    pub output_tokens: Option<u64>,
    pub monthly_volume: u64,
}

impl From<&TokenConfig> for CostTable {
    fn from(config: &TokenConfig) -> Self {
        Self {
            input_rate: config.input_rate,
            output_rate: config.output_rate,
            output_ratio: config.output_ratio,
            output_tokens: config.output_tokens,
            monthly_volume: config.monthly_volume,
        }
    }
}

impl CostTable {
    /// Output estimate for a given input size.
    pub fn output_for(&self, input_tokens: usize) -> usize {
        match self.output_tokens {
            Some(explicit) => explicit as usize,
            None => (input_tokens as f64 * self.output_ratio).round() as usize,
        }
    }

    pub fn cost(&self, input_tokens: usize) -> ScenarioCost {
        let output_tokens = self.output_for(input_tokens);
        let cost_per_use = (input_tokens as f64 * self.input_rate
            + output_tokens as f64 * self.output_rate)
            / 1_000_000.0;
        ScenarioCost {
            tokens: input_tokens,
            output_tokens,
            cost_per_use: round6(cost_per_use),
            monthly_cost: round6(cost_per_use * self.monthly_volume as f64),
        }
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Cost of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCost {
    pub tokens: usize,
    pub output_tokens: usize,
    pub cost_per_use: f64,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCosts {
    pub monthly_volume: u64,
    pub idle: ScenarioCost,
    pub typical: ScenarioCost,
    pub with_reference: ScenarioCost,
    pub worst: ScenarioCost,
}

pub fn project_costs(scenarios: &Scenarios, with_reference: usize, table: &CostTable) -> ScenarioCosts {
    ScenarioCosts {
        monthly_volume: table.monthly_volume,
        idle: table.cost(scenarios.idle),
        typical: table.cost(scenarios.typical),
        with_reference: table.cost(with_reference),
        worst: table.cost(scenarios.worst),
    }
}
