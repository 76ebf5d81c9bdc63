//! Static per-model cost table.
//!
//! §9 records the open question "how is `cost_usd` computed" as resolved in
//! favor of a small static table rather than querying a pricing API at
//! runtime — provider pricing changes slowly enough that a table checked in
//! here, and updated by hand when it drifts, is simpler than a live lookup
//! with its own failure modes.

use crate::types::Usage;

/// Price per million tokens, in USD, split by input/output/cached-input.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    /// USD per million input tokens.
    pub input_per_million: f64,
    /// USD per million output tokens.
    pub output_per_million: f64,
    /// USD per million cached input tokens (typically discounted).
    pub cached_input_per_million: f64,
}

const UNKNOWN_MODEL_PRICING: ModelPricing = ModelPricing {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cached_input_per_million: 0.3,
};

/// Known model → pricing entries. Matched by prefix so dated model
/// snapshots (e.g. `claude-sonnet-4-20250514`) resolve to their family's
/// rate without needing an entry per release.
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    (
        "claude-opus",
        ModelPricing {
            input_per_million: 15.0,
            output_per_million: 75.0,
            cached_input_per_million: 1.5,
        },
    ),
    (
        "claude-sonnet",
        ModelPricing {
            input_per_million: 3.0,
            output_per_million: 15.0,
            cached_input_per_million: 0.3,
        },
    ),
    (
        "claude-haiku",
        ModelPricing {
            input_per_million: 0.8,
            output_per_million: 4.0,
            cached_input_per_million: 0.08,
        },
    ),
    (
        "gpt-4o",
        ModelPricing {
            input_per_million: 2.5,
            output_per_million: 10.0,
            cached_input_per_million: 1.25,
        },
    ),
];

/// Resolve pricing for a model name, falling back to a conservative
/// default for unrecognized models rather than failing the scan.
#[must_use]
pub fn pricing_for(model: &str) -> ModelPricing {
    PRICING_TABLE
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .map_or(UNKNOWN_MODEL_PRICING, |(_, pricing)| *pricing)
}

/// Compute the USD cost of a single request's usage for a given model.
#[must_use]
pub fn cost_usd(model: &str, usage: &Usage) -> f64 {
    let pricing = pricing_for(model);
    let billable_input = usage.input_tokens.saturating_sub(usage.cached_tokens);
    let input_cost = billable_input as f64 / 1_000_000.0 * pricing.input_per_million;
    let cached_cost = usage.cached_tokens as f64 / 1_000_000.0 * pricing.cached_input_per_million;
    let output_cost = usage.output_tokens as f64 / 1_000_000.0 * pricing.output_per_million;
    input_cost + cached_cost + output_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefix_resolves_exact_family() {
        let pricing = pricing_for("claude-sonnet-4-20250514");
        assert!((pricing.input_per_million - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let pricing = pricing_for("some-future-model");
        assert!((pricing.input_per_million - UNKNOWN_MODEL_PRICING.input_per_million).abs() < f64::EPSILON);
    }

    #[test]
    fn cached_tokens_are_billed_at_discount() {
        let usage = Usage {
            input_tokens: 1_000_000,
            output_tokens: 0,
            cached_tokens: 1_000_000,
        };
        let cost = cost_usd("claude-sonnet-4", &usage);
        assert!((cost - 0.3).abs() < 1e-9);
    }
}
