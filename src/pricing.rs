use crate::results::TokenCounts;

/// Per-token USD rates for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input_per_token: f64,
    pub output_per_token: f64,
}

impl ModelPricing {
    /// Estimated cost of a call with the given token usage.
    pub fn cost(&self, counts: TokenCounts) -> f64 {
        counts.input as f64 * self.input_per_token + counts.output as f64 * self.output_per_token
    }
}

// Published per-million-token rates, stored per token.
const PRICING: &[(&str, ModelPricing)] = &[
    (
        "gpt-4o-mini",
        ModelPricing {
            input_per_token: 0.150 / 1_000_000.0,
            output_per_token: 0.600 / 1_000_000.0,
        },
    ),
    (
        "gpt-4o-2024-08-06",
        ModelPricing {
            input_per_token: 2.50 / 1_000_000.0,
            output_per_token: 10.00 / 1_000_000.0,
        },
    ),
    (
        "gemini-1.5-flash",
        ModelPricing {
            input_per_token: 0.075 / 1_000_000.0,
            output_per_token: 0.30 / 1_000_000.0,
        },
    ),
    (
        "llama-3.1-70b-versatile",
        ModelPricing {
            input_per_token: 0.59 / 1_000_000.0,
            output_per_token: 0.79 / 1_000_000.0,
        },
    ),
];

/// Look up the pricing entry for a model identifier.
pub fn pricing_for(model: &str) -> Option<ModelPricing> {
    PRICING
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, pricing)| *pricing)
}

/// Model identifiers with a pricing entry, in table order.
pub fn known_models() -> impl Iterator<Item = &'static str> {
    PRICING.iter().map(|(name, _)| *name)
}

/// Estimated cost for a call against `model`, or None when the model has no
/// pricing entry.
pub fn cost_for(model: &str, counts: TokenCounts) -> Option<f64> {
    pricing_for(model).map(|pricing| pricing.cost(counts))
}
