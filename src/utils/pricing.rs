// ABOUTME: Model pricing table and cost calculation
// Loads per-model input/output prices once and converts token usage into USD

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::utils::error::{Result, ThreadChatError};

/// Price for a block of tokens in one direction (input or output).
///
/// `price` is the USD cost of `tokens` tokens, so the unit price is
/// `price / tokens`. `tokens` must be positive; a zero divisor is rejected
/// at cost time with `InvalidPricing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBand {
    pub price: f64,
    pub tokens: u64,
}

/// Pricing for a single model: separate bands for prompt and completion tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input: PriceBand,
    pub output: PriceBand,
}

/// Read-only table mapping model identifiers to pricing, loaded once at
/// session start from `aimodels.json`.
#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
}

impl PricingTable {
    pub fn new(models: HashMap<String, ModelPricing>) -> Self {
        Self { models }
    }

    /// Load the table from a JSON file of the form
    /// `{ "<model>": { "input": {"price", "tokens"}, "output": {...} } }`.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let models: HashMap<String, ModelPricing> = serde_json::from_str(&content)?;
        Ok(Self { models })
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn get(&self, model: &str) -> Option<&ModelPricing> {
        self.models.get(model)
    }

    /// All known model identifiers, sorted. Drives the model selector.
    pub fn models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.models.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Compute the USD cost of one cycle.
    ///
    /// Pure: no state is touched, the same inputs always produce the same
    /// output. Fails with `UnknownModel` for a model not in the table and
    /// `InvalidPricing` when a band has a zero token divisor.
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64, model: &str) -> Result<f64> {
        let pricing = self
            .models
            .get(model)
            .ok_or_else(|| ThreadChatError::UnknownModel(model.to_string()))?;

        if pricing.input.tokens == 0 || pricing.output.tokens == 0 {
            return Err(ThreadChatError::InvalidPricing(model.to_string()));
        }

        let unit_input = pricing.input.price / pricing.input.tokens as f64;
        let unit_output = pricing.output.price / pricing.output.tokens as f64;

        Ok(prompt_tokens as f64 * unit_input + completion_tokens as f64 * unit_output)
    }

    /// Format cost as USD string
    pub fn format_cost(cost: f64) -> String {
        if cost < 0.01 {
            format!("${:.4}", cost)
        } else {
            format!("${:.2}", cost)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table() -> PricingTable {
        let mut models = HashMap::new();
        models.insert(
            "gpt-x".to_string(),
            ModelPricing {
                input: PriceBand {
                    price: 0.01,
                    tokens: 1000,
                },
                output: PriceBand {
                    price: 0.03,
                    tokens: 1000,
                },
            },
        );
        models.insert(
            "broken".to_string(),
            ModelPricing {
                input: PriceBand {
                    price: 0.01,
                    tokens: 0,
                },
                output: PriceBand {
                    price: 0.03,
                    tokens: 1000,
                },
            },
        );
        PricingTable::new(models)
    }

    #[test]
    fn cost_of_zero_tokens_is_zero() {
        let table = table();
        assert_eq!(table.cost(0, 0, "gpt-x").unwrap(), 0.0);
    }

    #[test]
    fn cost_matches_band_arithmetic() {
        let table = table();
        // 10 * (0.01/1000) + 5 * (0.03/1000) = 0.00025
        let cost = table.cost(10, 5, "gpt-x").unwrap();
        assert!((cost - 0.00025).abs() < 1e-12);
    }

    #[test]
    fn cost_is_deterministic() {
        let table = table();
        let a = table.cost(123, 456, "gpt-x").unwrap();
        let b = table.cost(123, 456, "gpt-x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn cost_is_linear_in_prompt_tokens() {
        let table = table();
        let unit_input = 0.01 / 1000.0;
        let base = table.cost(100, 50, "gpt-x").unwrap();
        let doubled = table.cost(200, 50, "gpt-x").unwrap();
        assert!((doubled - (base + 100.0 * unit_input)).abs() < 1e-12);
    }

    #[test]
    fn cost_is_linear_in_completion_tokens() {
        let table = table();
        let unit_output = 0.03 / 1000.0;
        let base = table.cost(100, 50, "gpt-x").unwrap();
        let doubled = table.cost(100, 100, "gpt-x").unwrap();
        assert!((doubled - (base + 50.0 * unit_output)).abs() < 1e-12);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let table = table();
        match table.cost(10, 5, "no-such-model") {
            Err(ThreadChatError::UnknownModel(m)) => assert_eq!(m, "no-such-model"),
            other => panic!("expected UnknownModel, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn zero_token_divisor_is_rejected() {
        let table = table();
        match table.cost(10, 5, "broken") {
            Err(ThreadChatError::InvalidPricing(m)) => assert_eq!(m, "broken"),
            other => panic!("expected InvalidPricing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn models_are_sorted() {
        let table = table();
        assert_eq!(table.models(), vec!["broken", "gpt-x"]);
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gpt-x": {{"input": {{"price": 0.01, "tokens": 1000}}, "output": {{"price": 0.03, "tokens": 1000}}}}}}"#
        )
        .unwrap();

        let table = PricingTable::load_from_json(file.path()).unwrap();
        assert!(table.contains("gpt-x"));
        assert_eq!(table.get("gpt-x").unwrap().input.tokens, 1000);
    }

    #[test]
    fn format_cost_switches_precision() {
        assert_eq!(PricingTable::format_cost(0.0001), "$0.0001");
        assert_eq!(PricingTable::format_cost(0.01), "$0.01");
        assert_eq!(PricingTable::format_cost(1.234), "$1.23");
    }
}
