use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::validate::InvalidInput;

/// One solve request. Matrices are indexed `[product][channel]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationInput {
    pub conversion_rates: Vec<Vec<f64>>,
    pub avg_ticket_size: Vec<Vec<f64>>,
    pub cost_per_click: Vec<f64>,
    pub total_budget: f64,
    pub min_budget_percent: f64,
    pub min_transactions_per_product: Vec<i64>,
    pub min_clicks: i64,
    pub max_cost_percent: f64,
}

impl OptimizationInput {
    /// Three channels, three products.
    pub fn reference() -> Self {
        Self {
            conversion_rates: vec![
                vec![0.04, 0.01, 0.015],
                vec![0.0, 0.03, 0.015],
                vec![0.01, 0.0, 0.015],
            ],
            avg_ticket_size: vec![
                vec![25.0, 55.0, 55.0],
                vec![0.0, 60.0, 70.0],
                vec![40.0, 0.0, 80.0],
            ],
            cost_per_click: vec![1.1, 1.6, 1.9],
            total_budget: 10_000.0,
            min_budget_percent: 0.15,
            min_transactions_per_product: vec![50, 55, 60],
            min_clicks: 7_000,
            max_cost_percent: 0.80,
        }
    }

    /// Reads a request from a `.toml` file, or JSON for any other extension.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading input: {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&data)
                .with_context(|| format!("failed parsing TOML input: {}", path.display()))
        } else {
            serde_json::from_str(&data)
                .with_context(|| format!("failed parsing JSON input: {}", path.display()))
        }
    }

    pub fn canonical_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn scalar(&self, parameter: InputParameter) -> f64 {
        match parameter {
            InputParameter::TotalBudget => self.total_budget,
            InputParameter::MinBudgetPercent => self.min_budget_percent,
            InputParameter::MinClicks => self.min_clicks as f64,
            InputParameter::MaxCostPercent => self.max_cost_percent,
        }
    }

    /// Fractional click floors round to the nearest count. Values with no
    /// integer counterpart are rejected here; everything else is left to
    /// [`validate`](crate::model::validate::validate).
    pub fn set_scalar(
        &mut self,
        parameter: InputParameter,
        value: f64,
    ) -> Result<(), InvalidInput> {
        match parameter {
            InputParameter::TotalBudget => self.total_budget = value,
            InputParameter::MinBudgetPercent => self.min_budget_percent = value,
            InputParameter::MinClicks => {
                let rounded = value.round();
                if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
                    return Err(InvalidInput::NotCount {
                        field: parameter.to_string(),
                        value,
                    });
                }
                self.min_clicks = rounded as i64;
            }
            InputParameter::MaxCostPercent => self.max_cost_percent = value,
        }
        Ok(())
    }
}

/// Scalar knobs that can be changed without touching the matrices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InputParameter {
    TotalBudget,
    MinBudgetPercent,
    MinClicks,
    MaxCostPercent,
}

impl Display for InputParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TotalBudget => "total_budget",
            Self::MinBudgetPercent => "min_budget_percent",
            Self::MinClicks => "min_clicks",
            Self::MaxCostPercent => "max_cost_percent",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
#[error("unknown input parameter: {0}")]
pub struct InputParameterParseError(pub String);

impl FromStr for InputParameter {
    type Err = InputParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "total_budget" | "budget" => Ok(Self::TotalBudget),
            "min_budget_percent" | "min_budget" => Ok(Self::MinBudgetPercent),
            "min_clicks" | "clicks" => Ok(Self::MinClicks),
            "max_cost_percent" | "max_cost" => Ok(Self::MaxCostPercent),
            _ => Err(InputParameterParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputOverrides {
    pub conversion_rates: Option<Vec<Vec<f64>>>,
    pub avg_ticket_size: Option<Vec<Vec<f64>>>,
    pub cost_per_click: Option<Vec<f64>>,
    pub total_budget: Option<f64>,
    pub min_budget_percent: Option<f64>,
    pub min_transactions_per_product: Option<Vec<i64>>,
    pub min_clicks: Option<i64>,
    pub max_cost_percent: Option<f64>,
}

pub fn apply_overrides(input: &mut OptimizationInput, overrides: &InputOverrides) {
    if let Some(v) = &overrides.conversion_rates {
        input.conversion_rates = v.clone();
    }
    if let Some(v) = &overrides.avg_ticket_size {
        input.avg_ticket_size = v.clone();
    }
    if let Some(v) = &overrides.cost_per_click {
        input.cost_per_click = v.clone();
    }
    if let Some(v) = overrides.total_budget {
        input.total_budget = v;
    }
    if let Some(v) = overrides.min_budget_percent {
        input.min_budget_percent = v;
    }
    if let Some(v) = &overrides.min_transactions_per_product {
        input.min_transactions_per_product = v.clone();
    }
    if let Some(v) = overrides.min_clicks {
        input.min_clicks = v;
    }
    if let Some(v) = overrides.max_cost_percent {
        input.max_cost_percent = v;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::str::FromStr;

    use serde_json::json;

    use super::{apply_overrides, InputOverrides, InputParameter, OptimizationInput};

    #[test]
    fn deserializes_request_body_field_names() {
        let body = json!({
            "conversion_rates": [[0.04, 0.01, 0.015], [0, 0.03, 0.015], [0.01, 0, 0.015]],
            "avg_ticket_size": [[25, 55, 55], [0, 60, 70], [40, 0, 80]],
            "cost_per_click": [1.1, 1.6, 1.9],
            "total_budget": 10000,
            "min_budget_percent": 0.15,
            "min_transactions_per_product": [50, 55, 60],
            "min_clicks": 7000,
            "max_cost_percent": 0.8
        });
        let parsed: OptimizationInput =
            serde_json::from_value(body).expect("failed to parse request body");
        assert_eq!(parsed, OptimizationInput::reference());
    }

    #[test]
    fn loads_json_and_toml_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reference = OptimizationInput::reference();

        let json_path = dir.path().join("request.json");
        fs::write(
            &json_path,
            serde_json::to_string_pretty(&reference).expect("serialize"),
        )
        .expect("write json");
        assert_eq!(OptimizationInput::load(&json_path).expect("json"), reference);

        let toml_path = dir.path().join("request.toml");
        fs::write(&toml_path, toml::to_string(&reference).expect("serialize")).expect("write toml");
        assert_eq!(OptimizationInput::load(&toml_path).expect("toml"), reference);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"total_budget\": 1}").expect("write broken");
        let err = OptimizationInput::load(&broken).expect_err("missing fields");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn hash_tracks_content() {
        let base = OptimizationInput::reference();
        let mut changed = base.clone();
        changed.min_clicks += 1;
        assert_eq!(base.canonical_hash(), OptimizationInput::reference().canonical_hash());
        assert_ne!(base.canonical_hash(), changed.canonical_hash());
        assert_eq!(base.canonical_hash().len(), 64);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut input = OptimizationInput::reference();
        apply_overrides(
            &mut input,
            &InputOverrides {
                total_budget: Some(12_000.0),
                cost_per_click: Some(vec![1.0, 1.0, 1.0]),
                ..InputOverrides::default()
            },
        );
        assert_eq!(input.total_budget, 12_000.0);
        assert_eq!(input.cost_per_click, vec![1.0, 1.0, 1.0]);
        assert_eq!(input.min_clicks, 7_000);
    }

    #[test]
    fn parses_parameter_aliases() {
        assert_eq!(
            InputParameter::from_str("total-budget").expect("alias"),
            InputParameter::TotalBudget
        );
        assert_eq!(
            InputParameter::from_str("clicks").expect("alias"),
            InputParameter::MinClicks
        );
        assert!(InputParameter::from_str("roas").is_err());
    }

    #[test]
    fn min_clicks_scalar_rounds_to_integer() {
        let mut input = OptimizationInput::reference();
        input
            .set_scalar(InputParameter::MinClicks, 6_500.6)
            .expect("finite count");
        assert_eq!(input.min_clicks, 6_501);
        assert_eq!(input.scalar(InputParameter::MinClicks), 6_501.0);
    }

    #[test]
    fn min_clicks_scalar_rejects_values_without_a_count() {
        for value in [f64::NAN, f64::INFINITY, 1e30] {
            let mut input = OptimizationInput::reference();
            let err = input
                .set_scalar(InputParameter::MinClicks, value)
                .expect_err("no integer counterpart");
            assert_eq!(err.field(), "min_clicks");
            assert_eq!(input.min_clicks, 7_000);
        }
    }
}
