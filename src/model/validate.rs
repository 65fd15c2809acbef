use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::input::OptimizationInput;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("{field} must not be empty")]
    Empty { field: String },
    #[error("{field} must have {expected} columns, found {found}")]
    ColumnCount {
        field: String,
        expected: usize,
        found: usize,
    },
    #[error("{field} must have {expected} elements, found {found}")]
    Length {
        field: String,
        expected: usize,
        found: usize,
    },
    #[error("{field} must be a finite non-negative number, found {value}")]
    Negative { field: String, value: f64 },
    #[error("{field} must be strictly positive, found {value}")]
    NotPositive { field: String, value: f64 },
    #[error("{field} must lie in [0, 1], found {value}")]
    OutOfRange { field: String, value: f64 },
    #[error("{field} must be a whole count, found {value}")]
    NotCount { field: String, value: f64 },
    #[error("conversion_rates has {conversion_rates} rows, avg_ticket_size {avg_ticket_size}")]
    ProductRows {
        conversion_rates: usize,
        avg_ticket_size: usize,
    },
}

impl InvalidInput {
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field }
            | Self::ColumnCount { field, .. }
            | Self::Length { field, .. }
            | Self::Negative { field, .. }
            | Self::NotPositive { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotCount { field, .. } => field.as_str(),
            // The product count is read from conversion_rates.
            Self::ProductRows { .. } => "conversion_rates",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub products: usize,
    pub channels: usize,
}

/// Input that passed [`validate`]; the only thing the model builder accepts.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInput<'a> {
    input: &'a OptimizationInput,
    dims: Dimensions,
}

impl<'a> ValidatedInput<'a> {
    pub fn input(&self) -> &'a OptimizationInput {
        self.input
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// True when the per-channel floors alone exceed the total budget.
    pub fn floors_exceed_budget(&self) -> bool {
        self.dims.channels as f64 * self.input.min_budget_percent > 1.0
    }
}

pub fn validate(input: &OptimizationInput) -> Result<ValidatedInput<'_>, InvalidInput> {
    let products = input.conversion_rates.len();
    let channels = input.cost_per_click.len();
    if products == 0 {
        return Err(InvalidInput::Empty {
            field: "conversion_rates".to_string(),
        });
    }
    if channels == 0 {
        return Err(InvalidInput::Empty {
            field: "cost_per_click".to_string(),
        });
    }

    if input.avg_ticket_size.len() != products {
        return Err(InvalidInput::ProductRows {
            conversion_rates: products,
            avg_ticket_size: input.avg_ticket_size.len(),
        });
    }
    check_matrix("conversion_rates", &input.conversion_rates, channels)?;
    check_matrix("avg_ticket_size", &input.avg_ticket_size, channels)?;
    if input.min_transactions_per_product.len() != products {
        return Err(InvalidInput::Length {
            field: "min_transactions_per_product".to_string(),
            expected: products,
            found: input.min_transactions_per_product.len(),
        });
    }

    for (i, cpc) in input.cost_per_click.iter().enumerate() {
        check_positive(&format!("cost_per_click[{i}]"), *cpc)?;
    }
    check_positive("total_budget", input.total_budget)?;
    check_fraction("min_budget_percent", input.min_budget_percent)?;
    check_fraction("max_cost_percent", input.max_cost_percent)?;

    if input.min_clicks < 0 {
        return Err(InvalidInput::Negative {
            field: "min_clicks".to_string(),
            value: input.min_clicks as f64,
        });
    }
    for (p, count) in input.min_transactions_per_product.iter().enumerate() {
        if *count < 0 {
            return Err(InvalidInput::Negative {
                field: format!("min_transactions_per_product[{p}]"),
                value: *count as f64,
            });
        }
    }

    Ok(ValidatedInput {
        input,
        dims: Dimensions { products, channels },
    })
}

/// Row counts are checked by the caller; this covers width and entries.
fn check_matrix(field: &str, matrix: &[Vec<f64>], columns: usize) -> Result<(), InvalidInput> {
    for (p, row) in matrix.iter().enumerate() {
        if row.len() != columns {
            return Err(InvalidInput::ColumnCount {
                field: format!("{field}[{p}]"),
                expected: columns,
                found: row.len(),
            });
        }
        for (i, value) in row.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(InvalidInput::Negative {
                    field: format!("{field}[{p}][{i}]"),
                    value: *value,
                });
            }
        }
    }
    Ok(())
}

fn check_positive(field: &str, value: f64) -> Result<(), InvalidInput> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InvalidInput::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), InvalidInput> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidInput::OutOfRange {
            field: field.to_string(),
            value,
        })
    }
}
