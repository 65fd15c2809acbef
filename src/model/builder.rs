//! Translates a validated request into the budget allocation linear program.
//!
//! Variable `i` is the spend on channel `i`. Clicks on a channel are
//! `budget[i] / cost_per_click[i]`, conversions of product `p` are clicks times
//! `conversion_rates[p][i]`, and revenue is conversions times
//! `avg_ticket_size[p][i]`. Every quantity is linear in the budgets.

use crate::model::program::{
    LinearConstraint, LinearExpr, LinearProgram, Objective, Sense, Variable,
};
use crate::model::validate::ValidatedInput;

pub const TOTAL_BUDGET: &str = "total_budget";
pub const MIN_CLICKS: &str = "min_clicks";
pub const MAX_COST: &str = "max_cost";

pub fn channel_floor_name(channel: usize) -> String {
    format!("min_budget_channel_{}", channel + 1)
}

pub fn product_floor_name(product: usize) -> String {
    format!("min_conversions_product_{}", product + 1)
}

pub fn build_model(validated: &ValidatedInput<'_>) -> LinearProgram {
    let input = validated.input();
    let dims = validated.dims();
    let channels = dims.channels;

    let variables = (0..channels)
        .map(|i| Variable {
            name: format!("budget_{i}"),
            lower: 0.0,
            upper: None,
        })
        .collect();

    let revenue = revenue_expr(validated);
    let mut constraints = Vec::with_capacity(dims.products + channels + 3);

    constraints.push(LinearConstraint::leq(
        TOTAL_BUDGET,
        LinearExpr::from_coefficients(vec![1.0; channels]),
        input.total_budget,
    ));

    let floor = input.min_budget_percent * input.total_budget;
    for i in 0..channels {
        let mut expr = LinearExpr::zeros(channels);
        expr.add_term(i, 1.0);
        constraints.push(LinearConstraint::geq(channel_floor_name(i), expr, floor));
    }

    for (p, rates) in input.conversion_rates.iter().enumerate() {
        let mut expr = LinearExpr::zeros(channels);
        for (i, rate) in rates.iter().enumerate() {
            expr.add_term(i, rate / input.cost_per_click[i]);
        }
        constraints.push(LinearConstraint::geq(
            product_floor_name(p),
            expr,
            input.min_transactions_per_product[p] as f64,
        ));
    }

    constraints.push(LinearConstraint::geq(
        MIN_CLICKS,
        clicks_expr(validated),
        input.min_clicks as f64,
    ));

    // Spend is the raw budget weighted by cost per click; the value side is
    // Σ ticket * rate * budget without the per-click division.
    let spend = LinearExpr::from_coefficients(input.cost_per_click.clone());
    let value = conversion_value_expr(validated);
    constraints.push(LinearConstraint::leq(
        MAX_COST,
        spend.minus(&value.scaled(input.max_cost_percent)),
        0.0,
    ));

    LinearProgram {
        variables,
        objective: Objective {
            sense: Sense::Maximize,
            expr: revenue,
        },
        constraints,
    }
}

/// Σ_p avg_ticket_size[p][i] * conversion_rates[p][i] / cost_per_click[i] per channel.
pub fn revenue_expr(validated: &ValidatedInput<'_>) -> LinearExpr {
    let input = validated.input();
    let mut expr = LinearExpr::zeros(validated.dims().channels);
    for (rates, tickets) in input.conversion_rates.iter().zip(&input.avg_ticket_size) {
        for (i, (rate, ticket)) in rates.iter().zip(tickets).enumerate() {
            expr.add_term(i, ticket * rate / input.cost_per_click[i]);
        }
    }
    expr
}

pub fn clicks_expr(validated: &ValidatedInput<'_>) -> LinearExpr {
    let coefficients = validated
        .input()
        .cost_per_click
        .iter()
        .map(|cpc| 1.0 / cpc)
        .collect();
    LinearExpr::from_coefficients(coefficients)
}

/// Σ_p avg_ticket_size[p][i] * conversion_rates[p][i] per channel, the value
/// side of the cost ceiling.
pub fn conversion_value_expr(validated: &ValidatedInput<'_>) -> LinearExpr {
    let input = validated.input();
    let mut expr = LinearExpr::zeros(validated.dims().channels);
    for (rates, tickets) in input.conversion_rates.iter().zip(&input.avg_ticket_size) {
        for (i, (rate, ticket)) in rates.iter().zip(tickets).enumerate() {
            expr.add_term(i, ticket * rate);
        }
    }
    expr
}
