use crate::model::input::{InputParameter, OptimizationInput};
use crate::optimizer::{BudgetOptimizer, OptimizeError, ParameterChange, WhatIfResult};

pub fn simulate_whatif(
    optimizer: &BudgetOptimizer,
    base: &OptimizationInput,
    target_changes: &[(InputParameter, f64)],
) -> Result<WhatIfResult, OptimizeError> {
    let before = optimizer.optimize(base)?;

    let mut changed = base.clone();
    let mut changes_applied = Vec::new();
    for (parameter, to) in target_changes {
        let from = changed.scalar(*parameter);
        changed.set_scalar(*parameter, *to)?;
        changes_applied.push(ParameterChange {
            parameter: *parameter,
            from,
            to: changed.scalar(*parameter),
        });
    }

    let after = optimizer.optimize(&changed)?;
    let objective_delta = match (before.objective_value(), after.objective_value()) {
        (Some(old), Some(new)) => Some(new - old),
        _ => None,
    };
    let allocation_deltas = match (before.allocations(), after.allocations()) {
        (Some(old), Some(new)) => Some(new.iter().zip(old).map(|(n, o)| n - o).collect()),
        _ => None,
    };

    Ok(WhatIfResult {
        changes_applied,
        before,
        after,
        objective_delta,
        allocation_deltas,
    })
}

#[cfg(test)]
mod tests {
    use super::simulate_whatif;
    use crate::model::input::{InputParameter, OptimizationInput};
    use crate::optimizer::{BudgetOptimizer, OptimizeError};

    #[test]
    fn larger_budget_never_lowers_revenue() {
        let optimizer = BudgetOptimizer::with_defaults();
        let result = simulate_whatif(
            &optimizer,
            &OptimizationInput::reference(),
            &[(InputParameter::TotalBudget, 12_000.0)],
        )
        .expect("whatif");
        assert_eq!(result.changes_applied.len(), 1);
        assert_eq!(result.changes_applied[0].from, 10_000.0);
        assert_eq!(result.changes_applied[0].to, 12_000.0);
        let delta = result.objective_delta.expect("both solved");
        assert!(delta > 0.0);
        let deltas = result.allocation_deltas.expect("both solved");
        assert!((deltas.iter().sum::<f64>() - 2_000.0).abs() < 1e-2);
    }

    #[test]
    fn losing_feasibility_drops_the_delta() {
        let optimizer = BudgetOptimizer::with_defaults();
        let result = simulate_whatif(
            &optimizer,
            &OptimizationInput::reference(),
            &[(InputParameter::MinClicks, 50_000.0)],
        )
        .expect("whatif");
        assert!(result.before.is_solved());
        assert!(!result.after.is_solved());
        assert!(result.objective_delta.is_none());
        assert!(result.allocation_deltas.is_none());
    }

    #[test]
    fn invalid_change_is_reported() {
        let optimizer = BudgetOptimizer::with_defaults();
        let err = simulate_whatif(
            &optimizer,
            &OptimizationInput::reference(),
            &[(InputParameter::MaxCostPercent, 1.5)],
        )
        .expect_err("out of range");
        assert!(matches!(err, OptimizeError::InvalidInput(_)));
    }

    #[test]
    fn non_finite_click_floor_is_rejected_by_name() {
        let optimizer = BudgetOptimizer::with_defaults();
        for value in [f64::NAN, 1e30] {
            let err = simulate_whatif(
                &optimizer,
                &OptimizationInput::reference(),
                &[(InputParameter::MinClicks, value)],
            )
            .expect_err("click floor must be a count");
            match err {
                OptimizeError::InvalidInput(invalid) => assert_eq!(invalid.field(), "min_clicks"),
                other => panic!("expected invalid input, got {other:?}"),
            }
        }
    }
}
