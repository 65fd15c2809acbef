use serde::{Deserialize, Serialize};

use crate::model::program::{LinearConstraint, LinearProgram, Relation};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintCheck {
    pub name: String,
    pub lhs: f64,
    pub relation: Relation,
    pub rhs: f64,
    pub slack: f64,
    pub satisfied: bool,
    pub binding: bool,
}

/// Evaluates every constraint of `program` at `values`.
///
/// `tolerance` is relative: a constraint with right side `r` may be violated
/// by up to `tolerance * max(|r|, 1)`.
pub fn audit_constraints(
    program: &LinearProgram,
    values: &[f64],
    tolerance: f64,
) -> Vec<ConstraintCheck> {
    program
        .constraints
        .iter()
        .map(|constraint| check_constraint(constraint, values, tolerance))
        .collect()
}

pub fn check_constraint(
    constraint: &LinearConstraint,
    values: &[f64],
    tolerance: f64,
) -> ConstraintCheck {
    let lhs = constraint.lhs.evaluate(values);
    let slack = constraint.slack(values);
    let allowance = tolerance * constraint.rhs.abs().max(1.0);
    ConstraintCheck {
        name: constraint.name.clone(),
        lhs,
        relation: constraint.relation,
        rhs: constraint.rhs,
        slack,
        satisfied: slack >= -allowance,
        binding: slack.abs() <= allowance,
    }
}

pub fn all_satisfied(checks: &[ConstraintCheck]) -> bool {
    checks.iter().all(|c| c.satisfied)
}

pub fn binding_names(checks: &[ConstraintCheck]) -> Vec<&str> {
    checks
        .iter()
        .filter(|c| c.binding)
        .map(|c| c.name.as_str())
        .collect()
}
