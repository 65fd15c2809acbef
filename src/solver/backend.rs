use good_lp::constraint::{eq, geq, leq};
use good_lp::{
    default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable as LpVariable,
};
use tracing::debug;

use crate::model::program::{LinearExpr, LinearProgram, Relation, Sense};
use crate::solver::{LpSolver, SolveStatus, SolverError, SolverOutcome};

/// `good_lp` adapter running the pure-Rust simplex backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl LpSolver for GoodLpSolver {
    fn name(&self) -> &str {
        "good_lp/microlp"
    }

    fn solve(&self, program: &LinearProgram) -> Result<SolverOutcome, SolverError> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<LpVariable> = program
            .variables
            .iter()
            .map(|var| {
                let mut definition = variable().name(var.name.clone()).min(var.lower);
                if let Some(upper) = var.upper {
                    definition = definition.max(upper);
                }
                vars.add(definition)
            })
            .collect();

        let objective = to_expression(&program.objective.expr, &handles);
        let unsolved = match program.objective.sense {
            Sense::Maximize => vars.maximise(objective),
            Sense::Minimize => vars.minimise(objective),
        };
        let mut problem = unsolved.using(default_solver);
        for constraint in &program.constraints {
            let lhs = to_expression(&constraint.lhs, &handles);
            let built = match constraint.relation {
                Relation::LessOrEqual => leq(lhs, constraint.rhs),
                Relation::GreaterOrEqual => geq(lhs, constraint.rhs),
                Relation::Equal => eq(lhs, constraint.rhs),
            };
            problem = problem.with(built);
        }

        let status = match problem.solve() {
            Ok(solution) => SolveStatus::Optimal {
                values: handles.iter().map(|v| solution.value(*v)).collect(),
            },
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(other) => SolveStatus::Failed {
                reason: other.to_string(),
            },
        };
        debug!(status = status.label(), "good_lp solve finished");

        if let SolveStatus::Optimal { values } = &status {
            if values.len() != program.variable_count() {
                return Err(SolverError::MalformedSolution {
                    expected: program.variable_count(),
                    found: values.len(),
                });
            }
        }

        Ok(SolverOutcome {
            backend: self.name().to_string(),
            status,
        })
    }
}

fn to_expression(expr: &LinearExpr, handles: &[LpVariable]) -> Expression {
    let mut out = Expression::with_capacity(handles.len());
    for (coefficient, var) in expr.coefficients.iter().zip(handles) {
        if *coefficient != 0.0 {
            out.add_mul(*coefficient, *var);
        }
    }
    out + expr.constant
}

#[cfg(test)]
mod tests {
    use super::GoodLpSolver;
    use crate::model::program::{
        LinearConstraint, LinearExpr, LinearProgram, Objective, Sense, Variable,
    };
    use crate::solver::{LpSolver, SolveStatus};

    fn two_variable_program(constraints: Vec<LinearConstraint>) -> LinearProgram {
        LinearProgram {
            variables: vec![
                Variable {
                    name: "x".to_string(),
                    lower: 0.0,
                    upper: None,
                },
                Variable {
                    name: "y".to_string(),
                    lower: 0.0,
                    upper: Some(3.0),
                },
            ],
            objective: Objective {
                sense: Sense::Maximize,
                expr: LinearExpr::from_coefficients(vec![1.0, 2.0]),
            },
            constraints,
        }
    }

    #[test]
    fn solves_bounded_program() {
        let program = two_variable_program(vec![LinearConstraint::leq(
            "cap",
            LinearExpr::from_coefficients(vec![1.0, 1.0]),
            4.0,
        )]);
        let outcome = GoodLpSolver.solve(&program).expect("solver fault");
        let SolveStatus::Optimal { values } = outcome.status else {
            panic!("expected optimal, got {:?}", outcome.status);
        };
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!((values[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn reports_infeasible_program() {
        let program = two_variable_program(vec![
            LinearConstraint::leq("cap", LinearExpr::from_coefficients(vec![1.0, 1.0]), 4.0),
            LinearConstraint::geq("floor", LinearExpr::from_coefficients(vec![1.0, 0.0]), 5.0),
        ]);
        let outcome = GoodLpSolver.solve(&program).expect("solver fault");
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn reports_unbounded_program() {
        let program = two_variable_program(Vec::new());
        let outcome = GoodLpSolver.solve(&program).expect("solver fault");
        assert_eq!(outcome.status, SolveStatus::Unbounded);
    }
}
