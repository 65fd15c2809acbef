pub mod audit;
pub mod report;
pub mod whatif;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::builder::build_model;
use crate::model::input::{InputParameter, OptimizationInput};
use crate::model::program::LinearProgram;
use crate::model::validate::{validate, Dimensions, InvalidInput};
use crate::solver::{GoodLpSolver, LpSolver, SolveStatus, SolverError};

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Allocation per channel plus realised revenue, or no solution at all.
///
/// On the wire this is always `{"allocations": .., "objective_value": ..}`
/// with both fields null when no optimum was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResultWire", into = "ResultWire")]
pub enum OptimizationResult {
    Solved {
        allocations: Vec<f64>,
        objective_value: f64,
    },
    NoSolution,
}

impl OptimizationResult {
    pub fn allocations(&self) -> Option<&[f64]> {
        match self {
            Self::Solved { allocations, .. } => Some(allocations),
            Self::NoSolution => None,
        }
    }

    pub fn objective_value(&self) -> Option<f64> {
        match self {
            Self::Solved {
                objective_value, ..
            } => Some(*objective_value),
            Self::NoSolution => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

#[derive(Serialize, Deserialize)]
struct ResultWire {
    allocations: Option<Vec<f64>>,
    objective_value: Option<f64>,
}

impl From<ResultWire> for OptimizationResult {
    fn from(wire: ResultWire) -> Self {
        match (wire.allocations, wire.objective_value) {
            (Some(allocations), Some(objective_value)) => Self::Solved {
                allocations,
                objective_value,
            },
            _ => Self::NoSolution,
        }
    }
}

impl From<OptimizationResult> for ResultWire {
    fn from(result: OptimizationResult) -> Self {
        match result {
            OptimizationResult::Solved {
                allocations,
                objective_value,
            } => Self {
                allocations: Some(allocations),
                objective_value: Some(objective_value),
            },
            OptimizationResult::NoSolution => Self {
                allocations: None,
                objective_value: None,
            },
        }
    }
}

/// Solver-level view of one solve, keeping infeasible and unbounded apart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolveDiagnostics {
    pub backend: String,
    pub status: String,
    pub reason: Option<String>,
    pub dims: Dimensions,
    pub constraint_count: usize,
    pub floors_exceed_budget: bool,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub input: OptimizationInput,
    pub program: LinearProgram,
    pub diagnostics: SolveDiagnostics,
    pub result: OptimizationResult,
}

/// Validate, build, solve, map. Holds nothing but the solver handle, so one
/// instance can serve any number of independent requests.
#[derive(Clone)]
pub struct BudgetOptimizer {
    solver: Arc<dyn LpSolver>,
}

impl BudgetOptimizer {
    pub fn new(solver: Arc<dyn LpSolver>) -> Self {
        Self { solver }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(GoodLpSolver))
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn optimize(&self, input: &OptimizationInput) -> Result<OptimizationResult, OptimizeError> {
        Ok(self.solve_detailed(input)?.result)
    }

    pub fn solve_detailed(&self, input: &OptimizationInput) -> Result<SolveReport, OptimizeError> {
        let validated = validate(input)?;
        let dims = validated.dims();
        let floors_exceed_budget = validated.floors_exceed_budget();
        if floors_exceed_budget {
            warn!(
                channels = dims.channels,
                min_budget_percent = input.min_budget_percent,
                "per-channel floors exceed the total budget; no allocation can exist"
            );
        }

        let program = build_model(&validated);
        info!(
            products = dims.products,
            channels = dims.channels,
            constraints = program.constraints.len(),
            backend = self.solver.name(),
            "solving budget allocation"
        );

        let outcome = self.solver.solve(&program)?;
        let result = match &outcome.status {
            SolveStatus::Optimal { values } => OptimizationResult::Solved {
                allocations: values.clone(),
                objective_value: program.objective.expr.evaluate(values),
            },
            _ => OptimizationResult::NoSolution,
        };
        let reason = match &outcome.status {
            SolveStatus::Failed { reason } => Some(reason.clone()),
            _ => None,
        };
        match result.objective_value() {
            Some(value) => info!(objective_value = value, "optimal allocation found"),
            None => warn!(status = outcome.status.label(), "no solution found"),
        }

        Ok(SolveReport {
            input: input.clone(),
            diagnostics: SolveDiagnostics {
                backend: outcome.backend,
                status: outcome.status.label().to_string(),
                reason,
                dims,
                constraint_count: program.constraints.len(),
                floors_exceed_budget,
            },
            program,
            result,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterChange {
    pub parameter: InputParameter,
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhatIfResult {
    pub changes_applied: Vec<ParameterChange>,
    pub before: OptimizationResult,
    pub after: OptimizationResult,
    pub objective_delta: Option<f64>,
    pub allocation_deltas: Option<Vec<f64>>,
}
