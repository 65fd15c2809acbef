pub mod backend;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::program::LinearProgram;

pub use backend::GoodLpSolver;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SolveStatus {
    Optimal { values: Vec<f64> },
    Infeasible,
    Unbounded,
    Failed { reason: String },
}

impl SolveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimal { .. } => "optimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverOutcome {
    pub backend: String,
    pub status: SolveStatus,
}

/// Fatal solver faults. Infeasibility and the like are reported through
/// [`SolveStatus`] instead.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver returned {found} values for {expected} variables")]
    MalformedSolution { expected: usize, found: usize },
}

/// Capability consumed by the optimizer: solve one linear program.
///
/// Implementations must not keep state between calls; every call receives a
/// fresh program and builds its own backend model.
pub trait LpSolver: Send + Sync {
    fn name(&self) -> &str;
    fn solve(&self, program: &LinearProgram) -> Result<SolverOutcome, SolverError>;
}
