use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Dense linear form `Σ coefficients[i] * x[i] + constant` over the program's variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearExpr {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub constant: f64,
}

impl LinearExpr {
    pub fn zeros(len: usize) -> Self {
        Self {
            coefficients: vec![0.0; len],
            constant: 0.0,
        }
    }

    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self {
            coefficients,
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, index: usize, coefficient: f64) {
        self.coefficients[index] += coefficient;
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
            constant: self.constant * factor,
        }
    }

    pub fn minus(&self, other: &LinearExpr) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .zip(&other.coefficients)
            .map(|(a, b)| a - b)
            .collect();
        Self {
            coefficients,
            constant: self.constant - other.constant,
        }
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.constant
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "==",
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub expr: LinearExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn leq(name: impl Into<String>, lhs: LinearExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lhs,
            relation: Relation::LessOrEqual,
            rhs,
        }
    }

    pub fn geq(name: impl Into<String>, lhs: LinearExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lhs,
            relation: Relation::GreaterOrEqual,
            rhs,
        }
    }

    /// Signed distance to the boundary; non-negative when the constraint holds.
    pub fn slack(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs.evaluate(values);
        match self.relation {
            Relation::LessOrEqual => self.rhs - lhs,
            Relation::GreaterOrEqual => lhs - self.rhs,
            Relation::Equal => -(lhs - self.rhs).abs(),
        }
    }
}

/// Solver-agnostic linear program over continuous variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearProgram {
    pub variables: Vec<Variable>,
    pub objective: Objective,
    pub constraints: Vec<LinearConstraint>,
}

impl LinearProgram {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }
}
