pub mod builder;
pub mod input;
pub mod parse;
pub mod program;
pub mod validate;

pub use builder::build_model;
pub use input::{apply_overrides, InputOverrides, InputParameter, OptimizationInput};
pub use program::{
    LinearConstraint, LinearExpr, LinearProgram, Objective, Relation, Sense, Variable,
};
pub use validate::{validate, Dimensions, InvalidInput, ValidatedInput};
