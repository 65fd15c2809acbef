//! Splits an advertising budget across marketing channels by solving a
//! linear program that maximises expected revenue.

pub mod config;
pub mod model;
pub mod optimizer;
pub mod output;
pub mod solver;
