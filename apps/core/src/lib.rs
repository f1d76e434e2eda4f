//! Matchday backend.
//!
//! Answers football-match questions asked in French or English against a
//! JSON tournament snapshot. `brain` holds the query pipeline, `actors` the
//! session layer that records conversations around it.

pub mod actors;
pub mod brain;
pub mod config;
pub mod database;
pub mod dataset;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod preflight;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use brain::pipeline::{QueryEngine, QueryOutcome};
pub use error::AppError;
