//! Test Module
//!
//! Cross-module test suite for the matchday backend.
//!
//! ## Test Categories
//! - `brain_tests`: Team extraction properties and answer round trips
//! - `pipeline_tests`: End-to-end query scenarios in English and French
//! - `database_tests`: Session and conversation storage
//! - `supervisor_tests`: Chat adapter behaviour

pub mod database_tests;
pub mod pipeline_tests;
