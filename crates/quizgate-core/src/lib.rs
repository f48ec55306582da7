//! quizgate-core — Quiz model, scoring, retake policy, and the gate service.
//!
//! This crate defines the fundamental data model, store traits, and policy
//! logic that the entire quizgate system builds on.

pub mod attempt;
pub mod error;
pub mod model;
pub mod parser;
pub mod policy;
pub mod report;
pub mod scoring;
pub mod service;
pub mod session;
pub mod store;
