//! Embeddable prioritize and extract pipelines for recprio.
//!
//! This crate provides I/O-agnostic pipeline entry points that can be driven
//! by the CLI, by tests, or by any embedding application.
//!
//! # Port traits
//!
//! - [`ports::RecordSource`]: load the recommendation table
//! - [`ports::WritePort`]: write artifacts
//!
//! Default filesystem-backed implementations are in [`adapters`].
//!
//! # Entry points
//!
//! - [`pipeline::run_prioritize`] / [`pipeline::write_prioritize_artifacts`]
//! - [`pipeline::run_extract`] / [`pipeline::write_extract_artifacts`]

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{
    ExtractOutcome, PrioritizeOutcome, ToolError, run_extract, run_prioritize,
    write_extract_artifacts, write_prioritize_artifacts,
};
pub use settings::{ExtractSettings, PrioritizeSettings};
