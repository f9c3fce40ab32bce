//! # pepsar Core Library
//!
//! A high-performance library for peptide sequence-activity-relationship (SAR)
//! statistics: per-(position, monomer) and per-cluster activity enrichment over
//! large categorical sequence datasets, and mutation-cliff mining.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Dataset`,
//!   `CategoricalColumn`, `BitMask`), pure statistical primitives (`compute_stats`,
//!   the Welch t-test), the derived-table data types, and I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates an analysis
//!   session. It owns the settings/invalidation machinery, the derived-table cache,
//!   the selection/filter synchronization, and the computational tasks that build
//!   the statistics tables and mine mutation cliffs.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to run complete analyses: validating a
//!   dataset, splitting sequences into position columns, and constructing a
//!   [`SarModel`](engine::model::SarModel) ready for interactive consumption.

pub mod core;
pub mod engine;
pub mod workflows;
