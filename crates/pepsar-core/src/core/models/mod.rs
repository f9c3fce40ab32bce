//! # Tabular Data Models
//!
//! Read-only column stores, bit-packed row masks, and the dataset abstraction
//! the engine layer computes against.
//!
//! The hot paths of the statistics tasks only ever touch the raw numeric arrays
//! exposed here (`CategoricalColumn::raw_data`, `BitMask` blocks); full strings
//! are materialized solely at construction and presentation boundaries.

pub mod column;
pub mod dataset;
pub mod mask;
pub mod monomers;
