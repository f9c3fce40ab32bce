//! # Workflows Module
//!
//! The user-facing entry points of the library, tying `core` and `engine`
//! together into complete procedures.
//!
//! - [`analyze`] - Validate a dataset, split its sequence column, and start a
//!   [`SarModel`](crate::engine::model::SarModel) session
//! - [`mine`] - Run the mutation-cliff miner on its own against ad-hoc inputs

pub mod analyze;
pub mod mine;
