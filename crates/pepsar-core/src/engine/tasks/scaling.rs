use crate::engine::config::ActivityScaling;
use crate::engine::error::EngineError;
use tracing::debug;

/// Applies the configured scaling to the raw activity array.
///
/// Log scalings require strictly positive inputs; the first offending row
/// aborts with a domain error so no partially scaled array is ever observed.
pub fn run(raw: &[f64], scaling: ActivityScaling) -> Result<Vec<f64>, EngineError> {
    if scaling != ActivityScaling::None {
        if let Some(row) = raw.iter().position(|&v| v <= 0.0) {
            return Err(EngineError::ScalingDomain {
                row,
                value: raw[row],
                scaling: scaling.label().to_string(),
            });
        }
    }

    debug!(rows = raw.len(), scaling = scaling.label(), "Scaling activity column.");
    Ok(raw.iter().map(|&v| scaling.apply(v)).collect())
}
