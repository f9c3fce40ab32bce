use crate::core::models::column::{CategoricalColumn, NumericColumn};
use crate::core::models::dataset::{Column, Dataset, DatasetError};
use crate::core::stats::tables::{ClusterTypeStats, MonomerPositionStats, MutationCliffs};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CsvIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File has no header row: {0}")]
    MissingHeader(String),

    #[error("Record on line {line} has {actual} fields, header has {expected}")]
    InconsistentRecord {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Loads a dataset from a headered CSV file.
///
/// A column whose every non-empty cell parses as `f64` (with at least one
/// non-empty cell) loads as numeric, empty cells becoming NaN; everything
/// else loads as categorical.
pub fn read_dataset(path: &Path) -> Result<Dataset, CsvIoError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(CsvIoError::MissingHeader(path.display().to_string()));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(CsvIoError::InconsistentRecord {
                line: index + 2,
                expected: headers.len(),
                actual: record.len(),
            });
        }
        for (column, value) in record.iter().enumerate() {
            cells[column].push(value.trim().to_string());
        }
    }

    let row_count = cells.first().map_or(0, Vec::len);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let mut dataset = Dataset::new(&name, row_count);

    for (header, values) in headers.iter().zip(cells) {
        dataset.add_column(infer_column(header, values))?;
    }

    debug!(
        rows = row_count,
        columns = dataset.columns().len(),
        "Loaded dataset from CSV."
    );
    Ok(dataset)
}

fn infer_column(name: &str, values: Vec<String>) -> Column {
    let mut any_number = false;
    let all_numeric = values.iter().all(|v| {
        if v.is_empty() {
            true
        } else {
            let ok = v.parse::<f64>().is_ok();
            any_number |= ok;
            ok
        }
    });

    if all_numeric && any_number {
        Column::Numeric(NumericColumn::new(
            name,
            values
                .iter()
                .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        ))
    } else {
        Column::Categorical(CategoricalColumn::from_values(name, values))
    }
}

/// Writes the monomer-position table as flat CSV rows:
/// position, monomer, count, mean_difference, p_value, ratio.
pub fn write_monomer_position_stats(
    path: &Path,
    stats: &MonomerPositionStats,
) -> Result<(), CsvIoError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["position", "monomer", "count", "mean_difference", "p_value", "ratio"])?;

    let mut positions: Vec<_> = stats.positions.iter().collect();
    positions.sort_by(|(a, _), (b, _)| natural_position_order(a, b));
    for (position, position_stats) in positions {
        let mut monomers: Vec<_> = position_stats.monomers.iter().collect();
        monomers.sort_by_key(|(monomer, _)| monomer.as_str());
        for (monomer, s) in monomers {
            writer.write_record(&[
                position.clone(),
                monomer.clone(),
                s.count.to_string(),
                s.mean_difference.to_string(),
                s.p_value.to_string(),
                s.ratio.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes cluster statistics as flat CSV rows:
/// partition, cluster, count, mean_difference, p_value, ratio.
pub fn write_cluster_stats(path: &Path, stats: &ClusterTypeStats) -> Result<(), CsvIoError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["partition", "cluster", "count", "mean_difference", "p_value", "ratio"])?;

    for (partition, clusters) in [("original", &stats.original), ("custom", &stats.custom)] {
        let mut names: Vec<_> = clusters.iter().collect();
        names.sort_by_key(|(name, _)| name.as_str());
        for (name, s) in names {
            writer.write_record(&[
                partition.to_string(),
                name.clone(),
                s.count.to_string(),
                s.mean_difference.to_string(),
                s.p_value.to_string(),
                s.ratio.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes mutation-cliff tuples as flat CSV rows:
/// monomer, position, reference_row, other_row.
pub fn write_mutation_cliff_pairs(path: &Path, cliffs: &MutationCliffs) -> Result<(), CsvIoError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["monomer", "position", "reference_row", "other_row"])?;
    for (monomer, position, reference, other) in cliffs.flat_pairs() {
        writer.write_record(&[
            monomer.to_string(),
            position.to_string(),
            reference.to_string(),
            other.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

// Position names are usually numeric ("1".."N"); sort those numerically and
// fall back to lexicographic for anything else.
fn natural_position_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<usize>(), b.parse::<usize>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
