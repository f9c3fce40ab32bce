use crate::core::models::column::CategoricalColumn;
use crate::core::models::monomers;
use thiserror::Error;
use tracing::warn;

/// Column tag holding the sequence notation kind.
pub const UNITS_TAG: &str = "units";
/// Column tag holding the separator character for separated notation.
pub const SEPARATOR_TAG: &str = "separator";

pub const UNITS_SEPARATED: &str = "separated";
pub const UNITS_FASTA: &str = "fasta";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SplitError {
    #[error("Sequence column carries no notation tag")]
    MissingNotation,

    #[error("Unknown sequence notation '{0}'")]
    UnknownNotation(String),

    #[error("Separated notation requires a separator tag")]
    MissingSeparator,

    #[error("Separator must be a single character, got '{0}'")]
    InvalidSeparator(String),
}

/// How a sequence string decomposes into aligned monomers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceNotation {
    /// Monomers joined by a separator character; empty tokens are gaps.
    Separated(char),
    /// One character per position; `-` and `.` are gaps.
    Fasta,
}

impl SequenceNotation {
    /// Resolves the notation from the sequence column's tags.
    pub fn from_tags(units: Option<&str>, separator: Option<&str>) -> Result<Self, SplitError> {
        match units {
            None => Err(SplitError::MissingNotation),
            Some(UNITS_FASTA) => Ok(Self::Fasta),
            Some(UNITS_SEPARATED) => {
                let separator = separator.ok_or(SplitError::MissingSeparator)?;
                let mut chars = separator.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Separated(c)),
                    _ => Err(SplitError::InvalidSeparator(separator.to_string())),
                }
            }
            Some(other) => Err(SplitError::UnknownNotation(other.to_string())),
        }
    }

    fn tokenize<'a>(&self, sequence: &'a str) -> Vec<&'a str> {
        match *self {
            Self::Separated(sep) => sequence.split(sep).collect(),
            Self::Fasta => sequence
                .char_indices()
                .map(|(i, c)| {
                    if c == '-' || c == '.' {
                        monomers::GAP
                    } else {
                        &sequence[i..i + c.len_utf8()]
                    }
                })
                .collect(),
        }
    }
}

/// Splits a column of aligned sequences into one categorical column per
/// position, named "1".."N". Ragged sequences pad with the gap category.
pub fn split_to_positions(
    sequences: &CategoricalColumn,
    notation: &SequenceNotation,
) -> Vec<CategoricalColumn> {
    let rows = sequences.len();
    let mut tokenized: Vec<Vec<&str>> = Vec::with_capacity(rows);
    let mut max_positions = 0;
    for row in 0..rows {
        let tokens = notation.tokenize(sequences.value(row));
        max_positions = max_positions.max(tokens.len());
        tokenized.push(tokens);
    }

    let mut non_standard = 0usize;
    let mut columns = Vec::with_capacity(max_positions);
    for position in 0..max_positions {
        let values = tokenized
            .iter()
            .map(|tokens| *tokens.get(position).unwrap_or(&monomers::GAP));
        let column = CategoricalColumn::from_values(&(position + 1).to_string(), values);
        non_standard += column
            .categories()
            .iter()
            .filter(|c| !c.is_empty() && !monomers::is_standard(c))
            .count();
        columns.push(column);
    }

    if non_standard > 0 {
        warn!(
            count = non_standard,
            "Split produced non-standard monomer categories."
        );
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_resolves_from_tags() {
        assert_eq!(
            SequenceNotation::from_tags(Some("separated"), Some("-")),
            Ok(SequenceNotation::Separated('-'))
        );
        assert_eq!(
            SequenceNotation::from_tags(Some("fasta"), None),
            Ok(SequenceNotation::Fasta)
        );
        assert_eq!(
            SequenceNotation::from_tags(None, None),
            Err(SplitError::MissingNotation)
        );
        assert_eq!(
            SequenceNotation::from_tags(Some("helm"), None),
            Err(SplitError::UnknownNotation("helm".to_string()))
        );
        assert_eq!(
            SequenceNotation::from_tags(Some("separated"), None),
            Err(SplitError::MissingSeparator)
        );
        assert_eq!(
            SequenceNotation::from_tags(Some("separated"), Some("--")),
            Err(SplitError::InvalidSeparator("--".to_string()))
        );
    }

    #[test]
    fn separated_sequences_split_by_position() {
        let sequences = CategoricalColumn::from_values("sequence", ["A-B-C", "A-C-C", "A-B-D"]);
        let columns = split_to_positions(&sequences, &SequenceNotation::Separated('-'));

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name(), "1");
        assert_eq!(columns[2].name(), "3");
        assert_eq!(columns[0].categories(), &["A"]);
        assert_eq!(columns[1].value(0), "B");
        assert_eq!(columns[1].value(1), "C");
        assert_eq!(columns[2].value(2), "D");
    }

    #[test]
    fn fasta_sequences_split_by_character() {
        let sequences = CategoricalColumn::from_values("sequence", ["AKC", "A-C"]);
        let columns = split_to_positions(&sequences, &SequenceNotation::Fasta);

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].value(0), "K");
        assert_eq!(columns[1].value(1), "");
    }

    #[test]
    fn ragged_sequences_pad_with_gaps() {
        let sequences = CategoricalColumn::from_values("sequence", ["A-B-C", "A"]);
        let columns = split_to_positions(&sequences, &SequenceNotation::Separated('-'));

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].value(1), "");
        assert_eq!(columns[2].value(1), "");
    }

    #[test]
    fn empty_separated_tokens_become_gaps() {
        let sequences = CategoricalColumn::from_values("sequence", ["A--C", "A-B-C"]);
        let columns = split_to_positions(&sequences, &SequenceNotation::Separated('-'));

        assert_eq!(columns[1].value(0), "");
        assert_eq!(columns[1].value(1), "B");
    }

    #[test]
    fn fasta_dot_is_also_a_gap() {
        let sequences = CategoricalColumn::from_values("sequence", ["A.C"]);
        let columns = split_to_positions(&sequences, &SequenceNotation::Fasta);
        assert_eq!(columns[1].value(0), "");
    }
}
