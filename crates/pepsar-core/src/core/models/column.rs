use super::mask::BitMask;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ColumnError {
    #[error("Category index {index} out of range for {count} categories in column '{column}'")]
    CategoryIndexOutOfRange {
        column: String,
        index: u32,
        count: usize,
    },
}

/// A read-only view over a categorical column: a dictionary of distinct values
/// plus a dense row → category-id array.
///
/// The empty string is a valid category and represents a gap ("no monomer at
/// this position"). Instances are immutable for the duration of one analysis
/// session and are rebuilt if the source column changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalColumn {
    name: String,
    categories: Vec<String>,
    raw: Vec<u32>,
}

impl CategoricalColumn {
    /// Builds the category dictionary in first-appearance order.
    pub fn from_values<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories: Vec<String> = Vec::new();
        let mut index: HashMap<String, u32> = HashMap::new();
        let mut raw = Vec::new();
        for value in values {
            let value = value.as_ref();
            let id = match index.get(value) {
                Some(&id) => id,
                None => {
                    let id = categories.len() as u32;
                    categories.push(value.to_string());
                    index.insert(value.to_string(), id);
                    id
                }
            };
            raw.push(id);
        }
        Self {
            name: name.to_string(),
            categories,
            raw,
        }
    }

    /// Assembles a column from a prebuilt dictionary and raw id array,
    /// validating that every id indexes the dictionary.
    pub fn from_parts(
        name: &str,
        categories: Vec<String>,
        raw: Vec<u32>,
    ) -> Result<Self, ColumnError> {
        if let Some(&bad) = raw.iter().find(|&&id| id as usize >= categories.len()) {
            return Err(ColumnError::CategoryIndexOutOfRange {
                column: name.to_string(),
                index: bad,
                count: categories.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            categories,
            raw,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn raw_data(&self) -> &[u32] {
        &self.raw
    }

    pub fn value(&self, row: usize) -> &str {
        &self.categories[self.raw[row] as usize]
    }

    pub fn category_index(&self, value: &str) -> Option<u32> {
        self.categories
            .iter()
            .position(|c| c == value)
            .map(|i| i as u32)
    }

    /// Mask of rows whose category id equals `id`.
    pub fn category_mask(&self, id: u32) -> BitMask {
        let mut mask = BitMask::new(self.raw.len());
        for (row, &value) in self.raw.iter().enumerate() {
            if value == id {
                mask.set(row, true);
            }
        }
        mask
    }

    /// Mask of rows whose value equals `value`, or `None` for an unknown category.
    pub fn value_mask(&self, value: &str) -> Option<BitMask> {
        self.category_index(value).map(|id| self.category_mask(id))
    }
}

/// A numeric column, the activity source of an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    name: String,
    values: Vec<f64>,
}

impl NumericColumn {
    pub fn new(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the first non-finite entry, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_finite())
    }
}

/// A boolean membership column, used for user-drawn custom clusters.
///
/// The owned bits double as a mask source: `as_mask` is a pure borrow and the
/// column is never mutated through the mask view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanColumn {
    name: String,
    data: BitMask,
}

impl BooleanColumn {
    pub fn new(name: &str, data: BitMask) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_mask(&self) -> &BitMask {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_assigns_ids_in_first_appearance_order() {
        let col = CategoricalColumn::from_values("pos", ["B", "A", "B", "", "A"]);
        assert_eq!(col.categories(), &["B", "A", ""]);
        assert_eq!(col.raw_data(), &[0, 1, 0, 2, 1]);
        assert_eq!(col.len(), 5);
    }

    #[test]
    fn value_resolves_through_dictionary() {
        let col = CategoricalColumn::from_values("pos", ["X", "Y", "X"]);
        assert_eq!(col.value(0), "X");
        assert_eq!(col.value(1), "Y");
        assert_eq!(col.value(2), "X");
    }

    #[test]
    fn category_index_finds_known_values_only() {
        let col = CategoricalColumn::from_values("pos", ["A", "C"]);
        assert_eq!(col.category_index("A"), Some(0));
        assert_eq!(col.category_index("C"), Some(1));
        assert_eq!(col.category_index("W"), None);
    }

    #[test]
    fn category_mask_marks_matching_rows() {
        let col = CategoricalColumn::from_values("pos", ["A", "B", "A", "B", "A"]);
        let mask = col.value_mask("A").unwrap();
        assert_eq!(mask.ones(), vec![0, 2, 4]);
        assert!(col.value_mask("Z").is_none());
    }

    #[test]
    fn empty_string_is_a_regular_category() {
        let col = CategoricalColumn::from_values("pos", ["A", "", "A", ""]);
        let gaps = col.value_mask("").unwrap();
        assert_eq!(gaps.ones(), vec![1, 3]);
    }

    #[test]
    fn from_parts_validates_raw_ids() {
        let ok = CategoricalColumn::from_parts(
            "pos",
            vec!["A".to_string(), "B".to_string()],
            vec![0, 1, 0],
        );
        assert!(ok.is_ok());

        let bad = CategoricalColumn::from_parts("pos", vec!["A".to_string()], vec![0, 1]);
        assert!(matches!(
            bad,
            Err(ColumnError::CategoryIndexOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn numeric_column_reports_first_non_finite() {
        let ok = NumericColumn::new("activity", vec![1.0, 2.0, 3.0]);
        assert_eq!(ok.first_non_finite(), None);

        let bad = NumericColumn::new("activity", vec![1.0, f64::NAN, 3.0]);
        assert_eq!(bad.first_non_finite(), Some(1));
    }

    #[test]
    fn boolean_column_exposes_bits_as_borrowed_mask() {
        let mut bits = BitMask::new(4);
        bits.set(1, true);
        bits.set(3, true);
        let col = BooleanColumn::new("cluster-a", bits);
        assert_eq!(col.as_mask().ones(), vec![1, 3]);
        assert_eq!(col.len(), 4);
    }
}
