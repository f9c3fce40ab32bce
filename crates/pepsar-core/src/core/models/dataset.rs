use super::column::{BooleanColumn, CategoricalColumn, NumericColumn};
use super::mask::BitMask;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DatasetError {
    #[error("Column '{column}' has {actual} rows, dataset has {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Dataset already has a column named '{0}'")]
    DuplicateColumn(String),
}

#[derive(Debug, Clone)]
pub enum Column {
    Categorical(CategoricalColumn),
    Numeric(NumericColumn),
    Boolean(BooleanColumn),
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Categorical(c) => c.name(),
            Column::Numeric(c) => c.name(),
            Column::Boolean(c) => c.name(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(c) => c.len(),
            Column::Numeric(c) => c.len(),
            Column::Boolean(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_categorical(&self) -> Option<&CategoricalColumn> {
        match self {
            Column::Categorical(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericColumn> {
        match self {
            Column::Numeric(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<&BooleanColumn> {
        match self {
            Column::Boolean(c) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskChange {
    Selection,
    Filter,
}

pub type ChangeCallback = Box<dyn Fn(MaskChange) + Send + Sync>;

/// Observer list for mask changes.
///
/// Bulk edits go through the dataset's `edit_*`/`set_*` methods, which fire a
/// single event per edit rather than one per bit toggled.
#[derive(Default)]
struct ChangeNotifier {
    callbacks: Vec<ChangeCallback>,
}

impl ChangeNotifier {
    fn subscribe(&mut self, callback: ChangeCallback) {
        self.callbacks.push(callback);
    }

    fn notify(&self, change: MaskChange) {
        for callback in &self.callbacks {
            callback(change);
        }
    }
}

/// The working table of one analysis session: named columns, the long-lived
/// selection and filter masks, and string tag storage used to persist state
/// across sessions.
///
/// The dataset is the single source of truth for row count, selection, and
/// filter state; the engine writes masks back here instead of keeping private
/// copies.
pub struct Dataset {
    name: String,
    row_count: usize,
    columns: Vec<Column>,
    selection: BitMask,
    filter: BitMask,
    tags: HashMap<String, String>,
    column_tags: HashMap<String, HashMap<String, String>>,
    notifier: ChangeNotifier,
}

impl Dataset {
    pub fn new(name: &str, row_count: usize) -> Self {
        Self {
            name: name.to_string(),
            row_count,
            columns: Vec::new(),
            selection: BitMask::new(row_count),
            filter: BitMask::filled(row_count, true),
            tags: HashMap::new(),
            column_tags: HashMap::new(),
            notifier: ChangeNotifier::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn add_column(&mut self, column: Column) -> Result<(), DatasetError> {
        if column.len() != self.row_count {
            return Err(DatasetError::ColumnLengthMismatch {
                column: column.name().to_string(),
                expected: self.row_count,
                actual: column.len(),
            });
        }
        if self.column(column.name()).is_some() {
            return Err(DatasetError::DuplicateColumn(column.name().to_string()));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn selection(&self) -> &BitMask {
        &self.selection
    }

    pub fn filter(&self) -> &BitMask {
        &self.filter
    }

    /// Replaces the selection mask wholesale and fires one change event.
    pub fn set_selection(&mut self, mask: BitMask) {
        assert_eq!(mask.len(), self.row_count, "selection mask length mismatch");
        self.selection = mask;
        self.notifier.notify(MaskChange::Selection);
    }

    /// Replaces the filter mask wholesale and fires one change event.
    pub fn set_filter(&mut self, mask: BitMask) {
        assert_eq!(mask.len(), self.row_count, "filter mask length mismatch");
        self.filter = mask;
        self.notifier.notify(MaskChange::Filter);
    }

    /// Runs `edit` against the selection mask, then fires one change event.
    pub fn edit_selection(&mut self, edit: impl FnOnce(&mut BitMask)) {
        edit(&mut self.selection);
        self.notifier.notify(MaskChange::Selection);
    }

    /// Runs `edit` against the filter mask, then fires one change event.
    pub fn edit_filter(&mut self, edit: impl FnOnce(&mut BitMask)) {
        edit(&mut self.filter);
        self.notifier.notify(MaskChange::Filter);
    }

    pub fn on_mask_change(&mut self, callback: ChangeCallback) {
        self.notifier.subscribe(callback);
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn set_tag(&mut self, key: &str, value: &str) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    pub fn column_tag(&self, column: &str, key: &str) -> Option<&str> {
        self.column_tags
            .get(column)
            .and_then(|tags| tags.get(key))
            .map(String::as_str)
    }

    pub fn set_column_tag(&mut self, column: &str, key: &str, value: &str) {
        self.column_tags
            .entry(column.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }
}
