use thiserror::Error;

/// A read-only table of named numeric columns.
///
/// Rows are observations, columns are named attributes. The target vector
/// lives outside the table and is aligned with it by row.
#[derive(Debug, Clone)]
pub struct FeatureTable<'a> {
    names: Vec<&'a str>,
    columns: Vec<&'a [f64]>,
}

impl<'a> FeatureTable<'a> {
    pub fn new(columns: Vec<(&'a str, &'a [f64])>) -> Result<Self, TableError> {
        if columns.is_empty() || columns[0].1.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let rows_len = columns[0].1.len();
        if columns.iter().skip(1).any(|(_, c)| c.len() != rows_len) {
            return Err(TableError::RowSizeMismatch);
        }

        let (names, columns) = columns.into_iter().unzip();
        Ok(Self { names, columns })
    }

    pub fn rows_len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn column(&self, name: &str) -> Result<&'a [f64], TableError> {
        self.names
            .iter()
            .position(|&n| n == name)
            .map(|i| self.columns[i])
            .ok_or_else(|| TableError::MissingColumn(name.to_owned()))
    }

    pub fn select(&self, names: &[&str]) -> Result<Vec<&'a [f64]>, TableError> {
        names.iter().map(|name| self.column(name)).collect()
    }
}

#[derive(Debug, Error, Clone)]
pub enum TableError {
    #[error("table must have at least one column and one row")]
    EmptyTable,

    #[error("some of columns have a different row count from others")]
    RowSizeMismatch,

    #[error("column {0:?} is not present in the feature table")]
    MissingColumn(String),
}
