//! The in-memory observational table a search runs over.

use crate::graph::VarId;
use std::collections::HashSet;
use thiserror::Error;

/// Reasons a table cannot be used as a search input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Dataset has no variables")]
    NoVariables,
    #[error("Dataset has no observations")]
    NoRows,
    #[error("Column '{name}' has {actual} rows, expected {expected}")]
    RaggedColumns { name: String, expected: usize, actual: usize },
    #[error("Variable '{0}' appears more than once")]
    DuplicateVariable(String),
    #[error("Column '{name}' holds a non-finite value at row {row}")]
    NonFinite { name: String, row: usize },
}

/// A rectangular numeric table: rows are observations, columns are named variables.
///
/// Columns are stored in ascending name order regardless of input order, so a
/// variable's `VarId` is its rank by name.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Dataset {
    /// Builds a dataset from `(name, column)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut named: Vec<(String, Vec<f64>)> = columns.into_iter().map(|(n, c)| (n.into(), c)).collect();
        if named.is_empty() {
            return Err(DatasetError::NoVariables);
        }

        let mut seen = HashSet::with_capacity(named.len());
        for (name, _) in &named {
            if !seen.insert(name.as_str()) {
                return Err(DatasetError::DuplicateVariable(name.clone()));
            }
        }

        let rows = named[0].1.len();
        if rows == 0 {
            return Err(DatasetError::NoRows);
        }
        for (name, col) in &named {
            if col.len() != rows {
                return Err(DatasetError::RaggedColumns { name: name.clone(), expected: rows, actual: col.len() });
            }
            if let Some(row) = col.iter().position(|x| !x.is_finite()) {
                return Err(DatasetError::NonFinite { name: name.clone(), row });
            }
        }

        named.sort_by(|a, b| a.0.cmp(&b.0));
        let (names, columns) = named.into_iter().unzip();
        Ok(Self { names, columns, rows })
    }

    /// Builds a dataset from a header and row-major records.
    pub fn from_rows<S: AsRef<str>>(header: &[S], records: &[Vec<f64>]) -> Result<Self, DatasetError> {
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len()); header.len()];
        for (r, record) in records.iter().enumerate() {
            if record.len() != header.len() {
                return Err(DatasetError::RaggedColumns {
                    name: format!("row {}", r),
                    expected: header.len(),
                    actual: record.len(),
                });
            }
            for (c, &value) in record.iter().enumerate() {
                columns[c].push(value);
            }
        }
        Self::from_columns(header.iter().map(|h| h.as_ref().to_string()).zip(columns))
    }

    pub fn n_rows(&self) -> usize { self.rows }
    pub fn n_vars(&self) -> usize { self.names.len() }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.names.len()).map(VarId::new)
    }

    /// Variable names in `VarId` order.
    pub fn names(&self) -> &[String] { &self.names }

    pub fn name(&self, id: VarId) -> &str { &self.names[id.index()] }

    pub fn var(&self, name: &str) -> Option<VarId> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok().map(VarId::new)
    }

    pub fn column(&self, id: VarId) -> &[f64] { &self.columns[id.index()] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_columns_are_sorted_by_name() {
        let ds = Dataset::from_columns([("b", vec![1.0, 2.0]), ("a", vec![3.0, 4.0])]).unwrap();
        assert_eq!(ds.names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ds.var("b"), Some(VarId(1)));
        assert_eq!(ds.column(VarId(0)), &[3.0, 4.0]);
        assert_eq!(ds.var("zzz"), None);
    }

    #[test]
    fn test_from_rows_transposes() {
        let ds = Dataset::from_rows(&["y", "x"], &[vec![1.0, 10.0], vec![2.0, 20.0]]).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column(ds.var("x").unwrap()), &[10.0, 20.0]);
    }

    #[rstest]
    #[case(vec![], DatasetError::NoVariables)]
    #[case(vec![("a", vec![])], DatasetError::NoRows)]
    #[case(vec![("a", vec![1.0]), ("a", vec![2.0])], DatasetError::DuplicateVariable("a".into()))]
    #[case(
        vec![("a", vec![1.0, 2.0]), ("b", vec![1.0])],
        DatasetError::RaggedColumns { name: "b".into(), expected: 2, actual: 1 }
    )]
    #[case(vec![("a", vec![1.0, f64::NAN])], DatasetError::NonFinite { name: "a".into(), row: 1 })]
    fn test_rejects_malformed_tables(#[case] cols: Vec<(&str, Vec<f64>)>, #[case] expected: DatasetError) {
        assert_eq!(Dataset::from_columns(cols).unwrap_err(), expected);
    }
}
