//! The model feature table and its dense row-major matrix.

use crate::error::{Error, Result};
use crate::flight::RiskLevel;

use super::table::Table;

/// Dense row-major matrix of feature values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the buffer length is not
    /// `n_rows * n_cols`.
    pub fn from_vec(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Result<Self> {
        if data.len() != n_rows * n_cols {
            return Err(Error::internal(format!(
                "feature buffer holds {} values, expected {n_rows} x {n_cols}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Build a matrix from equally sized rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the rows differ in length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(Error::internal("feature rows differ in length"));
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(data, rows.len(), n_cols)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of feature columns.
    #[inline]
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Check if the matrix has no rows or no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.n_cols == 0
    }

    /// One row of features.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// A single value.
    #[inline]
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |r| self.row(r))
    }
}

/// Feature table split into the feature matrix and the label column.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    names: Vec<String>,
    matrix: FeatureMatrix,
    label_column: String,
    /// Raw label cells; `None` when the table has no label column.
    raw_labels: Option<Vec<String>>,
}

impl FeatureStore {
    /// Split a feature table on `label_column`.
    ///
    /// The label column is excluded from the features when present; otherwise
    /// every column is a feature. Label cells stay unparsed until
    /// [`FeatureStore::labels`] is called, so a table without labels can still
    /// be inspected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if a feature cell is not a finite number.
    pub fn from_table(table: &Table, label_column: &str) -> Result<Self> {
        let label_idx = table.column_index(label_column);
        let feature_cols: Vec<usize> = (0..table.headers().len())
            .filter(|&c| Some(c) != label_idx)
            .collect();
        let names = feature_cols
            .iter()
            .map(|&c| table.headers()[c].clone())
            .collect();

        let mut data = Vec::with_capacity(table.len() * feature_cols.len());
        for row in 0..table.len() {
            for &col in &feature_cols {
                data.push(table.float(row, col)?);
            }
        }
        let matrix = FeatureMatrix::from_vec(data, table.len(), feature_cols.len())?;

        let raw_labels = label_idx.map(|col| {
            (0..table.len())
                .map(|row| table.cell(row, col).to_string())
                .collect()
        });

        Ok(Self {
            names,
            matrix,
            label_column: label_column.to_string(),
            raw_labels,
        })
    }

    /// Assemble a store from parts already in memory.
    #[must_use]
    pub fn from_parts(
        names: Vec<String>,
        matrix: FeatureMatrix,
        label_column: impl Into<String>,
        labels: Option<&[RiskLevel]>,
    ) -> Self {
        Self {
            names,
            matrix,
            label_column: label_column.into(),
            raw_labels: labels.map(|l| l.iter().map(|r| r.index().to_string()).collect()),
        }
    }

    /// Feature column names in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The feature matrix.
    #[must_use]
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrix.n_rows()
    }

    /// Check if the store has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrix.n_rows() == 0
    }

    /// Whether the label column was present.
    #[must_use]
    pub fn has_labels(&self) -> bool {
        self.raw_labels.is_some()
    }

    /// Parse the label column into risk classes.
    ///
    /// Labels may be written as `2` or `2.0`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingColumn`] if the table had no label column
    /// - [`Error::MissingLabel`] for an empty or `NaN` cell
    /// - [`Error::InvalidLabel`] for anything other than 0, 1 or 2
    pub fn labels(&self) -> Result<Vec<RiskLevel>> {
        let raw = self.raw_labels.as_ref().ok_or_else(|| Error::MissingColumn {
            table: "feature",
            column: self.label_column.clone(),
        })?;

        raw.iter()
            .enumerate()
            .map(|(row, cell)| self.parse_label(row, cell))
            .collect()
    }

    fn parse_label(&self, row: usize, cell: &str) -> Result<RiskLevel> {
        if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
            return Err(Error::MissingLabel {
                column: self.label_column.clone(),
                row,
            });
        }
        let invalid = || Error::InvalidLabel {
            row,
            value: cell.to_string(),
        };
        let value: f64 = cell.parse().map_err(|_| invalid())?;
        if value.fract() != 0.0 || !(0.0..=2.0).contains(&value) {
            return Err(invalid());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = value as usize;
        RiskLevel::from_index(index).ok_or_else(invalid)
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, FeatureMatrix) {
        (self.names, self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(csv: &str) -> FeatureStore {
        let table = Table::from_reader("feature", csv.as_bytes()).unwrap();
        FeatureStore::from_table(&table, "Risk_Level_Num").unwrap()
    }

    #[test]
    fn test_matrix_from_rows() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert!((m.value(0, 1) - 2.0).abs() < f64::EPSILON);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn test_matrix_ragged_rows() {
        let result = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[test]
    fn test_matrix_wrong_buffer_size() {
        assert!(FeatureMatrix::from_vec(vec![1.0; 5], 2, 3).is_err());
    }

    #[test]
    fn test_zero_width_matrix() {
        let m = FeatureMatrix::from_vec(Vec::new(), 4, 0).unwrap();
        assert!(m.is_empty());
        assert!(m.rows().all(<[f64]>::is_empty));
    }

    #[test]
    fn test_label_column_excluded() {
        let s = store("Wind,Risk_Level_Num,Vis\n0.5,2,-1.0\n-0.5,0.0,1.0\n");
        assert_eq!(s.names(), ["Wind", "Vis"]);
        assert_eq!(s.matrix().row(0), &[0.5, -1.0]);
        assert!(s.has_labels());
        assert_eq!(s.labels().unwrap(), vec![RiskLevel::High, RiskLevel::Low]);
    }

    #[test]
    fn test_without_label_column_all_columns_are_features() {
        let s = store("Wind,Vis\n0.5,1\n");
        assert_eq!(s.names().len(), 2);
        assert!(!s.has_labels());
        assert!(matches!(s.labels(), Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn test_missing_label_value() {
        let s = store("Wind,Risk_Level_Num\n0.5,1\n0.7,\n");
        let err = s.labels().unwrap_err();
        assert!(matches!(err, Error::MissingLabel { row: 1, .. }));
    }

    #[test]
    fn test_nan_label_is_missing() {
        let s = store("Wind,Risk_Level_Num\n0.5,NaN\n");
        assert!(matches!(s.labels(), Err(Error::MissingLabel { row: 0, .. })));
    }

    #[test]
    fn test_out_of_range_label() {
        let s = store("Wind,Risk_Level_Num\n0.5,3\n");
        assert!(matches!(s.labels(), Err(Error::InvalidLabel { .. })));

        let s = store("Wind,Risk_Level_Num\n0.5,1.5\n");
        assert!(matches!(s.labels(), Err(Error::InvalidLabel { .. })));

        let s = store("Wind,Risk_Level_Num\n0.5,high\n");
        assert!(matches!(s.labels(), Err(Error::InvalidLabel { .. })));
    }

    #[test]
    fn test_non_numeric_feature() {
        let table =
            Table::from_reader("feature", "Wind,Risk_Level_Num\nstrong,1\n".as_bytes()).unwrap();
        let err = FeatureStore::from_table(&table, "Risk_Level_Num").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { table: "feature", .. }));
    }

    #[test]
    fn test_from_parts_round_trips_labels() {
        let matrix = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let labels = [RiskLevel::Medium, RiskLevel::High];
        let s = FeatureStore::from_parts(vec!["x".into()], matrix, "label", Some(&labels));
        assert_eq!(s.labels().unwrap(), labels);
        assert_eq!(s.len(), 2);
    }
}
