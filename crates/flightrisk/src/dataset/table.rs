//! Raw CSV tables with header lookup and typed cell access.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{Error, Result};

/// A parsed CSV table: one header row plus string cells.
#[derive(Debug, Clone)]
pub struct Table {
    /// Short name used in error messages ("record", "feature").
    name: &'static str,
    /// Where the table came from.
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Read a table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid CSV
    /// (including rows whose width differs from the header).
    pub fn from_path(name: &'static str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Reading {} table from {}", name, path.display());
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(&path)
            .map_err(|source| Error::TableRead {
                path: path.clone(),
                source,
            })?;
        Self::collect(name, path, reader)
    }

    /// Read a table from any reader. Used for in-memory tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid CSV.
    pub fn from_reader<R: Read>(name: &'static str, input: R) -> Result<Self> {
        let reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
        Self::collect(name, PathBuf::from("<memory>"), reader)
    }

    fn collect<R: Read>(
        name: &'static str,
        path: PathBuf,
        mut reader: csv::Reader<R>,
    ) -> Result<Self> {
        let headers = match reader.headers() {
            Ok(headers) => headers.iter().map(str::to_string).collect(),
            Err(source) => return Err(Error::TableRead { path, source }),
        };

        let rows = match reader.records().collect::<std::result::Result<Vec<_>, _>>() {
            Ok(rows) => rows,
            Err(source) => return Err(Error::TableRead { path, source }),
        };

        Ok(Self {
            name,
            path,
            headers,
            rows,
        })
    }

    /// Table name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Source path, or `<memory>` for tables read from a reader.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a column that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if the column does not exist.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column).ok_or_else(|| Error::MissingColumn {
            table: self.name,
            column: column.to_string(),
        })
    }

    /// Raw text of a cell. Missing trailing cells read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or("")
    }

    /// Parse a cell as a finite float.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for empty, non-numeric or non-finite cells.
    pub fn float(&self, row: usize, column: usize) -> Result<f64> {
        let raw = self.cell(row, column);
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(row, column)),
        }
    }

    /// Parse a cell as an integer; `3` and `3.0` are both accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the cell is not a whole number.
    pub fn integer(&self, row: usize, column: usize) -> Result<i64> {
        let raw = self.cell(row, column);
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(value);
        }
        let value = self.float(row, column)?;
        if value.fract() != 0.0 || value.abs() >= 9.0e15 {
            return Err(self.invalid(row, column));
        }
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        Ok(whole)
    }

    /// Build an [`Error::InvalidValue`] for a cell.
    #[must_use]
    pub fn invalid(&self, row: usize, column: usize) -> Error {
        Error::invalid_value(
            self.name,
            row,
            self.headers.get(column).map_or("", String::as_str),
            self.cell(row, column),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_reader("test", csv.as_bytes()).expect("valid csv")
    }

    #[test]
    fn test_headers_and_rows() {
        let t = table("a,b,c\n1,2,3\n4,5,6\n");
        assert_eq!(t.headers(), ["a", "b", "c"]);
        assert_eq!(t.len(), 2);
        assert!(!t.is_empty());
        assert_eq!(t.cell(1, 2), "6");
        assert_eq!(t.path(), Path::new("<memory>"));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let t = table("a,b\n");
        assert!(t.is_empty());
        assert_eq!(t.headers().len(), 2);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let t = table("name, value\n Delhi , 2.5 \n");
        assert_eq!(t.column_index("value"), Some(1));
        assert_eq!(t.cell(0, 0), "Delhi");
        assert!((t.float(0, 1).unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_require_column() {
        let t = table("a,b\n1,2\n");
        assert_eq!(t.require_column("b").unwrap(), 1);

        let err = t.require_column("z").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { table: "test", .. }));
    }

    #[test]
    fn test_float_rejects_garbage() {
        let t = table("x,y\nabc,1\n,2\n");
        assert!(matches!(t.float(0, 0), Err(Error::InvalidValue { .. })));
        assert!(matches!(t.float(1, 0), Err(Error::InvalidValue { .. })));
        assert!((t.float(1, 1).unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_float_rejects_nan() {
        let t = table("x,y\nNaN,1\n");
        let err = t.float(0, 0).unwrap_err();
        assert!(err.to_string().contains("'NaN'"));
    }

    #[test]
    fn test_integer_accepts_float_notation() {
        let t = table("code\n3\n3.0\n-2\n3.5\n");
        assert_eq!(t.integer(0, 0).unwrap(), 3);
        assert_eq!(t.integer(1, 0).unwrap(), 3);
        assert_eq!(t.integer(2, 0).unwrap(), -2);
        assert!(t.integer(3, 0).is_err());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let result = Table::from_reader("test", "a,b\n1,2,3\n".as_bytes());
        assert!(matches!(result, Err(Error::TableRead { .. })));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Table::from_path("record", "/nonexistent/table.csv");
        assert!(matches!(result, Err(Error::TableRead { .. })));
    }
}
