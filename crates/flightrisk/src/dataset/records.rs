//! The human-readable record table.

use crate::error::Result;
use crate::flight::FlightRecord;

use super::table::Table;

/// Column holding the encoded airline.
pub const AIRLINE_COLUMN: &str = "Airline";
/// Column holding the departure airport name.
pub const SOURCE_COLUMN: &str = "Source_Airport_Full";
/// Column holding the arrival airport name.
pub const DESTINATION_COLUMN: &str = "Destination_Airport_Full";
/// Column holding wind speed in km/h.
pub const WIND_COLUMN: &str = "Wind_Speed";
/// Column holding visibility in km.
pub const VISIBILITY_COLUMN: &str = "Visibility_km";
/// Column holding the 0/1 storm flag.
pub const STORM_COLUMN: &str = "Storm";

/// Decoded flight records in table order. Position is the record identifier.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<FlightRecord>,
}

impl RecordStore {
    /// Decode every row of a record table.
    ///
    /// Columns other than the six known ones are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or a numeric cell
    /// does not parse.
    pub fn from_table(table: &Table) -> Result<Self> {
        let airline = table.require_column(AIRLINE_COLUMN)?;
        let source = table.require_column(SOURCE_COLUMN)?;
        let destination = table.require_column(DESTINATION_COLUMN)?;
        let wind = table.require_column(WIND_COLUMN)?;
        let visibility = table.require_column(VISIBILITY_COLUMN)?;
        let storm = table.require_column(STORM_COLUMN)?;

        let records = (0..table.len())
            .map(|row| {
                Ok(FlightRecord {
                    airline_code: table.integer(row, airline)?,
                    source: table.cell(row, source).to_string(),
                    destination: table.cell(row, destination).to_string(),
                    wind_speed: table.float(row, wind)?,
                    visibility_km: table.float(row, visibility)?,
                    storm: (table.float(row, storm)? - 1.0).abs() < f64::EPSILON,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FlightRecord> {
        self.records.get(index)
    }

    pub(crate) fn into_records(self) -> Vec<FlightRecord> {
        self.records
    }
}

impl From<Vec<FlightRecord>> for RecordStore {
    fn from(records: Vec<FlightRecord>) -> Self {
        Self { records }
    }
}
