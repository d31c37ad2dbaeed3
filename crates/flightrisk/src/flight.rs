//! Core flight and prediction types.
//!
//! This module defines the decoded record, the risk classes the classifier
//! predicts, and the [`Prediction`] handed to the presentation layer.

use serde::{Deserialize, Serialize};

/// Label used for airline codes outside the fixed enumeration.
pub const UNKNOWN_AIRLINE: &str = "Unknown Airline";

/// Airline names indexed by their encoded value.
const AIRLINES: [&str; 6] = [
    "IndiGo",
    "Air India",
    "SpiceJet",
    "Vistara",
    "GoAir",
    "Alliance Air",
];

/// Number of risk classes the classifier distinguishes.
pub const N_CLASSES: usize = 3;

/// Decode an airline code into its display name.
///
/// Total over all integers: unmapped codes yield [`UNKNOWN_AIRLINE`].
#[must_use]
pub fn airline_name(code: i64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|idx| AIRLINES.get(idx).copied())
        .unwrap_or(UNKNOWN_AIRLINE)
}

/// Round half away from zero to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ordinal risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Class 0.
    Low,
    /// Class 1.
    Medium,
    /// Class 2; its probability is reported as the crash probability.
    High,
}

impl RiskLevel {
    /// All classes in index order.
    pub const ALL: [Self; N_CLASSES] = [Self::Low, Self::Medium, Self::High];

    /// Map a class index to a risk level.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The class index used by the classifier.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Upper-case label shown to users.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Operational advice for this level.
    #[must_use]
    pub fn advisory(self) -> &'static str {
        match self {
            Self::Low => "Safe for operation - cleared for flight",
            Self::Medium => "Moderate risk - monitoring recommended",
            Self::High => "High risk - delay or reroute advised",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the record table.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    /// Encoded airline, see [`airline_name`].
    pub airline_code: i64,
    /// Full name of the departure airport.
    pub source: String,
    /// Full name of the arrival airport.
    pub destination: String,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Visibility in km.
    pub visibility_km: f64,
    /// Whether a storm was reported (stored as 1).
    pub storm: bool,
}

impl FlightRecord {
    /// Decoded airline name.
    #[must_use]
    pub fn airline(&self) -> &'static str {
        airline_name(self.airline_code)
    }

    /// "Yes" or "No".
    #[must_use]
    pub fn storm_label(&self) -> &'static str {
        if self.storm {
            "Yes"
        } else {
            "No"
        }
    }
}

/// The rendered outcome of a risk assessment.
///
/// Field names serialize exactly as the presentation layer expects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decoded airline name.
    #[serde(rename = "Airline")]
    pub airline: String,
    /// Departure airport.
    #[serde(rename = "Source")]
    pub source: String,
    /// Arrival airport.
    #[serde(rename = "Destination")]
    pub destination: String,
    /// Wind speed, two decimals.
    #[serde(rename = "Wind")]
    pub wind: f64,
    /// Visibility, two decimals.
    #[serde(rename = "Visibility")]
    pub visibility: f64,
    /// "Yes" or "No".
    #[serde(rename = "Storm")]
    pub storm: String,
    /// Most probable risk class.
    #[serde(rename = "Risk_Level")]
    pub risk_level: RiskLevel,
    /// HIGH-class probability as a percentage, two decimals.
    ///
    /// Always the HIGH score, whichever class won.
    #[serde(rename = "Crash_Probability")]
    pub crash_probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> FlightRecord {
        FlightRecord {
            airline_code: 3,
            source: "Indira Gandhi International Airport".to_string(),
            destination: "Chhatrapati Shivaji Maharaj International Airport".to_string(),
            wind_speed: 18.456,
            visibility_km: 7.0,
            storm: true,
        }
    }

    #[test]
    fn test_airline_name_known_codes() {
        assert_eq!(airline_name(0), "IndiGo");
        assert_eq!(airline_name(1), "Air India");
        assert_eq!(airline_name(2), "SpiceJet");
        assert_eq!(airline_name(3), "Vistara");
        assert_eq!(airline_name(4), "GoAir");
        assert_eq!(airline_name(5), "Alliance Air");
    }

    #[test]
    fn test_airline_name_unknown_codes() {
        assert_eq!(airline_name(6), UNKNOWN_AIRLINE);
        assert_eq!(airline_name(7), UNKNOWN_AIRLINE);
        assert_eq!(airline_name(-1), UNKNOWN_AIRLINE);
        assert_eq!(airline_name(i64::MAX), UNKNOWN_AIRLINE);
        assert_eq!(airline_name(i64::MIN), UNKNOWN_AIRLINE);
    }

    #[test]
    fn test_round2() {
        assert!((round2(18.456) - 18.46).abs() < f64::EPSILON);
        assert!((round2(18.454) - 18.45).abs() < f64::EPSILON);
        assert!((round2(0.125) - 0.13).abs() < f64::EPSILON);
        assert!((round2(7.0) - 7.0).abs() < f64::EPSILON);
        assert!((round2(100.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_risk_level_index_round_trip() {
        for (idx, level) in RiskLevel::ALL.iter().enumerate() {
            assert_eq!(level.index(), idx);
            assert_eq!(RiskLevel::from_index(idx), Some(*level));
        }
        assert_eq!(RiskLevel::from_index(3), None);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::Low.to_string(), "LOW");
        assert_eq!(RiskLevel::Medium.to_string(), "MEDIUM");
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }

    #[test]
    fn test_risk_level_advisory_differs() {
        assert!(RiskLevel::Low.advisory().contains("cleared"));
        assert!(RiskLevel::Medium.advisory().contains("monitoring"));
        assert!(RiskLevel::High.advisory().contains("reroute"));
    }

    #[test]
    fn test_risk_level_serializes_upper_case() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
    }

    #[test]
    fn test_record_decoding() {
        let mut record = sample_record();
        assert_eq!(record.airline(), "Vistara");
        assert_eq!(record.storm_label(), "Yes");

        record.storm = false;
        record.airline_code = 7;
        assert_eq!(record.storm_label(), "No");
        assert_eq!(record.airline(), UNKNOWN_AIRLINE);
    }

    #[test]
    fn test_prediction_field_names() {
        let prediction = Prediction {
            airline: "IndiGo".to_string(),
            source: "A".to_string(),
            destination: "B".to_string(),
            wind: 10.5,
            visibility: 3.25,
            storm: "No".to_string(),
            risk_level: RiskLevel::High,
            crash_probability: 66.67,
        };

        let value = serde_json::to_value(&prediction).unwrap();
        for key in [
            "Airline",
            "Source",
            "Destination",
            "Wind",
            "Visibility",
            "Storm",
            "Risk_Level",
            "Crash_Probability",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["Risk_Level"], "HIGH");
    }
}
