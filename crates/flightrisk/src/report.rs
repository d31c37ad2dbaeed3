//! Rendering of risk assessments for the terminal.
//!
//! The report layer only consumes [`Prediction`] values; it never touches the
//! classifier or the tables directly.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::flight::Prediction;
use crate::service::RiskService;

/// Shown when an identifier does not name a flight.
pub const INVALID_RECORD: &str = "Invalid flight record number";

/// Render a plain-text flight risk report.
#[must_use]
pub fn render_text(record_id: i64, prediction: &Prediction) -> String {
    let mut out = String::new();
    out.push_str(&format!("Flight Risk Report #{record_id}\n"));
    out.push_str("========================\n\n");

    out.push_str("[Flight Information]\n");
    out.push_str(&format!("  Airline:           {}\n", prediction.airline));
    out.push_str(&format!("  Source:            {}\n", prediction.source));
    out.push_str(&format!("  Destination:       {}\n", prediction.destination));
    out.push_str(&format!("  Wind speed:        {:.2} km/h\n", prediction.wind));
    out.push_str(&format!("  Visibility:        {:.2} km\n", prediction.visibility));
    out.push_str(&format!("  Storm:             {}\n\n", prediction.storm));

    out.push_str("[Risk Intelligence]\n");
    out.push_str(&format!("  Risk level:        {}\n", prediction.risk_level));
    out.push_str(&format!(
        "  Crash probability: {:.2}%\n",
        prediction.crash_probability
    ));
    out.push_str(&format!("  Advisory:          {}\n", prediction.risk_level.advisory()));
    out
}

/// Render a prediction as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(prediction: &Prediction) -> Result<String> {
    Ok(serde_json::to_string_pretty(prediction)?)
}

/// Parse a user-entered identifier. Surrounding whitespace is ignored.
#[must_use]
pub fn parse_record_id(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

/// Interactive lookup loop.
///
/// Reads one identifier per line from `input` and writes a report (or
/// [`INVALID_RECORD`]) to `output` until end of input or `quit`/`exit`.
/// Blank lines are skipped. Returns the number of reports written.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn run_session<R: BufRead, W: Write>(
    service: &RiskService,
    input: R,
    mut output: W,
    json: bool,
) -> Result<usize> {
    let mut shown = 0;
    write!(output, "Flight record number (0-{}): ", service.len().saturating_sub(1))?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        if !trimmed.is_empty() {
            match parse_record_id(trimmed).and_then(|id| Some((id, service.predict(id)?))) {
                Some((id, prediction)) => {
                    if json {
                        writeln!(output, "{}", render_json(&prediction)?)?;
                    } else {
                        writeln!(output, "{}", render_text(id, &prediction))?;
                    }
                    shown += 1;
                }
                None => writeln!(output, "{INVALID_RECORD}")?,
            }
            writeln!(output)?;
        }

        write!(output, "Check another flight (number, or 'quit'): ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(shown)
}
