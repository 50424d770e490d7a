//! Export the annual-average table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! two columns, `Year,Rate`, one row per year, ascending. The whole file is
//! rendered in memory and written in one go, replacing any previous file.

use std::path::Path;

use tracing::info;

use crate::domain::AnnualAverage;
use crate::error::{AppError, EXIT_INPUT};

/// Render the annual table as CSV bytes.
pub fn annual_csv_bytes(annual: &[AnnualAverage]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Year", "Rate"])
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV header: {e}")))?;

    for row in annual {
        writer
            .write_record([row.year.to_string(), row.mean_rate.to_string()])
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to finish export CSV: {e}")))
}

/// Write the annual table to `path`, overwriting it.
pub fn write_annual_csv(path: &Path, annual: &[AnnualAverage]) -> Result<(), AppError> {
    let bytes = annual_csv_bytes(annual)?;
    std::fs::write(path, &bytes)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), years = annual.len(), "wrote annual averages");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_year_rate_rows() {
        let annual = vec![
            AnnualAverage { year: 2020, mean_rate: 1.5, count: 2 },
            AnnualAverage { year: 2021, mean_rate: 2.25, count: 3 },
        ];
        let bytes = annual_csv_bytes(&annual).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Year,Rate\n2020,1.5\n2021,2.25\n");
    }

    #[test]
    fn empty_table_is_header_only() {
        let bytes = annual_csv_bytes(&[]).unwrap();
        assert_eq!(bytes, b"Year,Rate\n");
    }
}
