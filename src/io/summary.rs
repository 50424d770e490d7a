//! JSON dump of a whole pipeline run.
//!
//! The JSON is the "portable" representation of a run: the cleaning report,
//! every observation, and every derived table, for notebooks or other tools.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::app::pipeline::PipelineResult;
use crate::error::{AppError, EXIT_INPUT};

/// Write the pipeline result as pretty JSON, overwriting `path`.
pub fn write_summary_json(path: &Path, result: &PipelineResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write summary JSON: {e}")))?;

    info!(path = %path.display(), "wrote summary JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_result;
    use crate::domain::RunConfig;
    use crate::io::ingest::clean_csv;

    #[test]
    fn summary_serializes_shortfalls() {
        let config = RunConfig::default();
        let ingest = clean_csv(b"DATE,T10YIE\n", config.date_order);
        let result = build_result(Path::new("T10YIE.csv"), ingest, &config);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["metrics"]["trend"]["Err"]["kind"], "no_data");
        assert_eq!(json["observations"].as_array().map(Vec::len), Some(0));
    }
}
