//! Chart hand-off
//!
//! Rendering chart di luar crate ini. Di sini hanya mengumpulkan
//! `(variant, per-message µs, msgs/sec)` dan menyerahkannya ke `ChartSink`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::report::VariantReport;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("failed to write chart data to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize chart data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub variant: String,
    pub per_message_micros: f64,
    /// `None` (JSON null) kalau elapsed di bawah resolusi timer
    pub throughput: Option<f64>,
}

impl From<&VariantReport> for ChartRow {
    fn from(report: &VariantReport) -> Self {
        Self {
            variant: report.variant.clone(),
            per_message_micros: report.per_message_micros(),
            throughput: report.throughput(),
        }
    }
}

/// Penerima data chart
pub trait ChartSink {
    fn render(&mut self, rows: &[ChartRow]) -> Result<(), ChartError>;
}

/// Tulis rows sebagai JSON untuk plotting tool eksternal
#[derive(Debug, Clone)]
pub struct JsonChartSink {
    path: PathBuf,
}

impl JsonChartSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartSink for JsonChartSink {
    fn render(&mut self, rows: &[ChartRow]) -> Result<(), ChartError> {
        let io_err = |source| ChartError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(&self.path, json).map_err(io_err)?;

        tracing::info!(path = %self.path.display(), rows = rows.len(), "chart data written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sink_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("serde_speed.json");
        let mut sink = JsonChartSink::new(&path);

        let rows = vec![
            ChartRow {
                variant: "free".into(),
                per_message_micros: 5.0,
                throughput: Some(200_000.0),
            },
            ChartRow {
                variant: "pro".into(),
                per_message_micros: 4.0,
                throughput: Some(250_000.0),
            },
        ];
        sink.render(&rows).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["variant"], "free");
        assert_eq!(written[1]["throughput"], 250_000.0);
    }
}
