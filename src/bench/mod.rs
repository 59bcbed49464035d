//! Benchmark layer: round-trip harness, report, chart hand-off
//!
//! Single-threaded dan synchronous: setiap variant jalan sampai selesai
//! atau abort di error pertama.

mod chart;
mod harness;
mod report;
mod variant;

pub use chart::{ChartError, ChartRow, ChartSink, JsonChartSink};
pub use harness::{BenchError, Harness, RoundTripError};
pub use report::VariantReport;
pub use variant::{default_variants, Variant};
