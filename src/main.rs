//! Serde Speed - Avro serde round-trip benchmark
//!
//! Usage:
//!   cargo run --release -- [--test-runs N] [--schema PATH] [--verbose] [--chart]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use serde_speed::bench::{default_variants, ChartRow, ChartSink, Harness, JsonChartSink};
use serde_speed::config::Args;
use serde_speed::core::{Schema, SchemaRegistry};
use serde_speed::protocol::{topic_subject, MessageField, SerdePipeline};

fn init_tracing(verbose: bool) -> Result<()> {
    // JSON logs dengan SERDE_SPEED_LOG_JSON=1
    let json_logs = std::env::var("SERDE_SPEED_LOG_JSON").unwrap_or_default() == "1";
    let level = if verbose { "serde_speed=debug" } else { "serde_speed=info" };
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let schema = Schema::from_file(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let subject = topic_subject(&args.topic, MessageField::Value);
    tracing::info!(schema = %args.schema.display(), %subject, test_runs = args.test_runs.get(), "configured");

    println!("🚀 Serde Speed - Avro round-trip benchmark");
    println!("==========================================\n");

    let mut registry = SchemaRegistry::new();
    let pipeline = SerdePipeline::avro(subject, schema);
    let mut harness = Harness::new(&mut registry, pipeline, args.test_runs);

    let variants = default_variants();
    let results = if args.verbose {
        harness.run_all_with(&variants, |variant, i, event| {
            tracing::debug!(variant = %variant.name, iteration = i, envelope_id = %event.envelope.envelope_id, "round trip");
        })
    } else {
        harness.run_all(&variants)
    };

    let mut rows = Vec::new();
    let mut failed = Vec::new();

    for (variant, result) in variants.iter().zip(results) {
        let tag = variant.name.to_uppercase();
        if args.verbose {
            println!("[{tag}] Input event : {:?}", variant.seed);
        }

        match result {
            Ok(report) => {
                println!("{report}");
                if args.verbose {
                    println!("[{tag}] Output event: {:?}", report.last_event);
                }
                println!();
                rows.push(ChartRow::from(&report));
            }
            Err(e) => {
                println!("❌ {e}\n");
                failed.push(variant.name.as_str());
            }
        }
    }

    if args.chart {
        JsonChartSink::new(&args.chart_output)
            .render(&rows)
            .context("handing results to chart sink")?;
    }

    if !failed.is_empty() {
        anyhow::bail!("{} variant(s) aborted: {}", failed.len(), failed.join(", "));
    }

    println!("✅ All variants complete!");
    Ok(())
}
