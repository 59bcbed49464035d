//! Benchmark Harness
//!
//! Per variant:
//! 1. Satu round trip warm-up (tidak diukur), supaya registrasi schema
//!    dan alokasi pertama tidak masuk hasil
//! 2. `test_runs` round trip berurutan; output iterasi i jadi input i+1
//! 3. Tiap output mendapat envelope id baru dengan parent = id input
//!
//! Error apa pun menghentikan variant tersebut saja.

use std::num::NonZeroU64;
use std::time::{Duration, Instant};

use crate::core::SchemaRegistry;
use crate::model::{ModelError, UserRegisteredEvent, WireRecord};
use crate::protocol::{AvroCodec, SchemaCodec, SerdeError, SerdePipeline};

use super::report::VariantReport;
use super::variant::Variant;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoundTripError {
    #[error(transparent)]
    Serde(#[from] SerdeError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Kegagalan satu variant, lengkap dengan iterasi tempat terjadinya
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("variant `{variant}` aborted at {}: {source}", stage(.iteration))]
pub struct BenchError {
    pub variant: String,
    /// `None` = gagal saat warm-up
    pub iteration: Option<u64>,
    pub source: RoundTripError,
}

fn stage(iteration: &Option<u64>) -> String {
    match iteration {
        Some(i) => format!("iteration {i}"),
        None => "warm-up".to_string(),
    }
}

pub struct Harness<'r, C: SchemaCodec = AvroCodec> {
    registry: &'r mut SchemaRegistry,
    pipeline: SerdePipeline<C>,
    test_runs: NonZeroU64,
}

impl<'r, C: SchemaCodec> Harness<'r, C> {
    pub fn new(registry: &'r mut SchemaRegistry, pipeline: SerdePipeline<C>, test_runs: NonZeroU64) -> Self {
        Self {
            registry,
            pipeline,
            test_runs,
        }
    }

    #[inline]
    pub fn test_runs(&self) -> u64 {
        self.test_runs.get()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &*self.registry
    }

    pub fn pipeline(&self) -> &SerdePipeline<C> {
        &self.pipeline
    }

    /// Encode -> decode -> rekonstruksi, lalu sambungkan lineage ke `event`
    #[inline]
    pub fn round_trip(&mut self, event: &UserRegisteredEvent) -> Result<UserRegisteredEvent, RoundTripError> {
        let bytes = self.pipeline.encode(self.registry, &event.to_wire())?;
        let raw = self.pipeline.decode(&*self.registry, &bytes)?;

        let mut next = UserRegisteredEvent::from_wire(&raw)?;
        next.envelope.relink(event.envelope.envelope_id);
        Ok(next)
    }

    pub fn run_variant(&mut self, variant: &Variant) -> Result<VariantReport, BenchError> {
        self.run_timed(variant, None::<fn(u64, &UserRegisteredEvent)>)
    }

    /// Seperti `run_variant`, `observe` dipanggil untuk setiap event yang
    /// dihasilkan. Timer di-pause selama `observe` jalan, jadi waktunya
    /// tidak masuk hasil.
    pub fn run_variant_with<F>(&mut self, variant: &Variant, observe: F) -> Result<VariantReport, BenchError>
    where
        F: FnMut(u64, &UserRegisteredEvent),
    {
        self.run_timed(variant, Some(observe))
    }

    fn run_timed<F>(&mut self, variant: &Variant, mut observe: Option<F>) -> Result<VariantReport, BenchError>
    where
        F: FnMut(u64, &UserRegisteredEvent),
    {
        let fail = |iteration: Option<u64>, source: RoundTripError| BenchError {
            variant: variant.name.clone(),
            iteration,
            source,
        };

        tracing::info!(variant = %variant.name, test_runs = self.test_runs.get(), "starting variant");

        // Warm-up, hasil dibuang
        self.round_trip(&variant.seed).map_err(|e| fail(None, e))?;

        let runs = self.test_runs.get();
        let mut current = variant.seed.clone();

        let mut elapsed = Duration::ZERO;
        let mut start = Instant::now();
        for i in 0..runs {
            current = self.round_trip(&current).map_err(|e| fail(Some(i), e))?;
            if let Some(observe) = observe.as_mut() {
                elapsed += start.elapsed();
                observe(i, &current);
                start = Instant::now();
            }
        }
        elapsed += start.elapsed();

        let report = VariantReport::new(variant.name.clone(), runs, elapsed, current);
        if report.throughput().is_none() {
            tracing::warn!(variant = %variant.name, "elapsed time below timer resolution, throughput unavailable");
        }
        tracing::info!(
            variant = %variant.name,
            elapsed_secs = elapsed.as_secs_f64(),
            per_message_us = report.per_message_micros(),
            "variant finished"
        );
        Ok(report)
    }

    /// Jalankan semua variant; kegagalan satu variant tidak menghentikan
    /// variant lain. Hasil urut sesuai `variants`.
    pub fn run_all(&mut self, variants: &[Variant]) -> Vec<Result<VariantReport, BenchError>> {
        self.run_each(variants, None::<fn(&Variant, u64, &UserRegisteredEvent)>)
    }

    /// Seperti `run_all`, dengan observer per iterasi (di luar timer)
    pub fn run_all_with<F>(&mut self, variants: &[Variant], observe: F) -> Vec<Result<VariantReport, BenchError>>
    where
        F: FnMut(&Variant, u64, &UserRegisteredEvent),
    {
        self.run_each(variants, Some(observe))
    }

    fn run_each<F>(&mut self, variants: &[Variant], mut observe: Option<F>) -> Vec<Result<VariantReport, BenchError>>
    where
        F: FnMut(&Variant, u64, &UserRegisteredEvent),
    {
        let mut results = Vec::with_capacity(variants.len());
        for variant in variants {
            let result = match observe.as_mut() {
                Some(observe) => {
                    self.run_timed(variant, Some(|i: u64, event: &UserRegisteredEvent| observe(variant, i, event)))
                }
                None => self.run_timed(variant, None::<fn(u64, &UserRegisteredEvent)>),
            };
            if let Err(e) = &result {
                tracing::error!(error = %e, "variant aborted");
            }
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::default_variants;
    use crate::core::Schema;

    const USER_REGISTERED: &str = include_str!("../../schemas/user-registered.avsc");

    fn pipeline() -> SerdePipeline {
        SerdePipeline::avro("input-topic-value", Schema::parse_str(USER_REGISTERED).unwrap())
    }

    fn runs(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    #[test]
    fn test_round_trip_links_lineage() {
        let mut registry = SchemaRegistry::new();
        let mut harness = Harness::new(&mut registry, pipeline(), runs(1));
        let seed = default_variants().remove(0).seed;

        let next = harness.round_trip(&seed).unwrap();

        assert_eq!(next.envelope.parent_id, Some(seed.envelope.envelope_id));
        assert_ne!(next.envelope.envelope_id, seed.envelope.envelope_id);
        assert_eq!(next.user_id, seed.user_id);
        assert_eq!(next.subscription_type, seed.subscription_type);
    }

    #[test]
    fn test_warm_up_registers_schema_once() {
        let mut registry = SchemaRegistry::new();
        let mut harness = Harness::new(&mut registry, pipeline(), runs(5));

        for variant in default_variants() {
            harness.run_variant(&variant).unwrap();
        }
        assert_eq!(harness.registry().len(), 1);
        assert_eq!(harness.pipeline().schema_id(), Some(crate::core::BASE_SCHEMA_ID));
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let mut registry = SchemaRegistry::new();
        let mut harness = Harness::new(&mut registry, pipeline(), runs(4));
        let variant = default_variants().remove(0);

        let mut seen = Vec::new();
        let report = harness
            .run_variant_with(&variant, |i, e| seen.push((i, e.envelope.envelope_id)))
            .unwrap();

        assert_eq!(seen.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(seen[3].1, report.last_event.envelope.envelope_id);
    }

    #[test]
    fn test_observer_time_not_measured() {
        let mut registry = SchemaRegistry::new();
        let mut harness = Harness::new(&mut registry, pipeline(), runs(3));
        let variant = default_variants().remove(0);
        let pause = std::time::Duration::from_millis(50);

        let started = Instant::now();
        let report = harness
            .run_variant_with(&variant, |_, _| std::thread::sleep(pause))
            .unwrap();

        assert!(started.elapsed() >= pause * 3);
        assert!(report.elapsed < pause, "observer leaked into timer: {:?}", report.elapsed);
    }

    #[test]
    fn test_run_all_with_tags_variant() {
        let mut registry = SchemaRegistry::new();
        let mut harness = Harness::new(&mut registry, pipeline(), runs(2));
        let variants = default_variants();

        let mut seen = Vec::new();
        let results = harness.run_all_with(&variants, |variant, i, _| seen.push((variant.name.clone(), i)));

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(seen.len(), variants.len() * 2);
        assert_eq!(seen[0], (variants[0].name.clone(), 0));
        assert_eq!(seen[7], (variants[3].name.clone(), 1));
    }

    #[test]
    fn test_bench_error_display() {
        let err = BenchError {
            variant: "pro".into(),
            iteration: None,
            source: RoundTripError::Model(ModelError::MissingField("score".into())),
        };
        assert_eq!(err.to_string(), "variant `pro` aborted at warm-up: missing field `score`");

        let err = BenchError {
            iteration: Some(7),
            ..err
        };
        assert!(err.to_string().contains("iteration 7"));
    }
}
