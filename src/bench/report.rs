//! Hasil benchmark per variant

use std::fmt;
use std::time::Duration;

use crate::model::UserRegisteredEvent;

#[derive(Debug, Clone)]
pub struct VariantReport {
    pub variant: String,
    pub test_runs: u64,
    /// Total waktu loop (tanpa warm-up)
    pub elapsed: Duration,
    /// Event terakhir di lineage chain
    pub last_event: UserRegisteredEvent,
}

impl VariantReport {
    pub fn new(variant: String, test_runs: u64, elapsed: Duration, last_event: UserRegisteredEvent) -> Self {
        Self {
            variant,
            test_runs,
            elapsed,
            last_event,
        }
    }

    /// Waktu per message dalam detik
    #[inline]
    pub fn per_message_secs(&self) -> f64 {
        self.elapsed.as_secs_f64() / self.test_runs as f64
    }

    #[inline]
    pub fn per_message_micros(&self) -> f64 {
        self.per_message_secs() * 1e6
    }

    /// Messages per second = 1 / per_message.
    ///
    /// `None` kalau elapsed nol (loop lebih cepat dari resolusi timer).
    #[inline]
    pub fn throughput(&self) -> Option<f64> {
        let per_message = self.per_message_secs();
        (per_message > 0.0).then(|| 1.0 / per_message)
    }
}

impl fmt::Display for VariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.variant.to_uppercase();
        writeln!(
            f,
            "[{tag}] Execution time (total):       {:.5} seconds",
            self.elapsed.as_secs_f64()
        )?;
        writeln!(
            f,
            "[{tag}] Execution time (per message): {:.3} microseconds",
            self.per_message_micros()
        )?;
        match self.throughput() {
            Some(throughput) => write!(f, "[{tag}] Maximal throughput:           {throughput:.0} messages/sec"),
            None => write!(f, "[{tag}] Maximal throughput:           n/a (below timer resolution)"),
        }
    }
}
