//! Drives generators into outputs.
//!
//! Each runner writes `records` records, then either closes its output or,
//! with an interval, keeps writing one batch per tick until cancelled.
//! Runners execute concurrently; the first failure cancels the rest.

use std::time::Duration;

use anyhow::Context;
use logsynth_generator::{derive_rng, Generator, Registry};
use logsynth_output::Output;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// Metrics from one runner.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Number of records written.
    pub records: u64,
    /// Bytes accepted by the output.
    pub bytes: u64,
    /// Interval boundaries crossed.
    pub intervals: u64,
    /// Total time taken.
    pub elapsed: Duration,
}

impl RunMetrics {
    /// Calculate records per second.
    pub fn records_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.records as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// One generator feeding one output.
pub struct Runner {
    index: usize,
    generator: Box<dyn Generator>,
    output: Box<dyn Output>,
    interval: Option<Duration>,
    records: u64,
}

impl Runner {
    pub fn new(
        index: usize,
        generator: Box<dyn Generator>,
        output: Box<dyn Output>,
        interval: Option<Duration>,
        records: u64,
    ) -> Self {
        Self {
            index,
            generator,
            output,
            interval,
            records,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Run to completion or cancellation. The output is always closed.
    pub async fn run(mut self, cancel: CancellationToken) -> anyhow::Result<RunMetrics> {
        let start = Instant::now();
        let mut metrics = RunMetrics::default();

        let result = self.drive(&cancel, &mut metrics).await;
        let closed = self
            .output
            .close()
            .await
            .with_context(|| format!("runner {}: closing output", self.index));
        if let (Err(_), Err(close_error)) = (&result, &closed) {
            warn!("{close_error:#}");
        }
        result?;
        closed?;

        metrics.elapsed = start.elapsed();
        info!(
            "Runner {} wrote {} records ({} bytes, {} intervals) in {:?} ({:.0} records/sec)",
            self.index,
            metrics.records,
            metrics.bytes,
            metrics.intervals,
            metrics.elapsed,
            metrics.records_per_second()
        );
        Ok(metrics)
    }

    async fn drive(
        &mut self,
        cancel: &CancellationToken,
        metrics: &mut RunMetrics,
    ) -> anyhow::Result<()> {
        self.write_batch(cancel, metrics).await?;

        let Some(period) = self.interval else {
            return Ok(());
        };
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Runner {} cancelled", self.index);
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            self.output
                .new_interval()
                .await
                .with_context(|| format!("runner {}: starting new interval", self.index))?;
            metrics.intervals += 1;
            self.write_batch(cancel, metrics).await?;
        }
    }

    async fn write_batch(
        &mut self,
        cancel: &CancellationToken,
        metrics: &mut RunMetrics,
    ) -> anyhow::Result<()> {
        for _ in 0..self.records {
            if cancel.is_cancelled() {
                break;
            }
            let record = self
                .generator
                .next_record()
                .with_context(|| format!("runner {}: generating record", self.index))?;
            let written = self
                .output
                .write(&record)
                .await
                .with_context(|| format!("runner {}: writing record", self.index))?;
            metrics.records += 1;
            metrics.bytes += written as u64;
        }
        Ok(())
    }
}

/// Build every runner of `config`, deriving runner `i`'s random stream
/// from `master_seed` and `i`.
pub async fn build_runners(
    config: &Config,
    registry: &Registry,
    master_seed: u64,
) -> anyhow::Result<Vec<Runner>> {
    let mut runners = Vec::with_capacity(config.runners.len());
    for (index, runner) in config.runners.iter().enumerate() {
        let generator = registry
            .build(&runner.generator, derive_rng(master_seed, index as u64))
            .with_context(|| format!("runner {index}: invalid generator"))?;
        let output = logsynth_output::build(&runner.output)
            .await
            .with_context(|| format!("runner {index}: invalid output"))?;
        let interval = runner.interval(index)?;
        runners.push(Runner::new(
            index,
            generator,
            output,
            interval,
            runner.records,
        ));
    }
    Ok(runners)
}

/// Run all runners concurrently.
///
/// Returns per-runner metrics in runner order. The first failure cancels
/// the remaining runners and is returned once all of them have stopped.
pub async fn run_all(
    runners: Vec<Runner>,
    cancel: CancellationToken,
) -> anyhow::Result<Vec<RunMetrics>> {
    let mut tasks = JoinSet::new();
    for runner in runners {
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let index = runner.index();
            (index, runner.run(cancel).await)
        });
    }

    let mut completed = Vec::new();
    let mut first_error: Option<anyhow::Error> = None;
    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok((index, Ok(metrics))) => {
                completed.push((index, metrics));
                continue;
            }
            Ok((_, Err(e))) => e,
            Err(join_error) => anyhow::Error::new(join_error).context("runner task failed"),
        };
        error!("{failure:#}");
        cancel.cancel();
        if first_error.is_none() {
            first_error = Some(failure);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    completed.sort_by_key(|(index, _)| *index);
    Ok(completed.into_iter().map(|(_, metrics)| metrics).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let metrics = RunMetrics {
            records: 100,
            bytes: 1000,
            intervals: 0,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(metrics.records_per_second(), 50.0);
        assert_eq!(metrics.bytes_per_second(), 500.0);
        assert_eq!(RunMetrics::default().records_per_second(), 0.0);
    }
}
