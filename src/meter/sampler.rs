//! Periodic acquisition loop.

use crate::error::Result;
use crate::meter::{
    adc::AdcReader,
    conversion::convert,
    data::{MeterConfig, SwrSnapshot},
    derivation::{derive, round_to},
    store::SnapshotWriter,
};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Counters reported when the sampler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerStats {
    /// Snapshots published
    pub ticks: u64,
    /// Iterations that failed and backed off
    pub failures: u64,
}

/// Drives the forward/reverse sensors and publishes one snapshot per tick.
///
/// The sampler owns both the ADC and the store's write half. Both are
/// dropped when [`Sampler::run`] returns.
pub struct Sampler<A> {
    adc: A,
    config: MeterConfig,
    writer: SnapshotWriter,
    interval: Duration,
    backoff: Duration,
}

impl<A: AdcReader> Sampler<A> {
    /// Create a sampler with the default 500 ms period and 1 s error backoff.
    pub fn new(adc: A, config: MeterConfig, writer: SnapshotWriter) -> Self {
        Self {
            adc,
            config,
            writer,
            interval: Duration::from_millis(crate::DEFAULT_INTERVAL_MS),
            backoff: Duration::from_millis(crate::DEFAULT_BACKOFF_MS),
        }
    }

    /// Set the sampling period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the delay before retrying after a failed iteration.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Read both channels and build a snapshot without publishing it.
    pub fn sample_once(&mut self) -> Result<SwrSnapshot> {
        let pins = self.config.pins;
        let calibration = self.config.calibration;

        let forward_raw = self.adc.read_channel(pins.forward)?;
        let reverse_raw = self.adc.read_channel(pins.reverse)?;

        let adc_max = self.adc.max_value();
        let reference = self.adc.reference_voltage();
        let forward_power = convert(forward_raw, calibration.forward, adc_max, reference);
        let reverse_power = convert(reverse_raw, calibration.reverse, adc_max, reference);

        let derived = derive(forward_power, reverse_power);

        Ok(SwrSnapshot {
            forward_power: round_to(forward_power, 2),
            reverse_power: round_to(reverse_power, 2),
            swr: derived.swr,
            reflection_coefficient: derived.reflection_coefficient,
            power_loss_percent: derived.power_loss_percent,
            timestamp: Utc::now(),
        })
    }

    /// Sample once and publish the result.
    pub fn tick(&mut self) -> Result<SwrSnapshot> {
        let snapshot = self.sample_once()?;
        self.writer.publish(snapshot);
        Ok(snapshot)
    }

    /// Run until `shutdown` turns true or its sender is dropped.
    ///
    /// Failed iterations are logged and retried after the backoff delay; the
    /// loop never exits on its own.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SamplerStats {
        let mut stats = SamplerStats::default();

        info!(
            "Sampler started: forward channel {}, reverse channel {}, {}ms interval",
            self.config.pins.forward,
            self.config.pins.reverse,
            self.interval.as_millis()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.tick() {
                Ok(snapshot) => {
                    stats.ticks += 1;
                    debug!(
                        "fwd {:.2}W rev {:.2}W swr {:.2}",
                        snapshot.forward_power, snapshot.reverse_power, snapshot.swr
                    );
                    self.interval
                }
                Err(err) => {
                    stats.failures += 1;
                    if err.is_transient() {
                        warn!("Sampling failed, retrying in {}ms: {}", self.backoff.as_millis(), err);
                    } else {
                        error!("Sampling failed, retrying in {}ms: {}", self.backoff.as_millis(), err);
                    }
                    self.backoff
                }
            };

            if stop_requested(&mut shutdown, delay).await {
                break;
            }
        }

        info!(
            "Sampler stopped after {} ticks ({} failures), releasing ADC",
            stats.ticks, stats.failures
        );
        stats
    }
}

/// Sleep for `delay` unless a stop arrives first.
///
/// Changes that leave the flag false do not cut the sleep short.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    let wake = tokio::time::sleep(delay);
    tokio::pin!(wake);

    loop {
        tokio::select! {
            _ = &mut wake => return false,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow_and_update() {
                    return true;
                }
            }
        }
    }
}

impl<A: AdcReader + Send + 'static> Sampler<A> {
    /// Run the sampler as a background tokio task.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<SamplerStats> {
        tokio::spawn(self.run(shutdown))
    }
}
