//! # SWR Meter - Raspberry Pi RF Standing Wave Ratio Monitor
//!
//! Samples forward and reflected RF power sensors through an ADC, derives the
//! standing wave ratio and related figures, and serves the latest reading
//! over a small local web API.
//!
//! ## Features
//!
//! - **Measurement pipeline**: calibrated power conversion, SWR, reflection
//!   coefficient and mismatch loss, refreshed every 500 ms
//! - **Lock-light publication**: a single-writer snapshot store readers copy from
//! - **MCP3008 support**: SPI ADC on Raspberry Pi (feature-gated)
//! - **Web API**: `/api/swr`, `/api/config` and static dashboard files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swr_meter::{snapshot_store, start_web_server, MeterConfig, MeterQuery, MockAdc, Sampler, WebConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MeterConfig::default();
//!     let adc = MockAdc::new().with_constant(0, 600).with_constant(1, 90);
//!
//!     let (writer, reader) = snapshot_store();
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let sampler = Sampler::new(adc, config, writer).spawn(shutdown_rx);
//!
//!     let query = MeterQuery::new(reader, config);
//!     start_web_server(WebConfig::default(), query, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     shutdown_tx.send(true)?;
//!     sampler.await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod meter;
pub mod web;

// Re-export public API
pub use error::{Result, SwrError};
pub use meter::{
    adc::{AdcReader, MockAdc},
    data::{Calibration, MeterConfig, Pins, SwrSnapshot},
    derivation::{compute_power_loss_percent, compute_reflection_coefficient, compute_swr},
    query::MeterQuery,
    sampler::{Sampler, SamplerStats},
    store::{snapshot_store, SnapshotReader, SnapshotWriter},
};

#[cfg(feature = "gpio")]
pub use meter::adc::Mcp3008Adc;

pub use web::{create_app, start_web_server, WebConfig};

/// The default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Delay before the sampler retries after a failed iteration, in milliseconds
pub const DEFAULT_BACKOFF_MS: u64 = 1000;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Full-scale reading of a 10-bit ADC
pub const DEFAULT_ADC_MAX: u16 = 1023;

/// ADC reference voltage on a 3.3 V Raspberry Pi rail
pub const DEFAULT_REFERENCE_VOLTAGE: f64 = 3.3;

/// Largest SWR the meter reports; degenerate readings saturate here
pub const SWR_CEILING: f64 = 10.0;
