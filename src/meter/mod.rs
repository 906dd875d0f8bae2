//! SWR measurement pipeline.
//!
//! Samples the forward and reflected power sensors through an ADC, converts
//! the raw readings to calibrated power, derives SWR, reflection coefficient
//! and mismatch loss, and publishes the latest snapshot for concurrent readers.

pub mod adc;
pub mod conversion;
pub mod data;
pub mod derivation;
pub mod query;
pub mod sampler;
pub mod store;

// Re-export commonly used items
pub use adc::{AdcReader, MockAdc};
pub use data::{MeterConfig, SwrSnapshot};
pub use query::MeterQuery;
pub use sampler::{Sampler, SamplerStats};
pub use store::{snapshot_store, SnapshotReader, SnapshotWriter};

#[cfg(feature = "gpio")]
pub use adc::Mcp3008Adc;
