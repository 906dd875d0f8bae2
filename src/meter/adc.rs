//! Analog-to-digital converter access for the power sensors.
//!
//! The sampler only sees the [`AdcReader`] trait. On a Raspberry Pi with the
//! `gpio` feature an MCP3008 on SPI0 is used; elsewhere a [`MockAdc`] stands
//! in so the rest of the pipeline can run and be tested.

use crate::error::{Result, SwrError};
use crate::{DEFAULT_ADC_MAX, DEFAULT_REFERENCE_VOLTAGE};
use std::collections::{HashMap, VecDeque};

/// Trait for reading raw samples from an ADC.
pub trait AdcReader {
    /// Read one raw sample from `channel`, in `0..=self.max_value()`.
    fn read_channel(&mut self, channel: u8) -> Result<u16>;

    /// Largest value a sample can take (e.g. 1023 for a 10-bit converter).
    fn max_value(&self) -> u16;

    /// Reference voltage corresponding to [`AdcReader::max_value`].
    fn reference_voltage(&self) -> f64;
}

impl<A: AdcReader + ?Sized> AdcReader for Box<A> {
    fn read_channel(&mut self, channel: u8) -> Result<u16> {
        (**self).read_channel(channel)
    }

    fn max_value(&self) -> u16 {
        (**self).max_value()
    }

    fn reference_voltage(&self) -> f64 {
        (**self).reference_voltage()
    }
}

/// Scripted ADC for hosts without sensor hardware.
///
/// Each channel returns its queued samples in order and then repeats its
/// resting value. Injected failures are consumed before any sample.
#[derive(Debug, Clone)]
pub struct MockAdc {
    resting: HashMap<u8, u16>,
    queued: HashMap<u8, VecDeque<u16>>,
    pending_failures: usize,
    max_value: u16,
    reference_voltage: f64,
}

impl MockAdc {
    /// Create a mock 10-bit, 3.3 V converter with no configured channels.
    pub fn new() -> Self {
        Self {
            resting: HashMap::new(),
            queued: HashMap::new(),
            pending_failures: 0,
            max_value: DEFAULT_ADC_MAX,
            reference_voltage: DEFAULT_REFERENCE_VOLTAGE,
        }
    }

    /// Make `channel` return `value` whenever nothing is queued for it.
    pub fn with_constant(mut self, channel: u8, value: u16) -> Self {
        self.resting.insert(channel, value);
        self
    }

    /// Queue `values` to be returned in order from `channel`.
    ///
    /// After the queue drains the last queued value becomes the resting value.
    pub fn with_sequence(mut self, channel: u8, values: impl IntoIterator<Item = u16>) -> Self {
        let values: VecDeque<u16> = values.into_iter().collect();
        if let Some(&last) = values.back() {
            self.resting.insert(channel, last);
        }
        self.queued.entry(channel).or_default().extend(values);
        self
    }

    /// Fail the next `count` reads, on any channel.
    pub fn with_failures(mut self, count: usize) -> Self {
        self.pending_failures = count;
        self
    }

    /// Override the converter resolution and reference.
    pub fn with_range(mut self, max_value: u16, reference_voltage: f64) -> Self {
        self.max_value = max_value;
        self.reference_voltage = reference_voltage;
        self
    }
}

impl Default for MockAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcReader for MockAdc {
    fn read_channel(&mut self, channel: u8) -> Result<u16> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(SwrError::adc_error(format!(
                "simulated read failure on channel {}",
                channel
            )));
        }

        let value = match self.queued.get_mut(&channel).and_then(VecDeque::pop_front) {
            Some(value) => value,
            None => *self.resting.get(&channel).ok_or_else(|| {
                SwrError::adc_error(format!("channel {} is not connected", channel))
            })?,
        };

        Ok(value.min(self.max_value))
    }

    fn max_value(&self) -> u16 {
        self.max_value
    }

    fn reference_voltage(&self) -> f64 {
        self.reference_voltage
    }
}

#[cfg(feature = "gpio")]
mod mcp3008 {
    use super::*;
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

    /// SPI clock for the MCP3008 at 3.3 V.
    const SPI_CLOCK_HZ: u32 = 1_350_000;

    /// Number of single-ended inputs on the MCP3008.
    const CHANNELS: u8 = 8;

    /// MCP3008 10-bit ADC on the Raspberry Pi SPI bus, using rppal.
    ///
    /// The SPI device is released when this value is dropped.
    pub struct Mcp3008Adc {
        spi: Spi,
        reference_voltage: f64,
    }

    impl Mcp3008Adc {
        /// Open the MCP3008 on SPI0, chip select 0.
        pub fn new() -> Result<Self> {
            Self::with_bus(Bus::Spi0, SlaveSelect::Ss0, DEFAULT_REFERENCE_VOLTAGE)
        }

        /// Open the MCP3008 on a specific bus and chip select.
        pub fn with_bus(bus: Bus, slave: SlaveSelect, reference_voltage: f64) -> Result<Self> {
            let spi = Spi::new(bus, slave, SPI_CLOCK_HZ, Mode::Mode0)
                .map_err(|e| SwrError::adc_error(format!("Failed to open SPI device: {}", e)))?;

            tracing::info!("MCP3008 opened on {:?}/{:?}", bus, slave);

            Ok(Self {
                spi,
                reference_voltage,
            })
        }
    }

    impl AdcReader for Mcp3008Adc {
        fn read_channel(&mut self, channel: u8) -> Result<u16> {
            if channel >= CHANNELS {
                return Err(SwrError::adc_error(format!(
                    "MCP3008 has no channel {}",
                    channel
                )));
            }

            // Start bit, then single-ended mode and channel select in the high nibble.
            let request = [0x01, (0x08 | channel) << 4, 0x00];
            let mut response = [0u8; 3];

            self.spi.transfer(&mut response, &request).map_err(|e| {
                SwrError::adc_error(format!("SPI transfer on channel {} failed: {}", channel, e))
            })?;

            let value = (u16::from(response[1] & 0x03) << 8) | u16::from(response[2]);
            Ok(value.min(DEFAULT_ADC_MAX))
        }

        fn max_value(&self) -> u16 {
            DEFAULT_ADC_MAX
        }

        fn reference_voltage(&self) -> f64 {
            self.reference_voltage
        }
    }
}

#[cfg(feature = "gpio")]
pub use mcp3008::Mcp3008Adc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_channel() {
        let mut adc = MockAdc::new().with_constant(0, 512);
        assert_eq!(adc.read_channel(0).unwrap(), 512);
        assert_eq!(adc.read_channel(0).unwrap(), 512);
        assert_eq!(adc.max_value(), 1023);
    }

    #[test]
    fn test_sequence_then_resting_value() {
        let mut adc = MockAdc::new().with_sequence(1, [10, 20, 30]);
        assert_eq!(adc.read_channel(1).unwrap(), 10);
        assert_eq!(adc.read_channel(1).unwrap(), 20);
        assert_eq!(adc.read_channel(1).unwrap(), 30);
        assert_eq!(adc.read_channel(1).unwrap(), 30);
    }

    #[test]
    fn test_unconnected_channel_fails() {
        let mut adc = MockAdc::new().with_constant(0, 1);
        let err = adc.read_channel(5).unwrap_err();
        assert!(err.to_string().contains("channel 5"));
    }

    #[test]
    fn test_injected_failures_are_consumed() {
        let mut adc = MockAdc::new().with_constant(0, 7).with_failures(2);
        assert!(adc.read_channel(0).is_err());
        assert!(adc.read_channel(0).is_err());
        assert_eq!(adc.read_channel(0).unwrap(), 7);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut adc = MockAdc::new().with_constant(0, 4000);
        assert_eq!(adc.read_channel(0).unwrap(), 1023);
    }

    #[test]
    fn test_boxed_reader() {
        let mut adc: Box<dyn AdcReader + Send> = Box::new(MockAdc::new().with_constant(2, 99));
        assert_eq!(adc.read_channel(2).unwrap(), 99);
        assert_eq!(adc.reference_voltage(), 3.3);
    }
}
