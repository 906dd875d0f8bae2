//! Raw ADC sample to calibrated power conversion.

/// Convert a raw ADC sample into a power value.
///
/// The sample is scaled to a sensor voltage against the ADC reference, and
/// power is taken as the squared voltage times the channel's calibration
/// factor. Range clamping is the driver's job, not this function's.
pub fn convert(raw: u16, calibration: f64, adc_max: u16, reference_voltage: f64) -> f64 {
    if adc_max == 0 {
        return 0.0;
    }

    let voltage = f64::from(raw) * (reference_voltage / f64::from(adc_max));
    voltage * voltage * calibration
}
