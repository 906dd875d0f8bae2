//! Error handling for the SWR meter crate.

/// A specialized `Result` type for SWR meter operations.
pub type Result<T> = std::result::Result<T, SwrError>;

/// The main error type for SWR meter operations.
#[derive(Debug, thiserror::Error)]
pub enum SwrError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ADC channel read or initialization failed
    #[error("ADC error: {0}")]
    Adc(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SwrError {
    /// Create a new ADC error
    pub fn adc_error(msg: impl Into<String>) -> Self {
        Self::Adc(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the sampler should treat this error as transient and retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Adc(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwrError::adc_error("channel 3 timed out");
        assert_eq!(err.to_string(), "ADC error: channel 3 timed out");

        let err = SwrError::config_error("bad factor");
        assert!(err.to_string().contains("bad factor"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(SwrError::adc_error("spi").is_transient());
        assert!(SwrError::from(std::io::Error::other("bus")).is_transient());
        assert!(!SwrError::config_error("x").is_transient());
        assert!(!SwrError::web_server_error("x").is_transient());
    }
}
