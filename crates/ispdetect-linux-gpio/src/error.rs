//! Error types for Linux GPIO ISP operations

use thiserror::Error;

/// Linux GPIO ISP specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to open GPIO chip
    #[error("Failed to open GPIO chip '{path}': {source}")]
    ChipOpenFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to request GPIO lines
    #[error("Failed to request GPIO lines: {0}")]
    LineRequestFailed(#[source] gpiocdev::Error),

    /// Failed to reconfigure GPIO lines
    #[error("Failed to reconfigure GPIO lines: {0}")]
    ReconfigureFailed(#[source] gpiocdev::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing required parameter
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// The same GPIO line is assigned to two signals
    #[error("GPIO line {offset} is used for both {first} and {second}")]
    DuplicateLine {
        offset: u32,
        first: &'static str,
        second: &'static str,
    },
}

/// Result type for Linux GPIO ISP operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
