//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! bus transport ([`BusError`]), panel lifecycle operations ([`Error`]) and
//! device binding ([`ProbeError`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`BusError`] - A command write that did not reach the controller
//! - [`Error`] - Runtime errors during lifecycle operations
//! - [`ProbeError`] - Errors while binding a panel to a bus device
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level SPI/GPIO errors
//!
//! ## Example
//!
//! ```
//! use dsi_panel::{Builder, BuilderError};
//!
//! // Missing mode
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingMode)));
//! ```

use core::fmt::{self, Debug};

/// A command write that failed on the bus
///
/// Carries the register address of the failing transaction so a log line
/// points at the exact entry of the vendor table.
#[derive(Debug, Clone, PartialEq)]
pub enum BusError<E> {
    /// The transport rejected the write
    Transport {
        /// Address (first byte) of the failing write
        address: u8,
        /// Underlying transport error
        source: E,
    },
    /// The frame does not fit the codec's frame buffer
    ///
    /// Nothing was written to the bus.
    FrameTooLong {
        /// Address of the rejected write
        address: u8,
        /// Frame length in bytes, including the address byte
        len: usize,
    },
}

impl<E> BusError<E> {
    /// Address of the write that failed
    pub fn address(&self) -> u8 {
        match self {
            Self::Transport { address, .. } | Self::FrameTooLong { address, .. } => *address,
        }
    }
}

impl<E: Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { address, source } => {
                write!(f, "Bus write to 0x{address:02X} failed: {source:?}")
            }
            Self::FrameTooLong { address, len } => {
                write!(
                    f,
                    "Frame for 0x{address:02X} too long: {len} bytes (max {})",
                    crate::codec::MAX_FRAME_LEN
                )
            }
        }
    }
}

impl<E: Debug> core::error::Error for BusError<E> {}

/// Errors that can occur during panel lifecycle operations
///
/// Generic over the bus and power-supply error types so that callers can
/// match on the underlying hardware error.
#[derive(Debug, PartialEq)]
pub enum Error<BusE, PowerE> {
    /// Power supply failed to switch on
    ///
    /// The supply's own error, unchanged.
    Power(PowerE),
    /// A command write failed where the active policy treats it as fatal
    Bus(BusError<BusE>),
    /// The mode list could not be allocated
    Allocation,
    /// `enable()` called before a successful `prepare()`
    NotPrepared,
}

impl<BusE, PowerE> From<BusError<BusE>> for Error<BusE, PowerE> {
    fn from(e: BusError<BusE>) -> Self {
        Self::Bus(e)
    }
}

impl<BusE: Debug, PowerE: Debug> fmt::Display for Error<BusE, PowerE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Power(e) => write!(f, "Power supply error: {e:?}"),
            Self::Bus(e) => write!(f, "{e}"),
            Self::Allocation => write!(f, "Out of memory while duplicating mode"),
            Self::NotPrepared => write!(f, "Panel must be prepared before it is enabled"),
        }
    }
}

impl<BusE: Debug, PowerE: Debug> core::error::Error for Error<BusE, PowerE> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the panel is created.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Mode was not specified
    ///
    /// [`Builder::mode()`](crate::config::Builder::mode) must be called before building.
    MissingMode,
    /// Mode timings are not monotonic or have a zero active area / clock
    ///
    /// Each axis must satisfy `0 < display <= sync_start <= sync_end <= total`.
    InvalidMode {
        /// Horizontal active pixels
        h_display: u16,
        /// Vertical active lines
        v_display: u16,
    },
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMode => write!(f, "Mode must be specified"),
            Self::InvalidMode {
                h_display,
                v_display,
            } => write!(
                f,
                "Invalid mode {h_display}x{v_display} (timings must satisfy display <= sync_start <= sync_end <= total)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}

/// Errors that can occur when binding a panel to a bus device
#[derive(Debug, PartialEq)]
pub enum ProbeError<E> {
    /// No registered panel matches the compatible string
    UnknownPanel,
    /// The registered description does not yield a valid configuration
    InvalidDescriptor(BuilderError),
    /// The DSI host refused the link configuration
    Attach(E),
}

impl<E> From<BuilderError> for ProbeError<E> {
    fn from(e: BuilderError) -> Self {
        Self::InvalidDescriptor(e)
    }
}

impl<E: Debug> fmt::Display for ProbeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanel => write!(f, "No panel registered for this compatible string"),
            Self::InvalidDescriptor(e) => write!(f, "Invalid panel description: {e}"),
            Self::Attach(e) => write!(f, "DSI attach failed: {e:?}"),
        }
    }
}

impl<E: Debug> core::error::Error for ProbeError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_bus_error_address() {
        let transport: BusError<()> = BusError::Transport {
            address: 0xE0,
            source: (),
        };
        assert_eq!(transport.address(), 0xE0);

        let too_long: BusError<()> = BusError::FrameTooLong {
            address: 0x60,
            len: 80,
        };
        assert_eq!(too_long.address(), 0x60);
    }

    #[test]
    fn test_bus_error_display_names_address() {
        let e: BusError<i32> = BusError::Transport {
            address: 0x29,
            source: -5,
        };
        assert_eq!(e.to_string(), "Bus write to 0x29 failed: -5");
    }

    #[test]
    fn test_error_from_bus_error() {
        let e: Error<i32, ()> = BusError::Transport {
            address: 0x11,
            source: -110,
        }
        .into();
        assert!(matches!(
            e,
            Error::Bus(BusError::Transport { address: 0x11, .. })
        ));
    }

    #[test]
    fn test_builder_error_display() {
        let e = BuilderError::InvalidMode {
            h_display: 0,
            v_display: 1280,
        };
        assert!(e.to_string().starts_with("Invalid mode 0x1280"));
    }

    #[test]
    fn test_probe_error_from_builder_error() {
        let e: ProbeError<()> = BuilderError::MissingMode.into();
        assert_eq!(e, ProbeError::InvalidDescriptor(BuilderError::MissingMode));
        assert_eq!(
            e.to_string(),
            "Invalid panel description: Mode must be specified"
        );
    }
}
