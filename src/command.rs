//! MIPI DCS command definitions
//!
//! This module defines the standard Display Command Set (DCS) opcodes used to
//! bracket the vendor init sequence. Vendor (MCS) registers are not listed
//! here; they live in the per-panel tables under [`crate::panels`].
//!
//! ## Command Structure
//!
//! Every bus write is a single buffer whose first byte is the command (or
//! register address) and whose remaining bytes are parameters:
//!
//! - Short write, no parameter: `[command]`
//! - Short write, one parameter: `[command, param]`
//! - Long write: `[command, param0, param1, ...]`
//!
//! ## Example
//!
//! ```rust
//! use dsi_panel::{command, DsiBus};
//! # use core::convert::Infallible;
//! # struct MockBus;
//! # impl DsiBus for MockBus {
//! #     type Error = Infallible;
//! #     fn write(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let mut bus = MockBus;
//! // Wake the controller and turn the output on
//! let _ = bus.write(&[command::EXIT_SLEEP_MODE]);
//! let _ = bus.write(&[command::SET_DISPLAY_ON]);
//! ```

// Power mode commands

/// Enter sleep mode (0x10)
///
/// Stops the DC/DC converters and the internal oscillator. The controller
/// needs about 120ms before the supply may be removed.
pub const ENTER_SLEEP_MODE: u8 = 0x10;

/// Exit sleep mode (0x11)
///
/// Starts the DC/DC converters and the internal oscillator. The controller
/// needs up to 120ms to stabilize before the next command.
pub const EXIT_SLEEP_MODE: u8 = 0x11;

// Display output commands

/// Set display off (0x28)
///
/// Stops output from frame memory; the panel shows blank.
pub const SET_DISPLAY_OFF: u8 = 0x28;

/// Set display on (0x29)
///
/// Starts output from frame memory.
pub const SET_DISPLAY_ON: u8 = 0x29;

// Tearing effect commands

/// Set tear on (0x35)
///
/// Requires 1 byte: 0x00 = V-blank only, 0x01 = V-blank and H-blank
pub const SET_TEAR_ON: u8 = 0x35;

// Brightness commands (used by panels with an internal PWM)

/// Write display brightness (0x51)
pub const SET_DISPLAY_BRIGHTNESS: u8 = 0x51;
