//! MIPI DSI Panel Driver Core
//!
//! Power sequencing and command transport for display panels driven over a
//! serial command bus (MIPI DSI, or MIPI DBI over SPI), independent of any
//! OS display framework.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - Lifecycle state machine: `prepare` / `enable` / `disable` / `unprepare`
//! - Vendor init tables as typed static data, with page switching
//! - Block and per-register addressing
//! - Built-in JD9366 and NWE080 (ILI9881-class) panels
//! - `embedded-graphics` integration for mode geometry (with `graphics` feature)
//!
//! ## Usage
//!
//! ```rust
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use dsi_panel::{DsiBus, GpioBacklight, GpioReset, GpioSupply, Panel};
//! use dsi_panel::panels::jd9366;
//!
//! # struct MockBus;
//! # impl DsiBus for MockBus {
//! #     type Error = Infallible;
//! #     fn write(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let bus = MockBus;
//! # let mut delay = MockDelay;
//! let config = match jd9366::DESCRIPTOR.builder().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut panel = Panel::new(
//!     bus,
//!     GpioSupply::new(MockPin),
//!     Some(GpioReset::active_low(MockPin)),
//!     GpioBacklight::new(MockPin),
//!     config,
//! );
//!
//! let _ = panel.prepare(&mut delay);
//! let _ = panel.enable();
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Command codec
pub mod codec;
/// Standard DCS command definitions
pub mod command;
/// Panel configuration types and builder
pub mod config;
/// Error types for the driver
pub mod error;
/// Hardware capability abstraction
pub mod interface;
/// Video mode descriptor
pub mod mode;
/// Controller page selection
pub mod page;
/// Panel lifecycle state machine
pub mod panel;
/// Built-in panel descriptions
pub mod panels;
/// Panel registry and driver adapter
pub mod registry;
/// Command sequence tables
pub mod sequence;

pub use codec::{Addressing, CommandCodec, MAX_FRAME_LEN};
pub use config::{Builder, Config, DsiLink, DsiModeFlags, PixelFormat, ReplayPolicy, Timings};
pub use error::{BuilderError, BusError, Error, ProbeError};
pub use interface::InterfaceError;
pub use interface::{
    Backlight, DsiBus, GpioBacklight, GpioReset, GpioSupply, NoReset, PowerSupply, ResetLine,
    SpiDbiBus,
};
pub use mode::{ModeDescriptor, ModeFlags, ModeKind};
pub use page::{PageSelect, PageSelector};
pub use panel::{Panel, PanelState, ReplayReport};
pub use registry::{DsiHost, PanelDescriptor, PanelRegistry, Resources};
pub use sequence::{CommandEntry, CommandPage, InitSequence};
