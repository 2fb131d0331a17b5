//! Hardware capability abstraction
//!
//! The panel core never touches a peripheral directly. It drives four
//! capabilities, each a small trait:
//!
//! - [`DsiBus`] - byte-buffer command writes (DSI generic/DCS writes, or DBI over SPI)
//! - [`PowerSupply`] - the panel rail (regulator or load switch), fallible
//! - [`ResetLine`] - the optional reset GPIO, best-effort
//! - [`Backlight`] - the light source, on/off
//!
//! Adapters for embedded-hal v1.0 pins and SPI devices are provided:
//! [`GpioReset`], [`GpioBacklight`], [`GpioSupply`] and [`SpiDbiBus`].
//! Panels without a reset line use [`NoReset`].
//!
//! ## Example
//!
//! ```rust
//! use dsi_panel::{Backlight, GpioBacklight, GpioReset, ResetLine};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! // Reset is wired active-low on most panels
//! let mut reset = GpioReset::active_low(MockPin);
//! reset.set(true); // drives the pin low
//!
//! let mut backlight = GpioBacklight::new(MockPin);
//! backlight.enable();
//! ```

use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Command transport to the panel controller
///
/// One call is one bus transaction. The first byte is the command or
/// register address, the rest are parameters.
pub trait DsiBus {
    /// Error type for bus operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write one command frame
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was not acknowledged.
    fn write(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error>;
}

/// Panel power rail
pub trait PowerSupply {
    /// Error type for supply operations
    type Error: Debug;

    /// Switch the rail on
    ///
    /// # Errors
    ///
    /// Returns an error if the rail could not be enabled.
    fn enable(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Switch the rail off
    ///
    /// # Errors
    ///
    /// Returns an error if the rail could not be disabled.
    fn disable(&mut self) -> InterfaceResult<(), Self::Error>;
}

/// Controller reset line
///
/// `set(true)` asserts reset (holds the controller in reset), whatever the
/// electrical polarity. Failures are ignored; a reset GPIO has no useful
/// error to report mid-sequence.
pub trait ResetLine {
    /// Assert (`true`) or release (`false`) reset
    fn set(&mut self, active: bool);
}

/// Panel backlight
pub trait Backlight {
    /// Turn the light on
    fn enable(&mut self);
    /// Turn the light off
    fn disable(&mut self);
}

/// Placeholder for panels without a reset line
///
/// Uninhabited: `Option<NoReset>` can only ever be `None`.
#[derive(Debug)]
pub enum NoReset {}

impl ResetLine for NoReset {
    fn set(&mut self, _active: bool) {
        match *self {}
    }
}

/// Reset line on a GPIO output
#[derive(Debug)]
pub struct GpioReset<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> GpioReset<P> {
    /// Reset asserted when the pin is low (the common wiring)
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Reset asserted when the pin is high
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ResetLine for GpioReset<P> {
    fn set(&mut self, active: bool) {
        let drive_high = active != self.active_low;
        let _ = if drive_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

/// Backlight switched by an enable GPIO (active high)
#[derive(Debug)]
pub struct GpioBacklight<P> {
    pin: P,
}

impl<P: OutputPin> GpioBacklight<P> {
    /// Create a new backlight on an enable pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Backlight for GpioBacklight<P> {
    fn enable(&mut self) {
        let _ = self.pin.set_high();
    }

    fn disable(&mut self) {
        let _ = self.pin.set_low();
    }
}

/// Power rail switched by a regulator / load-switch enable GPIO (active high)
#[derive(Debug)]
pub struct GpioSupply<P> {
    pin: P,
}

impl<P: OutputPin> GpioSupply<P> {
    /// Create a new supply on an enable pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> PowerSupply for GpioSupply<P>
where
    P: OutputPin,
    P::Error: Debug,
{
    type Error = P::Error;

    fn enable(&mut self) -> InterfaceResult<(), Self::Error> {
        self.pin.set_high()
    }

    fn disable(&mut self) -> InterfaceResult<(), Self::Error> {
        self.pin.set_low()
    }
}

/// Errors that can occur at the SPI interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Command bus over MIPI DBI type C (4-wire SPI)
///
/// Many DSI controllers also expose a DBI port for bring-up. The first byte
/// of each frame is clocked out with DC low (command), the rest with DC high
/// (parameters).
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
///
/// ## Example
///
/// ```rust
/// use dsi_panel::{DsiBus, SpiDbiBus};
/// # use core::convert::Infallible;
/// # use embedded_hal::digital::OutputPin;
/// # use embedded_hal::spi::{Operation, SpiDevice};
/// # struct MockSpi;
/// # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
/// # impl SpiDevice for MockSpi {
/// #     fn transaction(
/// #         &mut self,
/// #         _operations: &mut [Operation<'_, u8>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// # struct MockPin;
/// # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
/// # impl OutputPin for MockPin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// let mut bus = SpiDbiBus::new(MockSpi, MockPin);
/// let _ = bus.write(&[0xE0, 0x00]); // select page 0
/// ```
pub struct SpiDbiBus<SPI, DC> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
}

impl<SPI, DC> SpiDbiBus<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    /// Create a new DBI bus
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self { spi, dc }
    }

    /// Release the SPI device and DC pin
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI, DC> DsiBus for SpiDbiBus<SPI, DC>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin,
    DC::Error: Debug,
{
    type Error = InterfaceError<SPI::Error, DC::Error>;

    fn write(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        let Some((command, params)) = bytes.split_first() else {
            return Ok(());
        };
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi
            .write(core::slice::from_ref(command))
            .map_err(InterfaceError::Spi)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(InterfaceError::Pin)?;
            self.spi.write(params).map_err(InterfaceError::Spi)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use embedded_hal::digital::ErrorType;
    use embedded_hal::spi::ErrorType as SpiErrorType;

    #[derive(Debug, Clone, PartialEq)]
    enum Wire {
        Level(bool),
        Spi(Vec<u8>),
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct MockError;

    impl embedded_hal::digital::Error for MockError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::Error for MockError {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    #[derive(Debug)]
    struct MockSpi {
        wire: Rc<RefCell<Vec<Wire>>>,
        fail: bool,
    }

    impl SpiErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(
            &mut self,
            operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            for op in operations {
                if let embedded_hal::spi::Operation::Write(bytes) = op {
                    self.wire.borrow_mut().push(Wire::Spi(bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct MockPin {
        wire: Rc<RefCell<Vec<Wire>>>,
    }

    impl ErrorType for MockPin {
        type Error = MockError;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.wire.borrow_mut().push(Wire::Level(false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.wire.borrow_mut().push(Wire::Level(true));
            Ok(())
        }
    }

    fn wired(fail: bool) -> (Rc<RefCell<Vec<Wire>>>, MockSpi, MockPin) {
        let wire = Rc::new(RefCell::new(Vec::new()));
        let spi = MockSpi {
            wire: wire.clone(),
            fail,
        };
        let pin = MockPin { wire: wire.clone() };
        (wire, spi, pin)
    }

    #[test]
    fn test_dbi_write_splits_command_and_params() {
        let (wire, spi, dc) = wired(false);
        let mut bus = SpiDbiBus::new(spi, dc);
        bus.write(&[0xFF, 0x98, 0x81, 0x03]).unwrap();
        assert_eq!(
            *wire.borrow(),
            alloc::vec![
                Wire::Level(false),
                Wire::Spi(alloc::vec![0xFF]),
                Wire::Level(true),
                Wire::Spi(alloc::vec![0x98, 0x81, 0x03]),
            ]
        );
    }

    #[test]
    fn test_dbi_bare_command_keeps_dc_low() {
        let (wire, spi, dc) = wired(false);
        let mut bus = SpiDbiBus::new(spi, dc);
        bus.write(&[0x11]).unwrap();
        assert_eq!(
            *wire.borrow(),
            alloc::vec![Wire::Level(false), Wire::Spi(alloc::vec![0x11])]
        );
    }

    #[test]
    fn test_dbi_empty_frame_is_noop() {
        let (wire, spi, dc) = wired(false);
        let mut bus = SpiDbiBus::new(spi, dc);
        bus.write(&[]).unwrap();
        assert!(wire.borrow().is_empty());
    }

    #[test]
    fn test_dbi_spi_error_is_reported() {
        let (_wire, spi, dc) = wired(true);
        let mut bus = SpiDbiBus::new(spi, dc);
        assert!(matches!(
            bus.write(&[0x29]),
            Err(InterfaceError::Spi(MockError))
        ));
    }

    #[test]
    fn test_gpio_reset_polarity() {
        let (wire, _spi, pin) = wired(false);
        let mut reset = GpioReset::active_low(pin);
        reset.set(true);
        reset.set(false);
        let pin = reset.release();
        let mut reset = GpioReset::active_high(pin);
        reset.set(true);
        assert_eq!(
            *wire.borrow(),
            alloc::vec![Wire::Level(false), Wire::Level(true), Wire::Level(true)]
        );
    }

    #[test]
    fn test_gpio_supply_and_backlight_drive_high_when_on() {
        let (wire, _spi, pin) = wired(false);
        let mut supply = GpioSupply::new(pin);
        supply.enable().unwrap();
        supply.disable().unwrap();
        let mut backlight = GpioBacklight::new(supply.release());
        backlight.enable();
        backlight.disable();
        assert_eq!(
            *wire.borrow(),
            alloc::vec![
                Wire::Level(true),
                Wire::Level(false),
                Wire::Level(true),
                Wire::Level(false)
            ]
        );
    }
}
