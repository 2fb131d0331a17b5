//! Command codec
//!
//! Encodes a register address and payload into bus frames. Two addressing
//! disciplines exist because some controllers cannot auto-increment their
//! internal address across every register range:
//!
//! - [`Addressing::Block`]: one frame `[address, payload...]`
//! - [`Addressing::PerRegister`]: one frame `[address + i, payload[i]]` per byte
//!
//! The codec never retries. A failed transaction is returned as a
//! [`BusError`] naming the address that failed; whether that is fatal is the
//! caller's decision (see [`ReplayPolicy`](crate::config::ReplayPolicy)).
//!
//! ## Example
//!
//! ```rust
//! use dsi_panel::{Addressing, CommandCodec, DsiBus};
//! # use core::convert::Infallible;
//! # struct MockBus;
//! # impl DsiBus for MockBus {
//! #     type Error = Infallible;
//! #     fn write(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! let mut codec = CommandCodec::new(MockBus);
//!
//! // [0x5D, 0x7C, 0x65] in one transaction
//! let _ = codec.write(0x5D, &[0x7C, 0x65], Addressing::Block);
//!
//! // [0x70, 0x10] then [0x71, 0x13]
//! let _ = codec.write(0x70, &[0x10, 0x13], Addressing::PerRegister);
//! ```

use embedded_hal::delay::DelayNs;

use crate::error::BusError;
use crate::interface::DsiBus;
use crate::sequence::CommandEntry;

type CodecResult<E> = core::result::Result<(), BusError<E>>;

/// Largest frame the codec will send, address byte included
pub const MAX_FRAME_LEN: usize = 64;

/// Register addressing discipline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Addressing {
    /// Single transaction, controller auto-increments
    #[default]
    Block,
    /// One transaction per register, address incremented by the host
    PerRegister,
}

/// Frames register writes onto a [`DsiBus`]
#[derive(Debug)]
pub struct CommandCodec<B> {
    bus: B,
}

impl<B: DsiBus> CommandCodec<B> {
    /// Create a codec owning the bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Write `payload` starting at `address`
    ///
    /// An empty payload in block mode sends the bare command `[address]`;
    /// in per-register mode it sends nothing. Per-register addresses wrap at
    /// 0xFF like the controller's 8-bit register index.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Transport`] with the failing address on the first
    /// rejected transaction, or [`BusError::FrameTooLong`] if a block frame
    /// exceeds [`MAX_FRAME_LEN`].
    pub fn write(
        &mut self,
        address: u8,
        payload: &[u8],
        addressing: Addressing,
    ) -> CodecResult<B::Error> {
        match addressing {
            Addressing::Block => self.write_block(address, payload),
            Addressing::PerRegister => self.write_per_register(address, payload),
        }
    }

    /// Send a parameterless command
    pub fn command(&mut self, command: u8) -> CodecResult<B::Error> {
        self.write_block(command, &[])
    }

    /// Write one table entry
    ///
    /// [`CommandEntry::Delay`] waits on `delay` and touches no bus.
    pub fn write_entry<D: DelayNs>(
        &mut self,
        entry: &CommandEntry,
        delay: &mut D,
    ) -> CodecResult<B::Error> {
        match *entry {
            CommandEntry::Single { address, value } => self.write_block(address, &[value]),
            CommandEntry::Block { address, values } => self.write_block(address, values),
            CommandEntry::PerRegister { address, values } => {
                self.write_per_register(address, values)
            }
            CommandEntry::Command { address } => self.write_block(address, &[]),
            CommandEntry::Delay { ms } => {
                delay.delay_ms(ms);
                Ok(())
            }
        }
    }

    /// Send a raw, already framed buffer
    ///
    /// Used for page-switch sequences whose first byte is a vendor command.
    pub fn write_raw(&mut self, frame: &[u8]) -> CodecResult<B::Error> {
        let address = frame.first().copied().unwrap_or_default();
        if frame.len() > MAX_FRAME_LEN {
            return Err(BusError::FrameTooLong {
                address,
                len: frame.len(),
            });
        }
        self.bus
            .write(frame)
            .map_err(|source| BusError::Transport { address, source })
    }

    /// Access the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus
    pub fn release(self) -> B {
        self.bus
    }

    fn write_block(&mut self, address: u8, payload: &[u8]) -> CodecResult<B::Error> {
        let len = payload.len() + 1;
        if len > MAX_FRAME_LEN {
            return Err(BusError::FrameTooLong { address, len });
        }
        let mut frame = [0u8; MAX_FRAME_LEN];
        frame[0] = address;
        frame[1..len].copy_from_slice(payload);
        self.bus
            .write(&frame[..len])
            .map_err(|source| BusError::Transport { address, source })
    }

    fn write_per_register(&mut self, address: u8, payload: &[u8]) -> CodecResult<B::Error> {
        for (offset, &value) in payload.iter().enumerate() {
            let register = address.wrapping_add(offset as u8);
            self.bus
                .write(&[register, value])
                .map_err(|source| BusError::Transport {
                    address: register,
                    source,
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockBus {
        frames: Vec<Vec<u8>>,
        fail_on: Option<usize>,
    }

    impl DsiBus for MockBus {
        type Error = i32;

        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            let index = self.frames.len();
            self.frames.push(bytes.to_vec());
            if self.fail_on == Some(index) {
                return Err(-5);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        waits: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.waits.push(ms);
        }
    }

    fn codec() -> CommandCodec<MockBus> {
        CommandCodec::new(MockBus::default())
    }

    #[test]
    fn test_block_write_is_one_frame() {
        let mut codec = codec();
        codec
            .write(0x5D, &[0x7C, 0x65, 0x53], Addressing::Block)
            .unwrap();
        assert_eq!(
            codec.bus.frames,
            alloc::vec![alloc::vec![0x5D, 0x7C, 0x65, 0x53]]
        );
    }

    #[test]
    fn test_per_register_write_increments_address() {
        let mut codec = codec();
        codec
            .write(0x70, &[0x10, 0x13, 0x06], Addressing::PerRegister)
            .unwrap();
        assert_eq!(
            codec.bus.frames,
            alloc::vec![
                alloc::vec![0x70, 0x10],
                alloc::vec![0x71, 0x13],
                alloc::vec![0x72, 0x06]
            ]
        );
    }

    #[test]
    fn test_per_register_address_wraps() {
        let mut codec = codec();
        codec
            .write(0xFF, &[0x01, 0x02], Addressing::PerRegister)
            .unwrap();
        assert_eq!(codec.bus.frames[1], alloc::vec![0x00, 0x02]);
    }

    #[test]
    fn test_empty_payload() {
        let mut codec = codec();
        codec.write(0x11, &[], Addressing::Block).unwrap();
        codec.write(0x40, &[], Addressing::PerRegister).unwrap();
        assert_eq!(codec.bus.frames, alloc::vec![alloc::vec![0x11]]);
    }

    #[test]
    fn test_failure_reports_failing_address_and_stops() {
        let mut codec = CommandCodec::new(MockBus {
            frames: Vec::new(),
            fail_on: Some(1),
        });
        let result = codec.write(0x20, &[0xAA, 0xBB, 0xCC], Addressing::PerRegister);
        assert_eq!(
            result,
            Err(BusError::Transport {
                address: 0x21,
                source: -5
            })
        );
        assert_eq!(codec.bus.frames.len(), 2);
    }

    #[test]
    fn test_frame_too_long_touches_no_bus() {
        let mut codec = codec();
        let payload = [0u8; MAX_FRAME_LEN];
        let result = codec.write(0x60, &payload, Addressing::Block);
        assert_eq!(
            result,
            Err(BusError::FrameTooLong {
                address: 0x60,
                len: MAX_FRAME_LEN + 1
            })
        );
        assert!(codec.bus.frames.is_empty());
    }

    #[test]
    fn test_largest_block_fits() {
        let mut codec = codec();
        let payload = [0xA5u8; MAX_FRAME_LEN - 1];
        codec.write(0x60, &payload, Addressing::Block).unwrap();
        assert_eq!(codec.bus.frames[0].len(), MAX_FRAME_LEN);
    }

    #[test]
    fn test_write_entry_dispatch() {
        let mut codec = codec();
        let mut delay = MockDelay::default();
        let entries = [
            CommandEntry::single(0xE1, 0x93),
            CommandEntry::per_register(0x00, &[0x47, 0x47]),
            CommandEntry::delay(5),
            CommandEntry::command(0x11),
        ];
        for entry in &entries {
            codec.write_entry(entry, &mut delay).unwrap();
        }
        assert_eq!(
            codec.bus.frames,
            alloc::vec![
                alloc::vec![0xE1, 0x93],
                alloc::vec![0x00, 0x47],
                alloc::vec![0x01, 0x47],
                alloc::vec![0x11]
            ]
        );
        assert_eq!(delay.waits, alloc::vec![5]);
    }

    #[test]
    fn test_write_raw() {
        let mut codec = codec();
        codec.write_raw(&[0xFF, 0x98, 0x81, 0x03]).unwrap();
        assert_eq!(
            codec.bus.frames,
            alloc::vec![alloc::vec![0xFF, 0x98, 0x81, 0x03]]
        );
    }
}
