//! Controller page (bank) selection
//!
//! Vendor controllers split their manufacturer registers into numbered
//! pages. A page-switch command must precede any write to a register in that
//! page. The switch protocol differs per controller family and is described
//! by [`PageSelect`].
//!
//! [`PageSelector`] remembers the active page so redundant switches can be
//! skipped. Skipping is off by default: vendor tables re-select defensively
//! and some controllers latch extra state on every switch.

use crate::codec::{CommandCodec, MAX_FRAME_LEN};
use crate::error::BusError;
use crate::interface::DsiBus;

/// Page-switch protocol of a controller family
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageSelect {
    /// No pages; switching is a no-op
    #[default]
    None,
    /// `[command, page]` (e.g. JD9366: `0xE0`)
    Register {
        /// Page-select command code
        command: u8,
    },
    /// `[prefix..., page]`, an unlock key followed by the page
    /// (e.g. ILI9881: `0xFF 0x98 0x81`)
    Unlock {
        /// Bytes sent before the page number
        prefix: &'static [u8],
    },
}

impl PageSelect {
    /// Length of the switch frame, 0 when the controller has no pages
    pub fn frame_len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Register { .. } => 2,
            Self::Unlock { prefix } => prefix.len() + 1,
        }
    }

    /// First byte of the switch frame
    pub fn command(&self) -> Option<u8> {
        match *self {
            Self::None => None,
            Self::Register { command } => Some(command),
            Self::Unlock { prefix } => prefix.first().copied(),
        }
    }

    /// Build the switch frame for `page`; `buf` is exactly `frame_len()` long
    fn encode(&self, page: u8, buf: &mut [u8]) {
        match *self {
            Self::None => {}
            Self::Register { command } => {
                buf[0] = command;
                buf[1] = page;
            }
            Self::Unlock { prefix } => {
                let (key, tail) = buf.split_at_mut(prefix.len());
                key.copy_from_slice(prefix);
                tail[0] = page;
            }
        }
    }
}

/// Tracks and switches the active controller page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageSelector {
    protocol: PageSelect,
    current: Option<u8>,
    elide_redundant: bool,
}

impl PageSelector {
    /// Create a selector for a controller family
    pub fn new(protocol: PageSelect, elide_redundant: bool) -> Self {
        Self {
            protocol,
            current: None,
            elide_redundant,
        }
    }

    /// Switch the controller to `page`
    ///
    /// # Errors
    ///
    /// Returns the [`BusError`] of the switch frame. The tracked page is
    /// forgotten on failure since the controller state is then unknown.
    pub fn select_page<B: DsiBus>(
        &mut self,
        codec: &mut CommandCodec<B>,
        page: u8,
    ) -> Result<(), BusError<B::Error>> {
        if self.protocol == PageSelect::None {
            return Ok(());
        }
        if self.elide_redundant && self.current == Some(page) {
            log::trace!("page {page} already active");
            return Ok(());
        }
        let len = self.protocol.frame_len();
        if len > MAX_FRAME_LEN {
            self.current = None;
            return Err(BusError::FrameTooLong {
                address: self.protocol.command().unwrap_or(page),
                len,
            });
        }

        let mut frame = [0u8; MAX_FRAME_LEN];
        self.protocol.encode(page, &mut frame[..len]);
        match codec.write_raw(&frame[..len]) {
            Ok(()) => {
                self.current = Some(page);
                Ok(())
            }
            Err(e) => {
                self.current = None;
                Err(e)
            }
        }
    }

    /// Page the controller was last switched to, if known
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Forget the tracked page (after reset or power loss)
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Switch protocol in use
    pub fn protocol(&self) -> PageSelect {
        self.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockBus {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl DsiBus for MockBus {
        type Error = ();

        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.frames.push(bytes.to_vec());
            if self.fail { Err(()) } else { Ok(()) }
        }
    }

    const ILI9881: PageSelect = PageSelect::Unlock {
        prefix: &[0xFF, 0x98, 0x81],
    };

    #[test]
    fn test_register_switch_frame() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(PageSelect::Register { command: 0xE0 }, false);
        pages.select_page(&mut codec, 4).unwrap();
        assert_eq!(codec.bus_mut().frames, alloc::vec![alloc::vec![0xE0, 0x04]]);
        assert_eq!(pages.current(), Some(4));
    }

    #[test]
    fn test_unlock_switch_frame() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(ILI9881, false);
        pages.select_page(&mut codec, 3).unwrap();
        assert_eq!(
            codec.bus_mut().frames,
            alloc::vec![alloc::vec![0xFF, 0x98, 0x81, 0x03]]
        );
        assert_eq!(ILI9881.frame_len(), 4);
    }

    #[test]
    fn test_no_pages_is_noop() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(PageSelect::None, false);
        pages.select_page(&mut codec, 1).unwrap();
        assert!(codec.bus_mut().frames.is_empty());
        assert_eq!(pages.current(), None);
    }

    #[test]
    fn test_redundant_switch_resent_by_default() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(PageSelect::Register { command: 0xE0 }, false);
        pages.select_page(&mut codec, 0).unwrap();
        pages.select_page(&mut codec, 0).unwrap();
        assert_eq!(codec.bus_mut().frames.len(), 2);
    }

    #[test]
    fn test_redundant_switch_elided() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(PageSelect::Register { command: 0xE0 }, true);
        pages.select_page(&mut codec, 0).unwrap();
        pages.select_page(&mut codec, 0).unwrap();
        pages.select_page(&mut codec, 1).unwrap();
        assert_eq!(
            codec.bus_mut().frames,
            alloc::vec![alloc::vec![0xE0, 0x00], alloc::vec![0xE0, 0x01]]
        );
    }

    #[test]
    fn test_invalidate_forces_switch() {
        let mut codec = CommandCodec::new(MockBus::default());
        let mut pages = PageSelector::new(PageSelect::Register { command: 0xE0 }, true);
        pages.select_page(&mut codec, 2).unwrap();
        pages.invalidate();
        pages.select_page(&mut codec, 2).unwrap();
        assert_eq!(codec.bus_mut().frames.len(), 2);
    }

    #[test]
    fn test_failed_switch_forgets_page() {
        let mut codec = CommandCodec::new(MockBus {
            frames: Vec::new(),
            fail: true,
        });
        let mut pages = PageSelector::new(PageSelect::Register { command: 0xE0 }, true);
        let result = pages.select_page(&mut codec, 1);
        assert_eq!(
            result,
            Err(BusError::Transport {
                address: 0xE0,
                source: ()
            })
        );
        assert_eq!(pages.current(), None);
    }
}
