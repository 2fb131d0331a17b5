//! Command sequence tables
//!
//! Vendor init sequences are plain data: an ordered list of [`CommandPage`]s,
//! each naming the controller page it targets and the [`CommandEntry`]s to
//! write there. One generic replay in [`crate::panel`] consumes them.
//!
//! ## Example
//!
//! ```
//! use dsi_panel::{CommandEntry, CommandPage, InitSequence};
//!
//! static PAGE1: [CommandEntry; 2] = [
//!     CommandEntry::single(0x00, 0x00),
//!     CommandEntry::single(0x01, 0xA0),
//! ];
//! static GAMMA: [CommandEntry; 1] = [CommandEntry::block(0x5D, &[0x7C, 0x65, 0x53])];
//!
//! static PAGES: [CommandPage; 2] = [
//!     CommandPage::on_page(1, &PAGE1),
//!     CommandPage::on_page(1, &GAMMA),
//! ];
//! let sequence = InitSequence::new(&PAGES);
//! assert_eq!(sequence.frame_count(), 3);
//! ```

use crate::codec::Addressing;

/// One write (or pause) in a vendor table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandEntry {
    /// Single register write: `[address, value]`
    Single {
        /// Register address
        address: u8,
        /// Register value
        value: u8,
    },
    /// Auto-increment block write: `[address, values...]` in one transaction
    Block {
        /// First register address
        address: u8,
        /// Values for `address`, `address + 1`, ...
        values: &'static [u8],
    },
    /// One transaction per value at `address + i`
    ///
    /// For register ranges the controller cannot auto-increment across.
    PerRegister {
        /// First register address
        address: u8,
        /// Values for `address`, `address + 1`, ...
        values: &'static [u8],
    },
    /// Command without parameters: `[address]`
    Command {
        /// Command code
        address: u8,
    },
    /// Pause mandated by the vendor between two writes
    Delay {
        /// Milliseconds to wait
        ms: u32,
    },
}

impl CommandEntry {
    /// Single register write
    pub const fn single(address: u8, value: u8) -> Self {
        Self::Single { address, value }
    }

    /// Auto-increment block write
    pub const fn block(address: u8, values: &'static [u8]) -> Self {
        Self::Block { address, values }
    }

    /// One write per register
    pub const fn per_register(address: u8, values: &'static [u8]) -> Self {
        Self::PerRegister { address, values }
    }

    /// Parameterless command
    pub const fn command(address: u8) -> Self {
        Self::Command { address }
    }

    /// Pause
    pub const fn delay(ms: u32) -> Self {
        Self::Delay { ms }
    }

    /// Target address, `None` for a delay
    pub fn address(&self) -> Option<u8> {
        match *self {
            Self::Single { address, .. }
            | Self::Block { address, .. }
            | Self::PerRegister { address, .. }
            | Self::Command { address } => Some(address),
            Self::Delay { .. } => None,
        }
    }

    /// Addressing discipline used to encode this entry
    pub fn addressing(&self) -> Addressing {
        match self {
            Self::PerRegister { .. } => Addressing::PerRegister,
            _ => Addressing::Block,
        }
    }

    /// Number of bus transactions this entry produces
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Single { .. } | Self::Block { .. } | Self::Command { .. } => 1,
            Self::PerRegister { values, .. } => values.len(),
            Self::Delay { .. } => 0,
        }
    }
}

/// Entries that target one controller page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandPage {
    /// Page to select first; `None` writes without switching
    pub page: Option<u8>,
    /// Entries in write order
    pub entries: &'static [CommandEntry],
}

impl CommandPage {
    /// Entries preceded by a switch to `page`
    pub const fn on_page(page: u8, entries: &'static [CommandEntry]) -> Self {
        Self {
            page: Some(page),
            entries,
        }
    }

    /// Entries written in whatever page is active
    pub const fn unpaged(entries: &'static [CommandEntry]) -> Self {
        Self {
            page: None,
            entries,
        }
    }
}

/// Ordered vendor init table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitSequence {
    pages: &'static [CommandPage],
}

impl InitSequence {
    /// An empty sequence
    pub const EMPTY: Self = Self { pages: &[] };

    /// Wrap a static page table
    pub const fn new(pages: &'static [CommandPage]) -> Self {
        Self { pages }
    }

    /// Pages in replay order
    pub fn pages(&self) -> &'static [CommandPage] {
        self.pages
    }

    /// Entries in replay order, flattened across pages
    pub fn entries(&self) -> impl Iterator<Item = &'static CommandEntry> {
        self.pages.iter().flat_map(|page| page.entries.iter())
    }

    /// Number of register/command transactions, excluding page switches
    pub fn frame_count(&self) -> usize {
        self.entries().map(CommandEntry::frame_count).sum()
    }

    /// Sum of all in-table delays in milliseconds
    pub fn delay_ms(&self) -> u32 {
        self.entries()
            .map(|entry| match entry {
                CommandEntry::Delay { ms } => *ms,
                _ => 0,
            })
            .sum()
    }

    /// Whether the table has no pages
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
