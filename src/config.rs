//! Panel configuration types and builder

use core::ops::BitOr;

pub use crate::error::BuilderError;
use crate::mode::ModeDescriptor;
use crate::page::PageSelect;
use crate::sequence::InitSequence;

/// What to do when a command write fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplayPolicy {
    /// Log the failure and keep going
    ///
    /// A controller often still reaches a working state after an isolated
    /// register glitch.
    #[default]
    BestEffort,
    /// Abort on the first failure
    FailFast,
}

/// Lifecycle delays in milliseconds
///
/// Each delay is a lower bound that completes before the next dependent
/// operation starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// Reset held asserted during power-up
    pub reset_assert_ms: u32,
    /// Controller boot time after reset release
    pub reset_boot_ms: u32,
    /// Settle time after exit-sleep
    pub sleep_exit_ms: u32,
    /// Settle time after display-on
    pub display_on_ms: u32,
    /// Settle time after enter-sleep, before reset/power removal
    pub sleep_enter_ms: u32,
    /// Reset held asserted before the supply is removed
    pub reset_hold_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reset_assert_ms: 20,
            reset_boot_ms: 100,
            sleep_exit_ms: 125,
            display_on_ms: 20,
            sleep_enter_ms: 120,
            reset_hold_ms: 20,
        }
    }
}

/// Pixel format on the DSI video stream
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelFormat {
    /// 24 bits per pixel
    #[default]
    Rgb888,
    /// 18 bits per pixel, loosely packed
    Rgb666,
    /// 18 bits per pixel, packed
    Rgb666Packed,
    /// 16 bits per pixel
    Rgb565,
}

impl PixelFormat {
    /// Bits per pixel on the wire
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Rgb888 | Self::Rgb666 => 24,
            Self::Rgb666Packed => 18,
            Self::Rgb565 => 16,
        }
    }
}

/// DSI link mode flags (Linux `MIPI_DSI_MODE_*` bit layout)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DsiModeFlags(pub u32);

impl DsiModeFlags {
    /// Video mode (as opposed to command mode)
    pub const VIDEO: Self = Self(1 << 0);
    /// Burst video transfers
    pub const VIDEO_BURST: Self = Self(1 << 1);
    /// Send hsync-end packets
    pub const VIDEO_HSE: Self = Self(1 << 4);
    /// Send end-of-transmission packets
    pub const EOT_PACKET: Self = Self(1 << 9);
    /// Send commands in low-power mode
    pub const LPM: Self = Self(1 << 11);

    /// Whether every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both sets of flags, usable in const context
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for DsiModeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Link parameters the DSI host must apply before talking to the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DsiLink {
    /// Number of data lanes
    pub lanes: u8,
    /// Video pixel format
    pub format: PixelFormat,
    /// Link mode flags
    pub mode_flags: DsiModeFlags,
}

impl Default for DsiLink {
    fn default() -> Self {
        Self {
            lanes: 4,
            format: PixelFormat::Rgb888,
            mode_flags: DsiModeFlags::VIDEO | DsiModeFlags::VIDEO_BURST | DsiModeFlags::LPM,
        }
    }
}

/// Panel configuration
///
/// Holds everything the lifecycle state machine needs besides the hardware
/// capabilities. Use [`Builder`] or
/// [`PanelDescriptor::config`](crate::registry::PanelDescriptor::config).
#[derive(Clone, Debug)]
pub struct Config {
    /// Preferred video mode
    pub mode: ModeDescriptor,
    /// Vendor init table replayed during prepare
    pub init_sequence: InitSequence,
    /// Page-switch protocol of the controller
    pub page_select: PageSelect,
    /// Skip page switches to the already-active page
    pub elide_redundant_pages: bool,
    /// Lifecycle delays
    pub timings: Timings,
    /// Failure handling for the init table
    pub init_policy: ReplayPolicy,
    /// Failure handling for display-off / enter-sleep during unprepare
    pub shutdown_policy: ReplayPolicy,
    /// Remove power again when prepare fails after enabling it
    ///
    /// When unset, the supply stays on after a failed prepare and is
    /// removed by the next [`Panel::unprepare`](crate::panel::Panel::unprepare).
    pub rollback_on_failure: bool,
    /// DSI link parameters
    pub link: DsiLink,
}

/// Builder for constructing panel configuration
///
/// # Example
///
/// ```rust
/// use dsi_panel::{Builder, ReplayPolicy};
/// use dsi_panel::panels::jd9366;
///
/// let config = match Builder::new()
///     .mode(jd9366::MODE)
///     .init_sequence(jd9366::INIT_SEQUENCE)
///     .page_select(jd9366::PAGE_SELECT)
///     .init_policy(ReplayPolicy::FailFast)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.timings.sleep_exit_ms, 125);
/// ```
#[must_use]
pub struct Builder {
    /// Preferred video mode (required)
    mode: Option<ModeDescriptor>,
    /// Vendor init table
    init_sequence: InitSequence,
    /// Page-switch protocol
    page_select: PageSelect,
    /// Skip redundant page switches
    elide_redundant_pages: bool,
    /// Lifecycle delays
    timings: Timings,
    /// Failure handling for the init table
    init_policy: ReplayPolicy,
    /// Failure handling during unprepare
    shutdown_policy: ReplayPolicy,
    /// Roll back power on failed prepare
    rollback_on_failure: bool,
    /// DSI link parameters
    link: DsiLink,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            mode: None,
            init_sequence: InitSequence::EMPTY,
            page_select: PageSelect::None,
            // Vendor tables re-select pages on purpose
            elide_redundant_pages: false,
            timings: Timings::default(),
            init_policy: ReplayPolicy::BestEffort,
            shutdown_policy: ReplayPolicy::BestEffort,
            rollback_on_failure: true,
            link: DsiLink::default(),
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred mode (required)
    pub fn mode(mut self, mode: ModeDescriptor) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the vendor init table
    pub fn init_sequence(mut self, sequence: InitSequence) -> Self {
        self.init_sequence = sequence;
        self
    }

    /// Set the page-switch protocol
    pub fn page_select(mut self, protocol: PageSelect) -> Self {
        self.page_select = protocol;
        self
    }

    /// Skip switches to the page that is already active
    pub fn elide_redundant_pages(mut self, value: bool) -> Self {
        self.elide_redundant_pages = value;
        self
    }

    /// Set all lifecycle delays
    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Set the failure policy for the init table
    pub fn init_policy(mut self, policy: ReplayPolicy) -> Self {
        self.init_policy = policy;
        self
    }

    /// Set the failure policy for the unprepare handshake
    pub fn shutdown_policy(mut self, policy: ReplayPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Remove power again if prepare fails after enabling it
    pub fn rollback_on_failure(mut self, value: bool) -> Self {
        self.rollback_on_failure = value;
        self
    }

    /// Set the DSI link parameters
    pub fn link(mut self, link: DsiLink) -> Self {
        self.link = link;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingMode` if no mode was set, or
    /// `BuilderError::InvalidMode` if its timings are inconsistent.
    pub fn build(self) -> Result<Config, BuilderError> {
        let mode = self.mode.ok_or(BuilderError::MissingMode)?;
        mode.validate()?;
        Ok(Config {
            mode,
            init_sequence: self.init_sequence,
            page_select: self.page_select,
            elide_redundant_pages: self.elide_redundant_pages,
            timings: self.timings,
            init_policy: self.init_policy,
            shutdown_policy: self.shutdown_policy,
            rollback_on_failure: self.rollback_on_failure,
            link: self.link,
        })
    }
}
