//! Video mode descriptor
//!
//! A [`ModeDescriptor`] is the static timing and geometry record a panel
//! exposes to the host. It is `Copy`: every query hands out a fresh copy that
//! the caller may annotate freely without touching the master table.
//!
//! ## Example
//!
//! ```
//! use dsi_panel::panels::jd9366;
//!
//! let mode = jd9366::MODE;
//! assert_eq!((mode.h_display, mode.v_display), (800, 1280));
//! assert_eq!(mode.computed_refresh_hz(), 60);
//! ```

use core::fmt;
use core::ops::BitOr;

use crate::error::BuilderError;

/// Sync polarity and scan flags (DRM `DRM_MODE_FLAG_*` bit layout)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags(pub u32);

impl ModeFlags {
    /// No flags
    pub const NONE: Self = Self(0);
    /// Positive horizontal sync
    pub const PHSYNC: Self = Self(1 << 0);
    /// Negative horizontal sync
    pub const NHSYNC: Self = Self(1 << 1);
    /// Positive vertical sync
    pub const PVSYNC: Self = Self(1 << 2);
    /// Negative vertical sync
    pub const NVSYNC: Self = Self(1 << 3);

    /// Whether every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ModeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Origin annotations a host attaches to a mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeKind(pub u8);

impl ModeKind {
    /// Not annotated
    pub const NONE: Self = Self(0);
    /// Mode the host should pick first
    pub const PREFERRED: Self = Self(1 << 3);
    /// Mode supplied by the driver (not probed from EDID)
    pub const DRIVER: Self = Self(1 << 6);

    /// Whether every bit of `other` is set
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ModeKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Timing and geometry of one video mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeDescriptor {
    /// Pixel clock in kHz
    pub pixel_clock: u32,
    /// Active pixels per line
    pub h_display: u16,
    /// Start of horizontal sync (display + front porch)
    pub h_sync_start: u16,
    /// End of horizontal sync (sync start + sync width)
    pub h_sync_end: u16,
    /// Total pixels per line (sync end + back porch)
    pub h_total: u16,
    /// Active lines per frame
    pub v_display: u16,
    /// Start of vertical sync
    pub v_sync_start: u16,
    /// End of vertical sync
    pub v_sync_end: u16,
    /// Total lines per frame
    pub v_total: u16,
    /// Nominal refresh rate in Hz
    pub refresh_hz: u16,
    /// Physical active-area width in millimetres
    pub width_mm: u16,
    /// Physical active-area height in millimetres
    pub height_mm: u16,
    /// Sync polarity and scan flags
    pub flags: ModeFlags,
    /// Host annotations; `NONE` in the master table
    pub kind: ModeKind,
}

impl ModeDescriptor {
    /// Check that both axes are monotonic and the mode is non-empty
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidMode`] if the clock or an active area
    /// is zero, or if `display <= sync_start <= sync_end <= total` does not
    /// hold on either axis.
    pub fn validate(&self) -> Result<(), BuilderError> {
        let axis_ok = |display: u16, start: u16, end: u16, total: u16| {
            display > 0 && display <= start && start <= end && end <= total
        };
        let valid = self.pixel_clock > 0
            && axis_ok(
                self.h_display,
                self.h_sync_start,
                self.h_sync_end,
                self.h_total,
            )
            && axis_ok(
                self.v_display,
                self.v_sync_start,
                self.v_sync_end,
                self.v_total,
            );
        if valid {
            Ok(())
        } else {
            Err(BuilderError::InvalidMode {
                h_display: self.h_display,
                v_display: self.v_display,
            })
        }
    }

    /// Nominal refresh rate, or the computed one if none was given
    pub fn refresh_rate(&self) -> u16 {
        if self.refresh_hz == 0 {
            self.computed_refresh_hz()
        } else {
            self.refresh_hz
        }
    }

    /// Refresh rate derived from clock and totals, rounded to nearest Hz
    ///
    /// Returns 0 if either total is zero.
    pub fn computed_refresh_hz(&self) -> u16 {
        let frame = u64::from(self.h_total) * u64::from(self.v_total);
        if frame == 0 {
            return 0;
        }
        let hz = (u64::from(self.pixel_clock) * 1000 + frame / 2) / frame;
        u16::try_from(hz).unwrap_or(u16::MAX)
    }

    /// Horizontal front porch in pixels
    pub fn h_front_porch(&self) -> u16 {
        self.h_sync_start.saturating_sub(self.h_display)
    }

    /// Horizontal sync width in pixels
    pub fn h_sync_width(&self) -> u16 {
        self.h_sync_end.saturating_sub(self.h_sync_start)
    }

    /// Horizontal back porch in pixels
    pub fn h_back_porch(&self) -> u16 {
        self.h_total.saturating_sub(self.h_sync_end)
    }

    /// Vertical front porch in lines
    pub fn v_front_porch(&self) -> u16 {
        self.v_sync_start.saturating_sub(self.v_display)
    }

    /// Vertical sync width in lines
    pub fn v_sync_width(&self) -> u16 {
        self.v_sync_end.saturating_sub(self.v_sync_start)
    }

    /// Vertical back porch in lines
    pub fn v_back_porch(&self) -> u16 {
        self.v_total.saturating_sub(self.v_sync_end)
    }

    /// Copy annotated as driver-supplied and preferred
    pub fn preferred(self) -> Self {
        Self {
            kind: self.kind | ModeKind::DRIVER | ModeKind::PREFERRED,
            ..self
        }
    }
}

impl fmt::Display for ModeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}@{}",
            self.h_display,
            self.v_display,
            self.refresh_rate()
        )
    }
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::geometry::OriginDimensions for ModeDescriptor {
    fn size(&self) -> embedded_graphics_core::geometry::Size {
        embedded_graphics_core::geometry::Size::new(
            u32::from(self.h_display),
            u32::from(self.v_display),
        )
    }
}
