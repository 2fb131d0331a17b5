//! NWE080 800x1280 panel (ILI9881-class controller)
//!
//! Pages are switched with the unlock frame `0xFF 0x98 0x81 page`. Every
//! register is written as its own `[register, value]` transaction.

use crate::command::{SET_DISPLAY_BRIGHTNESS, SET_TEAR_ON};
use crate::config::{DsiLink, DsiModeFlags, PixelFormat, ReplayPolicy};
use crate::mode::{ModeDescriptor, ModeFlags, ModeKind};
use crate::page::PageSelect;
use crate::registry::PanelDescriptor;
use crate::sequence::{CommandEntry, CommandPage, InitSequence};

/// Device-tree style compatible string
pub const COMPATIBLE: &str = "nwe,nwe080";

/// 800x1280, 107x172 mm
///
/// The vendor gives no nominal refresh rate; it is derived from the clock
/// and totals (60 Hz).
pub const MODE: ModeDescriptor = ModeDescriptor {
    pixel_clock: 70_858,
    h_display: 800,
    h_sync_start: 800 + 45,
    h_sync_end: 800 + 45 + 45,
    h_total: 800 + 45 + 45 + 4,
    v_display: 1280,
    v_sync_start: 1280 + 10,
    v_sync_end: 1280 + 10 + 25,
    v_total: 1280 + 10 + 25 + 6,
    refresh_hz: 0,
    width_mm: 107,
    height_mm: 172,
    flags: ModeFlags::NONE,
    kind: ModeKind::NONE,
};

/// `[0xFF, 0x98, 0x81, page]`
pub const PAGE_SELECT: PageSelect = PageSelect::Unlock {
    prefix: &[0xFF, 0x98, 0x81],
};

/// 4 lanes, RGB888, burst video with HSE and EoT packets, commands in LP mode
pub const LINK: DsiLink = DsiLink {
    lanes: 4,
    format: PixelFormat::Rgb888,
    mode_flags: DsiModeFlags::VIDEO
        .union(DsiModeFlags::VIDEO_BURST)
        .union(DsiModeFlags::VIDEO_HSE)
        .union(DsiModeFlags::EOT_PACKET)
        .union(DsiModeFlags::LPM),
};

static GIP: [CommandEntry; 2] = [
    // GIP_1
    CommandEntry::per_register(
        0x01,
        &[
            0x00, 0x00, 0x73, 0x00, 0x00, 0x0A, 0x00, 0x00, //
            0x20, 0x20, 0x00, 0x00, 0x00, 0x00, 0x1E, 0x1E, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x80, 0x06, //
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x33, //
            0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x3C, //
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
            0x00, 0x00, 0x00, 0x00,
        ],
    ),
    // GIP_2 and GIP_3
    CommandEntry::per_register(
        0x50,
        &[
            0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0x10, 0x32, //
            0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE, 0x00, 0x01, //
            0x00, 0x15, 0x14, 0x0E, 0x0F, 0x0C, 0x0D, 0x06, //
            0x02, 0x02, 0x02, 0x02, 0x02, 0x02, 0x07, 0x02, //
            0x02, 0x02, 0x02, 0x02, 0x02, 0x01, 0x00, 0x14, //
            0x15, 0x0E, 0x0F, 0x0C, 0x0D, 0x06, 0x02, 0x02, //
            0x02, 0x02, 0x02, 0x02, 0x07, 0x02, 0x02, 0x02, //
            0x02, 0x02, 0x02,
        ],
    ),
];

static POWER: [CommandEntry; 16] = [
    CommandEntry::single(0x6C, 0x15),
    CommandEntry::single(0x6E, 0x2A),
    // Clamp 15V
    CommandEntry::single(0x6F, 0x35),
    CommandEntry::single(0x3A, 0x92),
    CommandEntry::single(0x8D, 0x1F),
    CommandEntry::single(0x87, 0xBA),
    CommandEntry::single(0x26, 0x76),
    CommandEntry::single(0xB2, 0xD1),
    CommandEntry::single(0xB5, 0x27),
    CommandEntry::single(0x31, 0x75),
    CommandEntry::single(0x30, 0x03),
    CommandEntry::single(0x3B, 0x98),
    CommandEntry::single(0x35, 0x17),
    CommandEntry::single(0x33, 0x14),
    CommandEntry::single(0x38, 0x01),
    CommandEntry::single(0x39, 0x00),
];

static PANEL_AND_GAMMA: [CommandEntry; 9] = [
    // Scan direction
    CommandEntry::single(0x22, 0x0A),
    CommandEntry::single(0x31, 0x00),
    CommandEntry::single(0x53, 0x63),
    CommandEntry::single(0x55, 0x69),
    CommandEntry::single(0x50, 0xC7),
    CommandEntry::single(0x51, 0xC2),
    CommandEntry::single(0x60, 0x26),
    // Positive gamma
    CommandEntry::per_register(
        0xA0,
        &[
            0x08, 0x0F, 0x25, 0x01, 0x23, 0x18, 0x11, 0x1A, //
            0x81, 0x19, 0x26, 0x7C, 0x24, 0x1E, 0x5C, 0x2A, //
            0x2B, 0x50, 0x5C, 0x39,
        ],
    ),
    // Negative gamma
    CommandEntry::per_register(
        0xC0,
        &[
            0x08, 0x1F, 0x24, 0x1D, 0x04, 0x32, 0x24, 0x1F, //
            0x90, 0x20, 0x2C, 0x82, 0x19, 0x22, 0x4E, 0x28, //
            0x2D, 0x51, 0x5D, 0x39,
        ],
    ),
];

// Sleep-out and display-on follow from the lifecycle handshake, so TE on
// precedes them
static OUTPUT_CONFIG: [CommandEntry; 2] = [
    // Brightness PWM
    CommandEntry::per_register(SET_DISPLAY_BRIGHTNESS, &[0x0F, 0xFF, 0x2C]),
    // TE on, V-blank only
    CommandEntry::single(SET_TEAR_ON, 0x00),
];

static PAGES: [CommandPage; 4] = [
    CommandPage::on_page(3, &GIP),
    CommandPage::on_page(4, &POWER),
    CommandPage::on_page(1, &PANEL_AND_GAMMA),
    CommandPage::on_page(0, &OUTPUT_CONFIG),
];

/// Vendor init table
pub const INIT_SEQUENCE: InitSequence = InitSequence::new(&PAGES);

/// Registry entry
///
/// Display-off and enter-sleep failures abort `unprepare` on this panel.
pub const DESCRIPTOR: PanelDescriptor = PanelDescriptor {
    compatible: COMPATIBLE,
    name: "NWE080",
    mode: MODE,
    init_sequence: INIT_SEQUENCE,
    page_select: PAGE_SELECT,
    link: LINK,
    shutdown_policy: ReplayPolicy::FailFast,
};
