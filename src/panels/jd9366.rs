//! BOE JD9366 800x1280 panel
//!
//! Pages are switched with `0xE0 page`. Manufacturer registers are written
//! one register per transaction: the controller does not auto-increment
//! across all of its address ranges.

use crate::command::SET_TEAR_ON;
use crate::config::{DsiLink, DsiModeFlags, PixelFormat, ReplayPolicy};
use crate::mode::{ModeDescriptor, ModeFlags, ModeKind};
use crate::page::PageSelect;
use crate::registry::PanelDescriptor;
use crate::sequence::{CommandEntry, CommandPage, InitSequence};

/// Device-tree style compatible string
pub const COMPATIBLE: &str = "boe,jd9366";

/// 800x1280@60, 107x172 mm
pub const MODE: ModeDescriptor = ModeDescriptor {
    pixel_clock: 68_430,
    h_display: 800,
    h_sync_start: 800 + 16,
    h_sync_end: 800 + 16 + 48,
    h_total: 800 + 16 + 48 + 16,
    v_display: 1280,
    v_sync_start: 1280 + 8,
    v_sync_end: 1280 + 8 + 4,
    v_total: 1280 + 8 + 4 + 4,
    refresh_hz: 60,
    width_mm: 107,
    height_mm: 172,
    flags: ModeFlags::NONE,
    kind: ModeKind::NONE,
};

/// `[0xE0, page]`
pub const PAGE_SELECT: PageSelect = PageSelect::Register { command: 0xE0 };

/// 4 lanes, RGB888, burst video, commands in LP mode
pub const LINK: DsiLink = DsiLink {
    lanes: 4,
    format: PixelFormat::Rgb888,
    mode_flags: DsiModeFlags::VIDEO
        .union(DsiModeFlags::VIDEO_BURST)
        .union(DsiModeFlags::LPM),
};

static PASSWORD: [CommandEntry; 1] = [CommandEntry::per_register(0xE1, &[0x93, 0x65, 0xF8])];

static SEQUENCE_CTRL: [CommandEntry; 2] = [
    // DC0..DC3, DC7
    CommandEntry::per_register(0x70, &[0x10, 0x13, 0x06]),
    // 4 lanes
    CommandEntry::single(0x80, 0x03),
];

static LANE_CONFIG: [CommandEntry; 1] = [CommandEntry::single(0x2D, 0x03)];

static POWER_AND_GAMMA: [CommandEntry; 11] = [
    // VCOM
    CommandEntry::single(0x00, 0x00),
    CommandEntry::single(0x01, 0xA0),
    // VCOM reverse
    CommandEntry::single(0x03, 0x00),
    CommandEntry::single(0x04, 0xA0),
    // VGMP, VGMN, VGSP, VGSN
    CommandEntry::per_register(0x17, &[0x00, 0xB1, 0x01, 0x00, 0xB1, 0x01]),
    // VGH 15V, VGL -12V
    CommandEntry::per_register(0x1F, &[0x3E, 0x2D, 0x2D, 0x0E]),
    // SS=1 BGR=1, zigzag inversion, EQ1, EQ2
    CommandEntry::per_register(0x37, &[0x19, 0x05, 0x08, 0x12]),
    CommandEntry::single(0x3C, 0x78),
    // CHGEN off, 800 RGB source outputs, 1280 lines
    CommandEntry::per_register(0x3E, &[0x80, 0x80, 0x06, 0xA0]),
    // JD power IC, VCL -2.9V, VGH 19V, VGL -11V
    CommandEntry::per_register(0x55, &[0x01, 0x01, 0x69, 0x0A, 0x0A, 0x28, 0x19]),
    // Gamma, positive then negative
    CommandEntry::per_register(
        0x5D,
        &[
            0x7C, 0x65, 0x53, 0x48, 0x43, 0x35, 0x39, 0x23, //
            0x3D, 0x3C, 0x3D, 0x5A, 0x46, 0x57, 0x4B, 0x49, //
            0x2F, 0x03, 0x00, 0x7C, 0x65, 0x53, 0x48, 0x43, //
            0x35, 0x39, 0x23, 0x3D, 0x3C, 0x3D, 0x5A, 0x46, //
            0x57, 0x4B, 0x49, 0x2F, 0x03, 0x00,
        ],
    ),
];

/// GIP pin mapping (L, R, L_GS, R_GS) and GIP timing, 0x00..=0x7E
static GIP: [CommandEntry; 1] = [CommandEntry::per_register(
    0x00,
    &[
        0x47, 0x47, 0x45, 0x45, 0x4B, 0x4B, 0x49, 0x49, //
        0x41, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x43, //
        0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x46, 0x46, //
        0x44, 0x44, 0x4A, 0x4A, 0x48, 0x48, 0x40, 0x1F, //
        0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x42, 0x1F, 0x1F, //
        0x1F, 0x1F, 0x1F, 0x1F, 0x11, 0x0F, 0x0D, 0x0B, //
        0x09, 0x07, 0x05, 0x18, 0x17, 0x1F, 0x01, 0x1F, //
        0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x13, //
        0x1F, 0x1F, 0x10, 0x0E, 0x0C, 0x0A, 0x08, 0x06, //
        0x04, 0x18, 0x17, 0x1F, 0x00, 0x1F, 0x1F, 0x1F, //
        0x1F, 0x1F, 0x1F, 0x1F, 0x1F, 0x12, 0x1F, 0x1F, //
        0x40, 0x00, 0x00, 0x30, 0x03, 0x30, 0x01, 0x02, //
        0x00, 0x01, 0x02, 0x03, 0x6B, 0x00, 0x00, 0x73, //
        0x05, 0x06, 0x6B, 0x08, 0x00, 0x04, 0x04, 0x88, //
        0x00, 0x00, 0x06, 0x7B, 0x00, 0x07, 0x00, 0x5D, //
        0x17, 0x1F, 0x00, 0x00, 0x00, 0x03, 0x7B,
    ],
)];

// LEDON output on VCSW2
static LED_OUTPUT: [CommandEntry; 1] = [CommandEntry::single(0x0E, 0x01)];

static LED_VOLTAGE: [CommandEntry; 1] = [CommandEntry::single(0x98, 0x2F)];

static TUNING: [CommandEntry; 3] = [
    CommandEntry::single(0x09, 0x10),
    CommandEntry::single(0x2B, 0x2B),
    CommandEntry::single(0x2E, 0x44),
];

// Sleep-out and display-on follow from the lifecycle handshake, so TE on
// precedes them
static OUTPUT_CONFIG: [CommandEntry; 3] = [
    CommandEntry::single(0xE6, 0x02),
    CommandEntry::single(0xE7, 0x02),
    // TE on, V-blank only
    CommandEntry::single(SET_TEAR_ON, 0x00),
];

static PAGES: [CommandPage; 9] = [
    CommandPage::on_page(0, &PASSWORD),
    CommandPage::on_page(0, &SEQUENCE_CTRL),
    CommandPage::on_page(4, &LANE_CONFIG),
    CommandPage::on_page(1, &POWER_AND_GAMMA),
    CommandPage::on_page(2, &GIP),
    CommandPage::on_page(1, &LED_OUTPUT),
    CommandPage::on_page(3, &LED_VOLTAGE),
    CommandPage::on_page(4, &TUNING),
    CommandPage::on_page(0, &OUTPUT_CONFIG),
];

/// Vendor init table
pub const INIT_SEQUENCE: InitSequence = InitSequence::new(&PAGES);

/// Registry entry
pub const DESCRIPTOR: PanelDescriptor = PanelDescriptor {
    compatible: COMPATIBLE,
    name: "BOE JD9366",
    mode: MODE,
    init_sequence: INIT_SEQUENCE,
    page_select: PAGE_SELECT,
    link: LINK,
    shutdown_policy: ReplayPolicy::BestEffort,
};
