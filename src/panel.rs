//! Panel lifecycle state machine
//!
//! A [`Panel`] owns the command bus, the power supply, the optional reset
//! line and the backlight of one physical panel, and sequences them through
//! three states:
//!
//! ```text
//!             prepare()            enable()
//! Unpowered ─────────────► Prepared ─────────► Enabled
//!     ▲                      │   ▲                │
//!     └──────────────────────┘   └────────────────┘
//!           unprepare()              disable()
//! ```
//!
//! Every transition is idempotent. Calling a transition from a state where
//! it does not apply returns `Ok(())` without touching any hardware, except
//! `enable()` on an unpowered panel which is rejected with
//! [`Error::NotPrepared`].
//!
//! ## Example
//!
//! ```rust
//! use dsi_panel::{NoReset, Panel, PanelState};
//! use dsi_panel::panels::jd9366;
//! # use core::convert::Infallible;
//! # use dsi_panel::{Backlight, DsiBus, PowerSupply};
//! # use embedded_hal::delay::DelayNs;
//! # struct Bus;
//! # impl DsiBus for Bus {
//! #     type Error = Infallible;
//! #     fn write(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Supply;
//! # impl PowerSupply for Supply {
//! #     type Error = Infallible;
//! #     fn enable(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn disable(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Light;
//! # impl Backlight for Light {
//! #     fn enable(&mut self) {}
//! #     fn disable(&mut self) {}
//! # }
//! # struct Delay;
//! # impl DelayNs for Delay { fn delay_ns(&mut self, _ns: u32) {} }
//! let Ok(config) = jd9366::DESCRIPTOR.config() else { return };
//! let mut panel = Panel::new(Bus, Supply, None::<NoReset>, Light, config);
//! let mut delay = Delay;
//!
//! panel.prepare(&mut delay).ok();
//! panel.enable().ok();
//! assert_eq!(panel.state(), PanelState::Enabled);
//!
//! panel.disable().ok();
//! panel.unprepare(&mut delay).ok();
//! assert!(!panel.is_prepared());
//! ```

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use log::{debug, error, warn};

use crate::codec::CommandCodec;
use crate::command::{ENTER_SLEEP_MODE, EXIT_SLEEP_MODE, SET_DISPLAY_OFF, SET_DISPLAY_ON};
use crate::config::{Config, DsiLink, ReplayPolicy};
use crate::error::{BusError, Error};
use crate::interface::{Backlight, DsiBus, PowerSupply, ResetLine};
use crate::mode::ModeDescriptor;
use crate::page::PageSelector;
use crate::sequence::InitSequence;

type PanelResult<T, B, P> =
    core::result::Result<T, Error<<B as DsiBus>::Error, <P as PowerSupply>::Error>>;

/// Lifecycle state of a panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    /// Supply off (or state unknown after a failed prepare)
    #[default]
    Unpowered,
    /// Powered, initialised, out of sleep, display on; backlight off
    Prepared,
    /// Prepared with the backlight on
    Enabled,
}

/// Outcome of an init-table replay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Table entries written successfully (delays excluded)
    pub writes: usize,
    /// Failed entries and page switches tolerated under best effort
    pub failures: usize,
}

/// Replay an init table onto the bus
///
/// Pages are visited in order; each one is selected (if it names a page)
/// before its entries are written.
///
/// # Errors
///
/// Under [`ReplayPolicy::FailFast`] the first failed write or page switch is
/// returned. Under [`ReplayPolicy::BestEffort`] failures are logged, counted
/// in the report, and never returned.
pub fn replay<B: DsiBus, D: DelayNs>(
    codec: &mut CommandCodec<B>,
    pages: &mut PageSelector,
    sequence: &InitSequence,
    policy: ReplayPolicy,
    delay: &mut D,
) -> Result<ReplayReport, BusError<B::Error>> {
    let mut report = ReplayReport::default();
    for page in sequence.pages() {
        if let Some(number) = page.page {
            if let Err(e) = pages.select_page(codec, number) {
                tolerate(policy, e)?;
                report.failures += 1;
            }
        }
        for entry in page.entries {
            match codec.write_entry(entry, delay) {
                Ok(()) if entry.address().is_some() => report.writes += 1,
                Ok(()) => {}
                Err(e) => {
                    tolerate(policy, e)?;
                    report.failures += 1;
                }
            }
        }
    }
    Ok(report)
}

/// Apply `policy` to a failed write
fn tolerate<E: Debug>(policy: ReplayPolicy, e: BusError<E>) -> Result<(), BusError<E>> {
    match policy {
        ReplayPolicy::BestEffort => {
            warn!("ignoring failed write: {e}");
            Ok(())
        }
        ReplayPolicy::FailFast => Err(e),
    }
}

/// One physical DSI panel
///
/// ## Type Parameters
///
/// * `B` - command bus implementing [`DsiBus`]
/// * `P` - power rail implementing [`PowerSupply`]
/// * `R` - reset line implementing [`ResetLine`]; pass `None::<NoReset>` if absent
/// * `L` - backlight implementing [`Backlight`]
pub struct Panel<B, P, R, L>
where
    B: DsiBus,
    P: PowerSupply,
    R: ResetLine,
    L: Backlight,
{
    /// Command transport
    codec: CommandCodec<B>,
    /// Active controller page
    pages: PageSelector,
    /// Panel power rail
    supply: P,
    /// Optional reset line
    reset: Option<R>,
    /// Backlight
    backlight: L,
    /// Panel configuration
    config: Config,
    /// Lifecycle state
    state: PanelState,
    /// Supply left enabled, tracked apart from `state`
    powered: bool,
}

impl<B, P, R, L> Panel<B, P, R, L>
where
    B: DsiBus,
    P: PowerSupply,
    R: ResetLine,
    L: Backlight,
{
    /// Create an unpowered panel
    ///
    /// No hardware is touched until [`prepare`](Self::prepare).
    pub fn new(bus: B, supply: P, reset: Option<R>, backlight: L, config: Config) -> Self {
        let pages = PageSelector::new(config.page_select, config.elide_redundant_pages);
        Self {
            codec: CommandCodec::new(bus),
            pages,
            supply,
            reset,
            backlight,
            config,
            state: PanelState::Unpowered,
            powered: false,
        }
    }

    /// Power the panel up and initialise the controller
    ///
    /// Enables the supply, pulses reset (if present), replays the init
    /// table, then takes the controller out of sleep and switches the
    /// display on. No-op if already prepared.
    ///
    /// # Errors
    ///
    /// * [`Error::Power`] - the supply refused to enable; nothing else was touched
    /// * [`Error::Bus`] - sleep-out or display-on failed, or an init write
    ///   failed under [`ReplayPolicy::FailFast`]
    ///
    /// On error the panel stays [`PanelState::Unpowered`]. If
    /// `rollback_on_failure` is set, reset is re-asserted and the supply is
    /// disabled again before returning. Otherwise the supply stays on until
    /// the next [`unprepare`](Self::unprepare), and a retried `prepare` does
    /// not enable it a second time.
    pub fn prepare<D: DelayNs>(&mut self, delay: &mut D) -> PanelResult<(), B, P> {
        if self.state != PanelState::Unpowered {
            debug!("prepare: already {:?}", self.state);
            return Ok(());
        }

        if !self.powered {
            if let Err(e) = self.supply.enable() {
                error!("failed to enable power supply: {e:?}");
                return Err(Error::Power(e));
            }
            self.powered = true;
        }

        match self.power_on_sequence(delay) {
            Ok(report) => {
                debug!(
                    "panel prepared ({} writes, {} tolerated failures)",
                    report.writes, report.failures
                );
                self.state = PanelState::Prepared;
                Ok(())
            }
            Err(e) => {
                error!("prepare failed: {e}");
                if self.config.rollback_on_failure {
                    self.roll_back();
                }
                Err(Error::Bus(e))
            }
        }
    }

    /// Turn the backlight on
    ///
    /// No-op if already enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotPrepared`] if the panel is unpowered; the
    /// backlight is not touched.
    pub fn enable(&mut self) -> PanelResult<(), B, P> {
        match self.state {
            PanelState::Unpowered => Err(Error::NotPrepared),
            PanelState::Enabled => Ok(()),
            PanelState::Prepared => {
                self.backlight.enable();
                self.state = PanelState::Enabled;
                debug!("panel enabled");
                Ok(())
            }
        }
    }

    /// Turn the backlight off
    ///
    /// No-op unless enabled.
    pub fn disable(&mut self) -> PanelResult<(), B, P> {
        if self.state == PanelState::Enabled {
            self.backlight.disable();
            self.state = PanelState::Prepared;
            debug!("panel disabled");
        }
        Ok(())
    }

    /// Put the controller to sleep and remove power
    ///
    /// From [`PanelState::Enabled`] the backlight is switched off first.
    /// No-op (zero hardware calls) if already unpowered. A supply left on by
    /// a failed [`prepare`](Self::prepare) without rollback is removed
    /// without the sleep handshake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if display-off or enter-sleep fails under a
    /// [`ReplayPolicy::FailFast`] shutdown policy; the panel is then left
    /// [`PanelState::Prepared`] with power on. A supply that refuses to
    /// disable is logged and the panel still ends unpowered.
    pub fn unprepare<D: DelayNs>(&mut self, delay: &mut D) -> PanelResult<(), B, P> {
        if self.state == PanelState::Unpowered {
            if self.powered {
                self.power_off(delay);
                debug!("supply of unprepared panel removed");
            }
            return Ok(());
        }
        if self.state == PanelState::Enabled {
            self.backlight.disable();
            self.state = PanelState::Prepared;
        }

        let timings = self.config.timings;
        let policy = self.config.shutdown_policy;
        if let Err(e) = self.codec.command(SET_DISPLAY_OFF) {
            tolerate(policy, e)
                .inspect_err(|e| error!("failed to set display off: {e}"))?;
        }
        if let Err(e) = self.codec.command(ENTER_SLEEP_MODE) {
            tolerate(policy, e)
                .inspect_err(|e| error!("failed to enter sleep mode: {e}"))?;
        }
        delay.delay_ms(timings.sleep_enter_ms);

        self.power_off(delay);
        self.state = PanelState::Unpowered;
        debug!("panel unprepared");
        Ok(())
    }

    /// Remove power whatever state the panel is in
    ///
    /// Skips the display-off / enter-sleep handshake. Used when a device is
    /// unbound after that handshake failed.
    pub(crate) fn force_power_off<D: DelayNs>(&mut self, delay: &mut D) {
        if self.state == PanelState::Enabled {
            self.backlight.disable();
        }
        if self.state != PanelState::Unpowered || self.powered {
            warn!("forcing power off from {:?}", self.state);
            self.power_off(delay);
        }
        self.state = PanelState::Unpowered;
    }

    /// Modes the panel supports
    ///
    /// Always exactly one: a fresh copy of the configured mode marked
    /// driver-supplied and preferred.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if the list cannot be allocated.
    #[cfg(feature = "alloc")]
    pub fn get_modes(&self) -> PanelResult<alloc::vec::Vec<ModeDescriptor>, B, P> {
        let mut modes = alloc::vec::Vec::new();
        if modes.try_reserve_exact(1).is_err() {
            error!("failed to add mode {}", self.config.mode);
            return Err(Error::Allocation);
        }
        modes.push(self.mode());
        Ok(modes)
    }

    /// The preferred mode, without allocating
    pub fn mode(&self) -> ModeDescriptor {
        self.config.mode.preferred()
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Whether the panel is powered and initialised
    pub fn is_prepared(&self) -> bool {
        self.state != PanelState::Unpowered
    }

    /// Whether the backlight is on
    pub fn is_enabled(&self) -> bool {
        self.state == PanelState::Enabled
    }

    /// Panel configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// DSI link parameters the host must apply
    pub fn link(&self) -> DsiLink {
        self.config.link
    }

    /// Release the hardware capabilities
    ///
    /// The panel is not powered down; call [`unprepare`](Self::unprepare)
    /// first if needed.
    pub fn release(self) -> (B, P, Option<R>, L) {
        (self.codec.release(), self.supply, self.reset, self.backlight)
    }

    /// Steps of `prepare` after the supply is on
    fn power_on_sequence<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<ReplayReport, BusError<B::Error>> {
        let timings = self.config.timings;
        if let Some(reset) = self.reset.as_mut() {
            reset.set(true);
            delay.delay_ms(timings.reset_assert_ms);
            reset.set(false);
            delay.delay_ms(timings.reset_boot_ms);
        }
        self.pages.invalidate();

        let report = replay(
            &mut self.codec,
            &mut self.pages,
            &self.config.init_sequence,
            self.config.init_policy,
            delay,
        )?;

        self.codec.command(EXIT_SLEEP_MODE)?;
        delay.delay_ms(timings.sleep_exit_ms);

        self.codec.command(SET_DISPLAY_ON)?;
        delay.delay_ms(timings.display_on_ms);

        Ok(report)
    }

    /// Assert reset, hold it, then remove the supply
    fn power_off<D: DelayNs>(&mut self, delay: &mut D) {
        if let Some(reset) = self.reset.as_mut() {
            reset.set(true);
            delay.delay_ms(self.config.timings.reset_hold_ms);
        }
        if let Err(e) = self.supply.disable() {
            error!("failed to disable power supply: {e:?}");
        }
        self.powered = false;
        self.pages.invalidate();
    }

    /// Remove power after a failed prepare
    fn roll_back(&mut self) {
        if let Some(reset) = self.reset.as_mut() {
            reset.set(true);
        }
        if let Err(e) = self.supply.disable() {
            error!("failed to disable power supply during rollback: {e:?}");
        }
        self.powered = false;
        self.pages.invalidate();
    }
}
