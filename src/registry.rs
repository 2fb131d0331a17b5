//! Panel registry and driver adapter
//!
//! Binds a panel description to a concrete bus device. A host looks the
//! panel up by its compatible string, hands over the hardware capabilities,
//! and gets back a ready [`Panel`]:
//!
//! ```rust
//! use dsi_panel::registry::{self, DsiHost, PanelRegistry, Resources};
//! use dsi_panel::{DsiLink, NoReset};
//! # use core::convert::Infallible;
//! # use dsi_panel::{Backlight, DsiBus, PowerSupply};
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
//! # struct Host;
//! # impl DsiHost for Host {
//! #     type Error = Infallible;
//! #     fn attach(&mut self, _link: &DsiLink) -> Result<(), Self::Error> { Ok(()) }
//! #     fn detach(&mut self) {}
//! # }
//! let resources = Resources {
//!     bus: Bus,
//!     supply: Supply,
//!     reset: None::<NoReset>,
//!     backlight: Light,
//! };
//! let mut host = Host;
//! let panel = registry::probe(&PanelRegistry::builtin(), "boe,jd9366", &mut host, resources);
//! assert!(panel.is_ok());
//! ```

use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use log::{debug, error, warn};

use crate::config::{Builder, Config, DsiLink, ReplayPolicy};
use crate::error::{BuilderError, ProbeError};
use crate::interface::{Backlight, DsiBus, PowerSupply, ResetLine};
use crate::mode::ModeDescriptor;
use crate::page::PageSelect;
use crate::panel::Panel;
use crate::panels::{jd9366, nwe080};
use crate::sequence::InitSequence;

/// Static description of one panel model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelDescriptor {
    /// Compatible string the panel is matched by
    pub compatible: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Preferred mode
    pub mode: ModeDescriptor,
    /// Vendor init table
    pub init_sequence: InitSequence,
    /// Page-switch protocol
    pub page_select: PageSelect,
    /// DSI link parameters
    pub link: DsiLink,
    /// Failure handling for display-off / enter-sleep
    pub shutdown_policy: ReplayPolicy,
}

impl PanelDescriptor {
    /// Configuration with default timings and policies
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidMode`] if the descriptor's mode timings
    /// are inconsistent.
    pub fn config(&self) -> Result<Config, BuilderError> {
        self.builder().build()
    }

    /// Builder pre-filled from this descriptor, for overriding defaults
    pub fn builder(&self) -> Builder {
        Builder::new()
            .mode(self.mode)
            .init_sequence(self.init_sequence)
            .page_select(self.page_select)
            .shutdown_policy(self.shutdown_policy)
            .link(self.link)
    }
}

static BUILTIN: [PanelDescriptor; 2] = [jd9366::DESCRIPTOR, nwe080::DESCRIPTOR];

/// Explicit table of known panels
#[derive(Clone, Copy, Debug)]
pub struct PanelRegistry<'a> {
    panels: &'a [PanelDescriptor],
}

impl PanelRegistry<'static> {
    /// Registry of the panels shipped with this crate
    pub fn builtin() -> Self {
        Self { panels: &BUILTIN }
    }
}

impl<'a> PanelRegistry<'a> {
    /// Registry over a caller-supplied table
    pub fn new(panels: &'a [PanelDescriptor]) -> Self {
        Self { panels }
    }

    /// Find the panel matching `compatible`
    pub fn lookup(&self, compatible: &str) -> Option<&'a PanelDescriptor> {
        self.panels.iter().find(|panel| panel.compatible == compatible)
    }

    /// All registered panels
    pub fn iter(&self) -> impl Iterator<Item = &'a PanelDescriptor> {
        self.panels.iter()
    }
}

/// Host side of the DSI link
pub trait DsiHost {
    /// Error type for attach
    type Error: Debug;

    /// Apply the link parameters and start serving the panel
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot drive this link configuration.
    fn attach(&mut self, link: &DsiLink) -> Result<(), Self::Error>;

    /// Stop serving the panel
    fn detach(&mut self);
}

/// Hardware capabilities of one panel
#[derive(Debug)]
pub struct Resources<B, P, R, L> {
    /// Command bus
    pub bus: B,
    /// Power rail
    pub supply: P,
    /// Optional reset line
    pub reset: Option<R>,
    /// Backlight
    pub backlight: L,
}

/// Bind a panel to a bus device
///
/// Looks the panel up, releases reset, attaches the host with the panel's
/// link parameters and returns the unpowered panel.
///
/// # Errors
///
/// * [`ProbeError::UnknownPanel`] - no registered panel has this compatible string
/// * [`ProbeError::InvalidDescriptor`] - the registered mode is inconsistent
/// * [`ProbeError::Attach`] - the host refused the link configuration
pub fn probe<H, B, P, R, L>(
    registry: &PanelRegistry<'_>,
    compatible: &str,
    host: &mut H,
    resources: Resources<B, P, R, L>,
) -> Result<Panel<B, P, R, L>, ProbeError<H::Error>>
where
    H: DsiHost,
    B: DsiBus,
    P: PowerSupply,
    R: ResetLine,
    L: Backlight,
{
    let Some(descriptor) = registry.lookup(compatible) else {
        warn!("no panel registered for {compatible}");
        return Err(ProbeError::UnknownPanel);
    };
    let config = descriptor
        .config()
        .inspect_err(|e| error!("rejecting {}: {e}", descriptor.name))?;

    let Resources {
        bus,
        supply,
        mut reset,
        backlight,
    } = resources;
    if let Some(reset) = reset.as_mut() {
        reset.set(false);
    }

    if let Err(e) = host.attach(&descriptor.link) {
        error!("DSI attach failed for {}: {e:?}", descriptor.name);
        return Err(ProbeError::Attach(e));
    }

    debug!("bound {} ({})", descriptor.name, descriptor.mode);
    Ok(Panel::new(bus, supply, reset, backlight, config))
}

/// Unbind a panel
///
/// Powers the panel down, detaches the host and hands the hardware
/// capabilities back. If the shutdown handshake fails, reset is asserted and
/// the supply is disabled anyway.
pub fn remove<H, B, P, R, L, D>(
    mut panel: Panel<B, P, R, L>,
    host: &mut H,
    delay: &mut D,
) -> Resources<B, P, R, L>
where
    H: DsiHost,
    B: DsiBus,
    P: PowerSupply,
    R: ResetLine,
    L: Backlight,
    D: DelayNs,
{
    if let Err(e) = panel.unprepare(delay) {
        warn!("panel not powered down cleanly: {e}");
        panel.force_power_off(delay);
    }
    host.detach();

    let (bus, supply, reset, backlight) = panel.release();
    Resources {
        bus,
        supply,
        reset,
        backlight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelState;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::Cell;

    #[derive(Default)]
    struct MockBus {
        frames: Vec<Vec<u8>>,
        fail: Rc<Cell<bool>>,
    }

    impl DsiBus for MockBus {
        type Error = ();

        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.frames.push(bytes.to_vec());
            if self.fail.get() { Err(()) } else { Ok(()) }
        }
    }

    #[derive(Default)]
    struct MockSupply {
        on: bool,
    }

    impl PowerSupply for MockSupply {
        type Error = ();

        fn enable(&mut self) -> Result<(), Self::Error> {
            self.on = true;
            Ok(())
        }

        fn disable(&mut self) -> Result<(), Self::Error> {
            self.on = false;
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockReset {
        levels: Vec<bool>,
    }

    impl ResetLine for MockReset {
        fn set(&mut self, active: bool) {
            self.levels.push(active);
        }
    }

    #[derive(Default)]
    struct MockBacklight {
        on: bool,
    }

    impl Backlight for MockBacklight {
        fn enable(&mut self) {
            self.on = true;
        }

        fn disable(&mut self) {
            self.on = false;
        }
    }

    #[derive(Default)]
    struct MockHost {
        attached: Option<DsiLink>,
        refuse: bool,
        detached: bool,
    }

    impl DsiHost for MockHost {
        type Error = i32;

        fn attach(&mut self, link: &DsiLink) -> Result<(), Self::Error> {
            if self.refuse {
                return Err(-19);
            }
            self.attached = Some(*link);
            Ok(())
        }

        fn detach(&mut self) {
            self.detached = true;
        }
    }

    struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn resources() -> Resources<MockBus, MockSupply, MockReset, MockBacklight> {
        Resources {
            bus: MockBus::default(),
            supply: MockSupply::default(),
            reset: Some(MockReset::default()),
            backlight: MockBacklight::default(),
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = PanelRegistry::builtin();
        assert_eq!(
            registry.lookup("boe,jd9366").map(|p| p.name),
            Some("BOE JD9366")
        );
        assert_eq!(registry.lookup("nwe,nwe080").map(|p| p.name), Some("NWE080"));
        assert!(registry.lookup("acme,unknown").is_none());
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn test_custom_registry() {
        let table = [PanelDescriptor {
            compatible: "acme,test",
            name: "Test",
            ..jd9366::DESCRIPTOR
        }];
        let registry = PanelRegistry::new(&table);
        assert!(registry.lookup("acme,test").is_some());
        assert!(registry.lookup("boe,jd9366").is_none());
    }

    #[test]
    fn test_descriptor_config() {
        let config = nwe080::DESCRIPTOR.config().unwrap();
        assert_eq!(config.shutdown_policy, ReplayPolicy::FailFast);
        assert_eq!(config.init_policy, ReplayPolicy::BestEffort);
        assert_eq!(config.link, nwe080::LINK);
        assert!(config.rollback_on_failure);
        assert!(!config.elide_redundant_pages);
    }

    #[test]
    fn test_descriptor_with_invalid_mode_rejected() {
        let broken = PanelDescriptor {
            compatible: "acme,broken",
            mode: ModeDescriptor {
                h_total: 10,
                ..jd9366::MODE
            },
            ..jd9366::DESCRIPTOR
        };
        assert!(matches!(broken.config(), Err(BuilderError::InvalidMode { .. })));

        let table = [broken];
        let mut host = MockHost::default();
        let result = probe(&PanelRegistry::new(&table), "acme,broken", &mut host, resources());
        assert!(matches!(
            result,
            Err(ProbeError::InvalidDescriptor(BuilderError::InvalidMode { .. }))
        ));
        assert!(host.attached.is_none());
    }

    #[test]
    fn test_descriptor_builder_overrides() {
        let config = jd9366::DESCRIPTOR
            .builder()
            .init_policy(ReplayPolicy::FailFast)
            .build()
            .unwrap();
        assert_eq!(config.init_policy, ReplayPolicy::FailFast);
        assert_eq!(config.page_select, jd9366::PAGE_SELECT);
    }

    #[test]
    fn test_probe_attaches_link() {
        let mut host = MockHost::default();
        let panel = probe(&PanelRegistry::builtin(), "nwe,nwe080", &mut host, resources()).unwrap();
        assert_eq!(host.attached, Some(nwe080::LINK));
        assert_eq!(panel.state(), PanelState::Unpowered);
        assert_eq!(panel.link(), nwe080::LINK);

        let (bus, supply, reset, _backlight) = panel.release();
        assert!(bus.frames.is_empty());
        assert!(!supply.on);
        assert_eq!(reset.map(|r| r.levels), Some(alloc::vec![false]));
    }

    #[test]
    fn test_probe_unknown_panel() {
        let mut host = MockHost::default();
        let result = probe(&PanelRegistry::builtin(), "acme,unknown", &mut host, resources());
        assert!(matches!(result, Err(ProbeError::UnknownPanel)));
        assert!(host.attached.is_none());
    }

    #[test]
    fn test_probe_attach_failure() {
        let mut host = MockHost {
            refuse: true,
            ..MockHost::default()
        };
        let result = probe(&PanelRegistry::builtin(), "boe,jd9366", &mut host, resources());
        assert!(matches!(result, Err(ProbeError::Attach(-19))));
    }

    #[test]
    fn test_remove_powers_down_and_detaches() {
        let mut host = MockHost::default();
        let mut delay = MockDelay;
        let mut panel =
            probe(&PanelRegistry::builtin(), "boe,jd9366", &mut host, resources()).unwrap();
        panel.prepare(&mut delay).unwrap();
        panel.enable().unwrap();

        let resources = remove(panel, &mut host, &mut delay);
        assert!(host.detached);
        assert!(!resources.supply.on);
        assert!(!resources.backlight.on);
        let frames = resources.bus.frames;
        assert_eq!(frames[frames.len() - 2..], [alloc::vec![0x28], alloc::vec![0x10]]);
    }

    #[test]
    fn test_remove_powers_off_when_shutdown_handshake_fails() {
        let mut host = MockHost::default();
        let mut delay = MockDelay;
        let fail = Rc::new(Cell::new(false));
        let resources = Resources {
            bus: MockBus {
                fail: fail.clone(),
                ..MockBus::default()
            },
            ..resources()
        };
        let mut panel =
            probe(&PanelRegistry::builtin(), "nwe,nwe080", &mut host, resources).unwrap();
        assert_eq!(panel.config().shutdown_policy, ReplayPolicy::FailFast);
        panel.prepare(&mut delay).unwrap();
        panel.enable().unwrap();

        fail.set(true);
        let resources = remove(panel, &mut host, &mut delay);
        assert!(host.detached);
        assert!(!resources.supply.on);
        assert!(!resources.backlight.on);
        assert_eq!(
            resources.reset.and_then(|r| r.levels.last().copied()),
            Some(true)
        );
    }
}
