//! Built-in panel descriptions
//!
//! Each module carries the mode, page-switch protocol, DSI link parameters
//! and vendor init table of one panel, plus a [`PanelDescriptor`] bundling
//! them for the [`PanelRegistry`](crate::registry::PanelRegistry).
//!
//! [`PanelDescriptor`]: crate::registry::PanelDescriptor

pub mod jd9366;
pub mod nwe080;
