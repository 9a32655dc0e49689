//! # Print Spooler Integration
//!
//! Destination enumeration, device-context lifecycle, and the dispatch
//! path that streams a rendered label onto a printer surface.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`directory`] | Cached view of printable destinations |
//! | [`device`] | Device-context seam and platform backend selection |
//! | [`dispatch`] | Fit-to-page transform and job orchestration |

pub mod device;
pub mod directory;
pub mod dispatch;

#[cfg(windows)]
pub(crate) mod gdi;

#[cfg(windows)]
pub use gdi::{GdiBackend, GdiPageDevice};

pub use device::{DeviceBackend, PageDevice, PageMetrics, Placement, SystemBackend};
pub use directory::PrinterDirectory;
pub use dispatch::{DEFAULT_LABEL_WIDTH_IN, Dispatcher, PrintJob};
