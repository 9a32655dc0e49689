//! # Etiqueta - Label Printing Engine
//!
//! Etiqueta renders short text strings into scannable barcode/QR raster
//! labels and delivers them to a physical printer, keeping a durable,
//! append-only history of prior print jobs and user preferences. It
//! provides:
//!
//! - **Label rendering**: Code 128 and QR rasterization with a bounded LRU
//!   cache
//! - **Printer directory**: cached enumeration and validation of print
//!   destinations
//! - **Print dispatch**: device-context lifecycle, fit-to-page transform,
//!   raster transfer (Windows GDI backend)
//! - **Durable state**: atomic JSON persistence of settings and history
//! - **Async bridge**: non-blocking print submission with completions
//!   posted back to the interactive thread
//!
//! ## Quick Start
//!
//! ```no_run
//! use etiqueta::{
//!     Dispatcher, LabelGenerator, LabelRequest, PrinterDirectory, Symbology, SystemBackend,
//! };
//!
//! // Render a label (cached for repeat requests)
//! let generator = LabelGenerator::new();
//! let request = LabelRequest::new("INV-0042", Symbology::Code128)?;
//! let image = generator.generate(&request)?;
//!
//! // Pick a destination and print
//! let directory = PrinterDirectory::system();
//! let printers = directory.list(false);
//! let dispatcher = Dispatcher::new(SystemBackend::new());
//! dispatcher.print(&directory, &image, &printers[0])?;
//!
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Symbology renderers and the caching generator |
//! | [`spooler`] | Printer directory, device contexts, dispatch |
//! | [`store`] | Durable settings and print history |
//! | [`bridge`] | Background execution with interactive-thread completions |
//! | [`error`] | Error types |

pub mod bridge;
pub mod error;
pub mod label;
pub mod spooler;
pub mod store;

// Re-exports for convenience
pub use bridge::ExecBridge;
pub use error::EtiquetaError;
pub use label::{CacheStats, LabelGenerator, LabelImage, LabelRequest, Symbology};
pub use spooler::{
    DeviceBackend, Dispatcher, PageDevice, PageMetrics, Placement, PrintJob, PrinterDirectory,
    SystemBackend,
};
pub use store::{HistoryEntry, Settings, StateStore, ThemeMode};
