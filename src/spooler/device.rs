//! # Page Devices
//!
//! The device-context seam between the dispatcher and the OS printing
//! stack. A [`PageDevice`] is a live, exclusively-owned drawing surface for
//! one print job; a [`DeviceBackend`] knows how to acquire one for a named
//! destination.
//!
//! Devices are never shared across threads, and release of the underlying
//! OS handle is tied to `Drop` so every exit path — success, error, panic
//! unwind — returns the spooler handle.

use crate::error::EtiquetaError;
use crate::label::LabelImage;

/// Printable-area geometry of an acquired device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMetrics {
    /// Printable width in device pixels
    pub printable_width: u32,
    /// Printable height in device pixels
    pub printable_height: u32,
    /// Horizontal resolution, dots per logical inch
    pub dpi: u32,
}

/// Destination rectangle for a raster transfer, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A drawable print surface bound to one destination for one job.
///
/// Call order: `start_document`, then `metrics`/`draw_raster`, then
/// `end_document`. Dropping the device releases the OS handle whether or
/// not the document was finished.
pub trait PageDevice {
    /// Begin the print job and its single page.
    ///
    /// ## Errors
    ///
    /// [`EtiquetaError::JobStart`] when the spooler refuses the job.
    fn start_document(&mut self, title: &str) -> Result<(), EtiquetaError>;

    /// Query printable-area dimensions and horizontal resolution.
    fn metrics(&self) -> Result<PageMetrics, EtiquetaError>;

    /// Transfer the raster to the surface at `placement`.
    fn draw_raster(
        &mut self,
        image: &LabelImage,
        placement: Placement,
    ) -> Result<(), EtiquetaError>;

    /// End the page and the job.
    fn end_document(&mut self) -> Result<(), EtiquetaError>;
}

/// Acquires page devices for named destinations.
pub trait DeviceBackend {
    type Device: PageDevice;

    /// Acquire a device context bound to `destination`.
    ///
    /// ## Errors
    ///
    /// [`EtiquetaError::DeviceContext`] when the context cannot be created.
    fn open_device(&self, destination: &str) -> Result<Self::Device, EtiquetaError>;
}

/// The platform's real printing backend.
///
/// On Windows this drives GDI printer device contexts. Elsewhere there is
/// no system print path and acquiring a device reports a device-context
/// error, mirroring how enumeration yields an empty directory.
#[cfg(windows)]
pub type SystemBackend = crate::spooler::gdi::GdiBackend;

#[cfg(not(windows))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

#[cfg(not(windows))]
impl SystemBackend {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl DeviceBackend for SystemBackend {
    type Device = UnsupportedDevice;

    fn open_device(&self, destination: &str) -> Result<Self::Device, EtiquetaError> {
        Err(EtiquetaError::DeviceContext(format!(
            "printing to '{}' is not supported on this platform",
            destination
        )))
    }
}

/// Placeholder device for platforms without a print path; never acquired.
#[cfg(not(windows))]
pub struct UnsupportedDevice;

#[cfg(not(windows))]
impl PageDevice for UnsupportedDevice {
    fn start_document(&mut self, _title: &str) -> Result<(), EtiquetaError> {
        Err(EtiquetaError::JobStart("no print device".to_string()))
    }

    fn metrics(&self) -> Result<PageMetrics, EtiquetaError> {
        Err(EtiquetaError::PrintOperation("no print device".to_string()))
    }

    fn draw_raster(
        &mut self,
        _image: &LabelImage,
        _placement: Placement,
    ) -> Result<(), EtiquetaError> {
        Err(EtiquetaError::PrintOperation("no print device".to_string()))
    }

    fn end_document(&mut self) -> Result<(), EtiquetaError> {
        Err(EtiquetaError::PrintOperation("no print device".to_string()))
    }
}
