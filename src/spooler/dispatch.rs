//! # Print Dispatch
//!
//! Owns the per-job device lifecycle: validate the destination, acquire a
//! device, fit the label to the printable area, resample, transfer, and
//! release.
//!
//! ## Fit Transform
//!
//! The desired physical width is a fixed configured width (default 4 in)
//! converted to device pixels via the queried resolution and clamped to the
//! printable width; height follows the source aspect ratio. When that
//! height would overflow the page, the height is clamped instead and the
//! width re-derived from the ratio (width-first clamp — the height axis
//! absorbs rounding error in the common case, the width axis only when both
//! dimensions would overflow). The result never exceeds either printable
//! dimension.
//!
//! Centering uses integer division, so an odd remainder biases one pixel
//! toward the top-left.

use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use tracing::{info, warn};

use crate::error::EtiquetaError;
use crate::label::LabelImage;
use crate::spooler::device::{DeviceBackend, PageDevice, PageMetrics, Placement};
use crate::spooler::directory::PrinterDirectory;

/// Physical label width, logical inches.
pub const DEFAULT_LABEL_WIDTH_IN: f64 = 4.0;

/// Document name shown in the spooler queue.
const DOC_NAME: &str = "Barcode Print";

/// A print request in flight; exists only for the duration of dispatch.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub image: LabelImage,
    pub destination: String,
    pub submitted_at: DateTime<Local>,
}

impl PrintJob {
    pub fn new(image: LabelImage, destination: impl Into<String>) -> Self {
        Self {
            image,
            destination: destination.into(),
            submitted_at: Local::now(),
        }
    }
}

/// Compute the destination rectangle for a source raster on a page.
pub(crate) fn fit_to_page(
    source_width: u32,
    source_height: u32,
    metrics: &PageMetrics,
    label_width_in: f64,
) -> Placement {
    let max_width = (label_width_in * metrics.dpi as f64) as u32;
    let ratio = source_height as f64 / source_width as f64;

    let mut width = max_width.min(metrics.printable_width);
    let mut height = (width as f64 * ratio) as u32;
    if height > metrics.printable_height {
        height = metrics.printable_height;
        width = (height as f64 / ratio) as u32;
    }

    Placement {
        x: ((metrics.printable_width - width) / 2) as i32,
        y: ((metrics.printable_height - height) / 2) as i32,
        width,
        height,
    }
}

/// Streams rendered labels to print destinations.
///
/// Each call to [`Dispatcher::print`] acquires its own device context and
/// releases it on every exit path; nothing is retried automatically.
pub struct Dispatcher<B: DeviceBackend> {
    backend: B,
    label_width_in: f64,
}

impl<B: DeviceBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            label_width_in: DEFAULT_LABEL_WIDTH_IN,
        }
    }

    /// Override the configured physical label width.
    pub fn with_label_width(mut self, inches: f64) -> Self {
        self.label_width_in = inches;
        self
    }

    /// Print `image` on `destination`.
    ///
    /// The destination is validated against the directory snapshot before
    /// any OS resource is touched.
    ///
    /// ## Errors
    ///
    /// - [`EtiquetaError::UnknownDestination`] — empty or unlisted printer
    /// - [`EtiquetaError::DeviceContext`] — context acquisition failed
    /// - [`EtiquetaError::JobStart`] — the spooler refused the job
    /// - [`EtiquetaError::PrintOperation`] — any later step, wrapping the
    ///   underlying cause; the device is still released
    pub fn print(
        &self,
        directory: &PrinterDirectory,
        image: &LabelImage,
        destination: &str,
    ) -> Result<(), EtiquetaError> {
        if destination.is_empty() || !directory.is_valid(destination) {
            return Err(EtiquetaError::UnknownDestination(destination.to_string()));
        }

        let mut device = self.backend.open_device(destination)?;
        device.start_document(DOC_NAME)?;

        // Device context released by Drop on every path below
        match self.run_job(&mut device, image) {
            Ok(placement) => {
                info!(
                    destination,
                    width = placement.width,
                    height = placement.height,
                    "label printed"
                );
                Ok(())
            }
            Err(e) => {
                warn!(destination, error = %e, "print job failed");
                Err(match e {
                    EtiquetaError::PrintOperation(_) => e,
                    other => EtiquetaError::PrintOperation(other.to_string()),
                })
            }
        }
    }

    fn run_job(
        &self,
        device: &mut B::Device,
        image: &LabelImage,
    ) -> Result<Placement, EtiquetaError> {
        let metrics = device.metrics()?;
        let placement = fit_to_page(image.width(), image.height(), &metrics, self.label_width_in);

        // Destination surfaces are usually far denser than the source
        // encoding; point sampling would leave visible stair-stepping.
        let resampled = imageops::resize(image, placement.width, placement.height, FilterType::Lanczos3);

        device.draw_raster(&resampled, placement)?;
        device.end_document()?;
        Ok(placement)
    }
}
