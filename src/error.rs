//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.
//!
//! Persistence *read* failures are deliberately absent: a missing or corrupt
//! settings/history file is recovered by substituting an empty default and
//! never surfaced to the caller.

use thiserror::Error;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// Input text cannot be encoded by the chosen symbology
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Destination printer is not in the current directory snapshot
    #[error("Unknown print destination: {0}")]
    UnknownDestination(String),

    /// Device context could not be acquired for the destination
    #[error("Device context error: {0}")]
    DeviceContext(String),

    /// Print job/page could not be started on the device
    #[error("Job start error: {0}")]
    JobStart(String),

    /// Failure after the job started (transform, transfer, or finish)
    #[error("Print operation failed: {0}")]
    PrintOperation(String),

    /// Durable settings/history write failed
    #[error("Persistence write error: {0}")]
    PersistenceWrite(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
