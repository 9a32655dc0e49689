//! # Printer Directory
//!
//! Enumerates and caches the set of printable destination names.
//!
//! The cached snapshot is the sole source of truth for "is this printer
//! currently usable": [`PrinterDirectory::is_valid`] never re-queries the
//! OS, so callers needing freshness must ask for it explicitly with
//! `list(true)`.

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::EtiquetaError;

type Enumerator = Box<dyn Fn() -> Result<Vec<String>, EtiquetaError> + Send + Sync>;

/// Cached view of the OS print-spooler registry.
pub struct PrinterDirectory {
    enumerate: Enumerator,
    snapshot: Mutex<Option<Vec<String>>>,
}

impl PrinterDirectory {
    /// Directory backed by the OS spooler registry (local + connected
    /// destinations). On platforms without a spooler backend the directory
    /// is permanently empty.
    pub fn system() -> Self {
        Self::with_enumerator(Box::new(system_destinations))
    }

    /// Directory backed by a caller-supplied enumeration source.
    pub fn with_enumerator(enumerate: Enumerator) -> Self {
        Self {
            enumerate,
            snapshot: Mutex::new(None),
        }
    }

    /// Return the destination names, enumerating on first use or when
    /// `force_refresh` is set.
    ///
    /// Enumeration failure yields an empty list rather than an error: "no
    /// destinations" is a first-class state the caller must present.
    pub fn list(&self, force_refresh: bool) -> Vec<String> {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        if force_refresh || snapshot.is_none() {
            let names = match (self.enumerate)() {
                Ok(names) => names,
                Err(e) => {
                    warn!(error = %e, "printer enumeration failed");
                    Vec::new()
                }
            };
            debug!(count = names.len(), "refreshed printer directory");
            *snapshot = Some(names);
        }
        snapshot.as_ref().cloned().unwrap_or_default()
    }

    /// Membership test against the last-fetched snapshot. Never triggers an
    /// implicit refresh; before the first `list` call everything is invalid.
    pub fn is_valid(&self, name: &str) -> bool {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Pick the destination a new print should default to: the preferred
    /// name when it is still present, otherwise the first enumerated one.
    pub fn default_destination(&self, preferred: Option<&str>) -> Option<String> {
        let names = self.list(false);
        if let Some(p) = preferred {
            if names.iter().any(|n| n == p) {
                return Some(p.to_string());
            }
        }
        names.first().cloned()
    }
}

/// Enumerate local and connected printer names from the Windows spooler.
#[cfg(windows)]
fn system_destinations() -> Result<Vec<String>, EtiquetaError> {
    crate::spooler::gdi::enumerate_destinations()
}

#[cfg(not(windows))]
fn system_destinations() -> Result<Vec<String>, EtiquetaError> {
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fixed(names: &[&str]) -> PrinterDirectory {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        PrinterDirectory::with_enumerator(Box::new(move || Ok(names.clone())))
    }

    #[test]
    fn test_list_populates_on_first_call() {
        let directory = fixed(&["Front Desk", "Warehouse"]);
        assert_eq!(directory.list(false), vec!["Front Desk", "Warehouse"]);
    }

    #[test]
    fn test_list_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let directory = PrinterDirectory::with_enumerator(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Front Desk".to_string()])
        }));

        directory.list(false);
        directory.list(false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        directory.list(true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_enumeration_failure_yields_empty() {
        let directory = PrinterDirectory::with_enumerator(Box::new(|| {
            Err(EtiquetaError::DeviceContext("spooler unavailable".into()))
        }));
        assert!(directory.list(false).is_empty());
        assert!(!directory.is_valid("anything"));
    }

    #[test]
    fn test_is_valid_checks_snapshot_only() {
        let directory = fixed(&["Front Desk"]);

        // Nothing fetched yet: nothing is valid, and no fetch is triggered
        assert!(!directory.is_valid("Front Desk"));

        directory.list(false);
        assert!(directory.is_valid("Front Desk"));
        assert!(!directory.is_valid("Warehouse"));
    }

    #[test]
    fn test_default_destination_prefers_saved() {
        let directory = fixed(&["Front Desk", "Warehouse"]);
        assert_eq!(
            directory.default_destination(Some("Warehouse")),
            Some("Warehouse".to_string())
        );
        assert_eq!(
            directory.default_destination(Some("Retired")),
            Some("Front Desk".to_string())
        );
        assert_eq!(
            directory.default_destination(None),
            Some("Front Desk".to_string())
        );
    }
}
