//! # Print Pipeline Tests
//!
//! End-to-end coverage of the public print path against an instrumented
//! mock device backend: destination validation, device lifecycle ordering,
//! fit/centering of the transferred raster, unconditional device release,
//! and the render → dispatch → history → completion flow over the bridge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use etiqueta::{
    DeviceBackend, Dispatcher, EtiquetaError, ExecBridge, HistoryEntry, LabelGenerator,
    LabelImage, LabelRequest, PageDevice, PageMetrics, Placement, PrinterDirectory, StateStore,
    Symbology,
};

const PRINTER: &str = "Label Printer";

/// Shared recorder for everything the backend and its devices do.
#[derive(Clone, Default)]
struct Probe {
    events: Arc<Mutex<Vec<String>>>,
    opens: Arc<AtomicUsize>,
}

impl Probe {
    fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum FailAt {
    Nowhere,
    Open,
    StartDocument,
    Draw,
}

struct MockBackend {
    probe: Probe,
    metrics: PageMetrics,
    fail_at: FailAt,
}

impl MockBackend {
    fn new(probe: Probe, metrics: PageMetrics) -> Self {
        Self {
            probe,
            metrics,
            fail_at: FailAt::Nowhere,
        }
    }

    fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }
}

impl DeviceBackend for MockBackend {
    type Device = MockDevice;

    fn open_device(&self, destination: &str) -> Result<MockDevice, EtiquetaError> {
        self.probe.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Open {
            return Err(EtiquetaError::DeviceContext("injected open failure".into()));
        }
        self.probe.log(format!("open:{}", destination));
        Ok(MockDevice {
            probe: self.probe.clone(),
            metrics: self.metrics,
            fail_at: self.fail_at,
        })
    }
}

struct MockDevice {
    probe: Probe,
    metrics: PageMetrics,
    fail_at: FailAt,
}

impl PageDevice for MockDevice {
    fn start_document(&mut self, title: &str) -> Result<(), EtiquetaError> {
        if self.fail_at == FailAt::StartDocument {
            return Err(EtiquetaError::JobStart("injected start failure".into()));
        }
        self.probe.log(format!("start:{}", title));
        Ok(())
    }

    fn metrics(&self) -> Result<PageMetrics, EtiquetaError> {
        Ok(self.metrics)
    }

    fn draw_raster(
        &mut self,
        image: &LabelImage,
        placement: Placement,
    ) -> Result<(), EtiquetaError> {
        if self.fail_at == FailAt::Draw {
            return Err(EtiquetaError::PrintOperation("paper jam".into()));
        }
        self.probe.log(format!(
            "draw:{}x{}@{},{} src={}x{}",
            placement.width,
            placement.height,
            placement.x,
            placement.y,
            image.width(),
            image.height()
        ));
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), EtiquetaError> {
        self.probe.log("end");
        Ok(())
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.probe.log("release");
    }
}

fn directory_with(names: &[&str]) -> PrinterDirectory {
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    let directory = PrinterDirectory::with_enumerator(Box::new(move || Ok(names.clone())));
    directory.list(false);
    directory
}

fn linear_label() -> LabelImage {
    let generator = LabelGenerator::new();
    let request = LabelRequest::new("PIPELINE-01", Symbology::Code128).unwrap();
    generator.generate(&request).unwrap()
}

#[test]
fn unknown_destination_touches_no_device() {
    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let dispatcher = Dispatcher::new(MockBackend::new(probe.clone(), metrics));
    let directory = directory_with(&[PRINTER]);

    let err = dispatcher
        .print(&directory, &linear_label(), "Ghost Printer")
        .unwrap_err();

    assert!(matches!(err, EtiquetaError::UnknownDestination(_)));
    assert_eq!(probe.opens(), 0);
    assert!(probe.events().is_empty());
}

#[test]
fn empty_destination_is_rejected() {
    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let dispatcher = Dispatcher::new(MockBackend::new(probe.clone(), metrics));
    let directory = directory_with(&[PRINTER]);

    let err = dispatcher.print(&directory, &linear_label(), "").unwrap_err();
    assert!(matches!(err, EtiquetaError::UnknownDestination(_)));
    assert_eq!(probe.opens(), 0);
}

#[test]
fn successful_job_runs_full_lifecycle_in_order() {
    let probe = Probe::default();
    // 4 in at 600 dpi = 2400 px target; 600x300 source keeps its 2:1 ratio
    let metrics = PageMetrics {
        printable_width: 3000,
        printable_height: 2000,
        dpi: 600,
    };
    let dispatcher = Dispatcher::new(MockBackend::new(probe.clone(), metrics));
    let directory = directory_with(&[PRINTER]);

    dispatcher
        .print(&directory, &linear_label(), PRINTER)
        .unwrap();

    assert_eq!(
        probe.events(),
        vec![
            format!("open:{}", PRINTER),
            "start:Barcode Print".to_string(),
            // 2400x1200 centered on 3000x2000; raster resampled to target
            "draw:2400x1200@300,400 src=2400x1200".to_string(),
            "end".to_string(),
            "release".to_string(),
        ]
    );
}

#[test]
fn open_failure_is_device_context_error() {
    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let backend = MockBackend::new(probe.clone(), metrics).failing_at(FailAt::Open);
    let dispatcher = Dispatcher::new(backend);
    let directory = directory_with(&[PRINTER]);

    let err = dispatcher
        .print(&directory, &linear_label(), PRINTER)
        .unwrap_err();

    assert!(matches!(err, EtiquetaError::DeviceContext(_)));
    assert_eq!(probe.opens(), 1);
    // No device was ever handed out, so nothing to release
    assert!(probe.events().is_empty());
}

#[test]
fn job_start_failure_still_releases_device() {
    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let backend = MockBackend::new(probe.clone(), metrics).failing_at(FailAt::StartDocument);
    let dispatcher = Dispatcher::new(backend);
    let directory = directory_with(&[PRINTER]);

    let err = dispatcher
        .print(&directory, &linear_label(), PRINTER)
        .unwrap_err();

    assert!(matches!(err, EtiquetaError::JobStart(_)));
    assert_eq!(probe.events().last().map(String::as_str), Some("release"));
}

#[test]
fn transfer_failure_wraps_and_releases_device() {
    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let backend = MockBackend::new(probe.clone(), metrics).failing_at(FailAt::Draw);
    let dispatcher = Dispatcher::new(backend);
    let directory = directory_with(&[PRINTER]);

    let err = dispatcher
        .print(&directory, &linear_label(), PRINTER)
        .unwrap_err();

    match err {
        EtiquetaError::PrintOperation(cause) => assert!(cause.contains("paper jam")),
        other => panic!("expected PrintOperation, got {:?}", other),
    }

    let events = probe.events();
    assert!(!events.contains(&"end".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("release"));
}

#[test]
fn bridge_print_records_history_on_success() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = Arc::new(StateStore::at(tmp.path()));
    let directory = Arc::new(directory_with(&[PRINTER]));

    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let dispatcher = Dispatcher::new(MockBackend::new(probe, metrics));

    let generator = LabelGenerator::new();
    let request = LabelRequest::new("JOB-7", Symbology::QrCode).unwrap();
    let image = generator.generate(&request).unwrap();

    let bridge = ExecBridge::new();
    let worker_store = Arc::clone(&store);
    let worker_directory = Arc::clone(&directory);
    let succeeded = Arc::new(Mutex::new(false));
    let success_flag = Arc::clone(&succeeded);

    bridge.submit(
        move || {
            dispatcher.print(&worker_directory, &image, PRINTER)?;
            worker_store.append_history(HistoryEntry::new("JOB-7", PRINTER, Symbology::QrCode))?;
            Ok(())
        },
        move || *success_flag.lock().unwrap() = true,
        |e| panic!("print failed: {}", e),
    );

    assert!(bridge.drain_blocking());
    assert!(*succeeded.lock().unwrap());

    let history = store.load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].barcode, "JOB-7");
    assert_eq!(history[0].printer, PRINTER);
    assert_eq!(history[0].code_type, Symbology::QrCode);
}

#[test]
fn bridge_print_failure_skips_history() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = Arc::new(StateStore::at(tmp.path()));
    let directory = Arc::new(directory_with(&[PRINTER]));

    let probe = Probe::default();
    let metrics = PageMetrics {
        printable_width: 2000,
        printable_height: 3000,
        dpi: 450,
    };
    let dispatcher = Dispatcher::new(MockBackend::new(probe, metrics).failing_at(FailAt::Draw));

    let bridge = ExecBridge::new();
    let worker_store = Arc::clone(&store);
    let worker_directory = Arc::clone(&directory);
    let failure = Arc::new(Mutex::new(None));
    let failure_slot = Arc::clone(&failure);

    let image = linear_label();
    bridge.submit(
        move || {
            dispatcher.print(&worker_directory, &image, PRINTER)?;
            worker_store.append_history(HistoryEntry::new(
                "SHOULD-NOT-APPEAR",
                PRINTER,
                Symbology::Code128,
            ))?;
            Ok(())
        },
        || panic!("job must not succeed"),
        move |e| *failure_slot.lock().unwrap() = Some(e),
    );

    assert!(bridge.drain_blocking());
    assert!(matches!(
        failure.lock().unwrap().take(),
        Some(EtiquetaError::PrintOperation(_))
    ));
    assert!(store.load_history().is_empty());
}
