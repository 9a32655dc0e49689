//! # Etiqueta CLI
//!
//! Command-line interface for barcode/QR label printing.
//!
//! ## Usage
//!
//! ```bash
//! # List printable destinations (cached; --refresh re-queries the OS)
//! etiqueta printers
//!
//! # Render a label to a PNG file without printing
//! etiqueta render "INV-0042" --out label.png
//! etiqueta render "https://example.com" --qr --out qr.png
//!
//! # Print a label (uses the saved printer unless --printer is given)
//! etiqueta print "INV-0042"
//! etiqueta print "https://example.com" --qr --printer "Front Desk"
//!
//! # Show or clear print history
//! etiqueta history
//! etiqueta history --clear
//!
//! # Re-print a past entry (also copies its text to the clipboard)
//! etiqueta reprint 0
//!
//! # Show or save preferences
//! etiqueta settings
//! etiqueta settings --printer "Front Desk" --theme dark
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand, ValueEnum};

use etiqueta::{
    Dispatcher, EtiquetaError, ExecBridge, HistoryEntry, LabelGenerator, LabelRequest,
    PrintJob, PrinterDirectory, Settings, StateStore, Symbology, SystemBackend, ThemeMode,
    label,
};

/// Etiqueta - Barcode and QR label printing utility
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List printable destinations
    Printers {
        /// Re-query the OS spooler instead of using the cached snapshot
        #[arg(long)]
        refresh: bool,
    },

    /// Render a label to a PNG file
    Render {
        /// Text to encode
        text: String,

        /// Encode as a QR code instead of a Code 128 barcode
        #[arg(long)]
        qr: bool,

        /// Output file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Render and print a label
    Print {
        /// Text to encode
        text: String,

        /// Encode as a QR code instead of a Code 128 barcode
        #[arg(long)]
        qr: bool,

        /// Destination printer (defaults to the saved preference)
        #[arg(long)]
        printer: Option<String>,
    },

    /// Show the print history (newest first)
    History {
        /// Delete all history entries
        #[arg(long)]
        clear: bool,
    },

    /// Print a history entry again, copying its text to the clipboard
    Reprint {
        /// Entry index as shown by `history` (0 = most recent)
        index: usize,

        /// Destination printer (defaults to the entry's printer)
        #[arg(long)]
        printer: Option<String>,
    },

    /// Show or save preferences
    Settings {
        /// Preferred destination printer
        #[arg(long)]
        printer: Option<String>,

        /// UI theme preference
        #[arg(long)]
        theme: Option<ThemeArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for ThemeMode {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => ThemeMode::Light,
            ThemeArg::Dark => ThemeMode::Dark,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiquetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Printers { refresh } => {
            let directory = PrinterDirectory::system();
            let printers = directory.list(refresh);
            if printers.is_empty() {
                println!("No printers found.");
            } else {
                println!("Available printers:");
                for name in printers {
                    println!("  {}", name);
                }
            }
        }

        Commands::Render { text, qr, out } => {
            let request = LabelRequest::new(&text, symbology_for(qr))?;
            let generator = LabelGenerator::new();
            let image = generator.generate(&request)?;
            let png = label::to_png(&image)?;
            std::fs::write(&out, png)?;
            println!(
                "Saved {}x{} label to {}",
                image.width(),
                image.height(),
                out.display()
            );
        }

        Commands::Print { text, qr, printer } => {
            print_label(&text, symbology_for(qr), printer)?;
        }

        Commands::History { clear } => {
            let store = StateStore::open_default()?;
            if clear {
                store.clear_history()?;
                println!("History cleared!");
                return Ok(());
            }

            let history = store.load_history();
            if history.is_empty() {
                println!("History empty.");
                return Ok(());
            }
            for (i, entry) in history.iter().enumerate() {
                println!(
                    "{:>3}  {:<8} {:<28} {:<24} {}",
                    i,
                    entry.code_type.display_name(),
                    entry.barcode,
                    entry.printer,
                    entry.formatted_time()
                );
            }
        }

        Commands::Reprint { index, printer } => {
            let store = StateStore::open_default()?;
            let history = store.load_history();
            let Some(entry) = history.get(index) else {
                println!("No history entry {} (history has {}).", index, history.len());
                return Ok(());
            };

            copy_to_clipboard(&entry.barcode);

            let destination = printer.unwrap_or_else(|| entry.printer.clone());
            print_label(&entry.barcode, entry.code_type, Some(destination))?;
        }

        Commands::Settings { printer, theme } => {
            let store = StateStore::open_default()?;

            if printer.is_none() && theme.is_none() {
                match store.load_settings() {
                    Some(settings) => {
                        let printer = if settings.printer.is_empty() {
                            "(none)"
                        } else {
                            settings.printer.as_str()
                        };
                        println!("Printer: {}", printer);
                        println!(
                            "Theme:   {}",
                            match settings.theme_mode {
                                ThemeMode::Light => "light",
                                ThemeMode::Dark => "dark",
                            }
                        );
                    }
                    None => println!("No settings saved."),
                }
                return Ok(());
            }

            let mut settings = store.load_settings().unwrap_or_default();
            if let Some(name) = printer {
                let directory = PrinterDirectory::system();
                directory.list(false);
                if !directory.is_valid(&name) {
                    eprintln!("Warning: '{}' is not currently available.", name);
                }
                settings.printer = name;
            }
            if let Some(theme) = theme {
                settings.theme_mode = theme.into();
            }
            store.save_settings(&settings)?;
            println!("Settings saved!");
        }
    }

    Ok(())
}

fn symbology_for(qr: bool) -> Symbology {
    if qr { Symbology::QrCode } else { Symbology::Code128 }
}

/// Render, dispatch off-thread, record history on success, and wait for the
/// completion to land back on this thread.
fn print_label(
    text: &str,
    symbology: Symbology,
    printer: Option<String>,
) -> Result<(), EtiquetaError> {
    let store = Arc::new(StateStore::open_default()?);
    let directory = Arc::new(PrinterDirectory::system());

    let printers = directory.list(false);
    if printers.is_empty() {
        println!("No printers are installed on this system.");
        return Ok(());
    }

    let destination = match printer {
        Some(name) => name,
        None => {
            let saved = store.load_settings();
            let preferred = saved
                .as_ref()
                .map(|s: &Settings| s.printer.as_str())
                .filter(|p| !p.is_empty());
            match directory.default_destination(preferred) {
                Some(name) => name,
                None => {
                    println!("Please select a printer.");
                    return Ok(());
                }
            }
        }
    };

    let request = LabelRequest::new(text, symbology)?;
    let generator = LabelGenerator::new();
    let image = generator.generate(&request)?;

    println!(
        "Printing {} to {}...",
        symbology.display_name(),
        destination
    );

    let bridge = ExecBridge::new();
    let dispatcher = Dispatcher::new(SystemBackend::new());
    let failure: Arc<Mutex<Option<EtiquetaError>>> = Arc::new(Mutex::new(None));

    let job = PrintJob::new(image, destination);
    let worker_directory = Arc::clone(&directory);
    let worker_store = Arc::clone(&store);
    let entry = HistoryEntry::new(request.text(), job.destination.clone(), symbology);
    let failure_slot = Arc::clone(&failure);

    bridge.submit(
        move || {
            dispatcher.print(&worker_directory, &job.image, &job.destination)?;
            worker_store.append_history(entry)?;
            Ok(())
        },
        || println!("Print complete!"),
        move |e| {
            if let Ok(mut slot) = failure_slot.lock() {
                *slot = Some(e);
            }
        },
    );

    bridge.drain_blocking();

    if let Ok(mut slot) = failure.lock() {
        if let Some(e) = slot.take() {
            return Err(e);
        }
    }
    Ok(())
}

/// Copy text to the OS clipboard; failure is non-fatal and only logged.
fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
            Ok(()) => println!("Copied to clipboard."),
            Err(e) => tracing::debug!(error = %e, "clipboard copy failed"),
        },
        Err(e) => tracing::debug!(error = %e, "clipboard unavailable"),
    }
}
