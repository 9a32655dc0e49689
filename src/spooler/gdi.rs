//! # Windows GDI Backend
//!
//! Printer enumeration via the spooler registry and raster printing through
//! GDI printer device contexts.
//!
//! A [`GdiPageDevice`] owns one `HDC` created with `CreateDCW("WINSPOOL")`.
//! The raster is transferred with `StretchDIBits` as a 24-bpp top-down BGR
//! DIB, so the destination driver handles any final pixel-format
//! conversion. `DeleteDC` runs on drop; a job abandoned mid-document is
//! aborted first so the spooler never holds a half-written job.

use core::ffi::c_void;

use windows::Win32::Graphics::Gdi::{
    AbortDoc, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateDCW, DIB_RGB_COLORS, DOCINFOW,
    DeleteDC, EndDoc, EndPage, GetDeviceCaps, HDC, HORZRES, LOGPIXELSX, SRCCOPY, StartDocW,
    StartPage, StretchDIBits, VERTRES,
};
use windows::Win32::Graphics::Printing::{
    EnumPrintersW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_INFO_4W,
};
use windows::core::{PCWSTR, PWSTR};

use crate::error::EtiquetaError;
use crate::label::LabelImage;
use crate::spooler::device::{DeviceBackend, PageDevice, PageMetrics, Placement};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Enumerate local and connected printer names.
///
/// Uses PRINTER_INFO_4, the lightest enumeration level: display names only,
/// no driver round-trips.
pub(crate) fn enumerate_destinations() -> Result<Vec<String>, EtiquetaError> {
    unsafe {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        // First call reports the required buffer size
        let _ = EnumPrintersW(flags, None, 4, None, &mut needed, &mut returned);

        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buf: Vec<u8> = vec![0; needed as usize];
        EnumPrintersW(
            flags,
            None,
            4,
            Some(buf.as_mut_slice()),
            &mut needed,
            &mut returned,
        )
        .map_err(|_| EtiquetaError::DeviceContext("EnumPrintersW failed".to_string()))?;

        let ptr = buf.as_ptr() as *const PRINTER_INFO_4W;
        let slice = std::slice::from_raw_parts(ptr, returned as usize);

        let mut result: Vec<String> = Vec::new();
        for info in slice.iter() {
            if info.pPrinterName.is_null() {
                continue;
            }
            result.push(PWSTR(info.pPrinterName.0).to_string().unwrap_or_default());
        }

        Ok(result)
    }
}

/// Backend acquiring GDI printer device contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiBackend;

impl GdiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceBackend for GdiBackend {
    type Device = GdiPageDevice;

    fn open_device(&self, destination: &str) -> Result<Self::Device, EtiquetaError> {
        let driver = to_wide("WINSPOOL");
        let device = to_wide(destination);

        let hdc = unsafe {
            CreateDCW(
                PCWSTR::from_raw(driver.as_ptr()),
                PCWSTR::from_raw(device.as_ptr()),
                PCWSTR::null(),
                None,
            )
        };

        if hdc.is_invalid() {
            return Err(EtiquetaError::DeviceContext(format!(
                "CreateDC failed for '{}'",
                destination
            )));
        }

        Ok(GdiPageDevice {
            hdc,
            in_document: false,
        })
    }
}

/// One printer device context, exclusively owned for the span of a job.
pub struct GdiPageDevice {
    hdc: HDC,
    in_document: bool,
}

impl PageDevice for GdiPageDevice {
    fn start_document(&mut self, title: &str) -> Result<(), EtiquetaError> {
        let title_w = to_wide(title);
        let doc_info = DOCINFOW {
            cbSize: std::mem::size_of::<DOCINFOW>() as i32,
            lpszDocName: PCWSTR::from_raw(title_w.as_ptr()),
            ..Default::default()
        };

        unsafe {
            if StartDocW(self.hdc, &doc_info) <= 0 {
                return Err(EtiquetaError::JobStart("StartDoc failed".to_string()));
            }
            self.in_document = true;

            if StartPage(self.hdc) <= 0 {
                return Err(EtiquetaError::JobStart("StartPage failed".to_string()));
            }
        }

        Ok(())
    }

    fn metrics(&self) -> Result<PageMetrics, EtiquetaError> {
        let (width, height, dpi) = unsafe {
            (
                GetDeviceCaps(Some(self.hdc), HORZRES),
                GetDeviceCaps(Some(self.hdc), VERTRES),
                GetDeviceCaps(Some(self.hdc), LOGPIXELSX),
            )
        };

        if width <= 0 || height <= 0 || dpi <= 0 {
            return Err(EtiquetaError::PrintOperation(
                "device reports no printable area".to_string(),
            ));
        }

        Ok(PageMetrics {
            printable_width: width as u32,
            printable_height: height as u32,
            dpi: dpi as u32,
        })
    }

    fn draw_raster(
        &mut self,
        image: &LabelImage,
        placement: Placement,
    ) -> Result<(), EtiquetaError> {
        let (w, h) = (image.width(), image.height());

        // 24-bpp BGR rows, each padded to a DWORD boundary
        let stride = ((w as usize * 3) + 3) & !3;
        let mut pixels = vec![0u8; stride * h as usize];
        for (y, row) in image.rows().enumerate() {
            let base = y * stride;
            for (x, px) in row.enumerate() {
                let offset = base + x * 3;
                pixels[offset] = px[2];
                pixels[offset + 1] = px[1];
                pixels[offset + 2] = px[0];
            }
        }

        let info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: w as i32,
                biHeight: -(h as i32), // negative = top-down
                biPlanes: 1,
                biBitCount: 24,
                biCompression: BI_RGB.0,
                biSizeImage: pixels.len() as u32,
                ..Default::default()
            },
            ..Default::default()
        };

        let scanlines = unsafe {
            StretchDIBits(
                self.hdc,
                placement.x,
                placement.y,
                placement.width as i32,
                placement.height as i32,
                0,
                0,
                w as i32,
                h as i32,
                Some(pixels.as_ptr() as *const c_void),
                &info,
                DIB_RGB_COLORS,
                SRCCOPY,
            )
        };

        if scanlines == 0 {
            return Err(EtiquetaError::PrintOperation(
                "StretchDIBits transferred no scanlines".to_string(),
            ));
        }

        Ok(())
    }

    fn end_document(&mut self) -> Result<(), EtiquetaError> {
        unsafe {
            if EndPage(self.hdc) <= 0 {
                return Err(EtiquetaError::PrintOperation("EndPage failed".to_string()));
            }
            if EndDoc(self.hdc) <= 0 {
                return Err(EtiquetaError::PrintOperation("EndDoc failed".to_string()));
            }
        }
        self.in_document = false;
        Ok(())
    }
}

impl Drop for GdiPageDevice {
    fn drop(&mut self) {
        unsafe {
            if self.in_document {
                let _ = AbortDoc(self.hdc);
            }
            let _ = DeleteDC(self.hdc);
        }
    }
}
