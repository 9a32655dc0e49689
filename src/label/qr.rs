//! QR label rendering.
//!
//! Uses the qrcode crate and draws modules directly into an RGB raster at
//! 20 px per module with a 4-module quiet zone, no surrounding canvas. The
//! output is square and already large enough that print resampling only
//! ever scales it up.

use image::{Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};

use crate::error::EtiquetaError;

/// Pixels per QR module.
const MODULE_SIZE: u32 = 20;

/// Quiet zone width on each side, in modules.
const QUIET_ZONE: u32 = 4;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Render `text` as a QR code with error-correction level L.
pub(crate) fn render(text: &str) -> Result<RgbImage, EtiquetaError> {
    let code = QrCode::with_error_correction_level(text, EcLevel::L)
        .map_err(|e| EtiquetaError::Encoding(format!("QR generation failed: {}", e)))?;

    let modules = code.width() as u32;
    let size = (modules + 2 * QUIET_ZONE) * MODULE_SIZE;
    let mut img = RgbImage::from_pixel(size, size, WHITE);

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            let px = (QUIET_ZONE + qx) * MODULE_SIZE;
            let py = (QUIET_ZONE + qy) * MODULE_SIZE;
            for dy in 0..MODULE_SIZE {
                for dx in 0..MODULE_SIZE {
                    img.put_pixel(px + dx, py + dy, BLACK);
                }
            }
        }
    }

    Ok(img)
}
