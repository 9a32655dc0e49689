//! Code 128 label rendering.
//!
//! Uses the barcoders crate for Code 128 encoding. The raw symbol is drawn
//! at 2 px per module and composited centered onto a fixed 600x300 white
//! label canvas, which is what gets cached and printed.

use barcoders::sym::code128::Code128;
use image::{Rgb, RgbImage};

use crate::error::EtiquetaError;

/// Fixed label canvas, in logical pixels.
pub const CANVAS_WIDTH: u32 = 600;
pub const CANVAS_HEIGHT: u32 = 300;

/// Horizontal pixels per barcode module.
const MODULE_SCALE: u32 = 2;

/// Bar height in pixels.
const BAR_HEIGHT: u32 = 160;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Render `text` as a Code 128 barcode centered on the label canvas.
///
/// Code128 requires a character set prefix:
/// - Character Set A (Ā): uppercase, control chars, digits
/// - Character Set B (Ɓ): uppercase, lowercase, digits, special chars
/// - Character Set C (Ć): digit pairs only (high density)
///
/// We use Set B as it supports the widest range of printable characters.
/// Input the symbology cannot represent fails with an encoding error.
pub(crate) fn render(text: &str) -> Result<RgbImage, EtiquetaError> {
    let prefixed = format!("\u{0181}{}", text);
    let barcode = Code128::new(&prefixed).map_err(|e| {
        EtiquetaError::Encoding(format!("Code 128 cannot encode {:?}: {}", text, e))
    })?;
    let modules = barcode.encode();

    let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, WHITE);

    let bar_width = modules.len() as u32 * MODULE_SCALE;
    let origin_x = if bar_width < CANVAS_WIDTH {
        (CANVAS_WIDTH - bar_width) / 2
    } else {
        0
    };
    let origin_y = if BAR_HEIGHT < CANVAS_HEIGHT {
        (CANVAS_HEIGHT - BAR_HEIGHT) / 2
    } else {
        0
    };

    for (i, &module) in modules.iter().enumerate() {
        if module != 1 {
            continue;
        }
        for sx in 0..MODULE_SCALE {
            let x = origin_x + i as u32 * MODULE_SCALE + sx;
            if x >= CANVAS_WIDTH {
                break;
            }
            for y in origin_y..origin_y + BAR_HEIGHT {
                canvas.put_pixel(x, y, BLACK);
            }
        }
    }

    Ok(canvas)
}
