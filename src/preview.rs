//! Raster previews of icons using resvg.
//!
//! Previews are static: CSS animations and scripts are not evaluated, so an
//! animated icon renders as its first frame.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{Error, Result};
use crate::manipulation::SvgManipulator;

/// Renders an icon to an RGBA image.
///
/// The icon is scaled to fit within `size x size` pixels while preserving
/// its aspect ratio (the larger dimension will be `size`).
pub fn render_preview(svg: &str, size: u32) -> Result<RgbaImage> {
    if size == 0 {
        return Err(Error::Render("preview size must be positive".into()));
    }

    // usvg rejects documents without the SVG namespace.
    let svg = SvgManipulator::new().ensure_svg_namespace(svg);

    let opts = Options::default();
    let tree = Tree::from_str(&svg, &opts).map_err(|e| Error::Render(e.to_string()))?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = ((svg_size.width() * scale).ceil() as u32).max(1);
    let height = ((svg_size.height() * scale).ceil() as u32).max(1);

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} pixmap")))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap_to_rgba_image(&pixmap)
}

/// Renders an icon and encodes it as PNG.
pub fn render_preview_png(svg: &str, size: u32) -> Result<Vec<u8>> {
    let image = render_preview(svg, size)?;
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        // tiny_skia uses premultiplied alpha
        let [r, g, b, a] = unpremultiply(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha());
        raw.extend_from_slice(&[r, g, b, a]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| Error::Render("pixel buffer size mismatch".into()))
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let alpha = a as f32 / 255.0;
    let channel = |c: u8| (c as f32 / alpha).round().min(255.0) as u8;
    [channel(r), channel(g), channel(b), a]
}
