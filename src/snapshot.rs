use crate::basemap::Outline;
use crate::map_view::MapDot;
use crate::render::hex_to_rgba;
use anyhow::{Context, Result};
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE: Rgba<u8> = Rgba([170, 170, 170, 255]);

/// Rasterizes the map: basemap outlines first, then dots in draw order.
pub fn render_map<'a>(
    width: u32,
    height: u32,
    outlines: &[Outline],
    dots: impl IntoIterator<Item = &'a MapDot>,
) -> RgbaImage {
    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);

    for ring in outlines {
        for pair in ring.windows(2) {
            draw_line(&mut img, pair[0], pair[1], OUTLINE);
        }
    }

    for dot in dots {
        fill_circle(&mut img, dot.x, dot.y, dot.radius.max(1.0), hex_to_rgba(dot.fill));
    }

    img
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("Failed to encode map PNG")?;
    Ok(buf)
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
    }
    img.save(path)
        .with_context(|| format!("Failed to save snapshot {:?}", path))?;
    info!("Wrote map snapshot to {:?}", path);
    Ok(())
}

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_circle(img: &mut RgbaImage, cx: f64, cy: f64, r: f64, color: Rgba<u8>) {
    let r2 = r * r;
    let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
    let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                put(img, x, y, color);
            }
        }
    }
}

fn draw_line(img: &mut RgbaImage, from: (f64, f64), to: (f64, f64), color: Rgba<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as i64;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        put(img, x.round() as i64, y.round() as i64, color);
    }
}
