use super::*;

/// Writes the tonemapped, sRGB-encoded render as a PNG (§6), grounded in
/// `vz::image::Rgb` but reading straight off linear [`ColorRgb`] pixels instead
/// of an intermediate `imagelib::RgbImage` wrapper.
pub fn write_png(path: &Path, pixels: &[ColorRgb], size: (u32, u32)) -> Result<()> {
    ensure!(
        pixels.len() == (size.0 * size.1) as usize,
        "pixel buffer size {} does not match image size {}x{}",
        pixels.len(),
        size.0,
        size.1
    );
    let mut buffer = imagelib::RgbImage::new(size.0, size.1);
    for (src, dst) in pixels.iter().zip(buffer.pixels_mut()) {
        *dst = imagelib::Rgb(src.tonemap().into_srgb8());
    }
    buffer
        .save(path)
        .with_context(|| format!("writing PNG {}", path.display()))
}

/// Writes the untonemapped linear radiance as an EXR (§6), via the `exr` crate.
pub fn write_exr(path: &Path, pixels: &[ColorRgb], size: (u32, u32)) -> Result<()> {
    ensure!(
        pixels.len() == (size.0 * size.1) as usize,
        "pixel buffer size {} does not match image size {}x{}",
        pixels.len(),
        size.0,
        size.1
    );
    exr::prelude::write_rgb_file(path, size.0 as usize, size.1 as usize, |x, y| {
        let p = pixels[y * size.0 as usize + x];
        (p.r(), p.g(), p.b())
    })
    .with_context(|| format!("writing EXR {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png_rejects_mismatched_pixel_count() {
        let pixels = vec![ColorRgb::BLACK; 3];
        let dir = std::env::temp_dir();
        let path = dir.join("raydiance_test_mismatch.png");
        assert!(write_png(&path, &pixels, (2, 2)).is_err());
    }
}
