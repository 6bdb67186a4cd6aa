use grain_outline::PixelBuffer;

/// Uniform opaque image.
pub fn uniform(width: usize, height: usize, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer::filled(width, height, [rgb[0], rgb[1], rgb[2], 255])
}

/// Dark elliptical grain on a light background.
pub fn grain_ellipse(width: usize, height: usize, rx: f64, ry: f64) -> PixelBuffer {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut img = uniform(width, height, [225, 220, 210]);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    for y in 0..height {
        for x in 0..width {
            let dx = (x as f64 + 0.5 - cx) / rx;
            let dy = (y as f64 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                img.set_pixel(x, y, [40, 35, 30, 255]);
            }
        }
    }
    img
}

/// Population variance of the red channel inside `[margin, size - margin)`.
pub fn red_variance(img: &PixelBuffer, margin: usize) -> f64 {
    let mut values = Vec::new();
    for y in margin..img.height() - margin {
        for x in margin..img.width() - margin {
            values.push(img.red(x, y) as f64);
        }
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}
