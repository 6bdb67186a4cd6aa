//! Generic square-kernel convolution over RGBA buffers.
//!
//! Neighbours outside the image contribute zero (zero padding). Only the
//! color channels are convolved; the output alpha is always 255. Sums are
//! rounded and saturated to 0-255 like a clamped 8-bit canvas.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, Axis};

use super::kernel::Kernel;
use crate::buffer::{PixelBuffer, CHANNELS};

/// Convolve `source` with `kernel` into a new buffer.
///
/// The source is only read, so every output pixel sees the original
/// neighbourhood. Rows are computed in parallel.
///
/// # Arguments
/// * `source` - RGBA image, left untouched
/// * `kernel` - Odd-sided square weights, applied as given
///
/// # Returns
/// A buffer of the same size with convolved RGB and alpha 255.
pub fn convolve(source: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let input = source.view();
    let (height, width, _) = input.dim();
    let side = kernel.side();
    let half = kernel.half_side() as isize;

    let mut output = Array3::<u8>::zeros((height, width, CHANNELS));

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let mut sum = [0.0f32; 3];

                for ky in 0..side {
                    let sy = y as isize + ky as isize - half;
                    if sy < 0 || sy >= height as isize {
                        continue;
                    }

                    for kx in 0..side {
                        let sx = x as isize + kx as isize - half;
                        if sx < 0 || sx >= width as isize {
                            continue;
                        }

                        let w = kernel.at(ky, kx);
                        for (c, acc) in sum.iter_mut().enumerate() {
                            *acc += input[[sy as usize, sx as usize, c]] as f32 * w;
                        }
                    }
                }

                for (c, acc) in sum.iter().enumerate() {
                    row[[x, c]] = acc.round().clamp(0.0, 255.0) as u8;
                }
                row[[x, 3]] = 255;
            }
        });

    PixelBuffer::wrap(output)
}

/// Convolve and replace the buffer contents with the result.
pub fn convolve_in_place(buffer: &mut PixelBuffer, kernel: &Kernel) {
    *buffer = convolve(buffer, kernel);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 37 + y * 11) % 256) as u8;
                buf.set_pixel(x, y, [v, v / 2, 255 - v, 17]);
            }
        }
        buf
    }

    #[test]
    fn test_identity_kernel_keeps_rgb_and_forces_alpha() {
        let src = gradient(6, 5);
        let out = convolve(&src, &Kernel::identity(3).unwrap());

        for y in 0..5 {
            for x in 0..6 {
                let a = src.pixel(x, y);
                let b = out.pixel(x, y);
                assert_eq!(&a[..3], &b[..3]);
                assert_eq!(b[3], 255);
            }
        }
    }

    #[test]
    fn test_zero_padding_at_corner() {
        let src = PixelBuffer::filled(3, 3, [90, 90, 90, 255]);
        let ones = Kernel::new(vec![1.0; 9]).unwrap();
        let out = convolve(&src, &ones);

        // Corner sees 4 in-bounds neighbours, edge 6, center 9 (saturated).
        assert_eq!(out.pixel(0, 0)[0], 255);
        let box_avg = Kernel::new(vec![1.0 / 9.0; 9]).unwrap();
        let out = convolve(&src, &box_avg);
        assert_eq!(out.pixel(0, 0)[0], 40);
        assert_eq!(out.pixel(1, 0)[0], 60);
        assert_eq!(out.pixel(1, 1)[0], 90);
    }

    #[test]
    fn test_negative_sums_saturate_to_zero() {
        let mut src = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        src.set_pixel(0, 0, [255, 255, 255, 255]);
        let out = convolve(&src, &Kernel::laplacian());

        assert_eq!(out.pixel(0, 0)[0], 255);
        assert_eq!(out.pixel(1, 1)[0], 0);
    }

    #[test]
    fn test_in_place_reads_original_pixels() {
        // A shift-right kernel would smear if it read its own output.
        let mut buf = PixelBuffer::new(4, 1);
        buf.set_pixel(0, 0, [200, 0, 0, 255]);
        let shift = Kernel::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        convolve_in_place(&mut buf, &shift);

        assert_eq!(buf.red(0, 0), 0);
        assert_eq!(buf.red(1, 0), 200);
        assert_eq!(buf.red(2, 0), 0);
        assert_eq!(buf.red(3, 0), 0);
    }

    #[test]
    fn test_dimensions_preserved() {
        let src = gradient(7, 4);
        let out = convolve(&src, &Kernel::gaussian(1.0).unwrap());
        assert_eq!(out.width(), 7);
        assert_eq!(out.height(), 4);
    }
}
