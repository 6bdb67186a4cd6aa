//! Scan-line interior fill of detected grain outlines.
//!
//! Each row is assumed to cross the outline twice. The first and last bright
//! pixel of the row are taken as the left and right boundary; everything in
//! between is painted as interior. Extra crossings from concave shapes are
//! ignored.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Pixels this close to any image border are never scanned or painted.
pub const BORDER_MARGIN: usize = 10;

/// Red value that marks an edge pixel in the Laplacian output.
pub const EDGE_VALUE: u8 = 255;

/// Color painted between the two boundary pixels.
pub const INTERIOR_RGB: [u8; 3] = [100, 100, 100];

/// Color painted on the boundary pixels themselves.
pub const BOUNDARY_RGB: [u8; 3] = [255, 0, 0];

/// Left or right boundary of a filled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub x: usize,
    pub y: usize,
}

impl BoundaryPoint {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Fill the interior of every row and collect its boundary pixels.
///
/// Only `y` in `[margin, height - margin)` and `x` in `[margin, width - margin)`
/// are considered. For each row with a first bright pixel `x1` and a distinct
/// last bright pixel `x2`, the pixels strictly between are painted
/// [`INTERIOR_RGB`], the two boundary pixels [`BOUNDARY_RGB`] (alpha is left
/// alone), and `(x1, y)`, `(x2, y)` are appended.
///
/// # Returns
/// Two points per filled row, rows ascending, left point first.
pub fn fill_interior(buffer: &mut PixelBuffer, margin: usize) -> Vec<BoundaryPoint> {
    let (width, height) = (buffer.width(), buffer.height());
    let mut points = Vec::new();

    if width <= 2 * margin || height <= 2 * margin {
        return points;
    }

    for y in margin..height - margin {
        let mut first = None;
        let mut last = None;

        for x in margin..width - margin {
            if buffer.red(x, y) == EDGE_VALUE {
                if first.is_none() {
                    first = Some(x);
                }
                last = Some(x);
            }
        }

        let (Some(x1), Some(x2)) = (first, last) else {
            continue;
        };
        if x2 <= x1 {
            continue;
        }

        for x in x1 + 1..x2 {
            buffer.set_rgb(x, y, INTERIOR_RGB);
        }
        buffer.set_rgb(x1, y, BOUNDARY_RGB);
        buffer.set_rgb(x2, y, BOUNDARY_RGB);

        points.push(BoundaryPoint::new(x1, y));
        points.push(BoundaryPoint::new(x2, y));
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::filled(width, height, [0, 0, 0, 255])
    }

    #[test]
    fn test_single_row_between_two_edges() {
        let mut img = dark(60, 30);
        img.set_pixel(12, 15, [255, 255, 255, 255]);
        img.set_pixel(40, 15, [255, 255, 255, 255]);

        let points = fill_interior(&mut img, BORDER_MARGIN);

        assert_eq!(points, vec![BoundaryPoint::new(12, 15), BoundaryPoint::new(40, 15)]);
        assert_eq!(img.pixel(12, 15), [255, 0, 0, 255]);
        assert_eq!(img.pixel(40, 15), [255, 0, 0, 255]);
        for x in 13..40 {
            assert_eq!(img.pixel(x, 15), [100, 100, 100, 255]);
        }
        assert_eq!(img.pixel(11, 15), [0, 0, 0, 255]);
        assert_eq!(img.pixel(41, 15), [0, 0, 0, 255]);
    }

    #[test]
    fn test_rows_with_zero_or_one_edge_are_skipped() {
        let mut img = dark(40, 40);
        img.set_pixel(20, 12, [255, 255, 255, 255]);

        let points = fill_interior(&mut img, BORDER_MARGIN);

        assert!(points.is_empty());
        assert_eq!(img.pixel(20, 12), [255, 255, 255, 255]);
    }

    #[test]
    fn test_margin_pixels_are_ignored_and_untouched() {
        let mut img = dark(40, 40);
        // Both edges in the left margin, and a row inside the top margin.
        img.set_pixel(2, 20, [255, 255, 255, 255]);
        img.set_pixel(8, 20, [255, 255, 255, 255]);
        img.set_pixel(12, 5, [255, 255, 255, 255]);
        img.set_pixel(25, 5, [255, 255, 255, 255]);
        let before = img.clone();

        let points = fill_interior(&mut img, BORDER_MARGIN);

        assert!(points.is_empty());
        assert_eq!(img, before);
    }

    #[test]
    fn test_inner_crossings_use_first_and_last() {
        let mut img = dark(60, 30);
        for x in [12, 20, 30, 45] {
            img.set_pixel(x, 18, [255, 255, 255, 255]);
        }

        let points = fill_interior(&mut img, BORDER_MARGIN);

        assert_eq!(points, vec![BoundaryPoint::new(12, 18), BoundaryPoint::new(45, 18)]);
        assert_eq!(img.pixel(20, 18), [100, 100, 100, 255]);
    }

    #[test]
    fn test_points_are_ordered_pairs_within_margin() {
        let mut img = dark(50, 50);
        for y in 10..40 {
            img.set_pixel(15, y, [255, 255, 255, 255]);
            img.set_pixel(33, y, [255, 255, 255, 255]);
        }

        let points = fill_interior(&mut img, BORDER_MARGIN);

        assert_eq!(points.len(), 60);
        for pair in points.chunks(2) {
            assert_eq!(pair[0].y, pair[1].y);
            assert!(pair[0].x < pair[1].x);
        }
        assert!(points.windows(2).all(|w| w[0].y <= w[1].y));
        assert!(points.iter().all(|p| (10..40).contains(&p.x) && (10..40).contains(&p.y)));
    }

    #[test]
    fn test_small_image_yields_nothing() {
        let mut img = PixelBuffer::filled(15, 15, [255, 255, 255, 255]);
        assert!(fill_interior(&mut img, BORDER_MARGIN).is_empty());
    }
}
