//! Brute-force "corner" candidates by neighbourhood dissimilarity.
//!
//! Every pixel is scored by the summed absolute red-channel difference to all
//! pixels in a `(2n+1)²` window around it, with indices tiling across the
//! image borders. The highest scores are returned. Cost is
//! `width * height * (2n+1)²`, so callers bound it with a work budget.

use std::cmp::Ordering;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{GrainError, GrainResult};

/// Pixel with its dissimilarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub x: usize,
    pub y: usize,
    pub score: u64,
}

/// Number of pixel comparisons a sampling run performs, or `None` when the
/// count does not fit in a `u64`.
pub fn sampling_work(width: usize, height: usize, aperture: usize) -> Option<u64> {
    let window = (aperture as u64).checked_mul(2)?.checked_add(1)?;
    (width as u64)
        .checked_mul(height as u64)?
        .checked_mul(window)?
        .checked_mul(window)
}

/// Score a single pixel against its tiled `[-n, n]²` neighbourhood.
pub fn dissimilarity(buffer: &PixelBuffer, x: usize, y: usize, aperture: usize) -> u64 {
    let pixels = buffer.view();
    let (height, width, _) = pixels.dim();
    let n = aperture as isize;
    let center = pixels[[y, x, 0]] as i32;

    let mut score = 0u64;
    for dy in -n..=n {
        let sy = (y as isize + dy).rem_euclid(height as isize) as usize;
        for dx in -n..=n {
            let sx = (x as isize + dx).rem_euclid(width as isize) as usize;
            score += (center - pixels[[sy, sx, 0]] as i32).unsigned_abs() as u64;
        }
    }
    score
}

/// Return the `num_points` highest-scoring pixels.
///
/// Ties are ordered by ascending `y`, then `x`.
///
/// # Arguments
/// * `buffer` - Image whose red channel is scored
/// * `aperture` - Half-width `n` of the `(2n+1)²` window
/// * `num_points` - Maximum number of points returned
/// * `budget` - Upper bound on pixel comparisons
///
/// # Returns
/// Points by descending score. Fails with
/// [`GrainError::SamplingBudgetExceeded`] before doing any work when the
/// comparison count exceeds `budget` or overflows (reported as `u64::MAX`).
pub fn sample_points(
    buffer: &PixelBuffer,
    aperture: usize,
    num_points: usize,
    budget: u64,
) -> GrainResult<Vec<ScoredPoint>> {
    let (width, height) = (buffer.width(), buffer.height());
    let work = match sampling_work(width, height, aperture) {
        Some(work) if work <= budget => work,
        Some(work) => return Err(GrainError::SamplingBudgetExceeded { work, budget }),
        None => {
            return Err(GrainError::SamplingBudgetExceeded {
                work: u64::MAX,
                budget,
            })
        }
    };
    debug!("sampling {} comparisons", work);
    if width == 0 || height == 0 || num_points == 0 {
        return Ok(Vec::new());
    }

    let mut scored: Vec<ScoredPoint> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..width).map(move |x| ScoredPoint {
                x,
                y,
                score: dissimilarity(buffer, x, y, aperture),
            })
        })
        .collect();

    scored.sort_by(rank);
    scored.truncate(num_points);
    Ok(scored)
}

fn rank(a: &ScoredPoint, b: &ScoredPoint) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.y.cmp(&b.y))
        .then(a.x.cmp(&b.x))
}
