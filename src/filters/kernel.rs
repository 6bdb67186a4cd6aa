//! Square convolution kernels.
//!
//! A kernel is a flat row-major list of weights whose length is the square of
//! an odd side. Weights are used as given: a blur kernel should already sum to
//! one, an edge kernel to zero.

use crate::error::{GrainError, GrainResult};

/// 3x3 Laplacian used by the edge stage (8-neighbour form).
pub const LAPLACIAN_3X3: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Largest accepted Gaussian sigma (a 193x193 kernel).
pub const MAX_BLUR_SIGMA: f32 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f32>,
    side: usize,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// The side is `round(sqrt(len))`; the length must be exactly `side²`
    /// and the side odd.
    pub fn new(weights: Vec<f32>) -> GrainResult<Self> {
        let len = weights.len();
        let side = (len as f64).sqrt().round() as usize;
        if side == 0 || side * side != len || side % 2 == 0 {
            return Err(GrainError::InvalidKernel { len });
        }
        Ok(Self { weights, side })
    }

    /// Single 1 at the center, zeros elsewhere.
    pub fn identity(side: usize) -> GrainResult<Self> {
        let len = side * side;
        let mut weights = vec![0.0; len];
        if side % 2 == 1 {
            weights[len / 2] = 1.0;
        }
        Self::new(weights)
    }

    pub fn laplacian() -> Self {
        Self {
            weights: LAPLACIAN_3X3.to_vec(),
            side: 3,
        }
    }

    /// Normalized 2D Gaussian.
    ///
    /// Size is `ceil(6 * sigma)` forced odd, covering 99.7% of the
    /// distribution. `sigma <= 0` gives the 1x1 identity; a non-finite sigma
    /// or one above [`MAX_BLUR_SIGMA`] is rejected.
    pub fn gaussian(sigma: f32) -> GrainResult<Self> {
        if !sigma.is_finite() || sigma > MAX_BLUR_SIGMA {
            return Err(GrainError::InvalidSigma { sigma });
        }
        let k1d = gaussian_kernel_1d(sigma);
        let side = k1d.len();

        let mut weights = Vec::with_capacity(side * side);
        for wy in &k1d {
            for wx in &k1d {
                weights.push(wy * wx);
            }
        }

        Ok(Self { weights, side })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn half_side(&self) -> usize {
        self.side / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at kernel row `ky`, column `kx`.
    #[inline]
    pub fn at(&self, ky: usize, kx: usize) -> f32 {
        self.weights[ky * self.side + kx]
    }
}

/// Normalized 1D Gaussian of odd length. `sigma` must be finite.
fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    let kernel_size = ((sigma * 6.0).ceil() as usize) | 1;
    let half = kernel_size / 2;

    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}
