//! Point extraction from edge images.
//!
//! - **Interior fill**: scan-line fill between the outermost edge pixels of
//!   each row, yielding left/right boundary points
//! - **Point sampler**: top-N pixels by neighbourhood dissimilarity, used as
//!   crude corner candidates

pub mod interior_fill;
pub mod point_sampler;

pub use interior_fill::{fill_interior, BoundaryPoint};
pub use point_sampler::{sample_points, ScoredPoint};
