use ndarray::s;

use crate::{Image, Patch};

/// Sliding-window geometry: spatial size of every emitted patch plus the
/// step between consecutive top-left corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub height: usize,
    pub width: usize,
    pub stride: usize,
}

impl WindowSpec {
    /// Overlapping scan used for the train split.
    pub fn overlapping(height: usize, width: usize, stride: usize) -> Self {
        Self { height, width, stride }
    }

    /// Non-overlapping partition used for the test split: the stride equals
    /// the window width, so patches never share pixels.
    pub fn tiling(height: usize, width: usize) -> Self {
        Self { height, width, stride: width }
    }
}

/// Cut `image` into patches along a row-major corner scan.
///
/// Corners step by `spec.stride` starting at (0, 0); all columns of one row
/// are visited before the next row. A window that would run past the bottom
/// or right edge is dropped, not padded — tiles whose dimensions are not
/// multiples of the stride lose partial border coverage on purpose, so that
/// every patch has exact dims `(spec.height, spec.width)` with channels
/// preserved.
pub fn extract(image: &Image, spec: &WindowSpec) -> Vec<Patch> {
    let (h, w, _) = image.dim();
    let mut patches = Vec::new();
    let mut x = 0;
    while x < h {
        let mut y = 0;
        while y < w {
            if x + spec.height <= h && y + spec.width <= w {
                let view = image.slice(s![x..x + spec.height, y..y + spec.width, ..]);
                patches.push(view.to_owned());
            }
            y += spec.stride;
        }
        x += spec.stride;
    }
    patches
}
