use ndarray::{s, Array3};

use crate::Patch;

/// Geometric augmentations applied to every training patch.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationSpec {
    /// Rotation angles in degrees, applied in order.
    pub rotation_angles: Vec<f32>,
    pub vertical_flip: bool,
    pub horizontal_flip: bool,
}

impl AugmentationSpec {
    /// The no-op spec: `expand` returns only the original patch. Used for the
    /// test split, which is never augmented.
    pub fn identity() -> Self {
        Self {
            rotation_angles: Vec::new(),
            vertical_flip: false,
            horizontal_flip: false,
        }
    }

    /// Number of patches `expand` emits per input.
    pub fn variants_per_patch(&self) -> usize {
        1 + self.rotation_angles.len()
            + usize::from(self.vertical_flip)
            + usize::from(self.horizontal_flip)
    }
}

/// Expand one patch into itself plus its configured variants, in a fixed
/// order: original, rotations (in given order), vertical flip, horizontal
/// flip. The original is always first and unmodified.
pub fn expand(patch: &Patch, spec: &AugmentationSpec) -> Vec<Patch> {
    let mut out = Vec::with_capacity(spec.variants_per_patch());
    out.push(patch.clone());
    for &angle in &spec.rotation_angles {
        out.push(rotate(patch, angle));
    }
    if spec.vertical_flip {
        out.push(flip_vertical(patch));
    }
    if spec.horizontal_flip {
        out.push(flip_horizontal(patch));
    }
    out
}

/// Reverse row order (top/bottom). Bit-exact, no interpolation.
pub fn flip_vertical(patch: &Patch) -> Patch {
    patch.slice(s![..;-1, .., ..]).to_owned()
}

/// Reverse column order (left/right). Bit-exact, no interpolation.
pub fn flip_horizontal(patch: &Patch) -> Patch {
    patch.slice(s![.., ..;-1, ..]).to_owned()
}

/// Rotate a patch counter-clockwise about its center, keeping the input
/// dimensions.
///
/// Right angles take a lossless index-permutation path (90/270 only when the
/// patch is square, since the output must keep the input shape). Everything
/// else is inverse-mapped with bilinear interpolation: corners swept outside
/// the source are filled with zeros, and interpolated samples are rounded and
/// clamped back to the 8-bit range.
pub fn rotate(patch: &Patch, degrees: f32) -> Patch {
    let (h, w, _) = patch.dim();
    let angle = degrees.rem_euclid(360.0);
    if angle == 0.0 {
        return patch.clone();
    }
    if angle == 180.0 {
        return patch.slice(s![..;-1, ..;-1, ..]).to_owned();
    }
    if h == w {
        let n = h;
        if angle == 90.0 {
            return Array3::from_shape_fn(patch.dim(), |(y, x, c)| patch[(x, n - 1 - y, c)]);
        }
        if angle == 270.0 {
            return Array3::from_shape_fn(patch.dim(), |(y, x, c)| patch[(n - 1 - x, y, c)]);
        }
    }
    rotate_bilinear(patch, angle)
}

fn rotate_bilinear(patch: &Patch, degrees: f32) -> Patch {
    let (h, w, c) = patch.dim();
    let (sin_t, cos_t) = (f64::from(degrees).to_radians()).sin_cos();
    let cy = (h as f64 - 1.0) / 2.0;
    let cx = (w as f64 - 1.0) / 2.0;

    let mut out = Array3::<u8>::zeros((h, w, c));
    for y in 0..h {
        for x in 0..w {
            // Rotate the output offset back by -angle to find the source.
            // Trig round-off can push a grid-exact source a hair outside the
            // bounds check, so near-integer coordinates are snapped first.
            let dy = y as f64 - cy;
            let dx = x as f64 - cx;
            let sx = snap_to_grid(cos_t * dx - sin_t * dy + cx);
            let sy = snap_to_grid(sin_t * dx + cos_t * dy + cy);
            if sx < 0.0 || sy < 0.0 || sx > (w - 1) as f64 || sy > (h - 1) as f64 {
                continue;
            }
            let x0 = sx.floor() as usize;
            let y0 = sy.floor() as usize;
            let x1 = (x0 + 1).min(w - 1);
            let y1 = (y0 + 1).min(h - 1);
            let fx = sx - x0 as f64;
            let fy = sy - y0 as f64;
            for ch in 0..c {
                let v00 = f64::from(patch[(y0, x0, ch)]);
                let v01 = f64::from(patch[(y0, x1, ch)]);
                let v10 = f64::from(patch[(y1, x0, ch)]);
                let v11 = f64::from(patch[(y1, x1, ch)]);
                let top = v00 + (v01 - v00) * fx;
                let bottom = v10 + (v11 - v10) * fx;
                let value = top + (bottom - top) * fy;
                out[(y, x, ch)] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

fn snap_to_grid(v: f64) -> f64 {
    if (v - v.round()).abs() < 1e-9 {
        v.round()
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patch(h: usize, w: usize, c: usize) -> Patch {
        Array3::from_shape_fn((h, w, c), |(y, x, ch)| ((y * 31 + x * 7 + ch * 3) % 256) as u8)
    }

    #[test]
    fn identity_spec_returns_only_the_original() {
        let patch = sample_patch(6, 6, 3);
        let out = expand(&patch, &AugmentationSpec::identity());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], patch);
    }

    #[test]
    fn expansion_count_and_order() {
        let patch = sample_patch(8, 8, 1);
        let spec = AugmentationSpec {
            rotation_angles: vec![90.0, 180.0, 270.0],
            vertical_flip: true,
            horizontal_flip: true,
        };
        let out = expand(&patch, &spec);
        assert_eq!(out.len(), spec.variants_per_patch());
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], patch);
        assert_eq!(out[1], rotate(&patch, 90.0));
        assert_eq!(out[2], rotate(&patch, 180.0));
        assert_eq!(out[3], rotate(&patch, 270.0));
        assert_eq!(out[4], flip_vertical(&patch));
        assert_eq!(out[5], flip_horizontal(&patch));
    }

    #[test]
    fn flips_are_involutions() {
        let patch = sample_patch(9, 13, 3);
        assert_eq!(flip_vertical(&flip_vertical(&patch)), patch);
        assert_eq!(flip_horizontal(&flip_horizontal(&patch)), patch);
    }

    #[test]
    fn vertical_flip_reverses_rows_exactly() {
        let patch = Array3::from_shape_vec((2, 3, 1), vec![0, 1, 2, 3, 4, 5]).unwrap();
        let flipped = flip_vertical(&patch);
        assert_eq!(flipped.iter().copied().collect::<Vec<u8>>(), vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn horizontal_flip_reverses_columns_exactly() {
        let patch = Array3::from_shape_vec((2, 3, 1), vec![0, 1, 2, 3, 4, 5]).unwrap();
        let flipped = flip_horizontal(&patch);
        assert_eq!(flipped.iter().copied().collect::<Vec<u8>>(), vec![2, 1, 0, 5, 4, 3]);
    }

    #[test]
    fn rotate_180_reverses_both_axes() {
        // [[1, 2], [3, 4]] rotated 180 -> [[4, 3], [2, 1]]
        let patch = Array3::from_shape_vec((2, 2, 1), vec![1, 2, 3, 4]).unwrap();
        let rotated = rotate(&patch, 180.0);
        assert_eq!(rotated.iter().copied().collect::<Vec<u8>>(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn rotate_90_is_lossless_on_square_patches() {
        // [[1, 2], [3, 4]] rotated 90 ccw -> [[2, 4], [1, 3]]
        let patch = Array3::from_shape_vec((2, 2, 1), vec![1, 2, 3, 4]).unwrap();
        let rotated = rotate(&patch, 90.0);
        assert_eq!(rotated.iter().copied().collect::<Vec<u8>>(), vec![2, 4, 1, 3]);
    }

    #[test]
    fn four_quarter_turns_restore_the_patch() {
        let patch = sample_patch(16, 16, 3);
        let mut p = patch.clone();
        for _ in 0..4 {
            p = rotate(&p, 90.0);
        }
        assert_eq!(p, patch);
        assert_eq!(rotate(&rotate(&patch, 180.0), 180.0), patch);
    }

    #[test]
    fn right_angles_on_non_square_patches_permute_through_the_center() {
        // 2x4 patches skip the lossless square shortcut, so these pin the
        // interpolated mapping itself. Keeping the input shape, only the two
        // middle columns stay inside the source; the outer ones are fill.
        let patch = Array3::from_shape_vec((2, 4, 1), vec![10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let ccw = rotate(&patch, 90.0);
        assert_eq!(
            ccw.iter().copied().collect::<Vec<u8>>(),
            vec![0, 30, 70, 0, 0, 20, 60, 0]
        );
        let cw = rotate(&patch, 270.0);
        assert_eq!(
            cw.iter().copied().collect::<Vec<u8>>(),
            vec![0, 60, 20, 0, 0, 70, 30, 0]
        );
    }

    #[test]
    fn rotation_preserves_dimensions_for_any_angle() {
        let patch = sample_patch(20, 14, 3);
        for &angle in &[13.0f32, 45.0, 90.0, 207.5, 270.0, 359.0] {
            assert_eq!(rotate(&patch, angle).dim(), (20, 14, 3));
        }
    }

    #[test]
    fn rotation_by_full_turn_is_identity() {
        let patch = sample_patch(10, 10, 1);
        assert_eq!(rotate(&patch, 0.0), patch);
        assert_eq!(rotate(&patch, 360.0), patch);
        assert_eq!(rotate(&patch, -360.0), patch);
    }

    #[test]
    fn arbitrary_rotation_stays_in_sample_range() {
        // Constant-255 patch: interior interpolation must not overshoot, the
        // swept corners fall back to the zero fill.
        let patch = Array3::from_elem((12, 12, 1), 255u8);
        let rotated = rotate(&patch, 45.0);
        let center = rotated[(6, 6, 0)];
        assert_eq!(center, 255);
    }

    #[test]
    fn expansion_entries_are_independent_copies() {
        let patch = sample_patch(6, 6, 1);
        let spec = AugmentationSpec {
            rotation_angles: vec![180.0],
            vertical_flip: false,
            horizontal_flip: false,
        };
        let mut out = expand(&patch, &spec);
        out[0][(0, 0, 0)] = out[0][(0, 0, 0)].wrapping_add(1);
        assert_ne!(out[0], patch.clone());
        assert_eq!(rotate(&patch, 180.0), out[1]);
    }
}
