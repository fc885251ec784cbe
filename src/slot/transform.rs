use crate::model::Matrix;

/// Flat placement of an armature display on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl DisplayTransform {
    #[inline]
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale_x + self.x, y * self.scale_y + self.y)
    }
}

/// Skinned vertices are already in armature space: scale and translate only.
pub fn resolve_skinned(local: &[f32], transform: &DisplayTransform, out: &mut [f32]) {
    for (src, dst) in local.chunks_exact(2).zip(out.chunks_exact_mut(2)) {
        let (x, y) = transform.apply(src[0], src[1]);
        dst[0] = x;
        dst[1] = y;
    }
}

/// Slot space to armature space through `matrix`, then scale and translate.
pub fn resolve_rigid(
    local: &[f32],
    matrix: &Matrix,
    transform: &DisplayTransform,
    out: &mut [f32],
) {
    for (src, dst) in local.chunks_exact(2).zip(out.chunks_exact_mut(2)) {
        let (ax, ay) = matrix.apply(src[0], src[1]);
        let (x, y) = transform.apply(ax, ay);
        dst[0] = x;
        dst[1] = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skinned_scale_then_translate() {
        let t = DisplayTransform {
            x: 100.0,
            y: 50.0,
            scale_x: 2.0,
            scale_y: 0.5,
        };
        let mut out = [0.0; 4];
        resolve_skinned(&[1.0, 2.0, -3.0, 4.0], &t, &mut out);
        assert_eq!(out, [102.0, 51.0, 94.0, 52.0]);
    }

    #[test]
    fn test_rigid_matrix_then_scale_then_translate() {
        // 90 degree rotation with translation (5, 6).
        let m = Matrix::new(0.0, 1.0, -1.0, 0.0, 5.0, 6.0);
        let t = DisplayTransform {
            x: 10.0,
            y: 20.0,
            scale_x: 2.0,
            scale_y: 3.0,
        };
        let mut out = [0.0; 4];
        resolve_rigid(&[1.0, 0.0, 0.0, 2.0], &m, &t, &mut out);
        // (1, 0) -> (5, 7) -> (20, 41); (0, 2) -> (3, 6) -> (16, 38)
        assert_eq!(out, [20.0, 41.0, 16.0, 38.0]);
    }

    #[test]
    fn test_identity_is_passthrough() {
        let local = [3.0, 4.0, 5.0, 6.0];
        let mut out = [0.0; 4];
        resolve_rigid(&local, &Matrix::IDENTITY, &DisplayTransform::default(), &mut out);
        assert_eq!(out, local);
    }
}
