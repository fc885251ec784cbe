/// 2x3 affine transform as produced by the animation engine for bones and slots.
///
/// Maps `(x, y)` to `(a * x + c * y + tx, b * x + d * y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub const fn from_translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Rotation by `angle` radians, then scale, then translation.
    pub fn from_transform(x: f32, y: f32, angle: f32, scale_x: f32, scale_y: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            cos * scale_x,
            sin * scale_x,
            -sin * scale_y,
            cos * scale_y,
            x,
            y,
        )
    }

    /// Transform a point.
    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_apply() {
        assert_eq!(Matrix::IDENTITY.apply(3.0, -4.0), (3.0, -4.0));
    }

    #[test]
    fn test_apply_matches_column_layout() {
        let m = Matrix::new(2.0, 0.5, -1.0, 3.0, 10.0, 20.0);
        let (x, y) = m.apply(1.0, 2.0);
        assert!((x - (2.0 - 2.0 + 10.0)).abs() < 1e-6);
        assert!((y - (0.5 + 6.0 + 20.0)).abs() < 1e-6);
    }

    #[test]
    fn test_quarter_turn() {
        let m = Matrix::from_transform(0.0, 0.0, std::f32::consts::FRAC_PI_2, 1.0, 1.0);
        let (x, y) = m.apply(1.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }
}
