//! Affine transforms as 3x3 homogeneous matrices.
//!
//! Mutators right-multiply the current matrix by an elementary matrix, so each
//! new operation acts in the local coordinates established by the previous
//! ones. A mutator that would produce a non-finite or singular matrix returns
//! [`TransformError::Degenerate`] and leaves the transform untouched.

use glam::{DMat3, DVec2, DVec3, dvec2};

use crate::errors::TransformError;
use crate::types::{Angle, Offset, Point};

/// An invertible 2D affine map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: DMat3,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

fn validate(matrix: DMat3) -> Result<DMat3, TransformError> {
    if !matrix.is_finite() {
        return Err(TransformError::Degenerate {
            reason: "non-finite matrix entry",
        });
    }
    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(TransformError::Degenerate {
            reason: "matrix is singular",
        });
    }
    Ok(matrix)
}

impl Transform {
    pub const fn identity() -> Self {
        Transform {
            matrix: DMat3::IDENTITY,
        }
    }

    /// Wrap an existing matrix after checking it is finite and invertible.
    pub fn from_matrix(matrix: DMat3) -> Result<Self, TransformError> {
        validate(matrix).map(|matrix| Transform { matrix })
    }

    pub fn matrix(&self) -> DMat3 {
        self.matrix
    }

    fn compose(&mut self, elementary: DMat3) -> Result<(), TransformError> {
        self.matrix = validate(self.matrix * elementary)?;
        Ok(())
    }

    /// Rotate counter-clockwise about the local origin.
    pub fn rotate(&mut self, angle: Angle) -> Result<(), TransformError> {
        self.compose(DMat3::from_angle(angle.radians()))
    }

    /// Rotate counter-clockwise about a local pivot point.
    pub fn rotate_about(&mut self, angle: Angle, pivot: Point) -> Result<(), TransformError> {
        let pivot = pivot.to_dvec2();
        self.compose(
            DMat3::from_translation(pivot)
                * DMat3::from_angle(angle.radians())
                * DMat3::from_translation(-pivot),
        )
    }

    pub fn translate(&mut self, v: Offset) -> Result<(), TransformError> {
        self.compose(DMat3::from_translation(v.to_dvec2()))
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> Result<(), TransformError> {
        self.compose(DMat3::from_scale(dvec2(sx, sy)))
    }

    /// Move the local origin so that local (0, 0) lands on the absolute point `p`.
    pub fn set_origin(&mut self, p: Point) -> Result<(), TransformError> {
        let local = self.invert()?.apply(p);
        self.translate(local - Point::ORIGIN)
    }

    /// Map the local box starting at `from` with size `bounds` onto the local
    /// box spanning `from..to`.
    ///
    /// Composes a translation to `from` with a per-axis scale of
    /// `(to - from) / bounds`.
    pub fn set_viewport(&mut self, from: Point, to: Point, bounds: Offset) -> Result<(), TransformError> {
        if bounds.dx == 0.0 || bounds.dy == 0.0 {
            return Err(TransformError::Degenerate {
                reason: "viewport bounds have a zero component",
            });
        }
        let span = to - from;
        let scale = dvec2(span.dx / bounds.dx, span.dy / bounds.dy);
        self.compose(DMat3::from_translation(from.to_dvec2()) * DMat3::from_scale(scale))
    }

    /// Reflect about the line `a x + b y + c = 0` (local coordinates).
    pub fn reflect(&mut self, a: f64, b: f64, c: f64) -> Result<(), TransformError> {
        let norm = a.hypot(b);
        if norm == 0.0 || !norm.is_finite() {
            return Err(TransformError::Degenerate {
                reason: "reflection line has a zero normal",
            });
        }
        let (a, b, c) = (a / norm, b / norm, c / norm);
        self.compose(DMat3::from_cols(
            DVec3::new(1.0 - 2.0 * a * a, -2.0 * a * b, 0.0),
            DVec3::new(-2.0 * a * b, 1.0 - 2.0 * b * b, 0.0),
            DVec3::new(-2.0 * a * c, -2.0 * b * c, 1.0),
        ))
    }

    /// Map a local point to absolute coordinates.
    pub fn apply(&self, p: Point) -> Point {
        Point::from_dvec2(self.matrix.transform_point2(p.to_dvec2()))
    }

    /// Map a displacement; translation does not apply.
    pub fn apply_vector(&self, v: Offset) -> Offset {
        Offset::from(self.matrix.transform_vector2(v.to_dvec2()))
    }

    pub fn invert(&self) -> Result<Transform, TransformError> {
        Transform::from_matrix(self.matrix.inverse())
    }

    /// Absolute position of the local origin.
    pub fn origin(&self) -> Point {
        Point::from_dvec2(self.matrix.transform_point2(DVec2::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x() - b.x()).abs() < 1e-9 && (a.y() - b.y()).abs() < 1e-9
    }

    #[test]
    fn identity_is_noop() {
        let t = Transform::identity();
        let p = Point::new(3.0, -2.0);
        assert_eq!(t.apply(p), p);
        assert_eq!(t.origin(), Point::ORIGIN);
    }

    #[test]
    fn translate_then_scale_acts_in_local_space() {
        let mut t = Transform::identity();
        t.translate(Offset::new(10.0, 0.0)).unwrap();
        t.scale(2.0, 3.0).unwrap();
        assert!(close(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 3.0)));
    }

    #[test]
    fn rotate_quarter_turn() {
        let mut t = Transform::identity();
        t.rotate(Angle::from_degrees(90.0)).unwrap();
        assert!(close(t.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn rotate_about_keeps_pivot_fixed() {
        let mut t = Transform::identity();
        let pivot = Point::new(2.0, 1.0);
        t.rotate_about(Angle::from_degrees(180.0), pivot).unwrap();
        assert!(close(t.apply(pivot), pivot));
        assert!(close(t.apply(Point::new(3.0, 1.0)), Point::new(1.0, 1.0)));
    }

    #[test]
    fn apply_vector_ignores_translation() {
        let mut t = Transform::identity();
        t.translate(Offset::new(5.0, 5.0)).unwrap();
        t.scale(2.0, 2.0).unwrap();
        assert_eq!(t.apply_vector(Offset::new(1.0, -1.0)), Offset::new(2.0, -2.0));
    }

    #[test]
    fn zero_scale_is_degenerate_and_keeps_previous() {
        let mut t = Transform::identity();
        t.translate(Offset::new(1.0, 2.0)).unwrap();
        let before = t;
        let err = t.scale(0.0, 1.0).unwrap_err();
        assert!(matches!(err, TransformError::Degenerate { .. }));
        assert_eq!(t, before);
    }

    #[test]
    fn non_finite_translation_is_degenerate() {
        let mut t = Transform::identity();
        assert!(t.translate(Offset::new(f64::NAN, 0.0)).is_err());
        assert_eq!(t, Transform::identity());
    }

    #[test]
    fn set_origin_uses_absolute_point() {
        let mut t = Transform::identity();
        t.scale(2.0, 2.0).unwrap();
        t.set_origin(Point::new(4.0, 6.0)).unwrap();
        assert!(close(t.origin(), Point::new(4.0, 6.0)));
        assert!(close(t.apply(Point::new(1.0, 0.0)), Point::new(6.0, 6.0)));
    }

    #[test]
    fn viewport_maps_bounds() {
        let mut t = Transform::identity();
        t.set_viewport(Point::new(10.0, 10.0), Point::new(20.0, 30.0), Offset::new(1.0, 1.0))
            .unwrap();
        assert!(close(t.apply(Point::ORIGIN), Point::new(10.0, 10.0)));
        assert!(close(t.apply(Point::new(1.0, 1.0)), Point::new(20.0, 30.0)));
    }

    #[test]
    fn viewport_zero_bounds_is_degenerate() {
        let mut t = Transform::identity();
        let result = t.set_viewport(Point::ORIGIN, Point::new(1.0, 1.0), Offset::new(0.0, 1.0));
        assert!(result.is_err());
        assert_eq!(t, Transform::identity());
    }

    #[test]
    fn reflect_about_y_axis() {
        let mut t = Transform::identity();
        t.reflect(1.0, 0.0, 0.0).unwrap();
        assert!(close(t.apply(Point::new(1.0, 2.0)), Point::new(-1.0, 2.0)));
    }

    #[test]
    fn reflect_about_offset_diagonal() {
        // x - y + 1 = 0, i.e. y = x + 1
        let mut t = Transform::identity();
        t.reflect(2.0, -2.0, 2.0).unwrap();
        assert!(close(t.apply(Point::new(0.0, 0.0)), Point::new(-1.0, 1.0)));
        assert!(close(t.apply(Point::new(1.0, 2.0)), Point::new(1.0, 2.0)));
    }

    #[test]
    fn reflect_zero_normal_is_degenerate() {
        let mut t = Transform::identity();
        assert!(t.reflect(0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn invert_round_trips_composed_transform() {
        let mut t = Transform::identity();
        t.set_viewport(Point::new(1.0, 2.0), Point::new(5.0, -3.0), Offset::new(2.0, 4.0))
            .unwrap();
        t.set_origin(Point::new(-7.0, 3.5)).unwrap();
        t.rotate(Angle::from_degrees(33.0)).unwrap();
        let inv = t.invert().unwrap();
        for p in [Point::new(0.0, 0.0), Point::new(12.5, -4.0), Point::new(-3.0, 8.0)] {
            assert!(close(inv.apply(t.apply(p)), p));
        }
    }

    #[test]
    fn from_matrix_rejects_singular() {
        assert!(Transform::from_matrix(DMat3::ZERO).is_err());
        assert!(Transform::from_matrix(DMat3::IDENTITY).is_ok());
    }
}
