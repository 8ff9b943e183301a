use kurbo::{Affine, CubicBez, Point, Rect, Vec2};

/// Cheap stand-in for arc length: the average of the chord and the control polygon
///
/// Always between the true arc length's lower (chord) and upper (polygon) bounds.
pub(crate) fn approx_length(c: &CubicBez) -> f64 {
    let chord = (c.p3 - c.p0).hypot();
    let polygon = (c.p1 - c.p0).hypot() + (c.p2 - c.p1).hypot() + (c.p3 - c.p2).hypot();
    chord / 2.0 + polygon / 2.0
}

/// Interpolate each control point of two cubics
pub(crate) fn lerp_cubic(a: &CubicBez, b: &CubicBez, t: f64) -> CubicBez {
    CubicBez::new(
        a.p0.lerp(b.p0, t),
        a.p1.lerp(b.p1, t),
        a.p2.lerp(b.p2, t),
        a.p3.lerp(b.p3, t),
    )
}

/// Rotate a vector by degrees, positive turning +x toward +y
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate a point around `origin` by degrees
pub fn rotate_about(p: Point, origin: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return p;
    }
    origin + rotate_vec(p - origin, degrees)
}

/// Maps `src` onto `dest` by scaling and translating, no flipping
///
/// Both boxes must have non-zero size.
pub(crate) fn rect_to_rect(src: Rect, dest: Rect) -> Affine {
    debug_assert!(src.width() != 0.0 && src.height() != 0.0);
    Affine::translate((-src.min_x(), -src.min_y()))
        .then_scale_non_uniform(dest.width() / src.width(), dest.height() / src.height())
        .then_translate((dest.min_x(), dest.min_y()).into())
}

#[cfg(test)]
mod tests {
    use kurbo::{CubicBez, Point, Rect, Vec2};

    use super::{approx_length, rect_to_rect, rotate_about, rotate_vec};

    #[test]
    fn straight_line_length_is_exact() {
        let line = CubicBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0));
        assert_eq!(3.0, approx_length(&line));
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate_vec(Vec2::new(1.0, 0.0), 90.0);
        assert!((v - Vec2::new(0.0, 1.0)).hypot() < 1e-12, "{v:?}");
        let p = rotate_about(Point::new(10.0, 0.0), Point::new(5.0, 0.0), 180.0);
        assert!((p - Point::new(0.0, 0.0)).hypot() < 1e-12, "{p:?}");
    }

    #[test]
    fn rect_to_rect_maps_corners() {
        let transform = rect_to_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 25.0, 10.0));
        assert_eq!(Point::new(5.0, 5.0), transform * Point::new(0.0, 0.0));
        assert_eq!(Point::new(25.0, 10.0), transform * Point::new(10.0, 10.0));
    }
}
