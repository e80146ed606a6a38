use glam::DVec3;

/// Geodesic arc length between two unit vectors.
///
/// The dot product is clamped to [-1, 1] before the inverse cosine so that
/// floating-point overshoot for nearly identical or nearly antipodal points
/// cannot produce a NaN.
#[inline]
pub fn arc_length(a: DVec3, b: DVec3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Area of the spherical triangle (a, b, c) on the unit sphere.
///
/// Uses the Van Oosterom–Strackee solid-angle form
/// `E = 2 atan2(|a · (b × c)|, 1 + a·b + b·c + c·a)`, which stays accurate
/// for both small and obtuse triangles and is independent of the vertex
/// winding.
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let triple = a.dot(b.cross(c)).abs();
    let denom = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * triple.atan2(denom)
}

/// Center of mass of the spherical triangle (a, b, c).
///
/// The surface integral of the position vector over a spherical polygon is
/// half the sum of each edge's arc angle times the unit normal of its great
/// circle; dividing by the area gives the centroid. The result lies inside
/// the sphere, not on it. Returns the zero vector for a degenerate triangle.
pub fn triangle_centroid(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    let area = triangle_area(a, b, c);
    if area <= 0.0 || !area.is_finite() {
        return DVec3::ZERO;
    }

    let mut p = DVec3::ZERO;
    for (u, v) in [(a, b), (b, c), (c, a)] {
        let n = u.cross(v).normalize_or_zero();
        p += arc_length(u, v) * n;
    }
    p *= 0.5;

    // Make the result winding-independent: the centroid must point into the
    // same hemisphere as the vertices.
    if p.dot(a + b + c) < 0.0 {
        p = -p;
    }
    p / area
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn octant_triangle_area_and_centroid() {
        let (a, b, c) = (DVec3::X, DVec3::Y, DVec3::Z);
        let area = triangle_area(a, b, c);
        assert!((area - std::f64::consts::FRAC_PI_2).abs() < TOL);

        // By symmetry the octant centroid is (1/2, 1/2, 1/2): each edge is a
        // quarter arc and its great-circle normal is the opposite axis.
        let cm = triangle_centroid(a, b, c);
        assert!((cm - DVec3::splat(0.5)).length() < TOL);
        assert!(cm.length() < 1.0);
    }

    #[test]
    fn area_is_winding_independent() {
        let a = DVec3::new(0.2, 0.1, 1.0).normalize();
        let b = DVec3::new(0.3, 0.25, 1.0).normalize();
        let c = DVec3::new(0.12, 0.31, 1.0).normalize();
        assert!((triangle_area(a, b, c) - triangle_area(c, b, a)).abs() < TOL);
        let cm_fwd = triangle_centroid(a, b, c);
        let cm_rev = triangle_centroid(c, b, a);
        assert!((cm_fwd - cm_rev).length() < TOL);
    }

    #[test]
    fn quad_area_is_diagonal_split_invariant() {
        let v0 = DVec3::new(-0.1, -0.1, 1.0).normalize();
        let v1 = DVec3::new(0.15, -0.12, 1.0).normalize();
        let v2 = DVec3::new(0.13, 0.11, 1.0).normalize();
        let v3 = DVec3::new(-0.12, 0.14, 1.0).normalize();

        let split_02 = triangle_area(v0, v1, v2) + triangle_area(v2, v3, v0);
        let split_13 = triangle_area(v1, v2, v3) + triangle_area(v3, v0, v1);
        assert!((split_02 - split_13).abs() < 1e-13);
    }

    #[test]
    fn arc_length_bounds_and_clamping() {
        assert_eq!(arc_length(DVec3::X, DVec3::X), 0.0);
        assert!((arc_length(DVec3::X, -DVec3::X) - std::f64::consts::PI).abs() < TOL);
        assert!((arc_length(DVec3::X, DVec3::Y) - std::f64::consts::FRAC_PI_2).abs() < TOL);

        // A dot product that overshoots 1.0 must not yield NaN.
        let a = DVec3::new(1.0, 1e-9, 0.0).normalize();
        let len = arc_length(a, a);
        assert!(len.is_finite() && len >= 0.0);
    }

    #[test]
    fn degenerate_triangle_has_zero_moments() {
        let a = DVec3::X;
        assert_eq!(triangle_area(a, a, DVec3::Y), 0.0);
        assert_eq!(triangle_centroid(a, a, DVec3::Y), DVec3::ZERO);
    }
}
