use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector, DIM};
use crate::shape::Triangle;

/// Tests if a triangle intersects an AABB.
///
/// This is a separating-axis test on the three box normals, the triangle normal, and the
/// nine cross products between box axes and triangle edges. Shapes that only touch are
/// reported as intersecting.
pub fn intersection_test_aabb_triangle(aabb: &Aabb, triangle: &Triangle) -> bool {
    let center = aabb.center();
    let half_extents = aabb.half_extents();

    let v0 = triangle.a - center;
    let v1 = triangle.b - center;
    let v2 = triangle.c - center;
    let edges = [v1 - v0, v2 - v1, v0 - v2];

    let separated_along = |axis: &Vector<Real>| {
        let p0 = v0.dot(axis);
        let p1 = v1.dot(axis);
        let p2 = v2.dot(axis);
        let radius = half_extents.dot(&axis.abs());
        let min = p0.min(p1).min(p2);
        let max = p0.max(p1).max(p2);
        min > radius || max < -radius
    };

    for edge in &edges {
        for i in 0..DIM {
            let axis = Vector::ith(i, 1.0).cross(edge);
            if separated_along(&axis) {
                return false;
            }
        }
    }

    for i in 0..DIM {
        let min = v0[i].min(v1[i]).min(v2[i]);
        let max = v0[i].max(v1[i]).max(v2[i]);
        if min > half_extents[i] || max < -half_extents[i] {
            return false;
        }
    }

    let normal = edges[0].cross(&edges[1]);
    !separated_along(&normal)
}

#[cfg(test)]
mod test {
    use super::intersection_test_aabb_triangle;
    use crate::bounding_volume::Aabb;
    use crate::math::Point;
    use crate::shape::Triangle;

    fn unit_box() -> Aabb {
        Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn triangle_crossing_the_box() {
        let tri = Triangle::new(
            Point::new(-1.0, 0.5, -1.0),
            Point::new(2.0, 0.5, -1.0),
            Point::new(0.5, 0.5, 2.0),
        );
        assert!(intersection_test_aabb_triangle(&unit_box(), &tri));
    }

    #[test]
    fn triangle_touching_a_face() {
        let tri = Triangle::new(
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, 0.0, 1.0),
        );
        assert!(intersection_test_aabb_triangle(&unit_box(), &tri));
    }

    #[test]
    fn triangle_separated_by_its_own_plane() {
        let tri = Triangle::new(
            Point::new(3.0, 1.0, 1.0),
            Point::new(1.0, 3.0, 1.0),
            Point::new(1.0, 1.0, 3.0),
        );
        assert!(!intersection_test_aabb_triangle(&unit_box(), &tri));
    }

    #[test]
    fn triangle_next_to_a_box_edge() {
        let tri = Triangle::new(
            Point::new(1.6, 0.9, -1.0),
            Point::new(0.9, 1.6, -1.0),
            Point::new(1.25, 1.25, 2.0),
        );
        assert!(!intersection_test_aabb_triangle(&unit_box(), &tri));
    }
}
