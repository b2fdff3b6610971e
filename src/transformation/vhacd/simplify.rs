use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::ConvexHull;
use crate::transformation::{try_convex_hull, ConvexHullError};
use crate::utils;
use crate::DecompositionError;
use arrayvec::ArrayVec;

/// Reduces the number of vertices of `hull` to at most `max_vertices`.
///
/// A tetrahedron spanning the hull is selected first. Then the vertex farthest outside of
/// the convex hull of the selected vertices is added, until `max_vertices` is reached or
/// every vertex lies inside of that hull.
pub(crate) fn simplify_convex_hull(
    hull: ConvexHull,
    max_vertices: u32,
) -> Result<ConvexHull, DecompositionError> {
    let max_vertices = max_vertices.max(4) as usize;

    if hull.num_points() <= max_vertices {
        return Ok(hull);
    }

    let points = hull.points();
    let mut selected = vec![false; points.len()];
    let seed = initial_tetrahedron(points)?;
    let mut subset: Vec<Point<Real>> = seed.iter().map(|i| points[*i]).collect();
    for i in seed {
        selected[i] = true;
    }

    let eps = DEFAULT_EPSILON.sqrt() * hull.aabb().max_extent();
    let (mut vertices, mut triangles) = try_convex_hull(&subset)?;

    while subset.len() < max_vertices {
        let center = utils::center(&vertices);
        let normals: Vec<_> = triangles
            .iter()
            .filter_map(|tri| outward_face_normal(&vertices, tri, &center))
            .collect();

        let mut farthest = None;
        let mut farthest_dist = eps;

        for (i, pt) in points.iter().enumerate() {
            if selected[i] {
                continue;
            }

            let dist = normals
                .iter()
                .map(|(origin, normal)| (pt - origin).dot(normal))
                .fold(Real::MIN, Real::max);

            if dist > farthest_dist {
                farthest = Some(i);
                farthest_dist = dist;
            }
        }

        let Some(i) = farthest else {
            break;
        };

        selected[i] = true;
        subset.push(points[i]);
        (vertices, triangles) = try_convex_hull(&subset)?;
    }

    Ok(ConvexHull::from_parts_unchecked(vertices, triangles))
}

// A point of the face, and its unit normal pointing away from `center`.
fn outward_face_normal(
    vertices: &[Point<Real>],
    tri: &[u32; 3],
    center: &Point<Real>,
) -> Option<(Point<Real>, Vector<Real>)> {
    let [a, b, c] = tri.map(|i| vertices[i as usize]);
    let normal = (b - a).cross(&(c - a)).try_normalize(DEFAULT_EPSILON)?;

    if normal.dot(&(a - center)) < 0.0 {
        Some((a, -normal))
    } else {
        Some((a, normal))
    }
}

fn farthest_point(points: &[Point<Real>], dist: impl Fn(&Point<Real>) -> Real) -> (usize, Real) {
    let mut best = (0, Real::MIN);

    for (i, pt) in points.iter().enumerate() {
        let d = dist(pt);
        if d > best.1 {
            best = (i, d);
        }
    }

    best
}

fn initial_tetrahedron(points: &[Point<Real>]) -> Result<ArrayVec<usize, 4>, ConvexHullError> {
    let mut seed = ArrayVec::new();

    let p0 = utils::point_cloud_support_point_id(&Vector::x(), points);
    seed.push(p0);

    let (p1, d1) = farthest_point(points, |pt| (pt - points[p0]).norm_squared());
    if d1 <= 0.0 {
        return Err(ConvexHullError::Degenerate(0));
    }
    seed.push(p1);

    let dir = (points[p1] - points[p0]).normalize();
    let (p2, d2) = farthest_point(points, |pt| {
        let dpt = pt - points[p0];
        (dpt - dir * dpt.dot(&dir)).norm_squared()
    });
    if d2 <= 0.0 {
        return Err(ConvexHullError::Degenerate(1));
    }
    seed.push(p2);

    let normal = (points[p1] - points[p0])
        .cross(&(points[p2] - points[p0]))
        .try_normalize(0.0)
        .ok_or(ConvexHullError::Degenerate(1))?;
    let (p3, d3) = farthest_point(points, |pt| (pt - points[p0]).dot(&normal).abs());
    if d3 <= 0.0 {
        return Err(ConvexHullError::Degenerate(2));
    }
    seed.push(p3);

    Ok(seed)
}

#[cfg(test)]
mod test {
    use super::simplify_convex_hull;
    use crate::math::{Point, Real};
    use crate::shape::ConvexHull;

    fn sphere_points(n: usize) -> Vec<Point<Real>> {
        // Fibonacci sphere.
        let golden_angle = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
        (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as Real + 0.5) / n as Real;
                let r = (1.0 - y * y).sqrt();
                let theta = golden_angle * i as Real;
                Point::new(r * theta.cos(), y, r * theta.sin())
            })
            .collect()
    }

    #[test]
    fn small_hulls_are_unchanged() {
        let hull = ConvexHull::from_points(&sphere_points(20)).unwrap();
        let simplified = simplify_convex_hull(hull.clone(), 64).unwrap();
        assert_eq!(simplified, hull);
    }

    #[test]
    fn vertex_cap_is_respected() {
        let points = sphere_points(300);
        let hull = ConvexHull::from_points(&points).unwrap();
        assert_eq!(hull.num_points(), 300);

        for cap in [4, 5, 16, 64] {
            let simplified = simplify_convex_hull(hull.clone(), cap).unwrap();
            assert_eq!(simplified.num_points(), cap as usize);
            assert!(simplified.volume() <= hull.volume() + 1.0e-9);
            assert!(simplified.volume() > 0.0);

            for pt in simplified.points() {
                assert!(points.contains(pt));
            }
        }

        let simplified = simplify_convex_hull(hull.clone(), 64).unwrap();
        assert!(simplified.volume() > 0.8 * hull.volume());
    }
}
