use crate::math::{Point, Real, Vector, DIM};
use crate::shape::Triangle;

/// Casts axis-aligned rays against a triangle soup expressed in voxel-grid coordinates.
///
/// Rays always start at voxel centers, i.e., at integer grid coordinates. So, for each axis,
/// triangles are bucketed by the grid column their projection along that axis covers.
pub(super) struct RaycastGrid<'a> {
    triangles: &'a [Triangle],
    resolution: [u32; DIM],
    columns: [Vec<Vec<u32>>; DIM],
}

impl<'a> RaycastGrid<'a> {
    pub fn new(triangles: &'a [Triangle], resolution: [u32; DIM]) -> Self {
        let mut columns: [Vec<Vec<u32>>; DIM] = Default::default();

        for (axis, buckets) in columns.iter_mut().enumerate() {
            let (u, v) = Self::column_axes(axis);
            buckets.resize((resolution[u] * resolution[v]) as usize, Vec::new());

            for (tri_id, tri) in triangles.iter().enumerate() {
                let Some((u0, u1)) = Self::covered_range(tri, u, resolution[u]) else {
                    continue;
                };
                let Some((v0, v1)) = Self::covered_range(tri, v, resolution[v]) else {
                    continue;
                };

                for cv in v0..=v1 {
                    for cu in u0..=u1 {
                        buckets[(cu + cv * resolution[u]) as usize].push(tri_id as u32);
                    }
                }
            }
        }

        Self {
            triangles,
            resolution,
            columns,
        }
    }

    fn column_axes(axis: usize) -> (usize, usize) {
        ((axis + 1) % DIM, (axis + 2) % DIM)
    }

    // The integer coordinates along `axis` covered by the projection of `tri`.
    fn covered_range(tri: &Triangle, axis: usize, resolution: u32) -> Option<(u32, u32)> {
        let min = tri.a[axis].min(tri.b[axis]).min(tri.c[axis]).ceil();
        let max = tri.a[axis].max(tri.b[axis]).max(tri.c[axis]).floor();

        if max < 0.0 || min > max || resolution == 0 {
            return None;
        }

        let min = min.max(0.0) as u32;
        let max = (max as u32).min(resolution - 1);
        (min <= max).then_some((min, max))
    }

    /// Casts a ray from the center of the voxel `ijk` along the positive or negative `axis`.
    ///
    /// Returns `None` if nothing is hit. Otherwise returns `true` if the closest hit is on a
    /// back face (the ray leaves the mesh) and `false` if it is on a front face.
    pub fn trace(&self, ijk: [u32; DIM], axis: usize, positive: bool) -> Option<bool> {
        let (u, v) = Self::column_axes(axis);
        let column = &self.columns[axis][(ijk[u] + ijk[v] * self.resolution[u]) as usize];
        let origin = Point::new(ijk[0] as Real, ijk[1] as Real, ijk[2] as Real);
        let sign = if positive { 1.0 } else { -1.0 };
        let dir = Vector::ith(axis, sign);

        let mut closest: Option<(Real, bool)> = None;

        for tri_id in column {
            let tri = &self.triangles[*tri_id as usize];

            if let Some(toi) = ray_toi_with_triangle(&origin, &dir, tri) {
                if closest.map(|(best, _)| toi < best).unwrap_or(true) {
                    let back_face = dir.dot(&tri.scaled_normal()) > 0.0;
                    closest = Some((toi, back_face));
                }
            }
        }

        closest.map(|(_, back_face)| back_face)
    }
}

// Möller–Trumbore ray/triangle intersection. Hits on the triangle boundary are reported.
fn ray_toi_with_triangle(origin: &Point<Real>, dir: &Vector<Real>, tri: &Triangle) -> Option<Real> {
    let e1 = tri.b - tri.a;
    let e2 = tri.c - tri.a;
    let p = dir.cross(&e2);
    let det = e1.dot(&p);

    if det.abs() < Real::EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - tri.a;
    let u = s.dot(&p) * inv_det;

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&e1);
    let v = dir.dot(&q) * inv_det;

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let toi = e2.dot(&q) * inv_det;
    (toi > 0.0).then_some(toi)
}

#[cfg(test)]
mod test {
    use super::RaycastGrid;
    use crate::math::Point;
    use crate::shape::Triangle;

    #[test]
    fn front_and_back_face_hits() {
        // A single triangle in the plane x = 2 facing +x.
        let tris = [Triangle::new(
            Point::new(2.0, -1.0, -1.0),
            Point::new(2.0, 5.0, -1.0),
            Point::new(2.0, -1.0, 5.0),
        )];
        let grid = RaycastGrid::new(&tris, [4, 4, 4]);

        assert_eq!(grid.trace([0, 1, 1], 0, true), Some(true));
        assert_eq!(grid.trace([3, 1, 1], 0, false), Some(false));
        assert_eq!(grid.trace([3, 1, 1], 0, true), None);
        assert_eq!(grid.trace([0, 1, 1], 1, true), None);
    }
}
