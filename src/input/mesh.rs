use super::InputScalar;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM};
use crate::DecompositionError;

/// A validated triangle mesh, owned by the decomposition.
///
/// Every triangle index is smaller than the number of points, and every coordinate is
/// finite. The buffers are copied on construction so the caller can reuse its own
/// buffers right away.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct InputMesh {
    points: Vec<Point<Real>>,
    triangles: Vec<[u32; DIM]>,
}

impl InputMesh {
    /// Creates a mesh from its vertex and index buffers.
    pub fn new(
        points: Vec<Point<Real>>,
        triangles: Vec<[u32; DIM]>,
    ) -> Result<Self, DecompositionError> {
        if points.is_empty() {
            return Err(DecompositionError::invalid_input("the mesh has no point"));
        }

        if triangles.is_empty() {
            return Err(DecompositionError::invalid_input("the mesh has no triangle"));
        }

        if let Some(i) = points
            .iter()
            .position(|pt| pt.iter().any(|e| !e.is_finite()))
        {
            return Err(DecompositionError::invalid_input(format!(
                "point {} has a non-finite coordinate: {:?}",
                i, points[i]
            )));
        }

        let num_points = points.len();
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(idx) = tri.iter().find(|idx| **idx as usize >= num_points) {
                return Err(DecompositionError::invalid_input(format!(
                    "triangle {} references point {}, but the mesh only has {} points",
                    i, idx, num_points
                )));
            }
        }

        Ok(Self { points, triangles })
    }

    /// Creates a mesh from flat coordinate and index buffers.
    ///
    /// `points` must contain at least `3 * point_count` coordinates and `triangles` at
    /// least `3 * triangle_count` indices. Extra trailing values are ignored.
    pub fn from_flat<T: InputScalar>(
        points: &[T],
        point_count: u32,
        triangles: &[u32],
        triangle_count: u32,
    ) -> Result<Self, DecompositionError> {
        if point_count == 0 {
            return Err(DecompositionError::invalid_input("the mesh has no point"));
        }

        if triangle_count == 0 {
            return Err(DecompositionError::invalid_input("the mesh has no triangle"));
        }

        let num_coords = point_count as usize * DIM;
        if points.len() < num_coords {
            return Err(DecompositionError::invalid_input(format!(
                "the point buffer has {} coordinates, expected {} for {} points",
                points.len(),
                num_coords,
                point_count
            )));
        }

        let num_indices = triangle_count as usize * DIM;
        if triangles.len() < num_indices {
            return Err(DecompositionError::invalid_input(format!(
                "the triangle buffer has {} indices, expected {} for {} triangles",
                triangles.len(),
                num_indices,
                triangle_count
            )));
        }

        let points = points[..num_coords]
            .chunks_exact(DIM)
            .map(|c| Point::new(c[0].as_(), c[1].as_(), c[2].as_()))
            .collect();
        let triangles = triangles[..num_indices]
            .chunks_exact(DIM)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self::new(points, triangles)
    }

    /// The vertices of this mesh.
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The triangles of this mesh.
    pub fn triangles(&self) -> &[[u32; DIM]] {
        &self.triangles
    }

    /// The axis-aligned bounding box of this mesh.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
    }
}
