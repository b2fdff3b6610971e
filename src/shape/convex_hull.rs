use crate::bounding_volume::Aabb;
use crate::interface::FlatHull;
use crate::math::{Point, Real};
use crate::shape::Tetrahedron;
use crate::transformation::{try_convex_hull, ConvexHullError};
use crate::utils;

/// A convex polyhedron produced by the decomposition.
///
/// It is described by its vertex buffer and an index buffer of outward-oriented triangles.
/// Cloning a `ConvexHull` performs a deep copy: the clone shares no memory with the original.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    points: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
}

impl ConvexHull {
    /// Computes the convex hull of the given set of points.
    pub fn from_points(points: &[Point<Real>]) -> Result<Self, ConvexHullError> {
        let (points, indices) = try_convex_hull(points)?;
        Ok(Self { points, indices })
    }

    /// Wraps an already-convex mesh without checking its convexity.
    pub(crate) fn from_parts_unchecked(points: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Self {
        Self { points, indices }
    }

    /// The vertices of this convex hull.
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The triangles of this convex hull.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The number of vertices of this convex hull.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// The number of triangles of this convex hull.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Consumes `self`, returning its vertex and index buffers.
    pub fn into_parts(self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        (self.points, self.indices)
    }

    /// The average of the vertices of this convex hull.
    pub fn center(&self) -> Point<Real> {
        if self.points.is_empty() {
            Point::origin()
        } else {
            utils::center(&self.points)
        }
    }

    /// The axis-aligned bounding box of this convex hull.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
    }

    /// Computes the volume of this convex hull.
    pub fn volume(&self) -> Real {
        convex_mesh_volume(&self.points, &self.indices)
    }

    /// Copies this convex hull into flat vertex and index buffers.
    pub fn to_flat(&self) -> FlatHull {
        FlatHull::from(self)
    }
}

/// Computes the volume of a convex triangle mesh.
pub(crate) fn convex_mesh_volume(points: &[Point<Real>], indices: &[[u32; 3]]) -> Real {
    if points.is_empty() || indices.is_empty() {
        return 0.0;
    }

    let barycenter = utils::center(points);
    let mut total_volume = 0.0;

    for tri in indices {
        let a = points[tri[0] as usize];
        let b = points[tri[1] as usize];
        let c = points[tri[2] as usize];
        total_volume += Tetrahedron::new(a, b, c, barycenter).volume();
    }

    total_volume
}
