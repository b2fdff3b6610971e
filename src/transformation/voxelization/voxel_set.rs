// Rust port, with modifications, of https://github.com/kmammou/v-hacd/blob/master/src/VHACD_Lib/src/vhacdVolume.cpp
// By Khaled Mamou
//
// # License of the original C++ code:
// > Copyright (c) 2011 Khaled Mamou (kmamou at gmail dot com)
// > All rights reserved.
// >
// >
// > Redistribution and use in source and binary forms, with or without modification, are permitted provided that the following conditions are met:
// >
// > 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following disclaimer.
// >
// > 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the following disclaimer in the documentation and/or other materials provided with the distribution.
// >
// > 3. The names of the contributors may not be used to endorse or promote products derived from this software without specific prior written permission.
// >
// > THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use super::{FillMode, VoxelizedVolume};
use crate::bounding_volume::Aabb;
use crate::math::{Matrix, Point, Real, Vector, DIM};
use crate::transformation::vhacd::{CancellationFlag, CutPlane};
use crate::transformation::{try_convex_hull, ConvexHullError};
use crate::utils;
use crate::DecompositionError;
use std::sync::Arc;

type ConvexHullBuffers = (Vec<Point<Real>>, Vec<[u32; DIM]>);

/// A voxel.
#[derive(Copy, Clone, Debug)]
pub struct Voxel {
    /// The integer coordinates of the voxel as part of the voxel grid.
    pub coords: Point<u32>,
    /// Is this voxel on the surface of the volume (i.e. not inside of it)?
    pub is_on_surface: bool,
    /// Range of indices (to be looked up into the `VoxelSet` primitive map)
    /// of the primitives intersected by this voxel.
    pub(crate) intersections_range: (usize, usize),
}

impl Default for Voxel {
    fn default() -> Self {
        Self {
            coords: Point::origin(),
            is_on_surface: false,
            intersections_range: (0, 0),
        }
    }
}

/// A sparse set of voxels.
///
/// It only contains voxels that are considered as "full" after a voxelization.
#[derive(Clone, Debug)]
pub struct VoxelSet {
    /// The 3D origin of this voxel-set.
    pub origin: Point<Real>,
    /// The scale factor between the voxel integer coordinates and their
    /// actual float world-space coordinates.
    pub scale: Real,
    pub(crate) min_bb_voxels: Point<u32>,
    pub(crate) max_bb_voxels: Point<u32>,
    pub(crate) voxels: Vec<Voxel>,
    pub(crate) intersections: Arc<Vec<u32>>,
    pub(crate) primitive_classes: Arc<Vec<u32>>,
}

impl Default for VoxelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelSet {
    /// Creates a new empty set of voxels.
    pub fn new() -> Self {
        Self {
            origin: Point::origin(),
            min_bb_voxels: Point::origin(),
            max_bb_voxels: Vector::repeat(1).into(),
            scale: 1.0,
            voxels: Vec::new(),
            intersections: Arc::new(Vec::new()),
            primitive_classes: Arc::new(Vec::new()),
        }
    }

    // An empty set sharing the grid and the primitive maps of `self`.
    fn empty_sibling(&self, capacity: usize) -> Self {
        Self {
            origin: self.origin,
            scale: self.scale,
            min_bb_voxels: Point::origin(),
            max_bb_voxels: Vector::repeat(1).into(),
            voxels: Vec::with_capacity(capacity),
            intersections: self.intersections.clone(),
            primitive_classes: self.primitive_classes.clone(),
        }
    }

    /// The volume of a single voxel of this voxel set.
    pub fn voxel_volume(&self) -> Real {
        self.scale * self.scale * self.scale
    }

    /// Voxelizes the given shape described by its boundary triangle mesh.
    ///
    /// # Parameters
    /// * `points` - The vertex buffer of the boundary of the shape to voxelize.
    /// * `indices` - The index buffer of the boundary of the shape to voxelize.
    /// * `resolution` - Controls the number of subdivision done along each axis. This number
    ///   is the number of subdivisions along the axis where the input shape has the largest extent.
    ///   The other dimensions will have a different automatically-determined resolution (in order to
    ///   keep the voxels cubic).
    /// * `fill_mode` - Controls what is being voxelized.
    /// * `keep_voxel_to_primitives_map` - If set to `true` a map between the voxels
    ///   and the triangles it intersects will be computed.
    /// * `cancel` - Interrupts the voxelization with [`DecompositionError::Cancelled`].
    pub fn voxelize(
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
        resolution: u32,
        fill_mode: FillMode,
        keep_voxel_to_primitives_map: bool,
        cancel: &CancellationFlag,
    ) -> Result<Self, DecompositionError> {
        VoxelizedVolume::voxelize(
            points,
            indices,
            resolution,
            fill_mode,
            keep_voxel_to_primitives_map,
            cancel,
        )
        .map(Into::into)
    }

    /// The minimal coordinates of the integer bounding-box of the voxels in this set.
    pub fn min_bb_voxels(&self) -> Point<u32> {
        self.min_bb_voxels
    }

    /// The maximal coordinates of the integer bounding-box of the voxels in this set.
    pub fn max_bb_voxels(&self) -> Point<u32> {
        self.max_bb_voxels
    }

    /// Computes the total volume of the voxels contained by this set.
    pub fn compute_volume(&self) -> Real {
        self.voxel_volume() * self.voxels.len() as Real
    }

    fn get_voxel_point(&self, voxel: &Voxel) -> Point<Real> {
        self.get_point(na::convert(voxel.coords))
    }

    pub(crate) fn get_point(&self, voxel: Point<Real>) -> Point<Real> {
        self.origin + voxel.coords * self.scale
    }

    /// The number of voxels in this set.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Does this set contain no voxel at all?
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// The set of voxels.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// The number of voxels of this set lying on its boundary.
    pub fn num_voxels_on_surface(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_on_surface).count()
    }

    /// Update the bounding box of this voxel set.
    pub fn compute_bb(&mut self) {
        let Some(first) = self.voxels.first() else {
            return;
        };

        self.min_bb_voxels = first.coords;
        self.max_bb_voxels = first.coords;

        for voxel in &self.voxels {
            self.min_bb_voxels = self.min_bb_voxels.inf(&voxel.coords);
            self.max_bb_voxels = self.max_bb_voxels.sup(&voxel.coords);
        }
    }

    /// The world-space AABB of the given voxel.
    pub fn voxel_aabb(&self, voxel: &Voxel) -> Aabb {
        Aabb::from_half_extents(
            self.get_voxel_point(voxel),
            Vector::repeat(self.scale / 2.0),
        )
    }

    /// The world-space average of the centers of the voxels of this set.
    pub fn centroid(&self) -> Point<Real> {
        if self.voxels.is_empty() {
            return self.origin;
        }

        let centers: Vec<_> = self.voxels.iter().map(|v| self.get_voxel_point(v)).collect();
        utils::center(&centers)
    }

    /// The vertices of the surface voxels of this set, without duplicates.
    ///
    /// # Parameters
    /// * `sampling` - Only one every `sampling` surface voxels is considered.
    ///   Use `1` to make sure no voxel is being ignored.
    pub fn surface_points(&self, sampling: u32) -> Vec<Point<Real>> {
        let mut points = Vec::new();

        for voxel in self
            .voxels
            .iter()
            .filter(|v| v.is_on_surface)
            .step_by(sampling.max(1) as usize)
        {
            self.map_voxel_points(voxel, |p| points.push(p));
        }

        utils::dedup_points(&mut points);
        points
    }

    /// Compute the convex-hull of the voxels in this set.
    ///
    /// # Parameters
    /// * `sampling` - The convex-hull computation will ignore `sampling` voxels at
    ///   regular intervals. Useful to save some computation times if an exact result isn't need.
    ///   Use `1` to make sure no voxel is being ignored.
    pub fn compute_convex_hull(&self, sampling: u32) -> Result<ConvexHullBuffers, ConvexHullError> {
        try_convex_hull(&self.surface_points(sampling))
    }

    /// Compute the convex-hull of this voxel set after cutting each voxel
    /// by the triangles it intersects.
    ///
    /// Triangles classified as belonging to this part only (see
    /// [`VoxelSet::set_primitive_classes`]) are added whole instead of being clipped.
    /// Surface voxels that do not intersect any triangle contribute their corners.
    pub fn compute_exact_convex_hull(
        &self,
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
    ) -> Result<ConvexHullBuffers, ConvexHullError> {
        let mut surface_points = Vec::new();
        let (mut polygon, mut workspace) = (Vec::new(), Vec::new());
        let mut pushed_points = vec![false; points.len()];

        // Grab all the points.
        for voxel in self.voxels.iter().filter(|v| v.is_on_surface) {
            let intersections =
                &self.intersections[voxel.intersections_range.0..voxel.intersections_range.1];
            for prim_id in intersections {
                let [ia, ib, ic] = indices[*prim_id as usize].map(|i| i as usize);

                // A class equal to `u32::MAX` means that the triangle intersects multiple parts,
                // and a missing class means that no classification was computed. In both cases
                // the triangle has to be clipped by the voxel.
                let prim_class = self.primitive_classes.get(*prim_id as usize).copied();
                if prim_class == Some(u32::MAX) || prim_class.is_none() {
                    let aabb = self.voxel_aabb(voxel);
                    polygon.clear();
                    polygon.extend_from_slice(&[points[ia], points[ib], points[ic]]);
                    aabb.clip_polygon_with_workspace(&mut polygon, &mut workspace);
                    surface_points.append(&mut polygon);
                } else {
                    // The triangle is only contained by this part, so we don't need to cut
                    // it. It may intersect multiple voxels of this part so we only push
                    // vertices we have not pushed so far.
                    for i in [ia, ib, ic] {
                        if !pushed_points[i] {
                            surface_points.push(points[i]);
                            pushed_points[i] = true;
                        }
                    }
                }
            }

            if intersections.is_empty() {
                self.map_voxel_points(voxel, |p| surface_points.push(p));
            }
        }

        utils::dedup_points(&mut surface_points);
        try_convex_hull(&surface_points)
    }

    /// Gets the vertices of the given voxel.
    fn map_voxel_points(&self, voxel: &Voxel, mut f: impl FnMut(Point<Real>)) {
        let ijk = voxel.coords.coords.map(|e| e as Real);

        let shifts = [
            Vector::new(-0.5, -0.5, -0.5),
            Vector::new(0.5, -0.5, -0.5),
            Vector::new(0.5, 0.5, -0.5),
            Vector::new(-0.5, 0.5, -0.5),
            Vector::new(-0.5, -0.5, 0.5),
            Vector::new(0.5, -0.5, 0.5),
            Vector::new(0.5, 0.5, 0.5),
            Vector::new(-0.5, 0.5, 0.5),
        ];

        for shift in &shifts {
            f(self.origin + (ijk + *shift) * self.scale)
        }
    }

    // Signed distance between the voxel center and the plane, computed on the grid.
    fn signed_distance(&self, plane: &CutPlane, voxel: &Voxel) -> Real {
        (voxel.coords[plane.axis] as Real - plane.index as Real - 0.5) * self.scale
    }

    /// Collects the vertices of the voxels of this set on each side of the plane.
    ///
    /// All the voxels adjacent to the plane are taken, while only one every `sampling`
    /// voxels is taken elsewhere.
    pub(crate) fn intersect(
        &self,
        plane: &CutPlane,
        positive_pts: &mut Vec<Point<Real>>,
        negative_pts: &mut Vec<Point<Real>>,
        sampling: u32,
    ) {
        let d0 = self.scale;
        let mut sp = 0;
        let mut sn = 0;

        for voxel in &self.voxels {
            let d = self.signed_distance(plane, voxel);

            if d >= 0.0 {
                if d <= d0 {
                    self.map_voxel_points(voxel, |p| positive_pts.push(p));
                } else {
                    sp += 1;

                    if sp == sampling {
                        self.map_voxel_points(voxel, |p| positive_pts.push(p));
                        sp = 0;
                    }
                }
            } else if -d <= d0 {
                self.map_voxel_points(voxel, |p| negative_pts.push(p));
            } else {
                sn += 1;

                if sn == sampling {
                    self.map_voxel_points(voxel, |p| negative_pts.push(p));
                    sn = 0;
                }
            }
        }
    }

    /// Returns (negative_volume, positive_volume).
    pub(crate) fn compute_clipped_volumes(&self, plane: &CutPlane) -> (Real, Real) {
        if self.voxels.is_empty() {
            return (0.0, 0.0);
        }

        let num_positive_voxels = self
            .voxels
            .iter()
            .filter(|v| self.signed_distance(plane, v) >= 0.0)
            .count();

        let num_negative_voxels = self.voxels.len() - num_positive_voxels;
        let positive_volume = self.voxel_volume() * (num_positive_voxels as Real);
        let negative_volume = self.voxel_volume() * (num_negative_voxels as Real);

        (negative_volume, positive_volume)
    }

    /// A voxel set containing only the voxel on surface contained by `self`.
    pub(crate) fn select_on_surface(&self) -> VoxelSet {
        let mut on_surf = self.empty_sibling(0);
        on_surf
            .voxels
            .extend(self.voxels.iter().filter(|v| v.is_on_surface).copied());
        on_surf.compute_bb();
        on_surf
    }

    /// Splits this voxel set into two parts, depending on where the voxel center lies wrt.
    /// the given plane.
    ///
    /// Returns the (negative, positive) parts. Voxels adjacent to the plane become surface
    /// voxels of their part.
    pub(crate) fn clip(&self, plane: &CutPlane) -> (VoxelSet, VoxelSet) {
        let num_voxels = self.voxels.len();
        let mut negative_part = self.empty_sibling(num_voxels);
        let mut positive_part = self.empty_sibling(num_voxels);
        let d0 = self.scale;

        for voxel in &self.voxels {
            let mut voxel = *voxel;
            let d = self.signed_distance(plane, &voxel);

            if d.abs() <= d0 {
                voxel.is_on_surface = true;
            }

            if d >= 0.0 {
                positive_part.voxels.push(voxel);
            } else {
                negative_part.voxels.push(voxel);
            }
        }

        negative_part.compute_bb();
        positive_part.compute_bb();
        (negative_part, positive_part)
    }

    /// Sets the part index of every triangle of the voxelized mesh, shared by all the parts
    /// of a decomposition. `u32::MAX` marks triangles crossing several parts.
    pub(crate) fn set_primitive_classes(&mut self, classes: Arc<Vec<u32>>) {
        self.primitive_classes = classes;
    }

    /// The triangles intersected by the surface voxels of this set.
    pub(crate) fn intersected_primitives(&self) -> impl Iterator<Item = u32> + '_ {
        self.voxels
            .iter()
            .filter(|v| v.is_on_surface)
            .flat_map(move |v| {
                self.intersections[v.intersections_range.0..v.intersections_range.1]
                    .iter()
                    .copied()
            })
    }

    /// The eigenvalues of the covariance matrix of the voxel coordinates.
    pub(crate) fn compute_principal_axes(&self) -> Vector<Real> {
        let num_voxels = self.voxels.len();
        if num_voxels == 0 {
            return Vector::zeros();
        }

        let mut center = Point::origin();
        let denom = 1.0 / (num_voxels as Real);

        for voxel in &self.voxels {
            center += voxel.coords.map(|e| e as Real).coords * denom;
        }

        let mut cov_mat = Matrix::zeros();
        for voxel in &self.voxels {
            let xyz = voxel.coords.map(|e| e as Real) - center;
            cov_mat.syger(denom, &xyz, &xyz, 1.0);
        }

        cov_mat.symmetric_eigenvalues()
    }
}

#[cfg(test)]
mod test {
    use super::VoxelSet;
    use crate::math::Point;
    use crate::transformation::vhacd::{CancellationFlag, CutPlane};
    use crate::transformation::voxelization::FillMode;
    use std::sync::Arc;

    fn box_mesh(extents: [f64; 3]) -> (Vec<Point<f64>>, Vec<[u32; 3]>) {
        let points = (0..8)
            .map(|i| {
                Point::new(
                    (i & 1) as f64 * extents[0],
                    ((i >> 1) & 1) as f64 * extents[1],
                    ((i >> 2) & 1) as f64 * extents[2],
                )
            })
            .collect();
        let indices = vec![
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
            [0, 1, 4],
            [1, 5, 4],
            [2, 6, 3],
            [3, 6, 7],
            [0, 4, 2],
            [2, 4, 6],
            [1, 3, 5],
            [3, 7, 5],
        ];
        (points, indices)
    }

    #[test]
    fn clip_partitions_voxels() {
        let (points, indices) = box_mesh([2.0, 1.0, 1.0]);
        let vset = VoxelSet::voxelize(
            &points,
            &indices,
            20,
            FillMode::FloodFill,
            false,
            &CancellationFlag::new(),
        )
        .unwrap();
        let plane = CutPlane::new(&vset, 0, 9);
        let (negative, positive) = vset.clip(&plane);

        assert_eq!(negative.len() + positive.len(), vset.len());
        assert_eq!(negative.max_bb_voxels().x, 9);
        assert_eq!(positive.min_bb_voxels().x, 10);
        assert!(negative
            .voxels()
            .iter()
            .filter(|v| v.coords.x == 9)
            .all(|v| v.is_on_surface));

        let (vn, vp) = vset.compute_clipped_volumes(&plane);
        assert_relative_eq!(vn, negative.compute_volume());
        assert_relative_eq!(vp, positive.compute_volume());
    }

    #[test]
    fn box_voxel_hull_volume() {
        let (points, indices) = box_mesh([1.0, 1.0, 1.0]);
        let vset = VoxelSet::voxelize(
            &points,
            &indices,
            10,
            FillMode::FloodFill,
            false,
            &CancellationFlag::new(),
        )
        .unwrap();
        let (vertices, triangles) = vset.compute_convex_hull(1).unwrap();
        let volume = crate::shape::ConvexHull::from_parts_unchecked(vertices, triangles).volume();

        // The voxels overflow the box by half a voxel on each side.
        let side = 10.0 * vset.scale;
        assert_relative_eq!(volume, side * side * side, epsilon = 1.0e-9);
        assert_relative_eq!(vset.compute_volume(), volume, epsilon = 1.0e-9);
    }

    #[test]
    fn box_exact_hull_keeps_single_part_triangles_whole() {
        let (points, indices) = box_mesh([1.0, 2.0, 3.0]);
        let mut vset = VoxelSet::voxelize(
            &points,
            &indices,
            12,
            FillMode::FloodFill,
            true,
            &CancellationFlag::new(),
        )
        .unwrap();
        vset.set_primitive_classes(Arc::new(vec![0; indices.len()]));
        let (vertices, triangles) = vset.compute_exact_convex_hull(&points, &indices).unwrap();

        assert_eq!(vertices.len(), 8);
        assert_eq!(triangles.len(), 12);
        for pt in &vertices {
            assert!(points.contains(pt));
        }
    }

    #[test]
    fn box_exact_hull_with_clipped_triangles() {
        let (points, indices) = box_mesh([1.0, 2.0, 3.0]);
        let vset = VoxelSet::voxelize(
            &points,
            &indices,
            12,
            FillMode::FloodFill,
            true,
            &CancellationFlag::new(),
        )
        .unwrap();
        assert!(vset.intersected_primitives().next().is_some());

        let (vertices, triangles) = vset.compute_exact_convex_hull(&points, &indices).unwrap();
        let volume = crate::shape::ConvexHull::from_parts_unchecked(vertices.clone(), triangles).volume();

        assert_relative_eq!(volume, 6.0, epsilon = 1.0e-6);
        for pt in &vertices {
            assert!(pt.iter().all(|e| *e >= -1.0e-9));
            assert!(pt.x <= 1.0 + 1.0e-9 && pt.y <= 2.0 + 1.0e-9 && pt.z <= 3.0 + 1.0e-9);
        }
    }
}
