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

use super::raycast::RaycastGrid;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DIM};
use crate::shape::Triangle;
use crate::transformation::vhacd::CancellationFlag;
use crate::transformation::voxelization::{Voxel, VoxelSet};
use crate::DecompositionError;
use std::sync::Arc;

/// Controls how the voxelization determines which voxel needs
/// to be considered empty, and which ones will be considered full.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Only consider full the voxels intersecting the surface of the
    /// shape being voxelized.
    SurfaceOnly,
    /// Use a flood-fill technique to consider fill the voxels intersecting
    /// the surface of the shape being voxelized, as well as all the voxels
    /// bounded of them.
    #[default]
    FloodFill,
    /// Shoot six axis-aligned rays from each voxel. A voxel is full if none of
    /// the rays hit a front face first, and at least three of them hit a back face.
    RaycastFill,
}

/// The values of a voxel of a dense voxelized volume.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoxelValue {
    /// Voxel that has not been classified yet.
    PrimitiveUndefined,
    /// Voxel outside of the shape that still needs to be flood-filled from.
    PrimitiveOutsideSurfaceToWalk,
    /// Voxel outside of the shape.
    PrimitiveOutsideSurface,
    /// Voxel fully inside of the shape.
    PrimitiveInsideSurface,
    /// Voxel intersecting the boundary of the shape.
    PrimitiveOnSurface,
}

/// A dense voxel grid covering the bounding box of a triangle mesh.
///
/// The voxel `(i, j, k)` is centered at `origin + (i, j, k) * scale`, so the mesh bounding
/// box goes from the center of the first voxel to the center of the last voxel along its
/// longest axis.
pub struct VoxelizedVolume {
    origin: Point<Real>,
    scale: Real,
    resolution: [u32; DIM],
    num_voxels_on_surface: u32,
    num_voxels_inside_surface: u32,
    num_voxels_outside_surface: u32,
    data: Vec<VoxelValue>,
    // (linear voxel index, triangle index) for each voxel/triangle intersection.
    primitive_intersections: Vec<(u32, u32)>,
}

impl VoxelizedVolume {
    /// Voxelizes the given triangle mesh.
    ///
    /// # Parameters
    /// * `points` - The vertex buffer of the boundary of the shape to voxelize.
    /// * `indices` - The index buffer of the boundary of the shape to voxelize.
    /// * `resolution` - The number of voxels along the axis where the input shape has the
    ///   largest extent. The other dimensions get an automatically-determined resolution
    ///   in order to keep the voxels cubic.
    /// * `fill_mode` - Controls what is being voxelized.
    /// * `keep_voxel_to_primitives_map` - If set to `true` a map between the voxels
    ///   and the triangles they intersect will be computed.
    /// * `cancel` - Polled once per triangle and once per grid slice while filling.
    pub fn voxelize(
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
        resolution: u32,
        fill_mode: FillMode,
        keep_voxel_to_primitives_map: bool,
        cancel: &CancellationFlag,
    ) -> Result<Self, DecompositionError> {
        let mut result = VoxelizedVolume {
            resolution: [0; DIM],
            origin: Point::origin(),
            num_voxels_on_surface: 0,
            num_voxels_inside_surface: 0,
            num_voxels_outside_surface: 0,
            scale: 1.0,
            data: Vec::new(),
            primitive_intersections: Vec::new(),
        };

        if points.is_empty() || resolution < 2 {
            return Ok(result);
        }

        let aabb = Aabb::from_points(points.iter().copied());
        result.origin = aabb.mins;

        let d = aabb.extents();

        // The grid's longest axis is the axis with the largest extent. Ties go to the
        // last tied axis, so a cube is resolved along z.
        let mut longest = 0;
        for axis in 1..DIM {
            if d[axis] >= d[longest] {
                longest = axis;
            }
        }

        let r = d[longest];
        for axis in 0..DIM {
            result.resolution[axis] = if axis == longest {
                resolution
            } else {
                2 + (resolution as Real * d[axis] / r) as u32
            };
        }

        if r <= 0.0 || !r.is_finite() {
            result.resolution = [0; DIM];
            return Ok(result);
        }

        result.scale = r / (resolution as Real - 1.0);
        let inv_scale = (resolution as Real - 1.0) / r;
        result.allocate();

        // The triangles, expressed in the grid's integer coordinate system.
        let grid_triangles: Vec<Triangle> = indices
            .iter()
            .map(|tri| {
                Triangle::new(
                    (points[tri[0] as usize] - result.origin.coords) * inv_scale,
                    (points[tri[1] as usize] - result.origin.coords) * inv_scale,
                    (points[tri[2] as usize] - result.origin.coords) * inv_scale,
                )
            })
            .collect();

        let box_half_size = Vector::repeat(0.5);
        let max_ijk: Vector<u32> = Vector::from(result.resolution).map(|e| e - 1);

        for (tri_id, triangle) in grid_triangles.iter().enumerate() {
            cancel.check()?;

            // Find the range of voxels potentially intersecting the triangle.
            let mut ijk0 = max_ijk;
            let mut ijk1: Vector<u32> = Vector::zeros();

            for pt in triangle.vertices() {
                let ijk = pt.coords.map(|e| (e + 0.5).max(0.0) as u32).inf(&max_ijk);
                ijk0 = ijk0.inf(&ijk);
                ijk1 = ijk1.sup(&ijk);
            }

            ijk0.apply(|e| *e = e.saturating_sub(1));
            ijk1 = ijk1.map(|e| e + 1).inf(&max_ijk);

            // Determine exactly what voxel intersect the triangle.
            for i in ijk0.x..=ijk1.x {
                for j in ijk0.y..=ijk1.y {
                    for k in ijk0.z..=ijk1.z {
                        let idx = result.voxel_index(i, j, k);
                        let value = &mut result.data[idx as usize];

                        if *value != VoxelValue::PrimitiveUndefined && !keep_voxel_to_primitives_map
                        {
                            continue;
                        }

                        let aabb = Aabb::from_half_extents(
                            Point::new(i as Real, j as Real, k as Real),
                            box_half_size,
                        );

                        if aabb.intersects_triangle(triangle) {
                            if *value == VoxelValue::PrimitiveUndefined {
                                *value = VoxelValue::PrimitiveOnSurface;
                                result.num_voxels_on_surface += 1;
                            }

                            if keep_voxel_to_primitives_map {
                                result.primitive_intersections.push((idx, tri_id as u32));
                            }
                        }
                    }
                }
            }
        }

        match fill_mode {
            FillMode::SurfaceOnly => {
                for value in &mut result.data {
                    if *value != VoxelValue::PrimitiveOnSurface {
                        *value = VoxelValue::PrimitiveOutsideSurface;
                        result.num_voxels_outside_surface += 1;
                    }
                }
            }
            FillMode::FloodFill => {
                let [ri, rj, rk] = result.resolution;
                result.mark_outside_surface(0, 0, 0, ri, rj, 1);
                result.mark_outside_surface(0, 0, rk - 1, ri, rj, rk);
                result.mark_outside_surface(0, 0, 0, ri, 1, rk);
                result.mark_outside_surface(0, rj - 1, 0, ri, rj, rk);
                result.mark_outside_surface(0, 0, 0, 1, rj, rk);
                result.mark_outside_surface(ri - 1, 0, 0, ri, rj, rk);
                result.fill_outside_surface(cancel)?;
                result.fill_inside_surface();
            }
            FillMode::RaycastFill => {
                let grid = RaycastGrid::new(&grid_triangles, result.resolution);
                result.raycast_fill(&grid, cancel)?;
            }
        }

        Ok(result)
    }

    /// The number of voxels along each axis.
    pub fn resolution(&self) -> [u32; DIM] {
        self.resolution
    }

    /// The world-space size of a voxel edge.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The world-space center of the voxel `(0, 0, 0)`.
    pub fn origin(&self) -> Point<Real> {
        self.origin
    }

    fn allocate(&mut self) {
        let len = self.resolution[0] as usize * self.resolution[1] as usize * self.resolution[2] as usize;
        self.data.resize(len, VoxelValue::PrimitiveUndefined);
    }

    fn voxel_index(&self, i: u32, j: u32, k: u32) -> u32 {
        i + j * self.resolution[0] + k * self.resolution[0] * self.resolution[1]
    }

    fn voxel_mut(&mut self, i: u32, j: u32, k: u32) -> &mut VoxelValue {
        let idx = self.voxel_index(i, j, k);
        &mut self.data[idx as usize]
    }

    /// The value of the voxel `(i, j, k)`.
    pub fn voxel(&self, i: u32, j: u32, k: u32) -> VoxelValue {
        let idx = self.voxel_index(i, j, k);
        self.data[idx as usize]
    }

    /// The number of voxels intersecting the mesh boundary.
    pub fn num_voxels_on_surface(&self) -> u32 {
        self.num_voxels_on_surface
    }

    /// The number of voxels strictly inside of the mesh.
    pub fn num_voxels_inside_surface(&self) -> u32 {
        self.num_voxels_inside_surface
    }

    /// The number of voxels outside of the mesh.
    pub fn num_voxels_outside_surface(&self) -> u32 {
        self.num_voxels_outside_surface
    }

    /// Mark all the PrimitiveUndefined voxels within the given bounds as PrimitiveOutsideSurfaceToWalk.
    fn mark_outside_surface(&mut self, i0: u32, j0: u32, k0: u32, i1: u32, j1: u32, k1: u32) {
        for i in i0..i1 {
            for j in j0..j1 {
                for k in k0..k1 {
                    let v = self.voxel_mut(i, j, k);

                    if *v == VoxelValue::PrimitiveUndefined {
                        *v = VoxelValue::PrimitiveOutsideSurfaceToWalk;
                    }
                }
            }
        }
    }

    fn walk_forward(
        start: isize,
        end: isize,
        mut ptr: isize,
        out: &mut [VoxelValue],
        stride: isize,
        max_distance: isize,
    ) {
        let mut i = start;
        let mut count = 0;

        while count < max_distance && i < end && out[ptr as usize] == VoxelValue::PrimitiveUndefined
        {
            out[ptr as usize] = VoxelValue::PrimitiveOutsideSurfaceToWalk;
            i += 1;
            ptr += stride;
            count += 1;
        }
    }

    fn walk_backward(
        start: isize,
        end: isize,
        mut ptr: isize,
        out: &mut [VoxelValue],
        stride: isize,
        max_distance: isize,
    ) {
        let mut i = start;
        let mut count = 0;

        while count < max_distance
            && i >= end
            && out[ptr as usize] == VoxelValue::PrimitiveUndefined
        {
            out[ptr as usize] = VoxelValue::PrimitiveOutsideSurfaceToWalk;
            i -= 1;
            ptr -= stride;
            count += 1;
        }
    }

    fn fill_outside_surface(&mut self, cancel: &CancellationFlag) -> Result<(), DecompositionError> {
        let mut voxels_walked;
        let i0 = self.resolution[0];
        let j0 = self.resolution[1];
        let k0 = self.resolution[2];

        // Avoid striding too far in each direction to stay in L1 cache as much as possible.
        // The cache size required for the walk is roughly (4 * walk_distance * 64) since
        // the k direction doesn't count as it's walking byte per byte directly in a cache lines.
        // ~16k is required for a walk distance of 64 in each directions.
        let walk_distance = 64;

        // using the stride directly instead of calling get_voxel for each iterations saves
        // a lot of multiplications and pipeline stalls due to data dependencies on imul.
        let istride = self.voxel_index(1, 0, 0) as isize - self.voxel_index(0, 0, 0) as isize;
        let jstride = self.voxel_index(0, 1, 0) as isize - self.voxel_index(0, 0, 0) as isize;
        let kstride = self.voxel_index(0, 0, 1) as isize - self.voxel_index(0, 0, 0) as isize;

        // It might seem counter intuitive to go over the whole voxel range multiple times
        // but since we do the run in memory order, it leaves us with far fewer cache misses
        // than a BFS algorithm and it has the additional benefit of not requiring us to
        // store and manipulate a fifo for recursion that might become huge when the number
        // of voxels is large.
        // This will outperform the BFS algorithm by several orders of magnitude in practice.
        loop {
            voxels_walked = 0;

            for i in 0..i0 {
                cancel.check()?;

                for j in 0..j0 {
                    for k in 0..k0 {
                        let idx = self.voxel_index(i, j, k) as isize;
                        let voxel = self.voxel_mut(i, j, k);

                        if *voxel == VoxelValue::PrimitiveOutsideSurfaceToWalk {
                            voxels_walked += 1;
                            *voxel = VoxelValue::PrimitiveOutsideSurface;

                            // walk in each direction to mark other voxel that should be walked.
                            // this will generate a 3d pattern that will help the overall
                            // algorithm converge faster while remaining cache friendly.
                            Self::walk_forward(
                                k as isize + 1,
                                k0 as isize,
                                idx + kstride,
                                &mut self.data,
                                kstride,
                                walk_distance,
                            );
                            Self::walk_backward(
                                k as isize - 1,
                                0,
                                idx - kstride,
                                &mut self.data,
                                kstride,
                                walk_distance,
                            );

                            Self::walk_forward(
                                j as isize + 1,
                                j0 as isize,
                                idx + jstride,
                                &mut self.data,
                                jstride,
                                walk_distance,
                            );
                            Self::walk_backward(
                                j as isize - 1,
                                0,
                                idx - jstride,
                                &mut self.data,
                                jstride,
                                walk_distance,
                            );

                            Self::walk_forward(
                                (i + 1) as isize,
                                i0 as isize,
                                idx + istride,
                                &mut self.data,
                                istride,
                                walk_distance,
                            );
                            Self::walk_backward(
                                i as isize - 1,
                                0,
                                idx - istride,
                                &mut self.data,
                                istride,
                                walk_distance,
                            );
                        }
                    }
                }
            }

            self.num_voxels_outside_surface += voxels_walked;

            if voxels_walked == 0 {
                return Ok(());
            }
        }
    }

    fn fill_inside_surface(&mut self) {
        for i in 0..self.resolution[0] {
            for j in 0..self.resolution[1] {
                for k in 0..self.resolution[2] {
                    let v = self.voxel_mut(i, j, k);
                    if *v == VoxelValue::PrimitiveUndefined {
                        *v = VoxelValue::PrimitiveInsideSurface;
                        self.num_voxels_inside_surface += 1;
                    }
                }
            }
        }
    }

    fn raycast_fill(
        &mut self,
        grid: &RaycastGrid,
        cancel: &CancellationFlag,
    ) -> Result<(), DecompositionError> {
        const DIRECTIONS: [(usize, bool); 6] = [
            (0, true),
            (0, false),
            (1, true),
            (1, false),
            (2, true),
            (2, false),
        ];

        for i in 0..self.resolution[0] {
            cancel.check()?;

            for j in 0..self.resolution[1] {
                for k in 0..self.resolution[2] {
                    if self.voxel(i, j, k) == VoxelValue::PrimitiveOnSurface {
                        continue;
                    }

                    let mut inside_count = 0;
                    let mut outside_count = 0;

                    for (axis, positive) in DIRECTIONS {
                        match grid.trace([i, j, k], axis, positive) {
                            Some(true) => inside_count += 1,
                            Some(false) => outside_count += 1,
                            None => {}
                        }

                        // Early out if we hit the outside of the mesh,
                        // or if we accumulated enough inside hits.
                        if outside_count != 0 || inside_count >= 3 {
                            break;
                        }
                    }

                    let v = self.voxel_mut(i, j, k);
                    if outside_count == 0 && inside_count >= 3 {
                        *v = VoxelValue::PrimitiveInsideSurface;
                        self.num_voxels_inside_surface += 1;
                    } else {
                        *v = VoxelValue::PrimitiveOutsideSurface;
                        self.num_voxels_outside_surface += 1;
                    }
                }
            }
        }

        Ok(())
    }
}

impl From<VoxelizedVolume> for VoxelSet {
    fn from(mut volume: VoxelizedVolume) -> Self {
        let mut vset = VoxelSet::new();
        vset.origin = volume.origin;
        vset.scale = volume.scale;
        vset.voxels
            .reserve((volume.num_voxels_inside_surface + volume.num_voxels_on_surface) as usize);

        // Intersections are grouped by voxel, and sorted by triangle index within each group.
        volume.primitive_intersections.sort_unstable();
        let pairs = &volume.primitive_intersections;

        for i in 0..volume.resolution[0] {
            for j in 0..volume.resolution[1] {
                for k in 0..volume.resolution[2] {
                    let value = volume.voxel(i, j, k);

                    if value == VoxelValue::PrimitiveInsideSurface {
                        let voxel = Voxel {
                            coords: Point::new(i, j, k),
                            is_on_surface: false,
                            intersections_range: (0, 0),
                        };
                        vset.voxels.push(voxel);
                    } else if value == VoxelValue::PrimitiveOnSurface {
                        let idx = volume.voxel_index(i, j, k);
                        let start = pairs.partition_point(|p| p.0 < idx);
                        let end = start + pairs[start..].partition_point(|p| p.0 == idx);
                        let voxel = Voxel {
                            coords: Point::new(i, j, k),
                            is_on_surface: true,
                            intersections_range: (start, end),
                        };
                        vset.voxels.push(voxel);
                    }
                }
            }
        }

        vset.intersections = Arc::new(pairs.iter().map(|p| p.1).collect());
        vset.compute_bb();
        vset
    }
}
