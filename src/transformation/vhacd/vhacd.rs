use super::{merge, simplify, Parameters, Stage};
use crate::bounding_volume::Aabb;
use crate::input::InputMesh;
use crate::math::{Point, Real, Vector, DIM};
use crate::shape::ConvexHull;
use crate::transformation::voxelization::VoxelSet;
use crate::transformation::{try_convex_hull, ConvexHullError};
use crate::utils;
use crate::DecompositionError;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An axis-aligned plane separating two layers of voxels.
#[derive(Copy, Clone, Debug)]
pub(crate) struct CutPlane {
    pub abc: Vector<Real>,
    pub d: Real,
    pub axis: usize,
    /// Voxels with `coords[axis] <= index` lie on the negative side of the plane.
    pub index: u32,
}

impl CutPlane {
    pub fn new(vset: &VoxelSet, axis: usize, index: u32) -> Self {
        Self {
            abc: Vector::ith(axis, 1.0),
            d: -(vset.origin[axis] + (index as Real + 0.5) * vset.scale),
            axis,
            index,
        }
    }

    pub fn signed_distance(&self, pt: &Point<Real>) -> Real {
        self.abc.dot(&pt.coords) + self.d
    }
}

enum PartOutcome {
    Terminal(VoxelSet),
    Split(VoxelSet, VoxelSet),
}

struct PlaneCost {
    plane: CutPlane,
    total: Real,
    concavity: Real,
    centroid_distance: Real,
}

/// Approximate convex decomposition using the VHACD algorithm.
///
/// The input mesh is voxelized, then the voxel set is recursively split along axis-aligned
/// planes until every part is close enough to its convex hull. One convex hull is then
/// computed for each part with [`VHACD::compute_convex_hulls`].
pub struct VHACD {
    params: Parameters,
    voxel_parts: Vec<VoxelSet>,
    volume_ch0: Real,
}

impl VHACD {
    /// Decompose the given triangle mesh.
    ///
    /// # Parameters
    /// * `params` - The parameters for the VHACD algorithm execution.
    /// * `points` - The vertex buffer of the triangle mesh.
    /// * `indices` - The index buffer of the triangle mesh.
    ///
    /// The parameters are assumed to be valid, see [`Parameters::validate`].
    pub fn decompose(
        params: &Parameters,
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
    ) -> Result<Self, DecompositionError> {
        params.cancel.check()?;

        let aabb = Aabb::from_points(points.iter().copied());
        if points.is_empty() || aabb.max_extent() <= 0.0 {
            return Err(DecompositionError::ComputationFailure(
                "the input mesh has a zero extent".to_string(),
            ));
        }

        let dim = params.voxel_grid_dimension();
        params.progress.report(Stage::Voxelization, 0.0);
        let mut root = VoxelSet::voxelize(
            points,
            indices,
            dim,
            params.fill_mode,
            params.shrink_wrap,
            &params.cancel,
        )?;
        params.progress.report(Stage::Voxelization, 1.0);
        debug!(
            "Voxelized {} triangles on a {}-voxels grid: {} voxels, {} on the surface.",
            indices.len(),
            dim,
            root.len(),
            root.num_voxels_on_surface()
        );

        if root.is_empty() {
            return Err(DecompositionError::ComputationFailure(
                "the voxelization did not produce any voxel".to_string(),
            ));
        }

        root.compute_bb();
        params.cancel.check()?;
        let root_hull = hull_or_empty(root.compute_convex_hull(1))?;
        let volume_ch0 = root_hull.volume();

        if volume_ch0 <= 0.0 {
            return Err(DecompositionError::ComputationFailure(
                "the convex hull of the voxelized mesh has a zero volume".to_string(),
            ));
        }

        let mut result = VHACD {
            params: params.clone(),
            voxel_parts: Vec::new(),
            volume_ch0,
        };

        let mut parts = Vec::new();
        let mut level = Vec::new();
        params.cancel.check()?;
        params.progress.report(Stage::Splitting, 0.0);
        push_outcome(result.split_part(root, &root_hull, 0)?, &mut parts, &mut level);

        for depth in 1..=params.max_recursion_depth {
            if level.is_empty() {
                break;
            }

            let outcomes = utils::map_ordered(params.parallel, std::mem::take(&mut level), |part| {
                result.process_part(part, depth)
            });

            for outcome in outcomes {
                push_outcome(outcome?, &mut parts, &mut level);
            }

            let max_depth = params.max_recursion_depth as Real;
            params.progress.report(Stage::Splitting, depth as Real / max_depth);
        }

        params.progress.report(Stage::Splitting, 1.0);

        debug!(
            "Recursive splitting produced {} parts (hull volume of the whole mesh: {}).",
            parts.len(),
            volume_ch0
        );

        let classes = compute_primitive_classes(&parts, indices.len());
        for part in &mut parts {
            part.set_primitive_classes(classes.clone());
        }

        result.voxel_parts = parts;
        Ok(result)
    }

    /// The parts the voxelized mesh has been split into.
    pub fn voxel_parts(&self) -> &[VoxelSet] {
        &self.voxel_parts
    }

    /// The volume of the convex hull of the whole voxelized mesh.
    ///
    /// It is used to normalize every concavity measure of this decomposition.
    pub fn volume_ch0(&self) -> Real {
        self.volume_ch0
    }

    /// Compute one convex hull for each part, then simplify and merge them according to
    /// the decomposition parameters.
    ///
    /// The `points` and `indices` must be the buffers given to [`VHACD::decompose`].
    pub fn compute_convex_hulls(
        &self,
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
    ) -> Result<Vec<ConvexHull>, DecompositionError> {
        let params = &self.params;
        let parts: Vec<_> = self.voxel_parts.iter().enumerate().collect();
        let num_parts = parts.len().max(1) as Real;
        let num_done = AtomicUsize::new(0);
        params.progress.report(Stage::HullGeneration, 0.0);

        let hulls = utils::map_ordered(params.parallel, parts, |(part_id, part)| {
            params.cancel.check()?;
            let hull = self.part_convex_hull(part_id, part, points, indices)?;
            params.cancel.check()?;
            let hull = simplify::simplify_convex_hull(hull, params.max_num_vertices_per_ch)?;

            let done = num_done.fetch_add(1, Ordering::Relaxed) + 1;
            params
                .progress
                .report(Stage::HullGeneration, done as Real / num_parts);
            Ok(hull)
        })
        .into_iter()
        .collect::<Result<Vec<_>, DecompositionError>>()?;
        params.progress.report(Stage::HullGeneration, 1.0);

        debug!("Generated {} convex hulls.", hulls.len());

        let hulls = merge::merge_convex_hulls(
            hulls,
            params,
            self.volume_ch0,
            self.voxel_parts.first().map(|part| part.scale).unwrap_or(0.0),
        )?;

        debug!("Merging kept {} convex hulls.", hulls.len());
        Ok(hulls)
    }

    fn part_convex_hull(
        &self,
        part_id: usize,
        part: &VoxelSet,
        points: &[Point<Real>],
        indices: &[[u32; DIM]],
    ) -> Result<ConvexHull, DecompositionError> {
        if self.params.shrink_wrap {
            match part.compute_exact_convex_hull(points, indices) {
                Ok((vertices, triangles)) => {
                    return Ok(ConvexHull::from_parts_unchecked(vertices, triangles))
                }
                Err(err) => warn!(
                    "The exact convex hull of part {} failed ({}), using its voxel hull instead.",
                    part_id, err
                ),
            }
        }

        let (vertices, triangles) = part.compute_convex_hull(1)?;
        Ok(ConvexHull::from_parts_unchecked(vertices, triangles))
    }

    fn process_part(&self, part: VoxelSet, depth: u32) -> Result<PartOutcome, DecompositionError> {
        self.params.cancel.check()?;
        let hull = hull_or_empty(part.compute_convex_hull(1))?;
        self.split_part(part, &hull, depth)
    }

    fn split_part(
        &self,
        part: VoxelSet,
        part_hull: &ConvexHull,
        depth: u32,
    ) -> Result<PartOutcome, DecompositionError> {
        let params = &self.params;
        let volume = part.compute_volume();
        let concavity = compute_concavity(volume, part_hull.volume(), self.volume_ch0);
        let extents = part.max_bb_voxels() - part.min_bb_voxels();
        let wide_enough = extents.iter().all(|e| e + 1 >= params.min_edge_length);

        if depth >= params.max_recursion_depth || concavity <= params.concavity || !wide_enough {
            trace!(
                "Part with {} voxels at depth {} is terminal (concavity: {}).",
                part.len(),
                depth,
                concavity
            );
            return Ok(PartOutcome::Terminal(part));
        }

        let planes = self.compute_axes_aligned_clipping_planes(&part, params.plane_downsampling);
        if planes.is_empty() {
            return Ok(PartOutcome::Terminal(part));
        }

        let (preferred_cutting_direction, w) = compute_preferred_cutting_direction(&part);
        let on_surface = part.select_on_surface();
        let centroid = part.centroid();

        let mut best = self.compute_best_clipping_plane(
            &part,
            &on_surface,
            part_hull,
            &planes,
            &preferred_cutting_direction,
            w,
            concavity,
            params.convex_hull_downsampling,
            &centroid,
        )?;

        if params.plane_downsampling > 1 {
            let planes_ref =
                self.refine_axes_aligned_clipping_planes(&part, &best.plane, params.plane_downsampling);

            best = self.compute_best_clipping_plane(
                &part,
                &on_surface,
                part_hull,
                &planes_ref,
                &preferred_cutting_direction,
                w,
                concavity,
                1, // convex_hull_downsampling = 1
                &centroid,
            )?;
        }

        trace!(
            "Splitting part with {} voxels at depth {} along axis {} at voxel {} (concavity: {}, best split concavity: {}).",
            part.len(),
            depth,
            best.plane.axis,
            best.plane.index,
            concavity,
            best.concavity
        );

        let (negative, positive) = part.clip(&best.plane);
        Ok(PartOutcome::Split(negative, positive))
    }

    // The range of plane indices along `axis` leaving at least `min_edge_length` voxels on
    // each side of the plane.
    fn plane_index_range(&self, vset: &VoxelSet, axis: usize) -> Option<(u32, u32)> {
        let m = self.params.min_edge_length;
        let lo = vset.min_bb_voxels()[axis] + m - 1;
        let hi = vset.max_bb_voxels()[axis].checked_sub(m)?;
        (lo <= hi).then_some((lo, hi))
    }

    fn compute_axes_aligned_clipping_planes(
        &self,
        vset: &VoxelSet,
        downsampling: u32,
    ) -> Vec<CutPlane> {
        let mut planes = Vec::new();

        for axis in 0..DIM {
            if let Some((i0, i1)) = self.plane_index_range(vset, axis) {
                for i in (i0..=i1).step_by(downsampling as usize) {
                    planes.push(CutPlane::new(vset, axis, i));
                }
            }
        }

        planes
    }

    fn refine_axes_aligned_clipping_planes(
        &self,
        vset: &VoxelSet,
        best_plane: &CutPlane,
        downsampling: u32,
    ) -> Vec<CutPlane> {
        let axis = best_plane.axis;
        let Some((lo, hi)) = self.plane_index_range(vset, axis) else {
            return vec![*best_plane];
        };

        let i0 = lo.max(best_plane.index.saturating_sub(downsampling));
        let i1 = hi.min(best_plane.index + downsampling);
        (i0..=i1).map(|i| CutPlane::new(vset, axis, i)).collect()
    }

    // Returns the best plane, and the concavity of the two parts it generates.
    fn compute_best_clipping_plane(
        &self,
        input_vset: &VoxelSet,
        on_surface: &VoxelSet,
        input_hull: &ConvexHull,
        planes: &[CutPlane],
        preferred_cutting_direction: &Vector<Real>,
        w: Real,
        concavity: Real,
        convex_hull_downsampling: u32,
        centroid: &Point<Real>,
    ) -> Result<PlaneCost, DecompositionError> {
        let alpha = concavity * self.params.alpha;
        let beta = concavity * self.params.beta;
        let mut best: Option<PlaneCost> = None;
        let mut positive_pts = Vec::new();
        let mut negative_pts = Vec::new();

        for plane in planes {
            self.params.cancel.check()?;
            positive_pts.clear();
            negative_pts.clear();

            // Compute convex hulls.
            on_surface.intersect(
                plane,
                &mut positive_pts,
                &mut negative_pts,
                convex_hull_downsampling * 32,
            );

            for pt in input_hull.points() {
                let d = plane.signed_distance(pt);
                if d >= 0.0 {
                    positive_pts.push(*pt);
                }
                if d <= 0.0 {
                    negative_pts.push(*pt);
                }
            }

            let volume_positive_ch = point_cloud_hull_volume(&mut positive_pts)?;
            let volume_negative_ch = point_cloud_hull_volume(&mut negative_pts)?;

            // compute clipped volumes
            let (volume_negative, volume_positive) = input_vset.compute_clipped_volumes(plane);
            let concavity_negative =
                compute_concavity(volume_negative, volume_negative_ch, self.volume_ch0);
            let concavity_positive =
                compute_concavity(volume_positive, volume_positive_ch, self.volume_ch0);
            let split_concavity = concavity_negative + concavity_positive;

            // compute cost
            let balance = alpha * (volume_negative - volume_positive).abs() / self.volume_ch0;
            let d = w * plane.abc.dot(preferred_cutting_direction);
            let symmetry = beta * d;
            let total = split_concavity + balance + symmetry;
            let centroid_distance = plane.signed_distance(centroid).abs();

            let is_better = match &best {
                None => true,
                Some(best) => {
                    total < best.total
                        || (total == best.total && centroid_distance < best.centroid_distance)
                }
            };

            if is_better {
                best = Some(PlaneCost {
                    plane: *plane,
                    total,
                    concavity: split_concavity,
                    centroid_distance,
                });
            }
        }

        best.ok_or(DecompositionError::ComputationFailure(
            "no clipping plane to evaluate".to_string(),
        ))
    }
}

/// Computes an approximate convex decomposition of the given mesh.
///
/// The parameters are validated first. The hulls are returned in the breadth-first order
/// of the parts they were generated from, and a merged hull takes the slot of the first of
/// its two sources.
pub fn approximate_convex_decomposition(
    mesh: &InputMesh,
    params: &Parameters,
) -> Result<Vec<ConvexHull>, DecompositionError> {
    params.validate()?;
    let decomposition = VHACD::decompose(params, mesh.points(), mesh.triangles())?;
    decomposition.compute_convex_hulls(mesh.points(), mesh.triangles())
}

fn push_outcome(outcome: PartOutcome, parts: &mut Vec<VoxelSet>, next_level: &mut Vec<VoxelSet>) {
    match outcome {
        PartOutcome::Terminal(part) => parts.push(part),
        PartOutcome::Split(negative, positive) => {
            next_level.extend([negative, positive].into_iter().filter(|p| !p.is_empty()))
        }
    }
}

// Triangles intersected by the voxels of a single part get the index of that part,
// the others get `u32::MAX`.
fn compute_primitive_classes(parts: &[VoxelSet], num_primitives: usize) -> Arc<Vec<u32>> {
    let mut classes = vec![None; num_primitives];

    for (part_id, part) in parts.iter().enumerate() {
        let part_id = part_id as u32;

        for prim_id in part.intersected_primitives() {
            let class = &mut classes[prim_id as usize];
            *class = match *class {
                None => Some(part_id),
                Some(c) if c == part_id => Some(c),
                Some(_) => Some(u32::MAX),
            };
        }
    }

    Arc::new(
        classes
            .into_iter()
            .map(|c| c.unwrap_or(u32::MAX))
            .collect(),
    )
}

fn compute_preferred_cutting_direction(vset: &VoxelSet) -> (Vector<Real>, Real) {
    let eigv = vset.compute_principal_axes();

    let vx = (eigv.y - eigv.z) * (eigv.y - eigv.z);
    let vy = (eigv.x - eigv.z) * (eigv.x - eigv.z);
    let vz = (eigv.x - eigv.y) * (eigv.x - eigv.y);

    if vx < vy && vx < vz {
        let e = eigv.y * eigv.y + eigv.z * eigv.z;
        let dir = Vector::x();

        if e == 0.0 {
            (dir, 0.0)
        } else {
            (dir, 1.0 - vx / e)
        }
    } else if vy < vx && vy < vz {
        let e = eigv.x * eigv.x + eigv.z * eigv.z;
        let dir = Vector::y();

        if e == 0.0 {
            (dir, 0.0)
        } else {
            (dir, 1.0 - vy / e)
        }
    } else {
        let e = eigv.x * eigv.x + eigv.y * eigv.y;
        let dir = Vector::z();

        if e == 0.0 {
            (dir, 0.0)
        } else {
            (dir, 1.0 - vz / e)
        }
    }
}

// Degenerate inputs have no volume, other hull failures are reported.
fn hull_or_empty(
    hull: Result<(Vec<Point<Real>>, Vec<[u32; DIM]>), ConvexHullError>,
) -> Result<ConvexHull, DecompositionError> {
    match hull {
        Ok((vertices, triangles)) => Ok(ConvexHull::from_parts_unchecked(vertices, triangles)),
        Err(ConvexHullError::Degenerate(_)) | Err(ConvexHullError::IncompleteInput) => {
            Ok(ConvexHull::from_parts_unchecked(Vec::new(), Vec::new()))
        }
        Err(err) => Err(err.into()),
    }
}

fn point_cloud_hull_volume(points: &mut Vec<Point<Real>>) -> Result<Real, DecompositionError> {
    utils::dedup_points(points);
    Ok(hull_or_empty(try_convex_hull(points))?.volume())
}

pub(crate) fn compute_concavity(volume: Real, volume_ch: Real, volume0: Real) -> Real {
    ((volume_ch - volume).abs() / volume0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::{compute_concavity, compute_primitive_classes, CutPlane, VHACD};
    use crate::math::Point;
    use crate::transformation::vhacd::{CancellationFlag, Parameters};
    use crate::transformation::voxelization::{FillMode, VoxelSet};
    use crate::DecompositionError;

    fn box_mesh(mins: [f64; 3], maxs: [f64; 3]) -> (Vec<Point<f64>>, Vec<[u32; 3]>) {
        let points = (0..8)
            .map(|i| {
                Point::new(
                    if i & 1 == 0 { mins[0] } else { maxs[0] },
                    if (i >> 1) & 1 == 0 { mins[1] } else { maxs[1] },
                    if (i >> 2) & 1 == 0 { mins[2] } else { maxs[2] },
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
    fn concavity_is_normalized_and_clamped() {
        assert_relative_eq!(compute_concavity(1.0, 1.5, 2.0), 0.25);
        assert_relative_eq!(compute_concavity(1.5, 1.0, 2.0), 0.25);
        assert_relative_eq!(compute_concavity(0.0, 10.0, 2.0), 1.0);
    }

    #[test]
    fn cut_plane_separates_voxel_layers() {
        let (points, indices) = box_mesh([0.0; 3], [2.0, 1.0, 1.0]);
        let vset = VoxelSet::voxelize(
            &points,
            &indices,
            20,
            FillMode::FloodFill,
            false,
            &CancellationFlag::new(),
        )
        .unwrap();
        let plane = CutPlane::new(&vset, 0, 4);

        let below = vset.get_point(Point::new(4.0, 0.0, 0.0));
        let above = vset.get_point(Point::new(5.0, 0.0, 0.0));
        assert!(plane.signed_distance(&below) < 0.0);
        assert!(plane.signed_distance(&above) > 0.0);
        assert_relative_eq!(
            plane.signed_distance(&below),
            -plane.signed_distance(&above),
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn convex_box_is_a_single_part() {
        let (points, indices) = box_mesh([0.0; 3], [1.0, 2.0, 3.0]);
        let params = Parameters {
            resolution: 10_000,
            ..Parameters::default()
        };
        let vhacd = VHACD::decompose(&params, &points, &indices).unwrap();
        assert_eq!(vhacd.voxel_parts().len(), 1);

        let hulls = vhacd.compute_convex_hulls(&points, &indices).unwrap();
        assert_eq!(hulls.len(), 1);
        assert_relative_eq!(hulls[0].volume(), 6.0, epsilon = 1.0e-6);
    }

    #[test]
    fn triangles_shared_by_parts_are_unclassified() {
        let (points, indices) = box_mesh([0.0; 3], [4.0, 1.0, 1.0]);
        let vset = VoxelSet::voxelize(
            &points,
            &indices,
            40,
            FillMode::FloodFill,
            true,
            &CancellationFlag::new(),
        )
        .unwrap();
        let plane = CutPlane::new(&vset, 0, 20);
        let (negative, positive) = vset.clip(&plane);
        let classes = compute_primitive_classes(&[negative, positive], indices.len());

        // The two triangles of the -x face only touch the negative part, those of
        // the +x face only the positive one, and the long faces touch both.
        assert_eq!(classes[8], 0);
        assert_eq!(classes[9], 0);
        assert_eq!(classes[10], 1);
        assert_eq!(classes[11], 1);
        assert!(classes[..8].iter().all(|c| *c == u32::MAX));
    }

    #[test]
    fn zero_extent_mesh_fails() {
        let points = vec![Point::new(1.0, 1.0, 1.0); 3];
        let indices = vec![[0, 1, 2]];
        let result = VHACD::decompose(&Parameters::default(), &points, &indices);
        assert!(matches!(
            result,
            Err(DecompositionError::ComputationFailure(_))
        ));
    }

    #[test]
    fn cancelled_decomposition_stops() {
        let (points, indices) = box_mesh([0.0; 3], [1.0; 3]);
        let params = Parameters::default();
        params.cancel.cancel();
        let result = VHACD::decompose(&params, &points, &indices);
        assert!(matches!(result, Err(DecompositionError::Cancelled)));
    }
}
