use super::simplify::simplify_convex_hull;
use super::vhacd::compute_concavity;
use super::{Parameters, Stage};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use crate::shape::ConvexHull;
use crate::utils::hashmap::HashMap;
use crate::utils::{self, SortedPair};
use crate::DecompositionError;
use log::trace;
use ordered_float::OrderedFloat;

struct MergeCandidates {
    hulls: Vec<Option<ConvexHull>>,
    volumes: Vec<Real>,
    aabbs: Vec<Aabb>,
    volume_ch0: Real,
    voxel_scale: Real,
}

impl MergeCandidates {
    fn merged_hull(&self, i: u32, j: u32) -> Result<ConvexHull, DecompositionError> {
        let mut points = Vec::new();

        for id in [i, j] {
            if let Some(hull) = &self.hulls[id as usize] {
                points.extend_from_slice(hull.points());
            }
        }

        utils::dedup_points(&mut points);
        Ok(ConvexHull::from_points(&points)?)
    }

    // Returns `(not_touching, cost)` so that touching pairs sort first.
    fn merge_cost(&self, i: u32, j: u32) -> Result<(bool, Real), DecompositionError> {
        let merged_volume = self.merged_hull(i, j)?.volume();
        let (i, j) = (i as usize, j as usize);
        let cost = compute_concavity(
            self.volumes[i] + self.volumes[j],
            merged_volume,
            self.volume_ch0,
        );
        let touching = self.aabbs[i]
            .loosened(self.voxel_scale)
            .intersects(&self.aabbs[j]);
        Ok((!touching, cost))
    }

    fn alive(&self) -> impl Iterator<Item = u32> + '_ {
        self.hulls
            .iter()
            .enumerate()
            .filter(|(_, hull)| hull.is_some())
            .map(|(i, _)| i as u32)
    }
}

/// Merges the hulls with the lowest merge cost until at most `params.max_convex_hulls`
/// remain.
///
/// A merged hull replaces the first hull of the pair, and the order of the other
/// hulls is preserved.
pub(crate) fn merge_convex_hulls(
    hulls: Vec<ConvexHull>,
    params: &Parameters,
    volume_ch0: Real,
    voxel_scale: Real,
) -> Result<Vec<ConvexHull>, DecompositionError> {
    let max_hulls = params.max_convex_hulls.max(1) as usize;
    params.progress.report(Stage::Merging, 0.0);

    if hulls.len() <= max_hulls {
        params.progress.report(Stage::Merging, 1.0);
        return Ok(hulls);
    }

    let mut candidates = MergeCandidates {
        volumes: hulls.iter().map(|h| h.volume()).collect(),
        aabbs: hulls.iter().map(|h| h.aabb()).collect(),
        hulls: hulls.into_iter().map(Some).collect(),
        volume_ch0,
        voxel_scale,
    };

    let num_hulls = candidates.hulls.len() as u32;
    let pairs: Vec<_> = (0..num_hulls)
        .flat_map(|i| (i + 1..num_hulls).map(move |j| (i, j)))
        .collect();

    let initial_costs = utils::map_ordered(params.parallel, pairs, |(i, j)| {
        params.cancel.check()?;
        candidates
            .merge_cost(i, j)
            .map(|cost| (SortedPair::new(i, j), cost))
    });

    let mut costs = HashMap::default();
    for cost in initial_costs {
        let (pair, cost) = cost?;
        let _ = costs.insert(pair, cost);
    }

    let mut num_alive = num_hulls as usize;
    let num_merges = (num_alive - max_hulls) as Real;

    while num_alive > max_hulls {
        params.cancel.check()?;

        let best = costs
            .iter()
            .min_by_key(|(pair, (not_touching, cost))| {
                (*not_touching, OrderedFloat(*cost), pair.first(), pair.second())
            })
            .map(|(pair, _)| *pair);

        let Some(pair) = best else {
            break;
        };

        let (i, j) = (pair.first(), pair.second());
        let merged = candidates.merged_hull(i, j)?;
        let merged = simplify_convex_hull(merged, params.max_num_vertices_per_ch)?;
        trace!("Merging convex hulls {} and {}.", i, j);

        candidates.volumes[i as usize] = merged.volume();
        candidates.aabbs[i as usize] = merged.aabb();
        candidates.hulls[i as usize] = Some(merged);
        candidates.hulls[j as usize] = None;
        num_alive -= 1;

        costs.retain(|pair, _| {
            pair.first() != i && pair.second() != i && pair.first() != j && pair.second() != j
        });

        let others: Vec<_> = candidates.alive().filter(|k| *k != i).collect();
        for k in others {
            let cost = candidates.merge_cost(i, k)?;
            let _ = costs.insert(SortedPair::new(i, k), cost);
        }

        let num_merged = (num_hulls as usize - num_alive) as Real;
        params.progress.report(Stage::Merging, num_merged / num_merges);
    }

    params.progress.report(Stage::Merging, 1.0);
    Ok(candidates.hulls.into_iter().flatten().collect())
}
