use super::{ConvexHullError, TriangleFacet};
use crate::math::{Point, Real};
use crate::shape::Triangle;
use crate::transformation::convex_hull_utils::support_point_id;
use std::cmp::Ordering;

pub fn try_get_initial_mesh(
    normalized_points: &mut [Point<Real>],
    undecidable: &mut Vec<usize>,
) -> Result<Vec<TriangleFacet>, ConvexHullError> {
    /*
     * Compute the eigenvectors to see if the input data live on a subspace.
     */
    let cov_mat = crate::utils::cov(normalized_points);
    let eig = cov_mat.symmetric_eigen();
    let eigvec = eig.eigenvectors;
    let eigval = eig.eigenvalues;

    let mut eigpairs = [
        (eigvec.column(0).into_owned(), eigval[0]),
        (eigvec.column(1).into_owned(), eigval[1]),
        (eigvec.column(2).into_owned(), eigval[2]),
    ];

    /*
     * Sort in decreasing order wrt. eigenvalues.
     */
    eigpairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    /*
     * Count the dimension the data lives in.
     */
    let mut dimension = 0;
    while dimension < 3 {
        if relative_eq!(eigpairs[dimension].1, 0.0, epsilon = 1.0e-7) {
            break;
        }

        dimension += 1;
    }

    if dimension < 3 {
        return Err(ConvexHullError::Degenerate(dimension));
    }

    // Find a initial triangle lying on the principal halfspace…
    let center = crate::utils::center(normalized_points);

    for point in normalized_points.iter_mut() {
        *point = Point::from((*point - center) / eigval.amax());
    }

    let p1 = support_point_id(&eigpairs[0].0, normalized_points)
        .ok_or(ConvexHullError::MissingSupportPoint)?;
    let p2 = support_point_id(&-eigpairs[0].0, normalized_points)
        .ok_or(ConvexHullError::MissingSupportPoint)?;

    let mut max_area = 0.0;
    let mut p3 = usize::MAX;

    for (i, point) in normalized_points.iter().enumerate() {
        let area = Triangle::new(normalized_points[p1], normalized_points[p2], *point).area();

        if area > max_area {
            max_area = area;
            p3 = i;
        }
    }

    if p3 == usize::MAX {
        return Err(ConvexHullError::InternalError("no triangle found."));
    }

    // Build two facets with opposite normals
    let mut f1 = TriangleFacet::new(p1, p2, p3, normalized_points);
    let mut f2 = TriangleFacet::new(p2, p1, p3, normalized_points);

    // Link the facets together
    f1.set_facets_adjascency(1, 1, 1, 0, 2, 1);
    f2.set_facets_adjascency(0, 0, 0, 0, 2, 1);

    let mut facets = vec![f1, f2];

    // … and attribute visible points to each one of them.
    for point in 0..normalized_points.len() {
        if normalized_points[point] == normalized_points[p1]
            || normalized_points[point] == normalized_points[p2]
            || normalized_points[point] == normalized_points[p3]
        {
            continue;
        }

        let mut furthest = usize::MAX;
        let mut furthest_dist = 0.0;

        for (i, curr_facet) in facets.iter().enumerate() {
            if curr_facet.can_see_point(point, normalized_points) {
                let distance = curr_facet.distance_to_point(point, normalized_points);

                if distance > furthest_dist {
                    furthest = i;
                    furthest_dist = distance;
                }
            }
        }

        if furthest != usize::MAX {
            facets[furthest].add_visible_point(point, normalized_points);
        } else {
            undecidable.push(point);
        }

        // If none of the facet can be seen from the point, it is naturally deleted.
    }

    #[cfg(debug_assertions)]
    {
        super::check_facet_links(0, &facets[..]);
        super::check_facet_links(1, &facets[..]);
    }

    Ok(facets)
}
