use crate::math::{Point, Real};
use std::cmp::Ordering;

/// Given an index buffer, remove from `points` every point that is not indexed.
pub fn remove_unused_points(points: &mut Vec<Point<Real>>, idx: &mut [[u32; 3]]) {
    let mut used = vec![false; points.len()];
    let mut remap: Vec<usize> = (0..points.len()).collect();

    for i in idx.iter() {
        used[i[0] as usize] = true;
        used[i[1] as usize] = true;
        used[i[2] as usize] = true;
    }

    let mut i = 0;
    while i != points.len() {
        if !used[i] {
            let _ = points.swap_remove(i);
            remap[points.len()] = i;
            used[i] = used[points.len()];
        } else {
            i += 1;
        }
    }

    for id in idx.iter_mut() {
        id[0] = remap[id[0] as usize] as u32;
        id[1] = remap[id[1] as usize] as u32;
        id[2] = remap[id[2] as usize] as u32;
    }
}

/// Sorts `points` lexicographically and removes the exact duplicates.
///
/// The resulting order only depends on the point values, not on their
/// initial order.
pub fn dedup_points(points: &mut Vec<Point<Real>>) {
    points.sort_unstable_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.z.total_cmp(&b.z))
    });
    points.dedup_by(|a, b| {
        a.x.total_cmp(&b.x) == Ordering::Equal
            && a.y.total_cmp(&b.y) == Ordering::Equal
            && a.z.total_cmp(&b.z) == Ordering::Equal
    });
}

#[cfg(test)]
mod test {
    use super::{dedup_points, remove_unused_points};
    use crate::math::Point;

    #[test]
    fn unused_points_are_removed_and_indices_remapped() {
        let mut points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(9.0, 9.0, 9.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let mut idx = [[0, 2, 3]];

        remove_unused_points(&mut points, &mut idx);

        assert_eq!(points.len(), 3);
        assert!(!points.contains(&Point::new(9.0, 9.0, 9.0)));
        assert_eq!(points[idx[0][0] as usize], Point::new(0.0, 0.0, 0.0));
        assert_eq!(points[idx[0][1] as usize], Point::new(1.0, 0.0, 0.0));
        assert_eq!(points[idx[0][2] as usize], Point::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn dedup_is_order_independent() {
        let mut a = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
        ];
        let mut b = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
        ];

        dedup_points(&mut a);
        dedup_points(&mut b);

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
