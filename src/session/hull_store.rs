use crate::math::Real;
use crate::shape::ConvexHull;
use crate::DecompositionError;

/// The convex hulls produced by one decomposition.
///
/// Hulls are served by index, as independent copies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HullStore {
    hulls: Vec<ConvexHull>,
}

impl HullStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hull to this store.
    pub fn push(&mut self, hull: ConvexHull) {
        self.hulls.push(hull)
    }

    /// The number of hulls in this store.
    pub fn count(&self) -> u32 {
        self.hulls.len() as u32
    }

    /// Is this store empty?
    pub fn is_empty(&self) -> bool {
        self.hulls.is_empty()
    }

    /// A copy of the `index`-th hull of this store.
    pub fn get(&self, index: u32) -> Result<ConvexHull, DecompositionError> {
        self.hulls
            .get(index as usize)
            .cloned()
            .ok_or(DecompositionError::IndexOutOfRange {
                index,
                count: self.count(),
            })
    }

    /// Removes every hull from this store.
    pub fn clear(&mut self) {
        self.hulls.clear()
    }

    /// Iterates through the hulls of this store, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ConvexHull> {
        self.hulls.iter()
    }

    /// The hulls of this store, in order.
    pub fn as_slice(&self) -> &[ConvexHull] {
        &self.hulls
    }

    /// The sum of the volumes of the hulls of this store.
    pub fn total_volume(&self) -> Real {
        self.hulls.iter().map(|h| h.volume()).sum()
    }
}

impl Extend<ConvexHull> for HullStore {
    fn extend<I: IntoIterator<Item = ConvexHull>>(&mut self, iter: I) {
        self.hulls.extend(iter)
    }
}

#[cfg(test)]
mod test {
    use super::HullStore;
    use crate::math::{Point, Real};
    use crate::shape::ConvexHull;
    use crate::DecompositionError;

    fn cube(size: Real) -> ConvexHull {
        let points: Vec<_> = (0..8)
            .map(|i| {
                Point::new(
                    (i & 1) as Real * size,
                    ((i >> 1) & 1) as Real * size,
                    ((i >> 2) & 1) as Real * size,
                )
            })
            .collect();
        ConvexHull::from_points(&points).unwrap()
    }

    #[test]
    fn hulls_are_served_by_index() {
        let mut store = HullStore::new();
        store.push(cube(1.0));
        store.push(cube(2.0));

        assert_eq!(store.count(), 2);
        assert_eq!(store.get(1), Ok(cube(2.0)));
        assert_relative_eq!(store.total_volume(), 9.0, epsilon = 1.0e-9);
        assert_eq!(
            store.get(2),
            Err(DecompositionError::IndexOutOfRange { index: 2, count: 2 })
        );

        store.clear();
        assert!(store.is_empty());
        assert_eq!(
            store.get(0),
            Err(DecompositionError::IndexOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn retrieved_hulls_are_independent_copies() {
        let mut store = HullStore::new();
        store.push(cube(1.0));

        let copy = store.get(0).unwrap();
        store.clear();
        assert_relative_eq!(copy.volume(), 1.0, epsilon = 1.0e-9);
    }
}
