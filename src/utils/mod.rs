//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::cleanup::{dedup_points, remove_unused_points};
pub use self::cov::{center_cov, cov};
pub use self::parallel::map_ordered;
pub use self::point_cloud_support_point::{
    point_cloud_support_point, point_cloud_support_point_id,
};
pub use self::sorted_pair::SortedPair;

mod center;
mod cleanup;
mod cov;
pub mod hashmap;
mod parallel;
mod point_cloud_support_point;
mod sorted_pair;
