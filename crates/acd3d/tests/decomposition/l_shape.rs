use super::{l_shape, point_count, triangle_count};
use acd3d::input::InputMesh;
use acd3d::shape::ConvexHull;
use acd3d::transformation::vhacd::{approximate_convex_decomposition, Parameters};

fn l_shape_mesh() -> InputMesh {
    let (points, triangles) = l_shape();
    InputMesh::from_flat(
        &points,
        point_count(&points),
        &triangles,
        triangle_count(&triangles),
    )
    .unwrap()
}

fn params() -> Parameters {
    Parameters {
        resolution: 10_000,
        concavity: 0.001,
        ..Parameters::default()
    }
}

fn total_volume(hulls: &[ConvexHull]) -> f64 {
    hulls.iter().map(|h| h.volume()).sum()
}

#[test]
fn l_shape_is_split() {
    let hulls = approximate_convex_decomposition(&l_shape_mesh(), &params()).unwrap();

    assert!(hulls.len() >= 2);
    assert!(hulls.len() <= 32);
    for hull in &hulls {
        assert!(hull.volume() > 0.0);
        assert!(hull.num_points() <= 64);
        assert!(acd3d::transformation::check_convex_hull(hull.points(), hull.indices()).is_ok());
    }

    // The hull of the whole shape has a volume of 3.5.
    assert_relative_eq!(total_volume(&hulls), 3.0, epsilon = 0.15);
}

#[test]
fn l_shape_merged_into_a_single_hull() {
    let params = Parameters {
        max_convex_hulls: 1,
        ..params()
    };
    let hulls = approximate_convex_decomposition(&l_shape_mesh(), &params).unwrap();

    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume(), 3.5, epsilon = 0.15);
}

#[test]
fn hull_vertex_cap_is_respected() {
    let params = Parameters {
        max_num_vertices_per_ch: 4,
        ..params()
    };
    let hulls = approximate_convex_decomposition(&l_shape_mesh(), &params).unwrap();

    assert!(!hulls.is_empty());
    for hull in &hulls {
        assert!(hull.num_points() <= 4);
        assert!(hull.volume() > 0.0);
    }
}

#[test]
fn decomposition_is_deterministic() {
    let mesh = l_shape_mesh();
    let reference = approximate_convex_decomposition(&mesh, &params()).unwrap();

    for parallel in [true, false, true] {
        let params = Parameters {
            parallel,
            ..params()
        };
        let hulls = approximate_convex_decomposition(&mesh, &params).unwrap();
        assert_eq!(hulls, reference);
    }
}

#[test]
fn recursion_depth_bounds_the_hull_count() {
    let params = Parameters {
        max_recursion_depth: 1,
        concavity: 0.0,
        ..params()
    };
    let hulls = approximate_convex_decomposition(&l_shape_mesh(), &params).unwrap();
    assert!(hulls.len() <= 2);
}
