use super::{cube, point_count, triangle_count};
use acd3d::input::InputMesh;
use acd3d::transformation::vhacd::{approximate_convex_decomposition, FillMode, Parameters};
use na::Point3;

fn params() -> Parameters {
    Parameters {
        resolution: 10_000,
        ..Parameters::default()
    }
}

#[test]
fn cube_is_its_own_hull() {
    let (points, triangles) = cube();
    let mesh = InputMesh::from_flat(
        &points,
        point_count(&points),
        &triangles,
        triangle_count(&triangles),
    )
    .unwrap();

    let hulls = approximate_convex_decomposition(&mesh, &params()).unwrap();
    assert_eq!(hulls.len(), 1);

    let hull = &hulls[0];
    assert_eq!(hull.num_points(), 8);
    assert_eq!(hull.num_triangles(), 12);
    assert_relative_eq!(hull.volume(), 1.0, epsilon = 1.0e-6);
    assert_relative_eq!(hull.center(), Point3::new(0.5, 0.5, 0.5), epsilon = 1.0e-6);
    assert!(acd3d::transformation::check_convex_hull(hull.points(), hull.indices()).is_ok());
}

#[test]
fn default_parameters_recover_the_cube_corners() {
    let (points, triangles) = cube();
    let mesh = InputMesh::from_flat(&points, 8, &triangles, 12).unwrap();

    let hulls = approximate_convex_decomposition(&mesh, &Parameters::default()).unwrap();
    assert_eq!(hulls.len(), 1);

    let mut vertices: Vec<_> = hulls[0].points().iter().map(|p| [p.x, p.y, p.z]).collect();
    vertices.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut corners: Vec<_> = mesh.points().iter().map(|p| [p.x, p.y, p.z]).collect();
    corners.sort_by(|a, b| a.partial_cmp(b).unwrap());

    assert_eq!(vertices.len(), 8);
    for (vertex, corner) in vertices.iter().zip(&corners) {
        assert_relative_eq!(Point3::from(*vertex), Point3::from(*corner), epsilon = 1.0e-9);
    }
}

#[test]
fn filled_voxelizations_decompose_the_cube() {
    let (points, triangles) = cube();
    let mesh = InputMesh::from_flat(&points, 8, &triangles, 12).unwrap();

    for fill_mode in [FillMode::FloodFill, FillMode::RaycastFill] {
        let params = Parameters {
            fill_mode,
            ..params()
        };
        let hulls = approximate_convex_decomposition(&mesh, &params).unwrap();
        assert!(!hulls.is_empty());
        assert!(hulls.len() <= params.max_convex_hulls as usize);

        for hull in &hulls {
            assert!(hull.volume() > 0.0);
            let aabb = hull.aabb();
            assert!(aabb.mins.iter().all(|e| *e >= -0.1));
            assert!(aabb.maxs.iter().all(|e| *e <= 1.1));
        }
    }
}

#[test]
fn voxel_hulls_cover_the_cube() {
    let (points, triangles) = cube();
    let mesh = InputMesh::from_flat(&points, 8, &triangles, 12).unwrap();
    let params = Parameters {
        shrink_wrap: false,
        ..params()
    };

    let hulls = approximate_convex_decomposition(&mesh, &params).unwrap();
    assert_eq!(hulls.len(), 1);

    // The voxels overflow the cube by half a voxel on each side.
    let aabb = hulls[0].aabb();
    assert!(aabb.mins.iter().all(|e| *e < 0.0 && *e > -0.05));
    assert!(aabb.maxs.iter().all(|e| *e > 1.0 && *e < 1.05));
}
