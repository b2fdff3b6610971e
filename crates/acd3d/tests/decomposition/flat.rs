use acd3d::input::InputMesh;
use acd3d::transformation::vhacd::{approximate_convex_decomposition, Parameters};
use na::Point3;

fn square(corner: impl Fn(f64, f64) -> Point3<f64>) -> InputMesh {
    let points = vec![corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)];
    InputMesh::new(points, vec![[0, 1, 2], [0, 2, 3]]).unwrap()
}

fn thin_box(x: f64, y: f64, z: f64) -> InputMesh {
    let points = (0..8)
        .map(|i| {
            Point3::new(
                (i & 1) as f64 * x,
                ((i >> 1) & 1) as f64 * y,
                ((i >> 2) & 1) as f64 * z,
            )
        })
        .collect();
    let triangles = vec![
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
    InputMesh::new(points, triangles).unwrap()
}

#[test]
fn flat_squares_decompose_in_every_orientation() {
    let params = Parameters::default();
    let squares = [
        square(|u, v| Point3::new(u, v, 0.0)),
        square(|u, v| Point3::new(u, 0.0, v)),
        square(|u, v| Point3::new(0.0, u, v)),
    ];

    for mesh in &squares {
        let hulls = approximate_convex_decomposition(mesh, &params).unwrap();
        assert_eq!(hulls.len(), 1);

        // The square is thickened by one voxel at most.
        let aabb = hulls[0].aabb();
        let extents = aabb.extents();
        let mut sorted = [extents.x, extents.y, extents.z];
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(sorted[0] > 0.0 && sorted[0] < 0.05);
        assert!(sorted[1] >= 1.0 && sorted[1] < 1.05);
        assert!(sorted[2] >= 1.0 && sorted[2] < 1.05);
    }
}

#[test]
fn thin_plates_keep_a_bounded_grid() {
    let mesh = thin_box(10.0, 10.0, 0.001);
    let hulls = approximate_convex_decomposition(&mesh, &Parameters::default()).unwrap();
    assert!(!hulls.is_empty());

    for hull in &hulls {
        let aabb = hull.aabb();
        assert!(aabb.mins.iter().all(|e| *e > -1.0));
        assert!(aabb.maxs.x < 11.0 && aabb.maxs.y < 11.0 && aabb.maxs.z < 1.0);
    }
}
