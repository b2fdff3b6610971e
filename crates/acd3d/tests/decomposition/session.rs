use super::{cube, l_shape, point_count, triangle_count};
use acd3d::input::InputMesh;
use acd3d::session::{Session, SessionState};
use acd3d::transformation::vhacd::{Parameters, ProgressCallback, Stage};
use acd3d::DecompositionError;
use std::sync::{Arc, Mutex};

fn params() -> Parameters {
    Parameters {
        resolution: 10_000,
        concavity: 0.001,
        ..Parameters::default()
    }
}

#[test]
fn recompute_replaces_previous_hulls() {
    let mut session = Session::new();

    let (points, triangles) = l_shape();
    session
        .compute(
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params(),
        )
        .unwrap();
    let l_shape_hulls = session.hull_count().unwrap();
    assert!(l_shape_hulls >= 2);

    let (points, triangles) = cube();
    session.compute(&points, 8, &triangles, 12, &params()).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.hull_count(), Ok(1));
    assert_eq!(session.hulls().count(), 1);
    assert_eq!(session.parameters().map(|p| p.concavity), Some(0.001));
}

#[test]
fn retrieved_hulls_outlive_the_session() {
    let (points, triangles) = cube();
    let mut session = Session::new();
    session.compute(&points, 8, &triangles, 12, &params()).unwrap();

    let hull = session.get_hull(0).unwrap();
    drop(session);

    assert_eq!(hull.num_points(), 8);
    assert_relative_eq!(hull.volume(), 1.0, epsilon = 1.0e-6);
}

#[test]
fn structured_mesh_input() {
    let (points, triangles) = cube();
    let mesh = InputMesh::from_flat(&points, 8, &triangles, 12).unwrap();

    let mut session = Session::new();
    session.compute_mesh(mesh.clone(), &params()).unwrap();
    assert_eq!(session.mesh(), Some(&mesh));
    assert_relative_eq!(session.hulls().total_volume(), 1.0, epsilon = 1.0e-6);
}

#[test]
fn out_of_range_index_is_reported() {
    let (points, triangles) = l_shape();
    let mut session = Session::new();
    session
        .compute(
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params(),
        )
        .unwrap();

    let count = session.hull_count().unwrap();
    for i in 0..count {
        assert!(session.get_hull(i).is_ok());
    }
    assert_eq!(
        session.get_hull(count),
        Err(DecompositionError::IndexOutOfRange {
            index: count,
            count
        })
    );
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn hull_retrieval_is_idempotent() {
    let (points, triangles) = l_shape();
    let mut session = Session::new();
    session
        .compute(
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params(),
        )
        .unwrap();

    for i in 0..session.hull_count().unwrap() {
        let first = session.get_hull(i).unwrap();
        let second = session.get_hull(i).unwrap();
        assert_eq!(first, second);

        // Each retrieval is an independent copy.
        let (mut vertices, _) = first.into_parts();
        vertices[0].x += 100.0;
        assert_eq!(session.get_hull(i), Ok(second));
    }
}

#[test]
fn progress_covers_every_stage_in_order() {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = reports.clone();
    let params = Parameters {
        max_convex_hulls: 1,
        progress: ProgressCallback::new(move |stage, progress| {
            sink.lock().unwrap().push((stage, progress))
        }),
        ..params()
    };

    let (points, triangles) = l_shape();
    let mut session = Session::new();
    session
        .compute(
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params,
        )
        .unwrap();

    let reports = reports.lock().unwrap();
    let stages: Vec<_> = reports.iter().map(|(stage, _)| *stage).collect();
    assert!(stages.windows(2).all(|w| w[0] <= w[1]));

    for stage in [
        Stage::Voxelization,
        Stage::Splitting,
        Stage::HullGeneration,
        Stage::Merging,
    ] {
        let values: Vec<_> = reports
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, progress)| *progress)
            .collect();
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&1.0));
        assert!(values.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
