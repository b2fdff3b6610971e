use super::{cube, l_shape, point_count, triangle_count};
use acd3d::interface::{self, SessionTable};
use acd3d::session::SessionState;
use acd3d::transformation::vhacd::Parameters;
use acd3d::DecompositionError;

fn params() -> Parameters {
    Parameters {
        resolution: 10_000,
        concavity: 0.001,
        ..Parameters::default()
    }
}

#[test]
fn global_session_lifecycle() {
    let (points, triangles) = cube();
    let handle = interface::create();
    assert_eq!(interface::status(handle), Ok(SessionState::Created));

    assert!(interface::compute(handle, &points, 8, &triangles, 12, &params()));
    assert_eq!(interface::status(handle), Ok(SessionState::Ready));
    assert_eq!(interface::hull_count(handle), Ok(1));
    assert_eq!(interface::last_error(handle), Ok(None));

    let hull = interface::get_hull(handle, 0).unwrap();
    assert_eq!(hull.n, 8);
    assert_eq!(hull.m, 12);
    assert_eq!(hull.points.len(), 24);
    assert_eq!(hull.triangle_indices.len(), 36);
    assert!(hull.points.iter().all(|e| (-1.0e-6..=1.0 + 1.0e-6).contains(e)));
    interface::release_hull(hull);

    assert_eq!(
        interface::get_hull(handle, 1),
        Err(DecompositionError::IndexOutOfRange { index: 1, count: 1 })
    );

    interface::destroy(handle).unwrap();
    assert!(matches!(
        interface::destroy(handle),
        Err(DecompositionError::InvalidState(_))
    ));
    assert!(matches!(
        interface::hull_count(handle),
        Err(DecompositionError::InvalidState(_))
    ));
}

#[test]
fn single_and_double_precision_give_the_same_hulls() {
    let (points, triangles) = l_shape();
    let points32: Vec<f32> = points.iter().map(|e| *e as f32).collect();
    let table = SessionTable::new();

    let h64 = table.create();
    let h32 = table.create();
    table
        .try_compute(
            h64,
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params(),
        )
        .unwrap();
    table
        .try_compute(
            h32,
            &points32,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params(),
        )
        .unwrap();

    let count = table.hull_count(h64).unwrap();
    assert_eq!(table.hull_count(h32), Ok(count));
    for i in 0..count {
        assert_eq!(table.get_hull(h32, i), table.get_hull(h64, i));
    }

    table.destroy(h64).unwrap();
    table.destroy(h32).unwrap();
    assert!(table.is_empty());
}

#[test]
fn zero_triangles_is_invalid_input() {
    let (points, triangles) = cube();
    let table = SessionTable::new();
    let handle = table.create();

    let result = table.try_compute(handle, &points, 8, &triangles, 0, &params());
    assert!(matches!(result, Err(DecompositionError::InvalidInput(_))));
    assert_eq!(table.status(handle), Ok(SessionState::Created));
    assert!(matches!(
        table.last_error(handle),
        Ok(Some(DecompositionError::InvalidInput(_)))
    ));
}

#[test]
fn sessions_compute_concurrently() {
    let threads: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let (points, triangles) = cube();
                let handle = interface::create();
                let ok = interface::compute(handle, &points, 8, &triangles, 12, &params());
                let count = interface::hull_count(handle);
                interface::destroy(handle).unwrap();
                (ok, count)
            })
        })
        .collect();

    for thread in threads {
        assert_eq!(thread.join().unwrap(), (true, Ok(1)));
    }
}
