use super::{l_shape, point_count, triangle_count};
use acd3d::session::{Session, SessionState};
use acd3d::transformation::vhacd::{CancellationFlag, Parameters, ProgressCallback, Stage};
use acd3d::DecompositionError;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn cancelled_before_start() {
    let (points, triangles) = l_shape();
    let params = Parameters {
        resolution: 10_000,
        ..Parameters::default()
    };
    params.cancel.cancel();

    let mut session = Session::new();
    let result = session.compute(
        &points,
        point_count(&points),
        &triangles,
        triangle_count(&triangles),
        &params,
    );

    assert_eq!(result, Err(DecompositionError::Cancelled));
    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.hull_count(), Ok(0));
    assert_eq!(session.last_error(), Some(&DecompositionError::Cancelled));
}

// Blocks the decomposition when `stage` starts, until another thread has set the flag.
fn cancel_from_another_thread_at(stage: Stage) -> (Parameters, thread::JoinHandle<Instant>) {
    let flag = CancellationFlag::new();
    let (started_tx, started_rx) = mpsc::channel();
    let (cancelled_tx, cancelled_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let cancelled_rx = Mutex::new(cancelled_rx);

    let progress = ProgressCallback::new(move |reported, progress| {
        if reported == stage && progress == 0.0 {
            started_tx.lock().unwrap().send(()).unwrap();
            cancelled_rx.lock().unwrap().recv().unwrap();
        }
    });

    let canceller = {
        let flag = flag.clone();
        thread::spawn(move || {
            started_rx.recv().unwrap();
            flag.cancel();
            let cancelled_at = Instant::now();
            cancelled_tx.send(()).unwrap();
            cancelled_at
        })
    };

    let params = Parameters {
        concavity: 0.001,
        cancel: flag,
        progress,
        ..Parameters::default()
    };
    (params, canceller)
}

#[test]
fn cancelled_from_another_thread() {
    let (points, triangles) = l_shape();

    for stage in [Stage::Voxelization, Stage::Splitting] {
        let (params, canceller) = cancel_from_another_thread_at(stage);

        let mut session = Session::new();
        let result = session.compute(
            &points,
            point_count(&points),
            &triangles,
            triangle_count(&triangles),
            &params,
        );
        let returned_at = Instant::now();
        let cancelled_at = canceller.join().unwrap();

        assert_eq!(result, Err(DecompositionError::Cancelled));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(session.hull_count(), Ok(0));
        assert!(returned_at.duration_since(cancelled_at) < Duration::from_secs(5));

        // A reset flag can be reused.
        params.cancel.reset();
        let params = Parameters {
            progress: ProgressCallback::none(),
            resolution: 10_000,
            ..params
        };
        session
            .compute(
                &points,
                point_count(&points),
                &triangles,
                triangle_count(&triangles),
                &params,
            )
            .unwrap();
        assert_eq!(session.state(), SessionState::Ready);
    }
}

#[test]
fn no_hull_is_generated_after_a_cancelled_split() {
    let (points, triangles) = l_shape();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let flag = CancellationFlag::new();

    let progress = {
        let stages = stages.clone();
        let flag = flag.clone();
        ProgressCallback::new(move |stage, progress| {
            stages.lock().unwrap().push(stage);
            if stage == Stage::Splitting && progress == 0.0 {
                flag.cancel();
            }
        })
    };

    let params = Parameters {
        resolution: 10_000,
        concavity: 0.001,
        cancel: flag,
        progress,
        ..Parameters::default()
    };

    let mut session = Session::new();
    let result = session.compute(
        &points,
        point_count(&points),
        &triangles,
        triangle_count(&triangles),
        &params,
    );

    assert_eq!(result, Err(DecompositionError::Cancelled));
    assert_eq!(
        *stages.lock().unwrap(),
        vec![Stage::Voxelization, Stage::Voxelization, Stage::Splitting]
    );
}
