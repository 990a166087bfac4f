use ndarray::{s, Array3};
use rollout::{Trajectory, TrajectoryInit};

/// The ramp fixture: n=2, k=3, dt=0.1, position [[0,0],[1,0],[2,0]] per batch.
fn ramp() -> Trajectory {
    let position = Array3::from_shape_vec(
        (2, 3, 2),
        vec![
            0.0, 0.0, 1.0, 0.0, 2.0, 0.0, // batch 0
            0.0, 0.0, 1.0, 0.0, 2.0, 0.0, // batch 1
        ],
    )
    .unwrap();
    Trajectory::new(
        0.1,
        2,
        3,
        TrajectoryInit {
            position_nk2: Some(position),
            ..Default::default()
        },
    )
    .unwrap()
}

/// A k=1 fragment with position [[3,0]] per batch and a marker speed.
fn tail_step() -> Trajectory {
    Trajectory::new(
        0.1,
        2,
        1,
        TrajectoryInit {
            position_nk2: Some(Array3::from_shape_vec((2, 1, 2), vec![3.0, 0.0, 3.0, 0.0]).unwrap()),
            speed_nk1: Some(Array3::from_elem((2, 1, 1), 10.0)),
            ..Default::default()
        },
    )
    .unwrap()
}

#[test]
fn ramp_clip_then_append_scenario() {
    // Real use-case: a simulator truncates an episode at termination, then
    // splices on the post-termination pose.
    let mut traj = ramp();

    traj.clip_along_time_axis(2).unwrap();
    assert_eq!(traj.shape(), (2, 2));
    for b in 0..2 {
        assert_eq!(traj.position_nk2()[[b, 0, 0]], 0.0);
        assert_eq!(traj.position_nk2()[[b, 1, 0]], 1.0);
    }

    traj.append_along_time_axis(&tail_step()).unwrap();
    assert_eq!(traj.shape(), (2, 3));
    for b in 0..2 {
        assert_eq!(traj.position_nk2()[[b, 0, 0]], 0.0);
        assert_eq!(traj.position_nk2()[[b, 1, 0]], 1.0);
        assert_eq!(traj.position_nk2()[[b, 2, 0]], 3.0);
        assert_eq!(traj.speed_nk1()[[b, 2, 0]], 10.0);
    }
}

#[test]
fn append_preserves_both_halves_exactly() {
    // Fill every series of A and B with distinguishable content, then check
    // that slicing the concatenation reproduces each half across all six
    // fields.
    let fill = |n: usize, k: usize, offset: f64| -> Trajectory {
        let pos: Vec<f64> = (0..n * k * 2).map(|i| offset + i as f64).collect();
        let scalar = |mult: f64| -> Option<Array3<f64>> {
            let v: Vec<f64> = (0..n * k).map(|i| offset + mult * i as f64).collect();
            Some(Array3::from_shape_vec((n, k, 1), v).unwrap())
        };
        Trajectory::new(
            0.1,
            n,
            k,
            TrajectoryInit {
                position_nk2: Some(Array3::from_shape_vec((n, k, 2), pos).unwrap()),
                speed_nk1: scalar(2.0),
                acceleration_nk1: scalar(3.0),
                heading_nk1: scalar(5.0),
                angular_speed_nk1: scalar(7.0),
                angular_acceleration_nk1: scalar(11.0),
            },
        )
        .unwrap()
    };

    let a = fill(2, 3, 0.0);
    let b = fill(2, 2, 100.0);
    let (k1, k2) = (a.k(), b.k());

    let mut joined = a.clone();
    joined.append_along_time_axis(&b).unwrap();
    assert_eq!(joined.k(), k1 + k2);

    let head = s![.., ..k1, ..];
    let tail = s![.., k1.., ..];
    assert_eq!(joined.position_nk2().slice(head), a.position_nk2());
    assert_eq!(joined.position_nk2().slice(tail), b.position_nk2());
    assert_eq!(joined.speed_nk1().slice(head), a.speed_nk1());
    assert_eq!(joined.speed_nk1().slice(tail), b.speed_nk1());
    assert_eq!(joined.acceleration_nk1().slice(head), a.acceleration_nk1());
    assert_eq!(joined.acceleration_nk1().slice(tail), b.acceleration_nk1());
    assert_eq!(joined.heading_nk1().slice(head), a.heading_nk1());
    assert_eq!(joined.heading_nk1().slice(tail), b.heading_nk1());
    assert_eq!(joined.angular_speed_nk1().slice(head), a.angular_speed_nk1());
    assert_eq!(joined.angular_speed_nk1().slice(tail), b.angular_speed_nk1());
    assert_eq!(
        joined.angular_acceleration_nk1().slice(head),
        a.angular_acceleration_nk1()
    );
    assert_eq!(
        joined.angular_acceleration_nk1().slice(tail),
        b.angular_acceleration_nk1()
    );
}

#[test]
fn clip_is_idempotent() {
    let mut traj = ramp();
    traj.clip_along_time_axis(2).unwrap();
    let snapshot = traj.position_nk2().to_owned();

    // Second clip to the same horizon is a no-op.
    traj.clip_along_time_axis(2).unwrap();
    assert_eq!(traj.k(), 2);
    assert_eq!(traj.position_nk2(), snapshot.view());
}

#[test]
fn batch_extraction_matches_source_slice() {
    let mut a = ramp();
    // Make the batches distinguishable before slicing.
    a.append_along_time_axis(&tail_step()).unwrap();
    let single = a.new_from_batch_index(1);

    assert_eq!(single.shape(), (1, 4));
    assert_eq!(
        single.position_nk2().slice(s![0, .., ..]),
        a.position_nk2().slice(s![1, .., ..])
    );
    assert_eq!(
        single.speed_nk1().slice(s![0, .., ..]),
        a.speed_nk1().slice(s![1, .., ..])
    );
    assert_eq!(
        single.heading_nk1().slice(s![0, .., ..]),
        a.heading_nk1().slice(s![1, .., ..])
    );
    assert_eq!(
        single.angular_speed_nk1().slice(s![0, .., ..]),
        a.angular_speed_nk1().slice(s![1, .., ..])
    );
}
