use ndarray::Array3;
use rollout::state::State;
use rollout::{Error, Trajectory, TrajectoryInit};

/// The planner/simulator handshake: the simulator holds a single current
/// state, the planner fans it out to a batch of candidate rollouts, and the
/// simulator pulls the next current state off the chosen rollout's tail.
#[test]
fn broadcast_rollout_extract_cycle() {
    let dt = 0.05;

    // Current pose: off-origin, heading north-east.
    let current = State::new(
        dt,
        1,
        1,
        TrajectoryInit {
            position_nk2: Some(Array3::from_shape_vec((1, 1, 2), vec![1.0, 2.0]).unwrap()),
            heading_nk1: Some(Array3::from_elem((1, 1, 1), 0.78)),
            speed_nk1: Some(Array3::from_elem((1, 1, 1), 0.4)),
            ..Default::default()
        },
    )
    .unwrap();

    // Fan out to 8 candidate rollouts. Every replica starts identical.
    let batched = current.broadcast_to_batch_size(8).unwrap();
    assert_eq!(batched.shape(), (8, 1));
    for i in 0..8 {
        assert_eq!(batched.position_nk2()[[i, 0, 0]], 1.0);
        assert_eq!(batched.position_nk2()[[i, 0, 1]], 2.0);
        assert_eq!(batched.heading_nk1()[[i, 0, 0]], 0.78);
        assert_eq!(batched.speed_nk1()[[i, 0, 0]], 0.4);
    }

    // Roll the batch forward three steps (contents irrelevant here, the
    // shape bookkeeping is what's under test).
    let mut rollouts = batched.into_trajectory();
    for _ in 0..3 {
        rollouts
            .append_along_time_axis(&Trajectory::zeros(dt, 8, 1))
            .unwrap();
    }
    assert_eq!(rollouts.shape(), (8, 4));

    // Pick a rollout and pull its final configuration as the next state.
    let chosen = rollouts.new_from_batch_index(3);
    let next = State::from_trajectory_at_time(&chosen, -1).unwrap();
    assert_eq!(next.shape(), (1, 1));
}

#[test]
fn tail_sentinel_equals_explicit_last_index() {
    // Build an episode whose speed encodes the timestep, so the tail is
    // unambiguous.
    let dt = 0.1;
    let mut episode = Trajectory::zeros(dt, 3, 1);
    for t in 1..6 {
        let step = Trajectory::new(
            dt,
            3,
            1,
            TrajectoryInit {
                speed_nk1: Some(Array3::from_elem((3, 1, 1), t as f64)),
                ..Default::default()
            },
        )
        .unwrap();
        episode.append_along_time_axis(&step).unwrap();
    }

    let by_sentinel = State::from_trajectory_at_time(&episode, -1).unwrap();
    let by_index = State::from_trajectory_at_time(&episode, episode.k() as isize - 1).unwrap();

    assert_eq!(by_sentinel.speed_nk1(), by_index.speed_nk1());
    assert_eq!(by_sentinel.speed_nk1()[[0, 0, 0]], 5.0);
    // The sentinel selects exactly one timestep, not a wraparound slice.
    assert_eq!(by_sentinel.shape(), (3, 1));
}

#[test]
fn extracted_state_is_independent_of_episode() {
    let mut episode = Trajectory::zeros(0.1, 2, 4);
    let state = State::from_trajectory_at_time(&episode, 2).unwrap();

    // Truncating the episode afterwards must not disturb the state.
    episode.clip_along_time_axis(1).unwrap();
    assert_eq!(state.shape(), (2, 1));
    assert_eq!(state.position_nk2().sum(), 0.0);
}

#[test]
fn invalid_constructions_fail_loudly() {
    // A two-step state is rejected outright.
    assert!(matches!(
        State::new(0.1, 1, 2, TrajectoryInit::default()).unwrap_err(),
        Error::InvalidTimestepCount(2)
    ));

    // Broadcasting from a multi-rollout state to a different width is
    // ambiguous and rejected.
    let wide = State::zeros(0.1, 4);
    assert!(matches!(
        wide.broadcast_to_batch_size(6).unwrap_err(),
        Error::InvalidBroadcastSource(4, 6)
    ));

    // Time extraction past the end.
    let episode = Trajectory::zeros(0.1, 1, 4);
    assert!(matches!(
        State::from_trajectory_at_time(&episode, 4).unwrap_err(),
        Error::IndexOutOfRange(4, 4)
    ));
}
