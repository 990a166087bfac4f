//! Batched figure-eight rollouts.
//!
//! Builds a batch of lemniscate trajectories at different scales in one shot,
//! exercises the derived views and the clip/append episode assembly, then
//! renders one rollout onto a recording canvas and reports what was drawn.
//!
//! Run: cargo run --example figure_eight_rollout

use ndarray::Array3;
use rollout::render::RecordingCanvas;
use rollout::state::State;
use rollout::{Trajectory, TrajectoryInit};

/// Figure-eight position and heading at parameter `s` for a given scale.
fn lemniscate(s: f64, scale: f64) -> ([f64; 2], f64) {
    let x = scale * s.sin();
    let y = scale * s.sin() * s.cos();
    // Heading along the tangent.
    let dx = scale * s.cos();
    let dy = scale * (s.cos() * s.cos() - s.sin() * s.sin());
    ([x, y], dy.atan2(dx))
}

fn main() {
    let dt = 0.05;
    let n = 3;
    let k = 200;
    let scales = [1.0, 2.0, 4.0];

    // -- Fill the batched series analytically --
    let mut position = Array3::zeros((n, k, 2));
    let mut heading = Array3::zeros((n, k, 1));
    let mut speed = Array3::zeros((n, k, 1));
    for (b, &scale) in scales.iter().enumerate() {
        for t in 0..k {
            let s = 2.0 * std::f64::consts::PI * t as f64 / k as f64;
            let ([x, y], theta) = lemniscate(s, scale);
            position[[b, t, 0]] = x;
            position[[b, t, 1]] = y;
            heading[[b, t, 0]] = theta;
            speed[[b, t, 0]] = scale; // larger loops are traced faster
        }
    }

    let traj = Trajectory::new(
        dt,
        n,
        k,
        TrajectoryInit {
            position_nk2: Some(position),
            heading_nk1: Some(heading),
            speed_nk1: Some(speed),
            ..Default::default()
        },
    )
    .expect("series match the declared shape");

    println!("batched rollout: n={}, k={}, dt={}", traj.n(), traj.k(), traj.dt());

    // -- Derived views --
    let full = traj.position_heading_speed_and_angular_speed();
    println!("configuration view shape: {:?}", full.dim());

    // -- Episode assembly: take the first half, splice the second half back --
    let mut episode = traj.clone();
    episode.clip_along_time_axis(k / 2).expect("half horizon is valid");
    let mut second_half = Trajectory::zeros(dt, n, 0);
    for t in k / 2..k {
        let state = State::from_trajectory_at_time(&traj, t as isize)
            .expect("t is within the horizon");
        second_half
            .append_along_time_axis(&state.into_trajectory())
            .expect("batch sizes match");
    }
    episode
        .append_along_time_axis(&second_half)
        .expect("batch sizes match");
    println!("reassembled episode: {} timesteps", episode.k());

    // -- Render the widest rollout --
    let mut canvas = RecordingCanvas::new();
    episode.render(&mut canvas, 2, 8);
    let (origins, _) = &canvas.arrow_fields[0];
    println!(
        "rendered rollout 2: {} path points, {} heading arrows",
        canvas.polylines[0].len(),
        origins.len()
    );
}
