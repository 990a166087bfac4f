//! Validation episodes for a noisy unicycle.
//!
//! Implements the [`Simulator`] surface with a proportional heading
//! controller whose commands carry Gaussian actuation noise, runs a batch of
//! validation goals through the episode harness, and dumps the parameters
//! and the aggregated metrics as JSON -- the same artifacts the surrounding
//! tooling would persist.
//!
//! Run: cargo run --example unicycle_validation

use ndarray::Array3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rollout::render::{Canvas, RecordingCanvas};
use rollout::sim::{
    run_validation_episodes_with_controls, EpisodeMetrics, Simulator, SimulatorParams,
};
use rollout::state::State;
use rollout::{Trajectory, TrajectoryInit};

struct NoisyUnicycle {
    dt: f64,
    horizon: usize,
    rng: ChaCha8Rng,
    noise: Normal<f64>,
    goal: [f64; 2],
    state: State,
    episode: Option<Trajectory>,
}

impl NoisyUnicycle {
    fn new(dt: f64, horizon: usize) -> Self {
        Self {
            dt,
            horizon,
            rng: ChaCha8Rng::seed_from_u64(0),
            noise: Normal::new(0.0, 0.05).expect("valid std dev"),
            goal: [0.0, 0.0],
            state: State::zeros(dt, 1),
            episode: None,
        }
    }

    fn episode(&self) -> &Trajectory {
        self.episode.as_ref().expect("simulate() not called yet")
    }
}

impl Simulator for NoisyUnicycle {
    fn reset(&mut self, seed: i64) {
        if seed >= 0 {
            self.rng = ChaCha8Rng::seed_from_u64(seed as u64);
        }
        self.goal = [self.rng.gen_range(-4.0..4.0), self.rng.gen_range(-4.0..4.0)];
        self.state = State::zeros(self.dt, 1);
        self.episode = None;
    }

    fn simulate(&mut self) {
        let dt = self.dt;
        let mut traj = self.state.clone().into_trajectory();
        let mut x = traj.position_nk2()[[0, 0, 0]];
        let mut y = traj.position_nk2()[[0, 0, 1]];
        let mut theta = traj.heading_nk1()[[0, 0, 0]];
        let mut prev_omega = 0.0;

        for _ in 0..self.horizon {
            let target = (self.goal[1] - y).atan2(self.goal[0] - x);
            let err = target - theta;
            let omega = 2.0 * err.sin().atan2(err.cos()) + self.noise.sample(&mut self.rng);
            let v = 1.0 + self.noise.sample(&mut self.rng);

            theta += omega * dt;
            x += v * theta.cos() * dt;
            y += v * theta.sin() * dt;

            let step = Trajectory::new(
                dt,
                1,
                1,
                TrajectoryInit {
                    position_nk2: Some(Array3::from_shape_vec((1, 1, 2), vec![x, y]).unwrap()),
                    speed_nk1: Some(Array3::from_elem((1, 1, 1), v)),
                    heading_nk1: Some(Array3::from_elem((1, 1, 1), theta)),
                    angular_speed_nk1: Some(Array3::from_elem((1, 1, 1), omega)),
                    angular_acceleration_nk1: Some(Array3::from_elem(
                        (1, 1, 1),
                        (omega - prev_omega) / dt,
                    )),
                    ..Default::default()
                },
            )
            .expect("step series match the declared shape");
            traj.append_along_time_axis(&step).expect("batch sizes match");
            prev_omega = omega;
        }

        traj.clip_along_time_axis(self.horizon).expect("horizon within length");
        self.state = State::from_trajectory_at_time(&traj, -1).expect("non-empty episode");
        self.episode = Some(traj);
    }

    fn get_metrics(&self) -> EpisodeMetrics {
        let traj = self.episode();
        let last = traj.k() - 1;
        let dx = traj.position_nk2()[[0, last, 0]] - self.goal[0];
        let dy = traj.position_nk2()[[0, last, 1]] - self.goal[1];

        let mut m = EpisodeMetrics::new();
        m.insert("final_goal_distance".into(), (dx * dx + dy * dy).sqrt());
        m.insert("episode_length".into(), traj.k() as f64);
        m
    }

    fn render(&self, canvas: &mut dyn Canvas, stride: usize) {
        self.episode().render(canvas, 0, stride);
    }

    fn render_velocities(
        &self,
        speed_canvas: &mut dyn Canvas,
        angular_speed_canvas: &mut dyn Canvas,
    ) {
        self.episode()
            .render_velocities(speed_canvas, angular_speed_canvas, 0);
    }

    fn collect_metrics(
        episodes: &[EpisodeMetrics],
        _termination_reasons: &[String],
    ) -> EpisodeMetrics {
        let n = episodes.len() as f64;
        let mean_dist =
            episodes.iter().map(|m| m["final_goal_distance"]).sum::<f64>() / n;
        let successes = episodes
            .iter()
            .filter(|m| m["final_goal_distance"] < 0.5)
            .count() as f64;

        let mut m = EpisodeMetrics::new();
        m.insert("num_episodes".into(), n);
        m.insert("mean_final_goal_distance".into(), mean_dist);
        m.insert("success_rate".into(), successes / n);
        m
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let params = SimulatorParams {
        dt: 0.1,
        num_validation_goals: 9,
        episode_horizon: 120,
        seed: 42,
        simulator: "noisy_unicycle".into(),
        episode_termination_reasons: vec![],
    };
    println!("params: {}", serde_json::to_string_pretty(&params)?);

    let mut sim = NoisyUnicycle::new(params.dt, params.episode_horizon);
    let goals = params.num_validation_goals;
    let mut canvases = vec![RecordingCanvas::new(); goals];
    let mut speed_canvases = vec![RecordingCanvas::new(); goals];
    let mut angular_canvases = vec![RecordingCanvas::new(); goals];

    let report = run_validation_episodes_with_controls(
        &mut sim,
        &params,
        &mut canvases,
        &mut speed_canvases,
        &mut angular_canvases,
    );

    for (i, episode) in report.episodes.iter().enumerate() {
        println!(
            "goal #{i}: final distance {:.3} m over {} steps",
            episode["final_goal_distance"], episode["episode_length"]
        );
    }
    println!("metrics: {}", serde_json::to_string_pretty(&report.summary)?);
    Ok(())
}
