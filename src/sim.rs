//! Simulator boundary and the validation-episode loop.
//!
//! The crate does not implement vehicle dynamics, obstacle maps, or metric
//! semantics; those live behind the [`Simulator`] trait. What lives here is
//! the episode loop that every validation run shares: seed the simulator
//! once, then for each validation goal re-sample (`reset(-1)`), simulate,
//! collect per-episode metrics, and draw the episode onto its canvas. The
//! loop ends by folding the per-episode metrics through the simulator's
//! aggregator.
//!
//! Parameters and metrics are serde-serializable so the surrounding harness
//! can persist both as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::render::Canvas;

/// Scalar metrics reported by one validation episode.
///
/// Keys and their meaning belong to the simulator implementation; the
/// ordered map keeps JSON dumps stable across runs.
pub type EpisodeMetrics = BTreeMap<String, f64>;

/// Parameter source for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorParams {
    /// Discretization step in seconds.
    pub dt: f64,
    /// Number of validation goals (episodes) to simulate.
    pub num_validation_goals: usize,
    /// Maximum timesteps per episode.
    pub episode_horizon: usize,
    /// RNG seed for the first episode; later episodes reuse the stream.
    pub seed: i64,
    /// Simulator selector, resolved by the external harness.
    pub simulator: String,
    /// Termination reasons the aggregator should break metrics down by.
    #[serde(default)]
    pub episode_termination_reasons: Vec<String>,
}

/// A validation-episode simulator.
///
/// Implementations own their dynamics model, obstacle map, and metric
/// definitions; this crate's [`Trajectory`](crate::Trajectory) and
/// [`State`](crate::state::State) are the data they manipulate internally
/// and expose through `render`.
pub trait Simulator {
    /// Re-sample start and goal. A `seed` of `-1` keeps the current RNG
    /// stream; any other value reseeds it.
    fn reset(&mut self, seed: i64);

    /// Run one episode to termination or horizon.
    fn simulate(&mut self);

    /// Metrics for the most recent episode.
    fn get_metrics(&self) -> EpisodeMetrics;

    /// Draw the most recent episode, with heading arrows every `stride`
    /// timesteps.
    fn render(&self, canvas: &mut dyn Canvas, stride: usize);

    /// Draw the speed and angular-speed profiles of the most recent episode.
    fn render_velocities(
        &self,
        speed_canvas: &mut dyn Canvas,
        angular_speed_canvas: &mut dyn Canvas,
    );

    /// Aggregate per-episode metrics into a run summary, broken down by the
    /// given termination reasons.
    fn collect_metrics(
        episodes: &[EpisodeMetrics],
        termination_reasons: &[String],
    ) -> EpisodeMetrics;
}

/// Outcome of a validation run: per-episode metrics plus their aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub episodes: Vec<EpisodeMetrics>,
    pub summary: EpisodeMetrics,
}

/// Heading arrows roughly every 4% of the episode reads well at any horizon.
fn render_stride(episode_horizon: usize) -> usize {
    (episode_horizon / 25).max(1)
}

/// Run `num_validation_goals` episodes and aggregate their metrics.
///
/// The simulator is seeded once with `params.seed`; every later episode
/// calls `reset(-1)` so goals are drawn from the same stream. Episode `i`
/// renders onto `canvases[i]`.
///
/// # Panics
///
/// Panics unless `canvases.len() == params.num_validation_goals`.
pub fn run_validation_episodes<S, C>(
    sim: &mut S,
    params: &SimulatorParams,
    canvases: &mut [C],
) -> ValidationReport
where
    S: Simulator,
    C: Canvas,
{
    run(sim, params, canvases, None)
}

/// [`run_validation_episodes`], additionally drawing per-episode speed and
/// angular-speed profiles onto the two control canvas slices.
///
/// # Panics
///
/// Panics unless all three canvas slices have length
/// `params.num_validation_goals`.
pub fn run_validation_episodes_with_controls<S, C>(
    sim: &mut S,
    params: &SimulatorParams,
    canvases: &mut [C],
    speed_canvases: &mut [C],
    angular_speed_canvases: &mut [C],
) -> ValidationReport
where
    S: Simulator,
    C: Canvas,
{
    run(sim, params, canvases, Some((speed_canvases, angular_speed_canvases)))
}

fn run<S, C>(
    sim: &mut S,
    params: &SimulatorParams,
    canvases: &mut [C],
    mut controls: Option<(&mut [C], &mut [C])>,
) -> ValidationReport
where
    S: Simulator,
    C: Canvas,
{
    assert_eq!(
        canvases.len(),
        params.num_validation_goals,
        "one canvas per validation goal"
    );
    if let Some((speed, angular)) = &controls {
        assert_eq!(speed.len(), params.num_validation_goals, "one speed canvas per goal");
        assert_eq!(angular.len(), params.num_validation_goals, "one angular canvas per goal");
    }

    let stride = render_stride(params.episode_horizon);
    let mut episodes = Vec::with_capacity(params.num_validation_goals);

    sim.reset(params.seed);
    for i in 0..params.num_validation_goals {
        if i != 0 {
            sim.reset(-1);
        }
        tracing::info!(goal = i, "simulating validation goal");
        sim.simulate();
        episodes.push(sim.get_metrics());

        sim.render(&mut canvases[i], stride);
        if let Some((speed, angular)) = &mut controls {
            sim.render_velocities(&mut speed[i], &mut angular[i]);
        }
    }

    let summary = S::collect_metrics(&episodes, &params.episode_termination_reasons);
    tracing::debug!(episodes = episodes.len(), "validation run complete");

    ValidationReport { episodes, summary }
}
