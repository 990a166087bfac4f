//! # rollout
//!
//! Batched kinematic trajectories for wheeled ground vehicles.
//!
//! A [`Trajectory`] stores six time series -- position, heading, speed,
//! acceleration, angular speed, angular acceleration -- for `n` independent
//! rollouts over `k` timesteps at a fixed discretization step `dt`. Every
//! series has shape `[n, k, d]` (`d = 2` for position, `d = 1` otherwise), so
//! downstream consumers (dynamics, cost functions, rendering) can rely on a
//! fixed tensor rank instead of re-deriving it per call site. This is what
//! lets a planner evaluate `n` candidate rollouts in one vectorized pass
//! rather than looping over episodes.
//!
//! ## Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Trajectory`] | batched time series with append/clip/slice/derived views |
//! | [`state::State`] | a trajectory pinned to `k == 1`: an instantaneous configuration |
//! | [`render::Canvas`] | 2-D drawing target consumed by `render` |
//! | [`sim::Simulator`] | the episode surface a concrete vehicle simulator implements |
//!
//! ## Quick Start
//!
//! ```rust
//! use rollout::Trajectory;
//! use rollout::state::State;
//!
//! // Two rollouts, three timesteps, 10 Hz.
//! let mut traj = Trajectory::zeros(0.1, 2, 3);
//! assert_eq!(traj.position_nk2().dim(), (2, 3, 2));
//!
//! // Grow an episode one step at a time.
//! let step = Trajectory::zeros(0.1, 2, 1);
//! traj.append_along_time_axis(&step).unwrap();
//! assert_eq!(traj.shape(), (2, 4));
//!
//! // The final pose, as a single-timestep state.
//! let current = State::from_trajectory_at_time(&traj, -1).unwrap();
//! assert_eq!(current.shape(), (2, 1));
//! ```
//!
//! ## Ownership & Aliasing
//!
//! A trajectory exclusively owns its series. Accessors return `ArrayView3`
//! borrows, so no caller can mutate a trajectory through a returned view.
//! Derived-view constructors ([`Trajectory::new_from_batch_index`],
//! [`state::State::from_trajectory_at_time`]) produce owned copies that share
//! no mutation path with their source. Instances are single-owner and
//! single-threaded; the borrow checker enforces the no-aliased-mutation
//! contract the design requires.
//!
//! ## What Can Go Wrong
//!
//! All failures are programmer-error-class and surface synchronously at the
//! violating call as an [`Error`]; there is no retry or degraded mode:
//!
//! 1. **Shape mismatch on construction**: a supplied series does not match
//!    the declared `[n, k, d]`.
//! 2. **Appending across batch sizes**: `append_along_time_axis` requires
//!    equal `n`.
//! 3. **Clipping beyond the horizon**: `clip_along_time_axis` truncates, it
//!    never pads.

use ndarray::{concatenate, s, Array3, ArrayView3, Axis};
use thiserror::Error;

pub mod render;
pub mod sim;
pub mod state;

use render::Canvas;

/// Trajectory and state error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Supplied series does not match the declared `[n, k, d]` shape.
    #[error("series shape mismatch: expected [{0}, {1}, {2}], got [{3}, {4}, {5}]")]
    ShapeMismatch(usize, usize, usize, usize, usize, usize),

    /// Append between trajectories of differing batch size.
    #[error("batch size mismatch: {0} vs {1}")]
    BatchSizeMismatch(usize, usize),

    /// Clip requested beyond the current trajectory length.
    #[error("clip horizon {0} exceeds trajectory length {1}")]
    InvalidHorizon(usize, usize),

    /// State constructed with a timestep count other than 1.
    #[error("state requires exactly one timestep, got {0}")]
    InvalidTimestepCount(usize),

    /// Broadcast requested from a batch size that is neither 1 nor the target.
    #[error("cannot broadcast batch size {0} to {1}: source must be 1 or already match")]
    InvalidBroadcastSource(usize, usize),

    /// Time-index extraction outside the trajectory's valid range.
    #[error("time index {0} out of range for trajectory with {1} timesteps")]
    IndexOutOfRange(isize, usize),
}

/// Result type for trajectory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Optional initial values for the six trajectory series.
///
/// Any field left `None` defaults to all-zeros of the correct shape. Supplied
/// arrays are validated against the declared `[n, k, d]` on construction.
#[derive(Debug, Default, Clone)]
pub struct TrajectoryInit {
    pub position_nk2: Option<Array3<f64>>,
    pub speed_nk1: Option<Array3<f64>>,
    pub acceleration_nk1: Option<Array3<f64>>,
    pub heading_nk1: Option<Array3<f64>>,
    pub angular_speed_nk1: Option<Array3<f64>>,
    pub angular_acceleration_nk1: Option<Array3<f64>>,
}

/// Batched time series of a ground-vehicle trajectory.
///
/// `n` is the batch size and `k` the number of timesteps. `dt` and `n` are
/// fixed for the life of the trajectory; `k` changes only through
/// [`append_along_time_axis`](Trajectory::append_along_time_axis) and
/// [`clip_along_time_axis`](Trajectory::clip_along_time_axis).
#[derive(Debug, Clone)]
pub struct Trajectory {
    dt: f64,
    n: usize,
    k: usize,
    position_nk2: Array3<f64>,
    speed_nk1: Array3<f64>,
    acceleration_nk1: Array3<f64>,
    heading_nk1: Array3<f64>,
    angular_speed_nk1: Array3<f64>,
    angular_acceleration_nk1: Array3<f64>,
}

/// Validate one optional series against `[n, k, d]`, defaulting to zeros.
fn series_or_zeros(init: Option<Array3<f64>>, n: usize, k: usize, d: usize) -> Result<Array3<f64>> {
    match init {
        None => Ok(Array3::zeros((n, k, d))),
        Some(arr) => {
            let (an, ak, ad) = arr.dim();
            if (an, ak, ad) != (n, k, d) {
                return Err(Error::ShapeMismatch(n, k, d, an, ak, ad));
            }
            Ok(arr)
        }
    }
}

/// Concatenate two series along the time axis. Batch/feature dims must
/// already agree; the trajectory invariants guarantee that at every call site.
fn concat_time(a: &Array3<f64>, b: &Array3<f64>) -> Array3<f64> {
    concatenate![Axis(1), a.view(), b.view()]
}

impl Trajectory {
    /// Create a zero-filled trajectory of batch size `n` and `k` timesteps.
    ///
    /// `dt` is the discretization step in seconds and must be positive.
    pub fn zeros(dt: f64, n: usize, k: usize) -> Self {
        assert!(dt > 0.0, "dt must be positive");
        Self {
            dt,
            n,
            k,
            position_nk2: Array3::zeros((n, k, 2)),
            speed_nk1: Array3::zeros((n, k, 1)),
            acceleration_nk1: Array3::zeros((n, k, 1)),
            heading_nk1: Array3::zeros((n, k, 1)),
            angular_speed_nk1: Array3::zeros((n, k, 1)),
            angular_acceleration_nk1: Array3::zeros((n, k, 1)),
        }
    }

    /// Create a trajectory from explicit initial values.
    ///
    /// Each supplied series must have shape `[n, k, 2]` for position and
    /// `[n, k, 1]` for the rest; violations fail with
    /// [`Error::ShapeMismatch`]. Unsupplied series default to zeros.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ndarray::Array3;
    /// use rollout::{Trajectory, TrajectoryInit};
    ///
    /// let heading = Array3::from_elem((1, 4, 1), std::f64::consts::FRAC_PI_2);
    /// let traj = Trajectory::new(0.05, 1, 4, TrajectoryInit {
    ///     heading_nk1: Some(heading),
    ///     ..Default::default()
    /// }).unwrap();
    /// assert_eq!(traj.speed_nk1().sum(), 0.0);
    /// ```
    pub fn new(dt: f64, n: usize, k: usize, init: TrajectoryInit) -> Result<Self> {
        assert!(dt > 0.0, "dt must be positive");
        Ok(Self {
            dt,
            n,
            k,
            position_nk2: series_or_zeros(init.position_nk2, n, k, 2)?,
            speed_nk1: series_or_zeros(init.speed_nk1, n, k, 1)?,
            acceleration_nk1: series_or_zeros(init.acceleration_nk1, n, k, 1)?,
            heading_nk1: series_or_zeros(init.heading_nk1, n, k, 1)?,
            angular_speed_nk1: series_or_zeros(init.angular_speed_nk1, n, k, 1)?,
            angular_acceleration_nk1: series_or_zeros(init.angular_acceleration_nk1, n, k, 1)?,
        })
    }

    /// Direct adoption of pre-shaped series, skipping validation.
    ///
    /// Only for internal derived-view operations that guarantee shape
    /// correctness by construction.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        dt: f64,
        n: usize,
        k: usize,
        position_nk2: Array3<f64>,
        speed_nk1: Array3<f64>,
        acceleration_nk1: Array3<f64>,
        heading_nk1: Array3<f64>,
        angular_speed_nk1: Array3<f64>,
        angular_acceleration_nk1: Array3<f64>,
    ) -> Self {
        debug_assert_eq!(position_nk2.dim(), (n, k, 2));
        debug_assert_eq!(speed_nk1.dim(), (n, k, 1));
        Self {
            dt,
            n,
            k,
            position_nk2,
            speed_nk1,
            acceleration_nk1,
            heading_nk1,
            angular_speed_nk1,
            angular_acceleration_nk1,
        }
    }

    /// Discretization step in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Batch size.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of timesteps.
    pub fn k(&self) -> usize {
        self.k
    }

    /// `(n, k)` batch/time shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.k)
    }

    /// Positions, shape `[n, k, 2]`.
    pub fn position_nk2(&self) -> ArrayView3<'_, f64> {
        self.position_nk2.view()
    }

    /// Linear speeds, shape `[n, k, 1]`.
    pub fn speed_nk1(&self) -> ArrayView3<'_, f64> {
        self.speed_nk1.view()
    }

    /// Linear accelerations, shape `[n, k, 1]`.
    pub fn acceleration_nk1(&self) -> ArrayView3<'_, f64> {
        self.acceleration_nk1.view()
    }

    /// Headings in radians, shape `[n, k, 1]`.
    pub fn heading_nk1(&self) -> ArrayView3<'_, f64> {
        self.heading_nk1.view()
    }

    /// Angular speeds, shape `[n, k, 1]`.
    pub fn angular_speed_nk1(&self) -> ArrayView3<'_, f64> {
        self.angular_speed_nk1.view()
    }

    /// Angular accelerations, shape `[n, k, 1]`.
    pub fn angular_acceleration_nk1(&self) -> ArrayView3<'_, f64> {
        self.angular_acceleration_nk1.view()
    }

    /// Pose view: position and heading concatenated along the feature axis,
    /// shape `[n, k, 3]`.
    pub fn position_and_heading(&self) -> Array3<f64> {
        concatenate![Axis(2), self.position_nk2.view(), self.heading_nk1.view()]
    }

    /// Velocity view: speed and angular speed, shape `[n, k, 2]`.
    pub fn speed_and_angular_speed(&self) -> Array3<f64> {
        concatenate![Axis(2), self.speed_nk1.view(), self.angular_speed_nk1.view()]
    }

    /// Full configuration view: pose plus velocities, shape `[n, k, 5]`.
    pub fn position_heading_speed_and_angular_speed(&self) -> Array3<f64> {
        let pose = self.position_and_heading();
        let velocity = self.speed_and_angular_speed();
        concatenate![Axis(2), pose, velocity]
    }

    /// Extract the rollout at `batch_idx` as an independent `n = 1`
    /// trajectory.
    ///
    /// The result owns copies of the sliced series and shares no mutation
    /// path with `self`.
    ///
    /// # Panics
    ///
    /// Panics if `batch_idx >= n`.
    pub fn new_from_batch_index(&self, batch_idx: usize) -> Self {
        assert!(batch_idx < self.n, "batch index out of range");
        let slice = s![batch_idx..batch_idx + 1, .., ..];
        Self::from_parts(
            self.dt,
            1,
            self.k,
            self.position_nk2.slice(slice).to_owned(),
            self.speed_nk1.slice(slice).to_owned(),
            self.acceleration_nk1.slice(slice).to_owned(),
            self.heading_nk1.slice(slice).to_owned(),
            self.angular_speed_nk1.slice(slice).to_owned(),
            self.angular_acceleration_nk1.slice(slice).to_owned(),
        )
    }

    /// Concatenate `other` onto the end of this trajectory along the time
    /// axis, in place. Useful for assembling a full episode from per-step
    /// fragments.
    ///
    /// Fails with [`Error::BatchSizeMismatch`] if the batch sizes differ.
    pub fn append_along_time_axis(&mut self, other: &Trajectory) -> Result<()> {
        if self.n != other.n {
            return Err(Error::BatchSizeMismatch(self.n, other.n));
        }

        self.position_nk2 = concat_time(&self.position_nk2, &other.position_nk2);
        self.speed_nk1 = concat_time(&self.speed_nk1, &other.speed_nk1);
        self.acceleration_nk1 = concat_time(&self.acceleration_nk1, &other.acceleration_nk1);
        self.heading_nk1 = concat_time(&self.heading_nk1, &other.heading_nk1);
        self.angular_speed_nk1 = concat_time(&self.angular_speed_nk1, &other.angular_speed_nk1);
        self.angular_acceleration_nk1 = concat_time(
            &self.angular_acceleration_nk1,
            &other.angular_acceleration_nk1,
        );
        self.k += other.k;
        Ok(())
    }

    /// Truncate the trajectory to its first `horizon` timesteps, in place.
    ///
    /// A no-op when `horizon == k`. Fails with [`Error::InvalidHorizon`] when
    /// `horizon > k`: clipping truncates, it never pads.
    pub fn clip_along_time_axis(&mut self, horizon: usize) -> Result<()> {
        if self.k == horizon {
            return Ok(());
        }
        if horizon > self.k {
            return Err(Error::InvalidHorizon(horizon, self.k));
        }

        let slice = s![.., ..horizon, ..];
        self.position_nk2 = self.position_nk2.slice(slice).to_owned();
        self.speed_nk1 = self.speed_nk1.slice(slice).to_owned();
        self.acceleration_nk1 = self.acceleration_nk1.slice(slice).to_owned();
        self.heading_nk1 = self.heading_nk1.slice(slice).to_owned();
        self.angular_speed_nk1 = self.angular_speed_nk1.slice(slice).to_owned();
        self.angular_acceleration_nk1 = self.angular_acceleration_nk1.slice(slice).to_owned();
        self.k = horizon;
        Ok(())
    }

    /// Draw the rollout at `batch_idx` onto `canvas`: the position path as a
    /// connected line, plus unit heading arrows every `stride` timesteps.
    ///
    /// # Panics
    ///
    /// Panics if `batch_idx >= n`. A `stride` of 0 is treated as 1.
    pub fn render(&self, canvas: &mut dyn Canvas, batch_idx: usize, stride: usize) {
        assert!(batch_idx < self.n, "batch index out of range");
        let stride = stride.max(1);

        let points: Vec<[f64; 2]> = (0..self.k)
            .map(|t| {
                [
                    self.position_nk2[[batch_idx, t, 0]],
                    self.position_nk2[[batch_idx, t, 1]],
                ]
            })
            .collect();
        canvas.polyline(&points);

        let origins: Vec<[f64; 2]> = points.iter().step_by(stride).copied().collect();
        let directions: Vec<[f64; 2]> = (0..self.k)
            .step_by(stride)
            .map(|t| {
                let theta = self.heading_nk1[[batch_idx, t, 0]];
                [theta.cos(), theta.sin()]
            })
            .collect();
        canvas.arrows(&origins, &directions);
    }

    /// Draw the speed and angular-speed profiles of the rollout at
    /// `batch_idx` against time, one profile per canvas.
    ///
    /// # Panics
    ///
    /// Panics if `batch_idx >= n`.
    pub fn render_velocities(
        &self,
        speed_canvas: &mut dyn Canvas,
        angular_speed_canvas: &mut dyn Canvas,
        batch_idx: usize,
    ) {
        assert!(batch_idx < self.n, "batch index out of range");

        let speeds: Vec<[f64; 2]> = (0..self.k)
            .map(|t| [t as f64 * self.dt, self.speed_nk1[[batch_idx, t, 0]]])
            .collect();
        speed_canvas.polyline(&speeds);

        let omegas: Vec<[f64; 2]> = (0..self.k)
            .map(|t| [t as f64 * self.dt, self.angular_speed_nk1[[batch_idx, t, 0]]])
            .collect();
        angular_speed_canvas.polyline(&omegas);
    }
}
