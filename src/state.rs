//! Instantaneous vehicle state: a trajectory of exactly one timestep.
//!
//! A [`State`] is the interface object between planner and simulator: the
//! simulator holds one as "current pose" and hands it to the planner as the
//! initial condition for the next planning cycle. It is a [`Trajectory`] with
//! the extra invariant `k == 1`, enforced at every constructor.
//!
//! Two constructors exist beyond the trajectory ones:
//!
//! - [`State::broadcast_to_batch_size`] replicates a single-rollout state
//!   across `n` candidate rollouts so a batched planner can fan out from one
//!   initial condition.
//! - [`State::from_trajectory_at_time`] extracts the configuration at one
//!   timestep of an episode (with `-1` meaning the final step).

use ndarray::{s, Array3, ArrayView3, Axis};

use crate::{Error, Result, Trajectory, TrajectoryInit};

/// A single-timestep trajectory representing an instantaneous configuration.
///
/// Dereferences to [`Trajectory`] for all read access; there is no mutable
/// access to the inner trajectory, so the `k == 1` invariant cannot be broken
/// after construction.
#[derive(Debug, Clone)]
pub struct State {
    traj: Trajectory,
}

/// Replicate the single batch row of `a` (shape `[1, k, d]`) `n` times.
fn tile_batch(a: &ArrayView3<'_, f64>, n: usize) -> Array3<f64> {
    let (_, k, d) = a.dim();
    let row = a.index_axis(Axis(0), 0);
    let mut out = Array3::zeros((n, k, d));
    for mut dst in out.outer_iter_mut() {
        dst.assign(&row);
    }
    out
}

impl State {
    /// Create a state from explicit initial values.
    ///
    /// Identical in shape to [`Trajectory::new`] but fails with
    /// [`Error::InvalidTimestepCount`] unless `k == 1`.
    pub fn new(dt: f64, n: usize, k: usize, init: TrajectoryInit) -> Result<Self> {
        if k != 1 {
            return Err(Error::InvalidTimestepCount(k));
        }
        Ok(Self {
            traj: Trajectory::new(dt, n, k, init)?,
        })
    }

    /// Create a zero state (origin pose, at rest) of batch size `n`.
    pub fn zeros(dt: f64, n: usize) -> Self {
        Self {
            traj: Trajectory::zeros(dt, n, 1),
        }
    }

    /// Wrap an existing trajectory as a state.
    ///
    /// Fails with [`Error::InvalidTimestepCount`] unless `trajectory.k() == 1`.
    pub fn from_trajectory(trajectory: Trajectory) -> Result<Self> {
        if trajectory.k() != 1 {
            return Err(Error::InvalidTimestepCount(trajectory.k()));
        }
        Ok(Self { traj: trajectory })
    }

    /// Consume the state, yielding the underlying single-step trajectory.
    pub fn into_trajectory(self) -> Trajectory {
        self.traj
    }

    /// Broadcast this state to batch size `n`.
    ///
    /// When the batch size already matches, the state is returned unchanged
    /// (a move, not a copy). Otherwise the source must have batch size 1 and
    /// each series is replicated `n` times; any other source batch size fails
    /// with [`Error::InvalidBroadcastSource`].
    pub fn broadcast_to_batch_size(self, n: usize) -> Result<Self> {
        if self.traj.n() == n {
            return Ok(self);
        }
        if self.traj.n() != 1 {
            return Err(Error::InvalidBroadcastSource(self.traj.n(), n));
        }

        let traj = Trajectory::from_parts(
            self.traj.dt(),
            n,
            1,
            tile_batch(&self.traj.position_nk2(), n),
            tile_batch(&self.traj.speed_nk1(), n),
            tile_batch(&self.traj.acceleration_nk1(), n),
            tile_batch(&self.traj.heading_nk1(), n),
            tile_batch(&self.traj.angular_speed_nk1(), n),
            tile_batch(&self.traj.angular_acceleration_nk1(), n),
        );
        Ok(Self { traj })
    }

    /// Extract the state at timestep `t` of `trajectory`.
    ///
    /// `t == -1` is a sentinel for the final timestep. Any other `t` selects
    /// the single-element slice `[t, t+1)`. Out-of-range indices (including
    /// `-1` on an empty trajectory) fail with [`Error::IndexOutOfRange`].
    pub fn from_trajectory_at_time(trajectory: &Trajectory, t: isize) -> Result<Self> {
        let k = trajectory.k();
        let idx = if t == -1 {
            if k == 0 {
                return Err(Error::IndexOutOfRange(t, k));
            }
            k - 1
        } else {
            if t < 0 || t as usize >= k {
                return Err(Error::IndexOutOfRange(t, k));
            }
            t as usize
        };

        let slice = s![.., idx..idx + 1, ..];
        let traj = Trajectory::from_parts(
            trajectory.dt(),
            trajectory.n(),
            1,
            trajectory.position_nk2().slice(slice).to_owned(),
            trajectory.speed_nk1().slice(slice).to_owned(),
            trajectory.acceleration_nk1().slice(slice).to_owned(),
            trajectory.heading_nk1().slice(slice).to_owned(),
            trajectory.angular_speed_nk1().slice(slice).to_owned(),
            trajectory.angular_acceleration_nk1().slice(slice).to_owned(),
        );
        Ok(Self { traj })
    }
}

impl std::ops::Deref for State {
    type Target = Trajectory;

    fn deref(&self) -> &Trajectory {
        &self.traj
    }
}

impl From<State> for Trajectory {
    fn from(state: State) -> Trajectory {
        state.traj
    }
}
