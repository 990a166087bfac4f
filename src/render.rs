//! Drawing-surface boundary.
//!
//! Trajectories draw themselves onto anything implementing [`Canvas`]: a
//! connected line plot for paths and profiles, and a vector field for heading
//! arrows. A plotting backend lives outside this crate; the in-memory
//! [`RecordingCanvas`] stands in for one in tests and demos.

/// A 2-D drawing target accepting line-plot and vector-field draw calls.
pub trait Canvas {
    /// Draw a connected line through `points`.
    fn polyline(&mut self, points: &[[f64; 2]]);

    /// Draw one arrow per origin, pointing along the matching direction.
    ///
    /// `origins` and `directions` have equal length.
    fn arrows(&mut self, origins: &[[f64; 2]], directions: &[[f64; 2]]);
}

/// A [`Canvas`] that records draw calls instead of rasterizing them.
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    /// One entry per `polyline` call.
    pub polylines: Vec<Vec<[f64; 2]>>,
    /// One `(origins, directions)` entry per `arrows` call.
    pub arrow_fields: Vec<(Vec<[f64; 2]>, Vec<[f64; 2]>)>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty() && self.arrow_fields.is_empty()
    }

    /// Discard all recorded draw calls.
    pub fn clear(&mut self) {
        self.polylines.clear();
        self.arrow_fields.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn polyline(&mut self, points: &[[f64; 2]]) {
        self.polylines.push(points.to_vec());
    }

    fn arrows(&mut self, origins: &[[f64; 2]], directions: &[[f64; 2]]) {
        assert_eq!(
            origins.len(),
            directions.len(),
            "origins and directions must have equal length"
        );
        self.arrow_fields.push((origins.to_vec(), directions.to_vec()));
    }
}
