//! A single localized observation within a trajectory.

use nalgebra::Point3;

/// How a detection came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionKind {
    /// Produced by a live detector.
    #[default]
    Real,
    /// Linearly interpolated to fill a temporal gap. Virtual detections
    /// never count against spurious/wrong detection statistics.
    Virtual,
}

/// A spatio-temporal observation: position, frame index and kind.
///
/// Position and kind are fixed at construction; the `selected`/`enabled`
/// flags are transient UI state and play no role in scoring.
#[derive(Debug, Clone)]
pub struct Detection {
    /// x position.
    pub x: f64,
    /// y position.
    pub y: f64,
    /// z position.
    pub z: f64,
    /// Frame index.
    pub t: usize,
    kind: DetectionKind,
    /// Transient UI flag.
    pub selected: bool,
    /// Transient UI flag.
    pub enabled: bool,
}

impl Detection {
    /// Create a real detection at the given position and frame.
    pub fn new(x: f64, y: f64, z: f64, t: usize) -> Self {
        Self::with_kind(x, y, z, t, DetectionKind::Real)
    }

    /// Create an interpolated (virtual) detection bridging a gap.
    pub fn interpolated(x: f64, y: f64, z: f64, t: usize) -> Self {
        Self::with_kind(x, y, z, t, DetectionKind::Virtual)
    }

    /// Create a detection with an explicit kind.
    pub fn with_kind(x: f64, y: f64, z: f64, t: usize, kind: DetectionKind) -> Self {
        Self {
            x,
            y,
            z,
            t,
            kind,
            selected: false,
            enabled: true,
        }
    }

    pub fn kind(&self) -> DetectionKind {
        self.kind
    }

    pub fn is_real(&self) -> bool {
        self.kind == DetectionKind::Real
    }

    /// Position as a 3-D point.
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Euclidian distance to another detection, ignoring time.
    pub fn distance_to(&self, other: &Detection) -> f64 {
        (self.position() - other.position()).norm()
    }
}
