//! Track-pairing and performance-scoring core.
//!
//! Dependency order, leaves first: the trajectory model ([`Detection`],
//! [`TrackSegment`], [`TrackGroup`]), the gated track-to-track distance
//! ([`TrackDistance`]), the assignment solver ([`HungarianSolver`]), the
//! one-to-one matcher ([`OneToOneMatcher`]) and the score aggregation
//! ([`PerformanceAnalyzer`]).

mod analyzer;
mod detection;
mod distance;
mod group;
mod hungarian;
mod matcher;
mod segment;

pub use analyzer::{DetectionDistanceStats, PerformanceAnalyzer};
pub use detection::{Detection, DetectionKind};
pub use distance::{DistanceType, TrackDistance};
pub use group::{SegmentId, TrackGroup};
pub use hungarian::HungarianSolver;
pub use matcher::{OneToOneMatcher, TrackPair};
pub use segment::TrackSegment;
