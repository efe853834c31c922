//! # trackeval-rs
//!
//! Evaluation of single-particle / cell tracking results against a ground
//! truth. Given a reference set of trajectories and a candidate set produced
//! by some tracker, the crate computes the globally optimal one-to-one
//! pairing between the two sets (Hungarian/Munkres assignment under a gated
//! distance) and derives the standard quality scores from it: recovered,
//! missed and spurious track counts, the normalized pairing distance
//! ("alpha"), the full tracking score ("beta"), detection-level Jaccard
//! ratios, RMSE over matched detections and mean-squared-displacement
//! curves.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trackeval_rs::{score, Detection, TrackSegment, DEFAULT_GATE};
//!
//! let mut reference = TrackSegment::new();
//! for t in 0..10 {
//!     reference.push(Detection::new(t as f64, 0.0, 0.0, t))?;
//! }
//! let candidate = reference.clone();
//!
//! let summary = score(&[reference], &[candidate], DEFAULT_GATE)?;
//! assert!(summary.alpha > 0.99);
//! ```

pub mod measure;
pub mod scoring;

// Re-exports for convenience
pub use measure::{
    Detection, DetectionDistanceStats, DetectionKind, DistanceType, HungarianSolver,
    OneToOneMatcher, PerformanceAnalyzer, SegmentId, TrackDistance, TrackGroup, TrackPair,
    TrackSegment,
};
pub use scoring::{DEFAULT_GATE, ScoreSummary, match_tracks, pair_tracks, score};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur during a tracking evaluation.
    #[derive(Error, Debug)]
    pub enum Error {
        /// A parameter makes the requested evaluation meaningless. Surfaced
        /// before any computation starts.
        #[error("invalid configuration: {0}")]
        InvalidConfig(String),

        /// A detection was inserted out of temporal sequence. The insertion
        /// is a no-op; callers may skip the offending detection and go on.
        #[error("detection at t={got} breaks track continuity (expected t={expected})")]
        NonConsecutiveDetection { expected: usize, got: usize },

        /// The assignment solver failed to produce a valid permutation.
        /// Indicates a defect, not a user-facing condition; the evaluation
        /// must be aborted rather than return a silently wrong score.
        #[error("assignment solver invariant violated: {0}")]
        SolverInvariant(String),
    }

    /// Result type for evaluation operations.
    pub type Result<T> = std::result::Result<T, Error>;
}
