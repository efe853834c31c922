//! Optimal one-to-one pairing between reference and candidate tracks.

use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::measure::distance::{DistanceType, TrackDistance};
use crate::measure::hungarian::HungarianSolver;
use crate::measure::segment::TrackSegment;

/// One reference track and the candidate it was paired with.
///
/// Pairs are produced 1:1 with reference tracks: every reference track
/// appears in exactly one pair. `candidate = None` means the track was
/// missed — matching it to nothing was at least as cheap as matching it to
/// any candidate.
#[derive(Debug, Clone)]
pub struct TrackPair {
    /// Index into the reference track list.
    pub reference: usize,
    /// Index into the candidate track list, absent for a missed track.
    pub candidate: Option<usize>,
    /// Pairing cost under the distance type used for matching.
    pub distance: f64,
    /// First frame at which the pair matched under the gate.
    pub first_matching_time: Option<usize>,
    /// Last frame at which the pair matched under the gate.
    pub last_matching_time: Option<usize>,
}

impl TrackPair {
    pub fn is_missed(&self) -> bool {
        self.candidate.is_none()
    }
}

/// Builds the cost matrix over all (reference, candidate) pairs, solves the
/// assignment problem and materializes the result as [`TrackPair`]s.
///
/// The matrix has one column per candidate plus one dummy column per
/// reference track carrying that row's no-candidate penalty, so every
/// reference track can always fall back to "missed" and rows never
/// outnumber columns.
pub struct OneToOneMatcher<'a> {
    ref_tracks: &'a [TrackSegment],
    cand_tracks: &'a [TrackSegment],
}

impl<'a> OneToOneMatcher<'a> {
    pub fn new(ref_tracks: &'a [TrackSegment], cand_tracks: &'a [TrackSegment]) -> Self {
        Self {
            ref_tracks,
            cand_tracks,
        }
    }

    /// Compute the globally optimal pairing.
    ///
    /// Fails with [`Error::InvalidConfig`] when `max_dist` is not a
    /// positive finite gate or the reference track list is empty; a
    /// pairing against no ground truth has no meaningful normalization.
    pub fn pair_tracks(
        &self,
        max_dist: f64,
        distance_type: DistanceType,
    ) -> Result<Vec<TrackPair>> {
        if !(max_dist > 0.0) || !max_dist.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "gating distance must be positive and finite, got {max_dist}"
            )));
        }

        let num_ref = self.ref_tracks.len();
        let num_cand = self.cand_tracks.len();
        if num_ref == 0 {
            return Err(Error::InvalidConfig(
                "reference track list is empty".into(),
            ));
        }

        let penalties: Vec<f64> = self
            .ref_tracks
            .iter()
            .map(|r| TrackDistance::compute(r, None, distance_type, max_dist).distance)
            .collect();

        // every candidate column is priced for every reference row; the
        // dummy block prices the "missed" fallback
        let mut distances = Vec::with_capacity(num_ref * num_cand);
        let mut costs = Array2::zeros((num_ref, num_cand + num_ref));
        for (i, reference) in self.ref_tracks.iter().enumerate() {
            for (j, candidate) in self.cand_tracks.iter().enumerate() {
                let d = TrackDistance::compute(reference, Some(candidate), distance_type, max_dist);
                costs[[i, j]] = d.distance;
                distances.push(d);
            }
            for j in num_cand..num_cand + num_ref {
                costs[[i, j]] = penalties[i];
            }
        }

        debug!(
            num_ref,
            num_cand,
            matrix = ?costs.dim(),
            "solving track assignment"
        );
        let assignment = HungarianSolver::new(costs)?.solve()?;

        let pairs = assignment
            .iter()
            .enumerate()
            .map(|(i, &col)| {
                let chosen = (col < num_cand).then(|| &distances[i * num_cand + col]);
                match chosen {
                    // a real candidate is kept only when it beats the
                    // no-candidate penalty; a cost equal to the penalty
                    // carries no information and counts as missed
                    Some(d) if d.is_matching && d.distance < penalties[i] => TrackPair {
                        reference: i,
                        candidate: Some(col),
                        distance: d.distance,
                        first_matching_time: d.first_matching_time,
                        last_matching_time: d.last_matching_time,
                    },
                    _ => TrackPair {
                        reference: i,
                        candidate: None,
                        distance: penalties[i],
                        first_matching_time: None,
                        last_matching_time: None,
                    },
                }
            })
            .collect();
        Ok(pairs)
    }
}
