//! End-to-end scoring pipeline: pair the track sets, then summarize the
//! standard criteria in one pass.

use tracing::{debug, info};

use crate::error::Result;
use crate::measure::{DistanceType, OneToOneMatcher, PerformanceAnalyzer, TrackPair, TrackSegment};

/// Default gating distance, in the same spatial unit as the detections.
pub const DEFAULT_GATE: f64 = 5.0;

/// The scalar criteria of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    /// Normalized pairing distance, 1.0 for perfect recovery.
    pub alpha: f64,
    /// Full tracking score, additionally charged for spurious tracks.
    pub beta: f64,
    /// `paired / (paired + missed + wrong)` over detections.
    pub detections_jaccard: f64,
    /// `paired / (paired + missed + spurious)` over tracks.
    pub tracks_jaccard: f64,
    /// Root-mean-square error over matched detections.
    pub rmse: f64,
}

/// Pair the two track sets under an explicit distance type.
pub fn match_tracks(
    reference_tracks: &[TrackSegment],
    candidate_tracks: &[TrackSegment],
    max_dist: f64,
    distance_type: DistanceType,
) -> Result<Vec<TrackPair>> {
    debug!(
        num_ref = reference_tracks.len(),
        num_cand = candidate_tracks.len(),
        max_dist,
        ?distance_type,
        "pairing track sets"
    );
    OneToOneMatcher::new(reference_tracks, candidate_tracks)
        .pair_tracks(max_dist, distance_type)
}

/// Pair the two track sets under the gated Euclidian distance and wrap the
/// result in a [`PerformanceAnalyzer`] for further interrogation.
pub fn pair_tracks<'a>(
    reference_tracks: &'a [TrackSegment],
    candidate_tracks: &'a [TrackSegment],
    max_dist: f64,
) -> Result<PerformanceAnalyzer<'a>> {
    let pairs = match_tracks(
        reference_tracks,
        candidate_tracks,
        max_dist,
        DistanceType::Euclidian,
    )?;
    Ok(PerformanceAnalyzer::new(
        reference_tracks,
        candidate_tracks,
        pairs,
    ))
}

/// Run the whole pipeline and report the standard criteria.
pub fn score(
    reference_tracks: &[TrackSegment],
    candidate_tracks: &[TrackSegment],
    max_dist: f64,
) -> Result<ScoreSummary> {
    let analyzer = pair_tracks(reference_tracks, candidate_tracks, max_dist)?;
    let summary = ScoreSummary {
        alpha: analyzer.normalized_pairing_score(DistanceType::Euclidian, max_dist),
        beta: analyzer.full_tracking_score(DistanceType::Euclidian, max_dist),
        detections_jaccard: analyzer.detections_similarity(max_dist),
        tracks_jaccard: analyzer.tracks_similarity(),
        rmse: analyzer.detection_distance_stats(max_dist).rmse,
    };
    info!(
        alpha = summary.alpha,
        beta = summary.beta,
        detections_jaccard = summary.detections_jaccard,
        tracks_jaccard = summary.tracks_jaccard,
        rmse = summary.rmse,
        "evaluation finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::Detection;

    fn track(t0: usize, xs: &[f64]) -> TrackSegment {
        let mut segment = TrackSegment::new();
        for (i, &x) in xs.iter().enumerate() {
            segment.push(Detection::new(x, 0.0, 0.0, t0 + i)).unwrap();
        }
        segment
    }

    #[test]
    fn test_score_perfect_recovery() {
        let refs = vec![track(0, &[0.0; 10]), track(3, &[40.0; 6])];
        let cands = refs.clone();
        let summary = score(&refs, &cands, DEFAULT_GATE).unwrap();
        assert!((summary.alpha - 1.0).abs() < 1e-12);
        assert!((summary.beta - 1.0).abs() < 1e-12);
        assert!((summary.detections_jaccard - 1.0).abs() < 1e-12);
        assert!((summary.tracks_jaccard - 1.0).abs() < 1e-12);
        assert_eq!(summary.rmse, 0.0);
    }

    #[test]
    fn test_score_rejects_bad_gate() {
        let refs = vec![track(0, &[0.0; 3])];
        assert!(score(&refs, &refs, 0.0).is_err());
        assert!(score(&refs, &refs, f64::NAN).is_err());
    }

    #[test]
    fn test_score_rejects_empty_reference_list() {
        // without a ground truth the normalization bound is zero and the
        // scores would degenerate to NaN; surface the error up front
        let cands = vec![track(0, &[0.0; 3])];
        assert!(score(&[], &cands, DEFAULT_GATE).is_err());
        assert!(pair_tracks(&[], &cands, DEFAULT_GATE).is_err());
        assert!(match_tracks(&[], &cands, DEFAULT_GATE, DistanceType::Euclidian).is_err());
    }

    #[test]
    fn test_match_tracks_distance_types_agree_on_pairing() {
        let refs = vec![track(0, &[0.0; 6]), track(0, &[30.0; 6])];
        let cands = vec![track(0, &[0.4; 6]), track(0, &[30.2; 6])];
        let euclidian = match_tracks(&refs, &cands, 2.0, DistanceType::Euclidian).unwrap();
        let matching = match_tracks(&refs, &cands, 2.0, DistanceType::Matching).unwrap();
        for (a, b) in euclidian.iter().zip(&matching) {
            assert_eq!(a.candidate, b.candidate);
        }
        // cost scale differs: Euclidian sums distances, Matching counts
        assert!(euclidian[0].distance > 0.0);
        assert_eq!(matching[0].distance, 0.0);
    }

    #[test]
    fn test_pair_tracks_exposes_analyzer() {
        let refs = vec![track(0, &[0.0; 5])];
        let cands = vec![track(0, &[0.5; 5]), track(0, &[99.0; 5])];
        let analyzer = pair_tracks(&refs, &cands, 2.0).unwrap();
        assert_eq!(analyzer.pairs().len(), 1);
        assert_eq!(analyzer.num_paired_tracks(), 1);
        assert_eq!(analyzer.num_spurious_tracks(), 1);
    }
}
