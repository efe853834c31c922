//! Tracking performance criteria for a given pairing between a reference
//! and a candidate set of tracks.

use crate::measure::distance::{DistanceType, TrackDistance, overlap_distances};
use crate::measure::matcher::TrackPair;
use crate::measure::segment::TrackSegment;

/// Distance statistics over matched detections.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectionDistanceStats {
    /// Root-mean-square error.
    pub rmse: f64,
    /// Smallest matched distance.
    pub min: f64,
    /// Largest matched distance.
    pub max: f64,
    /// Standard deviation.
    pub std: f64,
}

/// Computes the scalar quality scores for one evaluation run.
///
/// The analyzer holds the two track sets and the pairing produced by the
/// [`OneToOneMatcher`](crate::measure::OneToOneMatcher); every reference
/// track must be represented by exactly one pair. Score accessors taking a
/// distance type and gate re-run the track-to-track distance per pair, so
/// the same pairing can be interrogated under both cost models.
pub struct PerformanceAnalyzer<'a> {
    reference_tracks: &'a [TrackSegment],
    candidate_tracks: &'a [TrackSegment],
    pairs: Vec<TrackPair>,
}

impl<'a> PerformanceAnalyzer<'a> {
    pub fn new(
        reference_tracks: &'a [TrackSegment],
        candidate_tracks: &'a [TrackSegment],
        pairs: Vec<TrackPair>,
    ) -> Self {
        Self {
            reference_tracks,
            candidate_tracks,
            pairs,
        }
    }

    pub fn pairs(&self) -> &[TrackPair] {
        &self.pairs
    }

    pub fn num_ref_tracks(&self) -> usize {
        self.reference_tracks.len()
    }

    pub fn num_candidate_tracks(&self) -> usize {
        self.candidate_tracks.len()
    }

    /// Total detection count over the reference tracks.
    pub fn num_ref_detections(&self) -> usize {
        self.reference_tracks.iter().map(TrackSegment::duration).sum()
    }

    /// Total detection count over the candidate tracks.
    pub fn num_candidate_detections(&self) -> usize {
        self.candidate_tracks.iter().map(TrackSegment::duration).sum()
    }

    fn pair_candidate(&self, pair: &TrackPair) -> Option<&'a TrackSegment> {
        pair.candidate.map(|j| &self.candidate_tracks[j])
    }

    fn pair_distance(
        &self,
        pair: &TrackPair,
        distance_type: DistanceType,
        max_dist: f64,
    ) -> TrackDistance {
        TrackDistance::compute(
            &self.reference_tracks[pair.reference],
            self.pair_candidate(pair),
            distance_type,
            max_dist,
        )
    }

    fn candidate_is_paired(&self, candidate: usize) -> bool {
        self.pairs.iter().any(|p| p.candidate == Some(candidate))
    }

    /// Sum of the pair costs.
    pub fn paired_tracks_distance(&self, distance_type: DistanceType, max_dist: f64) -> f64 {
        self.pairs
            .iter()
            .map(|p| self.pair_distance(p, distance_type, max_dist).distance)
            .sum()
    }

    /// Worst-case total distance: every reference track paired to nothing.
    fn distance_bound(&self, distance_type: DistanceType, max_dist: f64) -> f64 {
        self.reference_tracks
            .iter()
            .map(|r| TrackDistance::compute(r, None, distance_type, max_dist).distance)
            .sum()
    }

    /// Normalized pairing distance, the "alpha" criterion.
    ///
    /// 1.0 for perfect recovery, trending to 0 as results worsen; negative
    /// when the candidates are worse than no tracking at all.
    pub fn normalized_pairing_score(&self, distance_type: DistanceType, max_dist: f64) -> f64 {
        let distance = self.paired_tracks_distance(distance_type, max_dist);
        let bound = self.distance_bound(distance_type, max_dist);
        1.0 - distance / bound
    }

    /// Full tracking score, the "beta" criterion: like alpha but also
    /// charged for candidate tracks no pair selected.
    pub fn full_tracking_score(&self, distance_type: DistanceType, max_dist: f64) -> f64 {
        let distance = self.paired_tracks_distance(distance_type, max_dist);
        let bound = self.distance_bound(distance_type, max_dist);
        let penalty: f64 = self
            .candidate_tracks
            .iter()
            .enumerate()
            .filter(|(j, _)| !self.candidate_is_paired(*j))
            .map(|(_, c)| TrackDistance::compute(c, None, distance_type, max_dist).distance)
            .sum();
        (bound - distance) / (bound + penalty)
    }

    /// Candidate tracks not selected by any pair.
    pub fn num_spurious_tracks(&self) -> usize {
        (0..self.candidate_tracks.len())
            .filter(|&j| !self.candidate_is_paired(j))
            .count()
    }

    /// Reference tracks paired with no (or an empty) candidate.
    pub fn num_missed_tracks(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| self.pair_candidate(p).is_none_or(TrackSegment::is_empty))
            .count()
    }

    /// Candidate tracks selected by a pair.
    pub fn num_paired_tracks(&self) -> usize {
        (0..self.candidate_tracks.len())
            .filter(|&j| self.candidate_is_paired(j))
            .count()
    }

    /// Detection pairs recovered under the gate, summed over pairs.
    pub fn num_paired_detections(&self, max_dist: f64) -> usize {
        self.pairs
            .iter()
            .map(|p| {
                self.pair_distance(p, DistanceType::Matching, max_dist)
                    .num_matching_detections
            })
            .sum()
    }

    /// Reference detections not paired to a candidate detection.
    pub fn num_missed_detections(&self, max_dist: f64) -> usize {
        self.pairs
            .iter()
            .map(|p| {
                self.pair_distance(p, DistanceType::Matching, max_dist)
                    .num_non_matched_detections
            })
            .sum()
    }

    /// Candidate detections not paired to a reference detection. Real
    /// detections of unpaired candidate tracks all count; virtual ones
    /// never do.
    pub fn num_wrong_detections(&self, max_dist: f64) -> usize {
        let paired: usize = self
            .pairs
            .iter()
            .filter(|p| p.candidate.is_some())
            .map(|p| {
                self.pair_distance(p, DistanceType::Matching, max_dist)
                    .num_wrong_detections
            })
            .sum();
        let spurious: usize = self
            .candidate_tracks
            .iter()
            .enumerate()
            .filter(|(j, _)| !self.candidate_is_paired(*j))
            .map(|(_, c)| c.iter().filter(|d| d.is_real()).count())
            .sum();
        paired + spurious
    }

    /// RMSE, min, max and standard deviation over matched detections.
    /// All zero when nothing matched.
    pub fn detection_distance_stats(&self, max_dist: f64) -> DetectionDistanceStats {
        let mut sum = 0.0;
        let mut sum_square = 0.0;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        let mut count = 0usize;
        for pair in &self.pairs {
            if self.pair_candidate(pair).is_none_or(TrackSegment::is_empty) {
                continue;
            }
            let d = self.pair_distance(pair, DistanceType::Matching, max_dist);
            sum += d.sum_detection_distance;
            sum_square += d.sum_square_detection_distance;
            min = min.min(d.min_detection_distance);
            max = max.max(d.max_detection_distance);
            count += d.num_matching_detections;
        }
        if count == 0 {
            return DetectionDistanceStats::default();
        }
        let n = count as f64;
        let mean = sum / n;
        DetectionDistanceStats {
            rmse: (sum_square / n).sqrt(),
            min,
            max,
            std: (sum_square / n - mean * mean).max(0.0).sqrt(),
        }
    }

    /// Jaccard-style similarity on detections:
    /// `paired / (paired + missed + wrong)`.
    pub fn detections_similarity(&self, max_dist: f64) -> f64 {
        let paired = self.num_paired_detections(max_dist) as f64;
        let missed = self.num_missed_detections(max_dist) as f64;
        let wrong = self.num_wrong_detections(max_dist) as f64;
        paired / (paired + missed + wrong)
    }

    /// Jaccard-style similarity on tracks:
    /// `paired / (paired + missed + spurious)`.
    pub fn tracks_similarity(&self) -> f64 {
        let paired = self.num_paired_tracks() as f64;
        let missed = self.num_missed_tracks() as f64;
        let spurious = self.num_spurious_tracks() as f64;
        paired / (paired + missed + spurious)
    }

    /// Per-frame Euclidian distances over each pair's overlap, ungated.
    pub fn paired_detection_distances(&self) -> Vec<f64> {
        self.pairs
            .iter()
            .flat_map(|p| {
                overlap_distances(&self.reference_tracks[p.reference], self.pair_candidate(p))
            })
            .collect()
    }

    /// Frame-to-frame step lengths over the reference tracks.
    pub fn reference_jump_lengths(&self) -> Vec<f64> {
        jump_lengths(self.reference_tracks)
    }

    /// Frame-to-frame step lengths over the candidate tracks.
    pub fn candidate_jump_lengths(&self) -> Vec<f64> {
        jump_lengths(self.candidate_tracks)
    }

    /// Mean squared displacement of the reference tracks per time lag.
    pub fn reference_msds(&self) -> Vec<f64> {
        mean_squared_displacements(self.reference_tracks)
    }

    /// Mean squared displacement of the candidate tracks per time lag.
    pub fn candidate_msds(&self) -> Vec<f64> {
        mean_squared_displacements(self.candidate_tracks)
    }
}

fn jump_lengths(tracks: &[TrackSegment]) -> Vec<f64> {
    let mut lengths = Vec::new();
    for track in tracks {
        for window in track.detections().windows(2) {
            lengths.push(window[0].distance_to(&window[1]));
        }
    }
    lengths
}

/// Average of `|pos(t+tau) - pos(t)|^2` over all valid `(t, t+tau)` pairs,
/// for `tau` from 1 to the longest track's duration minus one. Lags with no
/// observed jump stay 0.
fn mean_squared_displacements(tracks: &[TrackSegment]) -> Vec<f64> {
    let max_lag = tracks
        .iter()
        .map(|t| t.duration().saturating_sub(1))
        .max()
        .unwrap_or(0);
    let mut msds = vec![0.0; max_lag];
    let mut num_jumps = vec![0usize; max_lag];

    for track in tracks {
        let detections = track.detections();
        for lag in 1..=max_lag.min(detections.len().saturating_sub(1)) {
            for pair in detections.windows(lag + 1) {
                let step = pair[0].distance_to(&pair[lag]);
                msds[lag - 1] += step * step;
                num_jumps[lag - 1] += 1;
            }
        }
    }
    for (msd, &n) in msds.iter_mut().zip(&num_jumps) {
        if n > 0 {
            *msd /= n as f64;
        }
    }
    msds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::detection::Detection;
    use crate::measure::matcher::OneToOneMatcher;

    fn track(t0: usize, xs: &[f64]) -> TrackSegment {
        let mut segment = TrackSegment::new();
        for (i, &x) in xs.iter().enumerate() {
            segment.push(Detection::new(x, 0.0, 0.0, t0 + i)).unwrap();
        }
        segment
    }

    fn analyze<'a>(
        refs: &'a [TrackSegment],
        cands: &'a [TrackSegment],
        max_dist: f64,
    ) -> PerformanceAnalyzer<'a> {
        let pairs = OneToOneMatcher::new(refs, cands)
            .pair_tracks(max_dist, DistanceType::Euclidian)
            .unwrap();
        PerformanceAnalyzer::new(refs, cands, pairs)
    }

    #[test]
    fn test_counts() {
        let refs = vec![track(0, &[0.0; 5]), track(2, &[1.0; 3])];
        let cands = vec![track(0, &[0.1; 5])];
        let analyzer = analyze(&refs, &cands, 1.0);
        assert_eq!(analyzer.num_ref_tracks(), 2);
        assert_eq!(analyzer.num_candidate_tracks(), 1);
        assert_eq!(analyzer.num_ref_detections(), 8);
        assert_eq!(analyzer.num_candidate_detections(), 5);
    }

    #[test]
    fn test_perfect_recovery_scores() {
        let refs = vec![track(0, &[0.0; 10]), track(0, &[20.0; 10])];
        let cands = refs.clone();
        let analyzer = analyze(&refs, &cands, 2.0);
        let alpha = analyzer.normalized_pairing_score(DistanceType::Euclidian, 2.0);
        let beta = analyzer.full_tracking_score(DistanceType::Euclidian, 2.0);
        assert!((alpha - 1.0).abs() < 1e-12);
        assert!((beta - 1.0).abs() < 1e-12);
        assert_eq!(analyzer.num_missed_tracks(), 0);
        assert_eq!(analyzer.num_spurious_tracks(), 0);
        assert_eq!(analyzer.num_paired_detections(2.0), 20);
        assert_eq!(analyzer.num_missed_detections(2.0), 0);
        assert_eq!(analyzer.num_wrong_detections(2.0), 0);
    }

    #[test]
    fn test_no_candidates_alpha_zero() {
        let refs = vec![track(0, &[0.0; 10])];
        let cands: Vec<TrackSegment> = Vec::new();
        let analyzer = analyze(&refs, &cands, 2.0);
        let alpha = analyzer.normalized_pairing_score(DistanceType::Euclidian, 2.0);
        assert_eq!(alpha, 0.0);
        assert_eq!(analyzer.num_missed_tracks(), 1);
        assert_eq!(analyzer.num_missed_detections(2.0), 10);
    }

    #[test]
    fn test_spurious_track_hits_beta_not_alpha() {
        let refs = vec![track(0, &[0.0; 10])];
        let close = track(0, &[0.1; 10]);
        let far = track(0, &[50.0; 10]);
        let cands = vec![close, far];
        let analyzer = analyze(&refs, &cands, 2.0);

        let alpha = analyzer.normalized_pairing_score(DistanceType::Euclidian, 2.0);
        let beta = analyzer.full_tracking_score(DistanceType::Euclidian, 2.0);
        assert!(alpha > 0.9);
        assert!(beta < alpha);
        assert_eq!(analyzer.num_spurious_tracks(), 1);
        assert_eq!(analyzer.num_paired_tracks(), 1);
        // the spurious track's real detections are all wrong
        assert_eq!(analyzer.num_wrong_detections(2.0), 10);
    }

    #[test]
    fn test_conservation_laws() {
        let refs = vec![track(0, &[0.0; 8]), track(0, &[10.0; 8]), track(4, &[30.0; 5])];
        let cands = vec![track(0, &[0.2; 8]), track(2, &[55.0; 4]), track(0, &[9.9; 8])];
        let analyzer = analyze(&refs, &cands, 1.5);
        assert_eq!(
            analyzer.num_paired_tracks() + analyzer.num_spurious_tracks(),
            analyzer.num_candidate_tracks()
        );
        // every reference track is either recovered or missed
        let recovered = analyzer
            .pairs()
            .iter()
            .filter(|p| !p.is_missed())
            .count();
        assert_eq!(
            recovered + analyzer.num_missed_tracks(),
            analyzer.num_ref_tracks()
        );
    }

    #[test]
    fn test_detection_distance_stats() {
        let refs = vec![track(0, &[0.0, 0.0])];
        let cands = vec![track(0, &[0.3, 0.4])];
        let analyzer = analyze(&refs, &cands, 1.0);
        let stats = analyzer.detection_distance_stats(1.0);
        // distances 0.3 and 0.4: rmse = sqrt(0.25/2), std = sqrt(0.125 - 0.35^2)
        assert!((stats.rmse - (0.125f64).sqrt()).abs() < 1e-9);
        assert!((stats.min - 0.3).abs() < 1e-9);
        assert!((stats.max - 0.4).abs() < 1e-9);
        assert!((stats.std - (0.125f64 - 0.1225).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_stats_zero_when_nothing_matched() {
        let refs = vec![track(0, &[0.0; 3])];
        let cands: Vec<TrackSegment> = Vec::new();
        let analyzer = analyze(&refs, &cands, 1.0);
        assert_eq!(analyzer.detection_distance_stats(1.0), DetectionDistanceStats::default());
    }

    #[test]
    fn test_jump_lengths_and_msd() {
        // constant drift of 2 per frame: msd(tau) = (2 tau)^2
        let xs: Vec<f64> = (0..5).map(|i| 2.0 * i as f64).collect();
        let refs = vec![track(0, &xs)];
        let cands: Vec<TrackSegment> = Vec::new();
        let analyzer = analyze(&refs, &cands, 1.0);

        let jumps = analyzer.reference_jump_lengths();
        assert_eq!(jumps.len(), 4);
        assert!(jumps.iter().all(|&j| (j - 2.0).abs() < 1e-12));

        let msds = analyzer.reference_msds();
        assert_eq!(msds.len(), 4);
        for (k, &msd) in msds.iter().enumerate() {
            let lag = (k + 1) as f64;
            assert!((msd - (2.0 * lag).powi(2)).abs() < 1e-9);
        }
        assert!(analyzer.candidate_msds().is_empty());
    }

    #[test]
    fn test_similarities() {
        let refs = vec![track(0, &[0.0; 10])];
        let cands = vec![track(0, &[0.1; 10]), track(0, &[50.0; 10])];
        let analyzer = analyze(&refs, &cands, 2.0);
        // tracks: 1 paired, 0 missed, 1 spurious
        assert!((analyzer.tracks_similarity() - 0.5).abs() < 1e-12);
        // detections: 10 paired, 0 missed, 10 wrong
        assert!((analyzer.detections_similarity(2.0) - 0.5).abs() < 1e-12);
    }
}
