//! Gated distance between two trajectories.

use crate::measure::segment::TrackSegment;

/// Cost model used when comparing two tracks detection by detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceType {
    /// Gated Euclidian cost: matched frames contribute their spatial
    /// distance, non-matched frames the gate itself.
    #[default]
    Euclidian,
    /// Unitless mismatch count: matched frames are free, every non-matched
    /// frame costs 1. Used for detection-level statistics.
    Matching,
}

impl DistanceType {
    /// Penalty charged for one non-matched frame.
    fn frame_penalty(self, max_dist: f64) -> f64 {
        match self {
            DistanceType::Euclidian => max_dist,
            DistanceType::Matching => 1.0,
        }
    }
}

/// Scalar cost and auxiliary statistics between one reference track and one
/// candidate track (or no candidate at all).
///
/// The gate `max_dist` bounds the per-frame penalty: a reference frame the
/// candidate misses costs exactly as much as a match at the gate, which
/// makes the total cost normalizable by track length. Comparing a track
/// against no candidate yields the worst-case penalty and anchors that
/// normalization.
#[derive(Debug, Clone)]
pub struct TrackDistance {
    /// Total cost under the chosen [`DistanceType`].
    pub distance: f64,
    /// Whether at least one detection pair matched under the gate.
    pub is_matching: bool,
    /// First frame at which the tracks matched.
    pub first_matching_time: Option<usize>,
    /// Last frame at which the tracks matched.
    pub last_matching_time: Option<usize>,
    /// Detection pairs within the gate.
    pub num_matching_detections: usize,
    /// Reference frames with no matching candidate detection.
    pub num_non_matched_detections: usize,
    /// Real candidate detections that match no reference detection.
    /// Virtual detections are never counted here.
    pub num_wrong_detections: usize,
    /// Smallest matched detection distance (`f64::MAX` when none matched).
    pub min_detection_distance: f64,
    /// Largest matched detection distance.
    pub max_detection_distance: f64,
    /// Sum of matched detection distances.
    pub sum_detection_distance: f64,
    /// Sum of squared matched detection distances.
    pub sum_square_detection_distance: f64,
}

impl TrackDistance {
    fn empty() -> Self {
        Self {
            distance: 0.0,
            is_matching: false,
            first_matching_time: None,
            last_matching_time: None,
            num_matching_detections: 0,
            num_non_matched_detections: 0,
            num_wrong_detections: 0,
            min_detection_distance: f64::MAX,
            max_detection_distance: 0.0,
            sum_detection_distance: 0.0,
            sum_square_detection_distance: 0.0,
        }
    }

    /// Compare `reference` (non-empty) against `candidate`.
    ///
    /// `candidate = None` (or an empty segment) stands for "no candidate":
    /// the cost is the full-length penalty `frame_penalty * duration(ref)`
    /// and every reference frame counts as non-matched.
    pub fn compute(
        reference: &TrackSegment,
        candidate: Option<&TrackSegment>,
        distance_type: DistanceType,
        max_dist: f64,
    ) -> Self {
        let mut result = Self::empty();
        let penalty = distance_type.frame_penalty(max_dist);

        let candidate = match candidate {
            Some(c) if !c.is_empty() => c,
            _ => {
                result.distance = penalty * reference.duration() as f64;
                result.num_non_matched_detections = reference.duration();
                return result;
            }
        };

        let (Some(t0_ref), Some(tend_ref)) = (reference.first_time(), reference.last_time())
        else {
            return result;
        };
        let (t0_cand, tend_cand) = (
            candidate.first_time().unwrap_or(0),
            candidate.last_time().unwrap_or(0),
        );

        // disjoint frame ranges: same penalty as no candidate, and all of
        // the candidate's frames are wrong
        if tend_cand < t0_ref || t0_cand > tend_ref {
            result.distance = penalty * reference.duration() as f64;
            result.num_non_matched_detections = reference.duration();
            result.num_wrong_detections = candidate.duration();
            return result;
        }

        // frames where only one of the two tracks extends
        result.num_wrong_detections += t0_ref.saturating_sub(t0_cand);
        result.num_wrong_detections += tend_cand.saturating_sub(tend_ref);
        result.num_non_matched_detections += t0_cand.saturating_sub(t0_ref);
        result.num_non_matched_detections += tend_ref.saturating_sub(tend_cand);
        result.distance = penalty
            * (t0_ref.abs_diff(t0_cand) + tend_ref.abs_diff(tend_cand)) as f64;

        let lo = t0_ref.max(t0_cand);
        let hi = tend_ref.min(tend_cand);
        for t in lo..=hi {
            let (Some(d_ref), Some(d_cand)) =
                (reference.detection_at(t), candidate.detection_at(t))
            else {
                continue;
            };
            let d = d_ref.distance_to(d_cand);
            if d_cand.is_real() && d < max_dist {
                result.record_match(t, d);
                if distance_type == DistanceType::Euclidian {
                    result.distance += d;
                }
            } else {
                result.distance += penalty;
                result.num_non_matched_detections += 1;
                if d_cand.is_real() {
                    result.num_wrong_detections += 1;
                }
            }
        }
        result
    }

    fn record_match(&mut self, t: usize, d: f64) {
        if !self.is_matching {
            self.first_matching_time = Some(t);
            self.is_matching = true;
        }
        self.last_matching_time = Some(t);
        self.num_matching_detections += 1;
        self.sum_detection_distance += d;
        self.sum_square_detection_distance += d * d;
        if d < self.min_detection_distance {
            self.min_detection_distance = d;
        } else if d > self.max_detection_distance {
            self.max_detection_distance = d;
        }
    }
}

/// Per-frame Euclidian distances over the overlap of two tracks. Empty when
/// the candidate is absent/empty or the frame ranges do not overlap.
pub(crate) fn overlap_distances(
    reference: &TrackSegment,
    candidate: Option<&TrackSegment>,
) -> Vec<f64> {
    let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
        return Vec::new();
    };
    let (Some(t0_ref), Some(tend_ref)) = (reference.first_time(), reference.last_time()) else {
        return Vec::new();
    };
    let (Some(t0_cand), Some(tend_cand)) = (candidate.first_time(), candidate.last_time())
    else {
        return Vec::new();
    };
    if tend_cand < t0_ref || t0_cand > tend_ref {
        return Vec::new();
    }
    let lo = t0_ref.max(t0_cand);
    let hi = tend_ref.min(tend_cand);
    (lo..=hi)
        .filter_map(|t| {
            match (reference.detection_at(t), candidate.detection_at(t)) {
                (Some(a), Some(b)) => Some(a.distance_to(b)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::detection::Detection;

    fn track(t0: usize, positions: &[f64]) -> TrackSegment {
        let mut segment = TrackSegment::new();
        for (i, &x) in positions.iter().enumerate() {
            segment.push(Detection::new(x, 0.0, 0.0, t0 + i)).unwrap();
        }
        segment
    }

    #[test]
    fn test_identical_tracks_zero_cost() {
        let reference = track(0, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        for distance_type in [DistanceType::Euclidian, DistanceType::Matching] {
            let d = TrackDistance::compute(&reference, Some(&reference), distance_type, 2.0);
            assert_eq!(d.distance, 0.0);
            assert!(d.is_matching);
            assert_eq!(d.num_matching_detections, reference.duration());
            assert_eq!(d.num_non_matched_detections, 0);
            assert_eq!(d.num_wrong_detections, 0);
            assert_eq!(d.first_matching_time, Some(0));
            assert_eq!(d.last_matching_time, Some(4));
        }
    }

    #[test]
    fn test_no_candidate_penalty() {
        let reference = track(2, &[0.0; 7]);
        let max_dist = 3.0;

        let d = TrackDistance::compute(&reference, None, DistanceType::Euclidian, max_dist);
        assert_eq!(d.distance, max_dist * 7.0);
        assert_eq!(d.num_non_matched_detections, 7);
        assert_eq!(d.num_matching_detections, 0);
        assert!(!d.is_matching);

        let d = TrackDistance::compute(&reference, None, DistanceType::Matching, max_dist);
        assert_eq!(d.distance, 7.0);

        // an empty candidate behaves like no candidate
        let empty = TrackSegment::new();
        let d = TrackDistance::compute(&reference, Some(&empty), DistanceType::Euclidian, max_dist);
        assert_eq!(d.distance, max_dist * 7.0);
    }

    #[test]
    fn test_disjoint_ranges() {
        let reference = track(0, &[0.0; 5]);
        let candidate = track(10, &[0.0; 4]);
        let d = TrackDistance::compute(&reference, Some(&candidate), DistanceType::Euclidian, 2.0);
        assert_eq!(d.distance, 2.0 * 5.0);
        assert_eq!(d.num_non_matched_detections, 5);
        assert_eq!(d.num_wrong_detections, 4);
        assert!(!d.is_matching);
    }

    #[test]
    fn test_partial_overlap_boundary_terms() {
        // reference [0, 9], candidate [2, 11]: overlap [2, 9]
        let reference = track(0, &[0.0; 10]);
        let candidate = track(2, &[0.0; 10]);
        let max_dist = 4.0;
        let d = TrackDistance::compute(
            &reference,
            Some(&candidate),
            DistanceType::Euclidian,
            max_dist,
        );
        // boundary cost 4 * (|0-2| + |9-11|), overlap matches exactly
        assert_eq!(d.distance, max_dist * 4.0);
        assert_eq!(d.num_matching_detections, 8);
        // frames 0,1 of the reference are uncovered
        assert_eq!(d.num_non_matched_detections, 2);
        // frames 10,11 of the candidate are extraneous
        assert_eq!(d.num_wrong_detections, 2);
        assert_eq!(d.first_matching_time, Some(2));
        assert_eq!(d.last_matching_time, Some(9));
    }

    #[test]
    fn test_gate_rejects_far_detections() {
        let reference = track(0, &[0.0, 0.0, 0.0]);
        let candidate = track(0, &[0.1, 100.0, 0.1]);
        let max_dist = 1.0;
        let d = TrackDistance::compute(
            &reference,
            Some(&candidate),
            DistanceType::Euclidian,
            max_dist,
        );
        assert_eq!(d.num_matching_detections, 2);
        assert_eq!(d.num_non_matched_detections, 1);
        assert_eq!(d.num_wrong_detections, 1);
        assert!((d.distance - (0.1 + max_dist + 0.1)).abs() < 1e-9);

        let d = TrackDistance::compute(
            &reference,
            Some(&candidate),
            DistanceType::Matching,
            max_dist,
        );
        assert_eq!(d.distance, 1.0);
    }

    #[test]
    fn test_virtual_detection_never_wrong() {
        let reference = track(0, &[0.0, 0.0, 0.0]);
        let mut candidate = TrackSegment::new();
        candidate.push(Detection::new(0.0, 0.0, 0.0, 0)).unwrap();
        // interpolated filler far from the reference
        candidate
            .push(Detection::interpolated(50.0, 0.0, 0.0, 1))
            .unwrap();
        candidate.push(Detection::new(0.0, 0.0, 0.0, 2)).unwrap();

        let d = TrackDistance::compute(&reference, Some(&candidate), DistanceType::Matching, 1.0);
        assert_eq!(d.num_matching_detections, 2);
        assert_eq!(d.num_non_matched_detections, 1);
        // the virtual detection is a non-match but not a wrong detection
        assert_eq!(d.num_wrong_detections, 0);
    }

    #[test]
    fn test_match_statistics() {
        let reference = track(0, &[0.0, 0.0]);
        let candidate = track(0, &[0.3, 0.4]);
        let d = TrackDistance::compute(&reference, Some(&candidate), DistanceType::Euclidian, 1.0);
        assert!((d.sum_detection_distance - 0.7).abs() < 1e-9);
        assert!((d.sum_square_detection_distance - 0.25).abs() < 1e-9);
        assert!((d.min_detection_distance - 0.3).abs() < 1e-9);
        assert!((d.max_detection_distance - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_distances() {
        let reference = track(0, &[0.0, 0.0, 0.0]);
        let candidate = track(1, &[1.0, 2.0, 3.0]);
        let distances = overlap_distances(&reference, Some(&candidate));
        assert_eq!(distances, vec![1.0, 2.0]);
        assert!(overlap_distances(&reference, None).is_empty());
    }
}
