//! A temporally contiguous trajectory.

use crate::error::{Error, Result};
use crate::measure::detection::Detection;

/// An ordered, gap-free sequence of detections.
///
/// Detections are strictly increasing and contiguous in `t`: each insertion
/// must carry `t == last.t + 1`, otherwise it is rejected and the segment is
/// left untouched. The segment's lifetime spans `[first.t, last.t]` and
/// every frame in that range holds exactly one detection, which makes
/// lookup by absolute time an index computation.
#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    detections: Vec<Detection>,
}

impl TrackSegment {
    /// Create an empty segment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a segment from an already ordered detection list.
    ///
    /// Fails with [`Error::NonConsecutiveDetection`] on the first frame gap
    /// or reordering.
    pub fn from_detections(detections: Vec<Detection>) -> Result<Self> {
        let mut segment = Self::new();
        for detection in detections {
            segment.push(detection)?;
        }
        Ok(segment)
    }

    /// Append a detection at the next frame.
    ///
    /// The detection's `t` must equal `last.t + 1`; violations are rejected
    /// as a no-op so the caller can skip the offending detection.
    pub fn push(&mut self, detection: Detection) -> Result<()> {
        if let Some(last) = self.detections.last() {
            let expected = last.t + 1;
            if detection.t != expected {
                return Err(Error::NonConsecutiveDetection {
                    expected,
                    got: detection.t,
                });
            }
        }
        self.detections.push(detection);
        Ok(())
    }

    /// Remove and return the most recent detection.
    pub fn remove_last(&mut self) -> Option<Detection> {
        self.detections.pop()
    }

    /// First detection (earliest in time).
    pub fn first(&self) -> Option<&Detection> {
        self.detections.first()
    }

    /// Last detection (latest in time).
    pub fn last(&self) -> Option<&Detection> {
        self.detections.last()
    }

    /// Frame index of the first detection.
    pub fn first_time(&self) -> Option<usize> {
        self.first().map(|d| d.t)
    }

    /// Frame index of the last detection.
    pub fn last_time(&self) -> Option<usize> {
        self.last().map(|d| d.t)
    }

    /// Detection at absolute frame `t`, if within the segment's lifetime.
    pub fn detection_at(&self, t: usize) -> Option<&Detection> {
        let first_t = self.first_time()?;
        if t < first_t {
            return None;
        }
        self.detections.get(t - first_t)
    }

    /// Number of frames spanned, `last.t - first.t + 1`. Zero when empty.
    pub fn duration(&self) -> usize {
        self.detections.len()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// All detections in temporal order.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }
}

impl<'a> IntoIterator for &'a TrackSegment {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}
