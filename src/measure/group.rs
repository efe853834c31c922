//! Exclusively-owning collection of track segments.

use crate::measure::detection::Detection;
use crate::measure::segment::TrackSegment;

/// Stable handle to a segment inside a [`TrackGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(usize);

#[derive(Debug, Clone, Default)]
struct Links {
    previous: Vec<usize>,
    next: Vec<usize>,
}

/// A group of track segments sharing one dataset/sequence context.
///
/// The group is an arena: it owns its segments outright (a segment is moved
/// in, so it cannot belong to two groups) and hands out [`SegmentId`]
/// handles that stay valid across removals. Segment-to-segment relations
/// (a track splitting into or merging from other tracks) are kept as index
/// lists per slot rather than as owning references, so removal only has to
/// clear indices.
#[derive(Debug, Clone, Default)]
pub struct TrackGroup {
    slots: Vec<Option<TrackSegment>>,
    links: Vec<Links>,
    description: Option<String>,
}

impl TrackGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a segment into the group, returning its handle.
    pub fn add_segment(&mut self, segment: TrackSegment) -> SegmentId {
        self.slots.push(Some(segment));
        self.links.push(Links::default());
        SegmentId(self.slots.len() - 1)
    }

    /// Remove a segment, severing every link that references it, and give
    /// ownership back to the caller. Returns `None` for a stale handle.
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<TrackSegment> {
        let segment = self.slots.get_mut(id.0)?.take()?;
        self.links[id.0] = Links::default();
        for links in &mut self.links {
            links.previous.retain(|&other| other != id.0);
            links.next.retain(|&other| other != id.0);
        }
        Some(segment)
    }

    /// Record that `second` continues `first` (split/merge graph edge).
    pub fn link(&mut self, first: SegmentId, second: SegmentId) {
        if self.contains(first) && self.contains(second) && first != second {
            self.links[first.0].next.push(second.0);
            self.links[second.0].previous.push(first.0);
        }
    }

    /// Remove the `first -> second` edge if present.
    pub fn unlink(&mut self, first: SegmentId, second: SegmentId) {
        if first.0 < self.links.len() && second.0 < self.links.len() {
            self.links[first.0].next.retain(|&other| other != second.0);
            self.links[second.0]
                .previous
                .retain(|&other| other != first.0);
        }
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.is_some())
    }

    pub fn segment(&self, id: SegmentId) -> Option<&TrackSegment> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut TrackSegment> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Segments continuing the given one.
    pub fn next_segments(&self, id: SegmentId) -> Vec<SegmentId> {
        self.links
            .get(id.0)
            .map(|links| links.next.iter().map(|&i| SegmentId(i)).collect())
            .unwrap_or_default()
    }

    /// Segments the given one continues from.
    pub fn previous_segments(&self, id: SegmentId) -> Vec<SegmentId> {
        self.links
            .get(id.0)
            .map(|links| links.previous.iter().map(|&i| SegmentId(i)).collect())
            .unwrap_or_default()
    }

    /// Iterate over the live segments.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &TrackSegment)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (SegmentId(i), s)))
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the segment holding a detection at frame `t` matching the
    /// predicate.
    pub fn segment_with_detection<F>(&self, t: usize, predicate: F) -> Option<SegmentId>
    where
        F: Fn(&Detection) -> bool,
    {
        self.segments()
            .find(|(_, segment)| segment.detection_at(t).is_some_and(&predicate))
            .map(|(id, _)| id)
    }

    /// Drain all live segments out of the group.
    pub fn clear(&mut self) -> Vec<TrackSegment> {
        let segments = self.slots.drain(..).flatten().collect();
        self.links.clear();
        segments
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }
}
