use std::cell::Cell;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::node::SectionId;
use crate::core::types::{ModelRect, StaffPoint};
use crate::error::{ScoreError, ScoreResult};

/// One physical vertical stick of a barline, in staff-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSegment {
    pub section: SectionId,
    pub bounds: ModelRect,
}

impl BarSegment {
    #[must_use]
    pub const fn new(section: SectionId, bounds: ModelRect) -> Self {
        Self { section, bounds }
    }
}

/// Ending barline of a measure.
///
/// Center and left edge derive from the union box of the segments. Both are
/// computed on first query and kept until [`Barline::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barline {
    segments: SmallVec<[BarSegment; 2]>,
    center: Cell<Option<StaffPoint>>,
    left_x: Cell<Option<i32>>,
}

impl Barline {
    pub fn new(segments: impl IntoIterator<Item = BarSegment>) -> ScoreResult<Self> {
        let segments: SmallVec<[BarSegment; 2]> = segments.into_iter().collect();
        validate_segments(&segments)?;
        Ok(Self {
            segments,
            center: Cell::new(None),
            left_x: Cell::new(None),
        })
    }

    /// Single-segment barline centered on `center_x`.
    ///
    /// Used for placeholder lines closing a measure that had no detected bar.
    pub fn synthesized(
        section: SectionId,
        center_x: i32,
        top: i32,
        height: i32,
        thickness: i32,
    ) -> ScoreResult<Self> {
        let thickness = thickness.max(1);
        Self::new([BarSegment::new(
            section,
            ModelRect::new(center_x - thickness / 2, top, thickness, height),
        )])
    }

    #[must_use]
    pub fn segments(&self) -> &[BarSegment] {
        &self.segments
    }

    pub fn sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.segments.iter().map(|segment| segment.section)
    }

    /// Union box of all segments.
    #[must_use]
    pub fn bounds(&self) -> ModelRect {
        let mut iter = self.segments.iter().map(|segment| segment.bounds);
        // Invariant: construction and `replace_segments` reject empty segment lists.
        let first = iter.next().unwrap_or_default();
        iter.fold(first, ModelRect::union)
    }

    #[must_use]
    pub fn center(&self) -> StaffPoint {
        if let Some(center) = self.center.get() {
            return center;
        }
        let center = self.bounds().center();
        self.center.set(Some(center));
        center
    }

    #[must_use]
    pub fn left_x(&self) -> i32 {
        if let Some(left_x) = self.left_x.get() {
            return left_x;
        }
        let left_x = self.bounds().x;
        self.left_x.set(Some(left_x));
        left_x
    }

    /// Drops cached geometry so the next query recomputes it.
    pub fn reset(&self) {
        self.center.set(None);
        self.left_x.set(None);
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.center.get().is_some() && self.left_x.get().is_some()
    }

    pub(crate) fn replace_segments(
        &mut self,
        segments: impl IntoIterator<Item = BarSegment>,
    ) -> ScoreResult<()> {
        let segments: SmallVec<[BarSegment; 2]> = segments.into_iter().collect();
        validate_segments(&segments)?;
        self.segments = segments;
        self.reset();
        Ok(())
    }
}

fn validate_segments(segments: &[BarSegment]) -> ScoreResult<()> {
    if segments.is_empty() {
        return Err(ScoreError::InvalidData(
            "barline needs at least one segment".to_owned(),
        ));
    }
    if segments
        .iter()
        .any(|segment| segment.bounds.width < 0 || segment.bounds.height < 0)
    {
        return Err(ScoreError::InvalidData(
            "barline segment extent must be >= 0".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BarSegment, Barline};
    use crate::core::node::SectionId;
    use crate::core::types::{ModelRect, StaffPoint};

    fn stick(section: u32, x: i32, y: i32, height: i32) -> BarSegment {
        BarSegment::new(SectionId::new(section), ModelRect::new(x, y, 4, height))
    }

    #[test]
    fn center_and_left_edge_come_from_union_of_segments() {
        let barline = Barline::new([stick(1, 98, 0, 40), stick(2, 100, 40, 40)]).expect("barline");
        assert_eq!(barline.left_x(), 98);
        assert_eq!(barline.center(), StaffPoint::new(101, 40));
        assert!(barline.is_resolved());
    }

    #[test]
    fn reset_forgets_cached_geometry() {
        let mut barline = Barline::new([stick(1, 98, 0, 80)]).expect("barline");
        assert_eq!(barline.center().x, 100);

        barline.reset();
        assert!(!barline.is_resolved());

        barline
            .replace_segments([stick(1, 148, 0, 80)])
            .expect("move segments");
        assert_eq!(barline.center().x, 150);
        assert_eq!(barline.left_x(), 148);
    }

    #[test]
    fn empty_segment_list_is_rejected() {
        assert!(Barline::new(Vec::new()).is_err());
    }

    #[test]
    fn synthesized_line_is_centered_on_requested_abscissa() {
        let barline = Barline::synthesized(SectionId::new(0), 340, 0, 80, 3).expect("barline");
        assert_eq!(barline.center().x, 340);
        assert_eq!(barline.segments().len(), 1);
    }
}
