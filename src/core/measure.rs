//! Measure geometry and identity.
//!
//! The left edge of a measure is the center abscissa of the previous
//! measure's ending barline, or 0 for the first measure of a staff. It is
//! memoized per measure and only recomputed after an explicit reset.

use indextree::NodeId;
use tracing::trace;

use crate::core::barline::{BarSegment, Barline};
use crate::core::node::{NodeKind, NodeKindTag};
use crate::core::tree::ScoreTree;
use crate::core::types::StaffPoint;
use crate::error::{ScoreError, ScoreResult};

impl ScoreTree {
    /// Identifier assigned to `measure` by the last recompute pass.
    pub fn measure_id(&self, measure: NodeId) -> ScoreResult<u32> {
        self.measure_data(measure).map(|data| data.id)
    }

    /// Ending barline of `measure`.
    pub fn barline(&self, measure: NodeId) -> ScoreResult<&Barline> {
        let Some(barline) = self.measure_data(measure)?.barline else {
            return Err(ScoreError::IncompleteMeasure { node: measure });
        };
        self.barline_geometry(barline)
    }

    pub fn barline_geometry(&self, barline: NodeId) -> ScoreResult<&Barline> {
        match self.node(barline)?.kind() {
            NodeKind::Barline(geometry) => Ok(geometry),
            other => Err(ScoreError::UnexpectedKind {
                node: barline,
                expected: NodeKindTag::Barline,
                actual: other.tag(),
            }),
        }
    }

    /// Staff-relative abscissa where `measure` starts.
    pub fn left_x(&self, measure: NodeId) -> ScoreResult<i32> {
        let data = self.measure_data(measure)?;
        if let Some(left_x) = data.left_x.get() {
            return Ok(left_x);
        }

        let left_x = match self.previous_measure(measure)? {
            None => 0,
            Some(previous) => self.barline(previous)?.center().x,
        };
        data.left_x.set(Some(left_x));
        trace!(measure = ?measure, left_x, "resolved measure left edge");
        Ok(left_x)
    }

    fn previous_measure(&self, measure: NodeId) -> ScoreResult<Option<NodeId>> {
        let mut cursor = self.previous_sibling(measure)?;
        while let Some(sibling) = cursor {
            if self.kind_of(sibling)? == NodeKindTag::Measure {
                return Ok(Some(sibling));
            }
            cursor = self.previous_sibling(sibling)?;
        }
        Ok(None)
    }

    pub(crate) fn next_measure(&self, measure: NodeId) -> ScoreResult<Option<NodeId>> {
        let mut cursor = self.next_sibling(measure)?;
        while let Some(sibling) = cursor {
            if self.kind_of(sibling)? == NodeKindTag::Measure {
                return Ok(Some(sibling));
            }
            cursor = self.next_sibling(sibling)?;
        }
        Ok(None)
    }

    /// Signed distance from the measure left edge to `point`.
    ///
    /// Negative when the point lies left of the edge. Only the previous
    /// measure's barline is needed, so an open last measure still answers.
    pub fn left_margin_of(&self, measure: NodeId, point: StaffPoint) -> ScoreResult<i32> {
        Ok(point.x - self.left_x(measure)?)
    }

    /// Signed distance from `point` to the left edge of the ending barline.
    pub fn right_margin_of(&self, measure: NodeId, point: StaffPoint) -> ScoreResult<i32> {
        Ok(self.barline(measure)?.left_x() - point.x)
    }

    /// Forgets the cached geometry of `measure` and of its barline.
    ///
    /// The left edge of the following measure is derived from this barline,
    /// so its cache is dropped as well. Nothing else is touched.
    pub fn reset_measure(&self, measure: NodeId) -> ScoreResult<()> {
        let data = self.measure_data(measure)?;
        data.left_x.set(None);
        if let Some(barline) = data.barline {
            self.barline_geometry(barline)?.reset();
        }
        if let Some(next) = self.next_measure(measure)? {
            self.measure_data(next)?.left_x.set(None);
        }
        trace!(measure = ?measure, "reset measure geometry");
        Ok(())
    }

    /// Resets `barline` through its owning measure.
    pub fn reset_barline(&self, barline: NodeId) -> ScoreResult<()> {
        self.barline_geometry(barline)?;
        match self.container(barline)? {
            Some(measure) if self.kind_of(measure)? == NodeKindTag::Measure => {
                self.reset_measure(measure)
            }
            _ => {
                self.barline_geometry(barline)?.reset();
                Ok(())
            }
        }
    }

    /// Replaces the physical segments of the ending barline of `measure`.
    pub fn move_barline(
        &mut self,
        measure: NodeId,
        segments: impl IntoIterator<Item = BarSegment>,
    ) -> ScoreResult<()> {
        let Some(barline) = self.measure_data(measure)?.barline else {
            return Err(ScoreError::IncompleteMeasure { node: measure });
        };
        match &mut self.node_mut(barline)?.kind {
            NodeKind::Barline(geometry) => geometry.replace_segments(segments)?,
            other => {
                return Err(ScoreError::UnexpectedKind {
                    node: barline,
                    expected: NodeKindTag::Barline,
                    actual: other.tag(),
                });
            }
        }
        self.reset_measure(measure)
    }
}

#[cfg(test)]
mod tests {
    use indextree::NodeId;

    use crate::core::barline::{BarSegment, Barline};
    use crate::core::node::{NodeKind, SectionId};
    use crate::core::tree::ScoreTree;
    use crate::core::types::{ModelPoint, ModelRect, ModelSize, StaffPoint};
    use crate::error::ScoreError;

    fn bar_at(center_x: i32) -> BarSegment {
        BarSegment::new(
            SectionId::new(center_x as u32),
            ModelRect::new(center_x - 2, 0, 4, 80),
        )
    }

    fn staff_with_bars(centers: &[i32]) -> (ScoreTree, Vec<NodeId>) {
        let mut tree = ScoreTree::new(ModelSize::new(2000, 3000));
        let page = tree.add_child(tree.root(), NodeKind::page(1)).expect("page");
        let system = tree.add_child(page, NodeKind::system(1)).expect("system");
        let staff = tree
            .add_child(system, NodeKind::staff(ModelPoint::new(0, 0), 1000, 20, 0))
            .expect("staff");
        let mut measures = Vec::new();
        for &center in centers {
            let measure = tree.add_child(staff, NodeKind::measure(false)).expect("measure");
            tree.add_child(
                measure,
                NodeKind::Barline(Barline::new([bar_at(center)]).expect("barline")),
            )
            .expect("barline");
            measures.push(measure);
        }
        (tree, measures)
    }

    #[test]
    fn left_edges_follow_previous_barline_centers() {
        let (tree, measures) = staff_with_bars(&[100, 220, 340]);
        let edges: Vec<i32> = measures
            .iter()
            .map(|m| tree.left_x(*m).expect("left x"))
            .collect();
        assert_eq!(edges, vec![0, 100, 220]);
    }

    #[test]
    fn margins_are_signed_and_unbounded() {
        let (tree, measures) = staff_with_bars(&[100, 220]);
        let second = measures[1];
        assert_eq!(
            tree.left_margin_of(second, StaffPoint::new(130, 10)).expect("left"),
            30
        );
        assert_eq!(
            tree.left_margin_of(second, StaffPoint::new(90, 10)).expect("left"),
            -10
        );
        // Barline left edge is 218.
        assert_eq!(
            tree.right_margin_of(second, StaffPoint::new(200, 10)).expect("right"),
            18
        );
        assert_eq!(
            tree.right_margin_of(second, StaffPoint::new(230, 10)).expect("right"),
            -12
        );
    }

    #[test]
    fn margin_query_without_barline_is_a_contract_violation() {
        let mut tree = ScoreTree::new(ModelSize::new(100, 100));
        let page = tree.add_child(tree.root(), NodeKind::page(1)).expect("page");
        let system = tree.add_child(page, NodeKind::system(1)).expect("system");
        let staff = tree
            .add_child(system, NodeKind::staff(ModelPoint::new(0, 0), 100, 20, 0))
            .expect("staff");
        let measure = tree.add_child(staff, NodeKind::measure(true)).expect("measure");

        let err = tree
            .right_margin_of(measure, StaffPoint::new(0, 0))
            .expect_err("no barline");
        assert!(matches!(err, ScoreError::IncompleteMeasure { node } if node == measure));
        // The first edge is the staff origin and needs no barline.
        assert_eq!(
            tree.left_margin_of(measure, StaffPoint::new(12, 0)).expect("left"),
            12
        );

        let next = tree.add_child(staff, NodeKind::measure(true)).expect("measure");
        let err = tree
            .left_margin_of(next, StaffPoint::new(0, 0))
            .expect_err("previous barline missing");
        assert!(matches!(err, ScoreError::IncompleteMeasure { node } if node == measure));
    }

    #[test]
    fn open_last_measure_still_reports_its_left_margin() {
        let (mut tree, measures) = staff_with_bars(&[100, 220]);
        let staff = tree.staff_of(measures[0]).expect("lookup").expect("staff");
        let open = tree.add_child(staff, NodeKind::measure(true)).expect("measure");

        assert_eq!(
            tree.left_margin_of(open, StaffPoint::new(250, 10)).expect("left"),
            30
        );
        assert!(tree.right_margin_of(open, StaffPoint::new(250, 10)).is_err());
    }

    #[test]
    fn reset_invalidates_owner_and_next_sibling_only() {
        let (tree, measures) = staff_with_bars(&[100, 220, 340, 460]);
        for measure in &measures {
            tree.left_x(*measure).expect("warm cache");
            let barline = tree.barline(*measure).expect("barline");
            barline.center();
            barline.left_x();
        }
        assert!(
            measures
                .iter()
                .all(|m| tree.barline(*m).expect("barline").is_resolved())
        );

        tree.reset_measure(measures[1]).expect("reset");

        let cached: Vec<bool> = measures
            .iter()
            .map(|m| tree.measure_data(*m).expect("data").cached_left_x().is_some())
            .collect();
        assert_eq!(cached, vec![true, false, false, true]);

        let resolved: Vec<bool> = measures
            .iter()
            .map(|m| tree.barline(*m).expect("barline").is_resolved())
            .collect();
        assert_eq!(resolved, vec![true, false, true, true]);
    }

    #[test]
    fn moving_a_barline_shifts_the_following_left_edge() {
        let (mut tree, measures) = staff_with_bars(&[100, 220, 340]);
        assert_eq!(tree.left_x(measures[2]).expect("left"), 220);

        tree.move_barline(measures[1], [bar_at(250)]).expect("move");

        assert_eq!(tree.left_x(measures[1]).expect("left"), 100);
        assert_eq!(tree.left_x(measures[2]).expect("left"), 250);
    }

    #[test]
    fn long_reset_chain_resolves_each_edge_once() {
        let centers: Vec<i32> = (1..=200).map(|i| i * 50).collect();
        let (tree, measures) = staff_with_bars(&centers);
        for measure in &measures {
            tree.reset_measure(*measure).expect("reset");
        }
        for (index, measure) in measures.iter().enumerate().rev() {
            let expected = if index == 0 { 0 } else { centers[index - 1] };
            assert_eq!(tree.left_x(*measure).expect("left"), expected);
        }
        assert!(
            measures
                .iter()
                .all(|m| tree.measure_data(*m).expect("data").cached_left_x().is_some())
        );
    }
}
