use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use indextree::NodeId;

use crate::core::{ModelPoint, ModelSize, ScoreTree, StaffPoint};
use crate::error::{ScoreError, ScoreResult};
use crate::render::Renderer;
use crate::zoom::{DisplayPoint, ZoomFactor};

use super::ScoreEngine;

/// Read-only geometry of one measure, in staff-relative model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSnapshot {
    pub id: u32,
    pub line_invented: bool,
    /// `None` when the previous measure has no barline to derive it from.
    pub left_x: Option<i32>,
    pub barline_center: Option<StaffPoint>,
    pub barline_left_x: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSnapshot {
    pub origin: ModelPoint,
    pub width: i32,
    pub interline: i32,
    pub stafflink: usize,
    pub measures: Vec<MeasureSnapshot>,
}

/// Serializable deterministic snapshot of the score geometry.
///
/// Owns plain values only, so it can be handed to worker threads and used
/// as a coordinate export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score_size: ModelSize,
    pub staves: Vec<StaffSnapshot>,
}

/// Display-space position of one measure at a given zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedMeasure {
    pub staff_index: usize,
    pub id: u32,
    pub left_x: Option<i32>,
    pub barline_center: Option<DisplayPoint>,
}

impl ScoreSnapshot {
    /// Resolves and copies the measure geometry of `tree`.
    pub fn capture(tree: &ScoreTree) -> ScoreResult<Self> {
        let mut staves = Vec::new();
        for staff in tree.staves() {
            let data = tree.staff_data(staff)?;
            let mut measures = Vec::new();
            for measure in tree.measures(staff)? {
                measures.push(capture_measure(tree, measure)?);
            }
            staves.push(StaffSnapshot {
                origin: data.origin,
                width: data.width,
                interline: data.interline,
                stafflink: data.stafflink,
                measures,
            });
        }
        Ok(Self {
            score_size: tree.size(),
            staves,
        })
    }

    #[must_use]
    pub fn measure_count(&self) -> usize {
        self.staves.iter().map(|staff| staff.measures.len()).sum()
    }

    /// Maps every measure to absolute display coordinates.
    #[must_use]
    pub fn project(&self, factor: ZoomFactor) -> Vec<ProjectedMeasure> {
        let entries: Vec<(usize, ModelPoint, MeasureSnapshot)> = self
            .staves
            .iter()
            .enumerate()
            .flat_map(|(index, staff)| {
                staff
                    .measures
                    .iter()
                    .map(move |measure| (index, staff.origin, *measure))
            })
            .collect();

        #[cfg(feature = "parallel-projection")]
        {
            entries
                .par_iter()
                .map(|(index, origin, measure)| project_measure(factor, *index, *origin, *measure))
                .collect()
        }

        #[cfg(not(feature = "parallel-projection"))]
        {
            entries
                .iter()
                .map(|(index, origin, measure)| project_measure(factor, *index, *origin, *measure))
                .collect()
        }
    }

    pub fn to_json_pretty(&self) -> ScoreResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScoreError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}

fn capture_measure(tree: &ScoreTree, measure: NodeId) -> ScoreResult<MeasureSnapshot> {
    let data = tree.measure_data(measure)?;
    let left_x = match tree.left_x(measure) {
        Ok(left_x) => Some(left_x),
        Err(ScoreError::IncompleteMeasure { .. }) => None,
        Err(err) => return Err(err),
    };
    let barline = match data.barline() {
        Some(barline) => Some(tree.barline_geometry(barline)?),
        None => None,
    };
    Ok(MeasureSnapshot {
        id: data.id(),
        line_invented: data.line_invented(),
        left_x,
        barline_center: barline.map(|barline| barline.center()),
        barline_left_x: barline.map(|barline| barline.left_x()),
    })
}

fn project_measure(
    factor: ZoomFactor,
    staff_index: usize,
    origin: ModelPoint,
    measure: MeasureSnapshot,
) -> ProjectedMeasure {
    ProjectedMeasure {
        staff_index,
        id: measure.id,
        left_x: measure
            .left_x
            .map(|left_x| factor.scaled(f64::from(origin.x + left_x))),
        barline_center: measure
            .barline_center
            .map(|center| factor.scaled_point(origin.offset(center))),
    }
}

impl<R: Renderer> ScoreEngine<R> {
    pub fn snapshot(&self) -> ScoreResult<ScoreSnapshot> {
        ScoreSnapshot::capture(&self.tree)
    }

    /// Projects the current snapshot at the current zoom ratio.
    pub fn project_measures(&self) -> ScoreResult<Vec<ProjectedMeasure>> {
        Ok(self.snapshot()?.project(self.zoom.factor()))
    }
}
