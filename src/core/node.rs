use std::cell::Cell;

use indextree::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::barline::Barline;
use crate::core::types::{ModelPoint, ModelSize, StaffPoint};

/// Identifier of one physical section produced by the line-extraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(u32);

impl SectionId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Data-free discriminant of [`NodeKind`], used for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKindTag {
    Score,
    Page,
    System,
    Staff,
    Measure,
    ClefList,
    Clef,
    Barline,
    TimeSignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreData {
    pub size: ModelSize,
    pub(crate) last_measure_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageData {
    pub number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemData {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffData {
    /// Absolute origin of the staff (top-left of the top line).
    pub origin: ModelPoint,
    pub width: i32,
    /// Distance between two consecutive staff lines.
    pub interline: i32,
    /// Index of this staff within its system, 0 for the top staff.
    pub stafflink: usize,
    pub(crate) last_measure_id: u32,
}

impl StaffData {
    #[must_use]
    pub fn new(origin: ModelPoint, width: i32, interline: i32, stafflink: usize) -> Self {
        Self {
            origin,
            width,
            interline,
            stafflink,
            last_measure_id: 0,
        }
    }

    /// Highest measure id handed out since the last counter reset.
    #[must_use]
    pub fn last_measure_id(&self) -> u32 {
        self.last_measure_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureData {
    pub(crate) id: u32,
    pub(crate) left_x: Cell<Option<i32>>,
    pub(crate) line_invented: bool,
    pub(crate) barline: Option<NodeId>,
    pub(crate) time_signature: Option<NodeId>,
    pub(crate) clefs: Option<NodeId>,
    pub(crate) staff: Option<NodeId>,
}

impl MeasureData {
    /// `line_invented` flags a measure whose ending barline was synthesized.
    #[must_use]
    pub fn new(line_invented: bool) -> Self {
        Self {
            id: 0,
            left_x: Cell::new(None),
            line_invented,
            barline: None,
            time_signature: None,
            clefs: None,
            staff: None,
        }
    }

    /// Identifier assigned by the last recompute pass, 0 before any pass.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn line_invented(&self) -> bool {
        self.line_invented
    }

    #[must_use]
    pub fn barline(&self) -> Option<NodeId> {
        self.barline
    }

    #[must_use]
    pub fn time_signature(&self) -> Option<NodeId> {
        self.time_signature
    }

    /// The clef sub-collection node.
    #[must_use]
    pub fn clef_list(&self) -> Option<NodeId> {
        self.clefs
    }

    /// Staff link refreshed by the recompute pass.
    #[must_use]
    pub fn staff(&self) -> Option<NodeId> {
        self.staff
    }

    #[must_use]
    pub fn cached_left_x(&self) -> Option<i32> {
        self.left_x.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClefShape {
    Treble,
    Bass,
    Alto,
    Tenor,
    Percussion,
}

impl ClefShape {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Treble => "G",
            Self::Bass => "F",
            Self::Alto | Self::Tenor => "C",
            Self::Percussion => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClefData {
    pub shape: ClefShape,
    pub center: StaffPoint,
    pub sections: SmallVec<[SectionId; 4]>,
}

impl ClefData {
    #[must_use]
    pub fn new(shape: ClefShape, center: StaffPoint) -> Self {
        Self {
            shape,
            center,
            sections: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_sections(mut self, sections: impl IntoIterator<Item = SectionId>) -> Self {
        self.sections.extend(sections);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignatureData {
    pub numerator: u8,
    pub denominator: u8,
    pub center: StaffPoint,
}

/// Payload of one score node, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Score(ScoreData),
    Page(PageData),
    System(SystemData),
    Staff(StaffData),
    Measure(MeasureData),
    ClefList,
    Clef(ClefData),
    Barline(Barline),
    TimeSignature(TimeSignatureData),
}

impl NodeKind {
    #[must_use]
    pub fn tag(&self) -> NodeKindTag {
        match self {
            Self::Score(_) => NodeKindTag::Score,
            Self::Page(_) => NodeKindTag::Page,
            Self::System(_) => NodeKindTag::System,
            Self::Staff(_) => NodeKindTag::Staff,
            Self::Measure(_) => NodeKindTag::Measure,
            Self::ClefList => NodeKindTag::ClefList,
            Self::Clef(_) => NodeKindTag::Clef,
            Self::Barline(_) => NodeKindTag::Barline,
            Self::TimeSignature(_) => NodeKindTag::TimeSignature,
        }
    }

    #[must_use]
    pub fn page(number: u32) -> Self {
        Self::Page(PageData { number })
    }

    #[must_use]
    pub fn system(id: u32) -> Self {
        Self::System(SystemData { id })
    }

    #[must_use]
    pub fn staff(origin: ModelPoint, width: i32, interline: i32, stafflink: usize) -> Self {
        Self::Staff(StaffData::new(origin, width, interline, stafflink))
    }

    #[must_use]
    pub fn measure(line_invented: bool) -> Self {
        Self::Measure(MeasureData::new(line_invented))
    }

    #[must_use]
    pub fn clef(shape: ClefShape, center: StaffPoint) -> Self {
        Self::Clef(ClefData::new(shape, center))
    }

    #[must_use]
    pub fn time_signature(numerator: u8, denominator: u8, center: StaffPoint) -> Self {
        Self::TimeSignature(TimeSignatureData {
            numerator,
            denominator,
            center,
        })
    }
}

/// Arena payload: the node kind plus its rebuild flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub(crate) kind: NodeKind,
    pub(crate) stale: bool,
}

impl TreeNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self { kind, stale: true }
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn tag(&self) -> NodeKindTag {
        self.kind.tag()
    }

    /// Set by insertion and cleanup, cleared when a recompute pass visits the node.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
