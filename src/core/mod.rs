mod barline;
mod measure;
mod node;
mod traversal;
mod tree;
pub mod types;

pub use indextree::NodeId;

pub use barline::{BarSegment, Barline};
pub use node::{
    ClefData, ClefShape, MeasureData, NodeKind, NodeKindTag, PageData, ScoreData, SectionId,
    StaffData, SystemData, TimeSignatureData, TreeNode,
};
pub use traversal::{Pass, PassSummary};
pub use tree::{MeasureIdScope, ScoreTree};
pub use types::{ModelPoint, ModelRect, ModelSize, StaffPoint, Viewport};
