use indextree::NodeId;
use thiserror::Error;

use crate::core::NodeKindTag;

pub type ScoreResult<T> = Result<T, ScoreError>;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("structural violation: {parent:?} cannot hold a {child:?} child")]
    StructuralViolation {
        parent: NodeKindTag,
        child: NodeKindTag,
    },

    #[error("measure {node:?} has no ending barline")]
    IncompleteMeasure { node: NodeId },

    #[error("node {0:?} is not part of this score tree")]
    UnknownNode(NodeId),

    #[error("node {node:?} is a {actual:?}, expected a {expected:?}")]
    UnexpectedKind {
        node: NodeId,
        expected: NodeKindTag,
        actual: NodeKindTag,
    },

    #[error("invalid viewport: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid zoom ratio: {0} (must be finite and > 0)")]
    InvalidRatio(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
