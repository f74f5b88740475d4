//! Model <-> display coordinate transform.

mod control;
mod factor;
mod geometry;
mod listener;
mod transform;

pub use control::{ControlPhase, ControlUpdate, RatioControl};
pub use factor::ZoomFactor;
pub use geometry::{DisplayPoint, DisplayRect, DisplaySize};
pub use listener::{ZoomChange, ZoomId, ZoomListener};
pub use transform::{ScaleTransform, ZoomConfig};
