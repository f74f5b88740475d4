//! Interactive collaborators of the score view: highlight marks and the
//! zoom slider.

mod mark;
mod slider;

pub use mark::{MarkChannel, MarkContext};
pub use slider::LogSlider;
