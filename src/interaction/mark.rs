use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::SectionId;
use crate::render::Color;

/// Rendering channel a highlight applies to (one per view of the same sections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkChannel(u16);

impl MarkChannel {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Section colors collected by a mark pass.
///
/// Later assignments of the same section in the same channel win, while the
/// first-assignment order is kept for deterministic output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkContext {
    marks: IndexMap<(MarkChannel, SectionId), Color>,
}

impl MarkContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, channel: MarkChannel, section: SectionId, color: Color) {
        self.marks.insert((channel, section), color);
    }

    #[must_use]
    pub fn color_of(&self, channel: MarkChannel, section: SectionId) -> Option<Color> {
        self.marks.get(&(channel, section)).copied()
    }

    /// Sections marked in `channel`, in first-assignment order.
    pub fn sections(&self, channel: MarkChannel) -> impl Iterator<Item = SectionId> + '_ {
        self.marks
            .keys()
            .filter(move |(entry_channel, _)| *entry_channel == channel)
            .map(|(_, section)| *section)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkChannel, MarkContext};
    use crate::core::SectionId;
    use crate::render::Color;

    #[test]
    fn channels_are_independent() {
        let mut context = MarkContext::new();
        let red = Color::rgb(1.0, 0.0, 0.0);
        context.assign(MarkChannel::new(0), SectionId::new(4), red);
        context.assign(MarkChannel::new(1), SectionId::new(4), Color::BLACK);
        context.assign(MarkChannel::new(0), SectionId::new(2), red);

        assert_eq!(context.color_of(MarkChannel::new(0), SectionId::new(4)), Some(red));
        assert_eq!(
            context.color_of(MarkChannel::new(1), SectionId::new(4)),
            Some(Color::BLACK)
        );
        let sections: Vec<_> = context.sections(MarkChannel::new(0)).collect();
        assert_eq!(sections, vec![SectionId::new(4), SectionId::new(2)]);
    }
}
