use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ZOOM_ID: AtomicU32 = AtomicU32::new(1);

/// Identity token of one transform instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoomId(u32);

impl ZoomId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ZOOM_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Change token shared by every listener of one notification batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomChange {
    pub source: ZoomId,
    pub ratio: f64,
    /// Increments once per batch.
    pub sequence: u64,
}

/// Subscriber notified synchronously, in registration order, when the
/// ratio of a transform changes.
pub trait ZoomListener {
    fn id(&self) -> &str;
    fn on_zoom_changed(&mut self, change: &ZoomChange);
}
