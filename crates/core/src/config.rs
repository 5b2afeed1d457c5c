use crate::DEFAULT_SWIPE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Distance a drag must exceed to count as a swipe.
    pub swipe_threshold: f64,
    pub snap_back_ms: u64,
    pub fling_ms: u64,
    pub mark_fling_ms: u64,
    pub feedback_hold_ms: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            snap_back_ms: 120,
            fling_ms: 260,
            mark_fling_ms: 200,
            feedback_hold_ms: 900,
        }
    }
}

impl DeckConfig {
    pub fn snap_back(&self) -> Duration {
        Duration::from_millis(self.snap_back_ms)
    }

    pub fn fling(&self) -> Duration {
        Duration::from_millis(self.fling_ms)
    }

    pub fn mark_fling(&self) -> Duration {
        Duration::from_millis(self.mark_fling_ms)
    }

    pub fn feedback_hold(&self) -> Duration {
        Duration::from_millis(self.feedback_hold_ms)
    }
}

/// Size of the surface the card is dragged across, in pointer units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}
