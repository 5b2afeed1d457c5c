use crate::{CategoryId, Outcome, SwipeDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    DeckRebuilt {
        cards: usize,
    },
    FilterChanged {
        category: CategoryId,
        selected: bool,
    },
    GestureStarted,
    /// A drag was dropped without being classified.
    GestureAborted,
    GestureResolved {
        outcome: Outcome,
        direction: Option<SwipeDirection>,
        dx: f64,
        dy: f64,
    },
    /// A swipe resolved while no card was active and was treated as a cancel.
    SwipeOnEmptyDeck {
        outcome: Outcome,
    },
    CardAdvanced {
        card_id: Option<String>,
        position: Option<usize>,
    },
    FeedbackShown,
    FeedbackCleared {
        dismissed: bool,
    },
    TornDown {
        cancelled_timers: usize,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
