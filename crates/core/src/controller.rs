use crate::{
    Card, Category, CategoryId, CategoryTable, Classification, DeckConfig, DeckSequencer, Event,
    EventBus, FilterSet, GestureMachine, NoCapture, Offset, Outcome, Point, PointerCapture,
    PointerId, RngState, Scheduler, SwipeDirection, TimerId, Viewport,
};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    SnapBack,
    FlingDone,
    ShowFeedback,
    FeedbackDone,
}

/// Everything the view needs for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckSnapshot<'a> {
    pub active_card: Option<&'a Card>,
    pub active_category: &'static Category,
    pub live_offset: Offset,
    pub is_animating: bool,
    pub show_feedback: bool,
    pub position: Option<usize>,
    pub deck_len: usize,
}

/// Drives the deck from pointer input. Hosts feed pointer events, call
/// [`DeckController::frame`] once per animation frame and
/// [`DeckController::tick`] with monotonic time, then render [`DeckController::snapshot`].
pub struct DeckController {
    deck: DeckSequencer,
    gesture: GestureMachine,
    scheduler: Scheduler<Task>,
    categories: CategoryTable,
    config: DeckConfig,
    viewport: Viewport,
    pointer_target: Box<dyn PointerCapture>,
    show_feedback: bool,
    feedback_timer: Option<TimerId>,
    events: EventBus,
}

impl DeckController {
    pub fn new(config: DeckConfig, rng: RngState) -> Self {
        Self {
            deck: DeckSequencer::new(rng),
            gesture: GestureMachine::new(config.swipe_threshold),
            scheduler: Scheduler::new(),
            categories: CategoryTable::default(),
            config,
            viewport: Viewport::default(),
            pointer_target: Box::new(NoCapture),
            show_feedback: false,
            feedback_timer: None,
            events: EventBus::default(),
        }
    }

    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }

    pub fn set_pointer_target(&mut self, target: Box<dyn PointerCapture>) {
        self.pointer_target = target;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn deck(&self) -> &DeckSequencer {
        &self.deck
    }

    pub fn filters(&self) -> &FilterSet {
        self.deck.filters()
    }

    pub fn categories(&self) -> CategoryTable {
        self.categories
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.deck.set_cards(cards);
        self.rebuilt();
    }

    pub fn set_filter(&mut self, category: CategoryId, selected: bool) {
        self.deck.set_filter(category, selected);
        self.events.push(Event::FilterChanged { category, selected });
        self.rebuilt();
    }

    pub fn toggle_category(&mut self, category: CategoryId) -> bool {
        let selected = self.deck.toggle(category);
        self.events.push(Event::FilterChanged { category, selected });
        self.rebuilt();
        selected
    }

    pub fn replace_filters(&mut self, filters: FilterSet) {
        self.deck.replace_filters(filters);
        self.rebuilt();
    }

    pub fn set_player_limit(&mut self, limit: Option<u32>) {
        self.deck.set_player_limit(limit);
        self.rebuilt();
    }

    pub fn pointer_down(&mut self, pointer: PointerId, point: Point, now: Duration) -> bool {
        self.scheduler.observe(now);
        let started = self
            .gesture
            .pointer_down(pointer, point, self.pointer_target.as_mut());
        if started {
            self.events.push(Event::GestureStarted);
        }
        started
    }

    /// Returns true when the host should schedule an animation frame.
    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> bool {
        self.gesture.pointer_move(pointer, point) && self.scheduler.request_frame()
    }

    /// Applies the coalesced pointer move. Returns true when the offset changed.
    pub fn frame(&mut self, now: Duration) -> bool {
        self.scheduler.observe(now);
        self.scheduler.take_frame() && self.gesture.flush_frame()
    }

    pub fn pointer_up(&mut self, pointer: PointerId, now: Duration) -> Option<Classification> {
        self.scheduler.observe(now);
        let classification = self
            .gesture
            .pointer_up(pointer, self.pointer_target.as_mut())?;
        self.scheduler.cancel_frame();
        self.release(classification);
        Some(classification)
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId, now: Duration) -> Option<Classification> {
        self.scheduler.observe(now);
        let classification = self
            .gesture
            .pointer_cancel(pointer, self.pointer_target.as_mut())?;
        self.scheduler.cancel_frame();
        self.release(classification);
        Some(classification)
    }

    /// Drops an in-progress drag without classifying it. Release animations
    /// already scheduled are left to finish.
    pub fn abort_gesture(&mut self) -> bool {
        if !self.gesture.is_dragging() {
            return false;
        }
        self.gesture.teardown(self.pointer_target.as_mut());
        self.scheduler.cancel_frame();
        self.events.push(Event::GestureAborted);
        true
    }

    /// Runs every timer due at `now`.
    pub fn tick(&mut self, now: Duration) {
        for task in self.scheduler.due(now) {
            self.run(task);
        }
    }

    /// Closes the feedback overlay early, completing the pending mark.
    pub fn dismiss_feedback(&mut self, now: Duration) -> bool {
        self.scheduler.observe(now);
        if !self.show_feedback {
            return false;
        }
        if let Some(timer) = self.feedback_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.finish_mark(true);
        true
    }

    /// Cancels timers and any frame request and releases pointer capture.
    pub fn teardown(&mut self) {
        let cancelled_timers = self.scheduler.pending();
        self.scheduler.cancel_all();
        self.gesture.teardown(self.pointer_target.as_mut());
        self.show_feedback = false;
        self.feedback_timer = None;
        self.events.push(Event::TornDown { cancelled_timers });
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle() && !self.gesture.is_dragging() && !self.gesture.is_animating()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn snapshot(&self) -> DeckSnapshot<'_> {
        let active_card = self.deck.current();
        let active_category = match active_card {
            Some(card) => self.categories.resolve(card.category_id),
            None => self.categories.default_category(),
        };
        DeckSnapshot {
            active_card,
            active_category,
            live_offset: self.gesture.offset(),
            is_animating: self.gesture.is_animating(),
            show_feedback: self.show_feedback,
            position: self.deck.position(),
            deck_len: self.deck.len(),
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain()
    }

    fn rebuilt(&mut self) {
        self.events.push(Event::DeckRebuilt {
            cards: self.deck.len(),
        });
    }

    fn release(&mut self, classification: Classification) {
        let offset = self.gesture.offset();
        self.events.push(Event::GestureResolved {
            outcome: classification.outcome,
            direction: classification.direction,
            dx: offset.dx,
            dy: offset.dy,
        });
        let outcome = classification.outcome;
        if outcome != Outcome::Cancel && self.deck.is_empty() {
            self.events.push(Event::SwipeOnEmptyDeck { outcome });
            self.scheduler.schedule(self.config.snap_back(), Task::SnapBack);
            return;
        }
        let target = classification
            .direction
            .map(|direction| self.fling_target(direction, offset));
        match outcome {
            Outcome::Cancel => {
                self.scheduler.schedule(self.config.snap_back(), Task::SnapBack);
            }
            Outcome::Advance => {
                self.gesture.fling_to(target.unwrap_or(offset));
                self.scheduler.schedule(self.config.fling(), Task::FlingDone);
            }
            Outcome::Mark => {
                self.gesture.fling_to(target.unwrap_or(offset));
                let timer = self
                    .scheduler
                    .schedule(self.config.mark_fling(), Task::ShowFeedback);
                self.feedback_timer = Some(timer);
            }
        }
    }

    fn fling_target(&self, direction: SwipeDirection, from: Offset) -> Offset {
        let Viewport { width, height } = self.viewport;
        match direction {
            SwipeDirection::Right => Offset::new(width, from.dy),
            SwipeDirection::Up => Offset::new(from.dx, -height),
            SwipeDirection::Left => Offset::new(-width * 0.5, from.dy),
            SwipeDirection::Down => Offset::new(from.dx, height * 0.35),
        }
    }

    fn run(&mut self, task: Task) {
        debug!(?task, "timer fired");
        match task {
            Task::SnapBack => self.gesture.settle(),
            Task::FlingDone => {
                self.gesture.settle();
                self.advance();
            }
            Task::ShowFeedback => {
                self.show_feedback = true;
                self.events.push(Event::FeedbackShown);
                let timer = self
                    .scheduler
                    .schedule(self.config.feedback_hold(), Task::FeedbackDone);
                self.feedback_timer = Some(timer);
            }
            Task::FeedbackDone => {
                self.feedback_timer = None;
                self.finish_mark(false);
            }
        }
    }

    fn finish_mark(&mut self, dismissed: bool) {
        self.show_feedback = false;
        self.events.push(Event::FeedbackCleared { dismissed });
        self.gesture.settle();
        self.advance();
    }

    fn advance(&mut self) {
        self.deck.advance();
        self.events.push(Event::CardAdvanced {
            card_id: self.deck.current().map(|card| card.id.clone()),
            position: self.deck.position(),
        });
    }
}

impl Drop for DeckController {
    fn drop(&mut self) {
        if !self.is_idle() {
            self.teardown();
        }
    }
}
