use sipdeck_core::{
    CaptureError, Card, Category, CategoryId, CategoryTable, DeckConfig, DeckController, Event,
    Offset, Outcome, Point, PointerCapture, PointerId, RngState, Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const P: PointerId = PointerId(1);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn cards() -> Vec<Card> {
    vec![
        Card::new("t1", "Truth one", CategoryId::Truth),
        Card::new("t2", "Truth two", CategoryId::Truth),
        Card::new("t3", "Truth three", CategoryId::Truth),
        Card::new("d1", "Dare one", CategoryId::Dare),
        Card::new("d2", "Dare two", CategoryId::Dare),
    ]
}

fn controller() -> DeckController {
    let mut controller = DeckController::new(DeckConfig::default(), RngState::from_seed(42));
    controller.set_viewport(Viewport {
        width: 800.0,
        height: 600.0,
    });
    controller.set_cards(cards());
    controller
}

fn swipe(controller: &mut DeckController, dx: f64, dy: f64, at: u64) -> Option<Outcome> {
    controller.pointer_down(P, Point::new(100.0, 100.0), ms(at));
    controller.pointer_move(P, Point::new(100.0 + dx, 100.0 + dy));
    controller.frame(ms(at + 5));
    controller
        .pointer_up(P, ms(at + 10))
        .map(|classification| classification.outcome)
}

#[derive(Default)]
struct CaptureLog {
    captured: Vec<PointerId>,
    released: Vec<PointerId>,
}

struct SharedCapture(Rc<RefCell<CaptureLog>>);

impl PointerCapture for SharedCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        self.0.borrow_mut().captured.push(pointer);
        Ok(())
    }

    fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        self.0.borrow_mut().released.push(pointer);
        Err(CaptureError::Detached)
    }
}

#[test]
fn right_swipe_flings_then_advances() {
    let mut controller = controller();
    let first = controller.snapshot().active_card.expect("card").id.clone();

    assert_eq!(swipe(&mut controller, 120.0, 10.0, 0), Some(Outcome::Advance));
    let snapshot = controller.snapshot();
    assert!(snapshot.is_animating);
    assert_eq!(snapshot.live_offset, Offset::new(800.0, 10.0));
    assert_eq!(snapshot.active_card.expect("card").id, first);

    controller.tick(ms(200));
    assert!(controller.snapshot().is_animating);
    controller.tick(ms(270));
    let snapshot = controller.snapshot();
    assert!(!snapshot.is_animating);
    assert_eq!(snapshot.live_offset, Offset::ZERO);
    assert_eq!(snapshot.position, Some(1));
    assert_ne!(snapshot.active_card.expect("card").id, first);
}

#[test]
fn upward_swipe_advances() {
    let mut controller = controller();
    assert_eq!(swipe(&mut controller, 0.0, -150.0, 0), Some(Outcome::Advance));
    assert_eq!(controller.snapshot().live_offset, Offset::new(0.0, -600.0));
    controller.tick(ms(400));
    assert_eq!(controller.deck().cursor(), 1);
}

#[test]
fn left_swipe_shows_feedback_before_advancing() {
    let mut controller = controller();
    assert_eq!(swipe(&mut controller, -100.0, 0.0, 0), Some(Outcome::Mark));
    assert_eq!(controller.snapshot().live_offset, Offset::new(-400.0, 0.0));
    assert!(!controller.snapshot().show_feedback);

    controller.tick(ms(210));
    assert!(controller.snapshot().show_feedback);
    assert!(controller.snapshot().is_animating);
    controller.tick(ms(1_000));
    assert!(controller.snapshot().show_feedback);
    assert_eq!(controller.deck().cursor(), 0);

    controller.tick(ms(1_110));
    let snapshot = controller.snapshot();
    assert!(!snapshot.show_feedback);
    assert!(!snapshot.is_animating);
    assert_eq!(snapshot.position, Some(1));
}

#[test]
fn downward_swipe_marks() {
    let mut controller = controller();
    assert_eq!(swipe(&mut controller, 5.0, 90.0, 0), Some(Outcome::Mark));
    assert_eq!(controller.snapshot().live_offset, Offset::new(5.0, 210.0));
}

#[test]
fn short_drag_snaps_back_without_advancing() {
    let mut controller = controller();
    assert_eq!(swipe(&mut controller, 30.0, -20.0, 0), Some(Outcome::Cancel));
    assert_eq!(controller.snapshot().live_offset, Offset::new(30.0, -20.0));
    controller.tick(ms(100));
    assert!(controller.snapshot().is_animating);
    controller.tick(ms(130));
    let snapshot = controller.snapshot();
    assert!(!snapshot.is_animating);
    assert_eq!(snapshot.live_offset, Offset::ZERO);
    assert_eq!(controller.deck().cursor(), 0);
}

#[test]
fn new_gestures_are_ignored_while_animating() {
    let mut controller = controller();
    swipe(&mut controller, 120.0, 0.0, 0);
    assert!(!controller.pointer_down(PointerId(2), Point::new(0.0, 0.0), ms(50)));
    assert!(controller.pointer_up(PointerId(2), ms(60)).is_none());
    controller.tick(ms(300));
    assert!(controller.pointer_down(PointerId(2), Point::new(0.0, 0.0), ms(310)));
}

#[test]
fn swipe_on_empty_deck_only_snaps_back() {
    let mut controller = controller();
    controller.set_filter(CategoryId::Truth, false);
    controller.set_filter(CategoryId::Dare, false);
    controller.drain_events().for_each(drop);

    assert_eq!(swipe(&mut controller, 150.0, 0.0, 0), Some(Outcome::Advance));
    assert_eq!(controller.snapshot().live_offset, Offset::new(150.0, 0.0));
    controller.tick(ms(200));

    let events: Vec<Event> = controller.drain_events().collect();
    assert!(events.contains(&Event::SwipeOnEmptyDeck {
        outcome: Outcome::Advance
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CardAdvanced { .. })));
    let snapshot = controller.snapshot();
    assert!(snapshot.active_card.is_none());
    assert!(!snapshot.is_animating);
    assert_eq!(snapshot.active_category.id, CategoryId::Truth);
    assert_eq!(controller.deck().cursor(), 0);
}

#[test]
fn escape_dismisses_feedback_early() {
    let mut controller = controller();
    swipe(&mut controller, -120.0, 0.0, 0);
    assert!(!controller.dismiss_feedback(ms(50)));
    controller.tick(ms(220));
    assert!(controller.dismiss_feedback(ms(300)));
    let snapshot = controller.snapshot();
    assert!(!snapshot.show_feedback);
    assert!(!snapshot.is_animating);
    assert_eq!(snapshot.position, Some(1));

    controller.tick(ms(5_000));
    assert_eq!(controller.deck().cursor(), 1);
    assert!(controller.is_idle());
}

#[test]
fn moves_are_coalesced_into_one_frame() {
    let mut controller = controller();
    controller.pointer_down(P, Point::new(0.0, 0.0), ms(0));
    assert!(controller.pointer_move(P, Point::new(10.0, 0.0)));
    assert!(!controller.pointer_move(P, Point::new(20.0, 0.0)));
    assert!(!controller.pointer_move(P, Point::new(35.0, 4.0)));
    assert_eq!(controller.snapshot().live_offset, Offset::ZERO);
    assert!(controller.frame(ms(16)));
    assert_eq!(controller.snapshot().live_offset, Offset::new(35.0, 4.0));
    assert!(!controller.frame(ms(32)));
}

#[test]
fn filter_change_resets_cursor_before_next_read() {
    let mut controller = controller();
    swipe(&mut controller, 120.0, 0.0, 0);
    controller.tick(ms(300));
    assert_eq!(controller.deck().cursor(), 1);

    controller.set_filter(CategoryId::Dare, false);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.deck_len, 3);
    assert_eq!(snapshot.position, Some(0));
    assert_eq!(
        snapshot.active_card.expect("card").category_id,
        CategoryId::Truth
    );
    let events: Vec<Event> = controller.drain_events().collect();
    assert!(events.contains(&Event::FilterChanged {
        category: CategoryId::Dare,
        selected: false
    }));
    assert!(events.contains(&Event::DeckRebuilt { cards: 3 }));
}

#[test]
fn teardown_cancels_pending_work_and_releases_capture() {
    let log = Rc::new(RefCell::new(CaptureLog::default()));
    let mut controller = controller();
    controller.set_pointer_target(Box::new(SharedCapture(Rc::clone(&log))));

    swipe(&mut controller, -120.0, 0.0, 0);
    assert_eq!(log.borrow().released, vec![P]);

    controller.pointer_down(PointerId(3), Point::default(), ms(20));
    controller.teardown();
    assert!(controller.is_idle());
    controller.tick(ms(10_000));
    let snapshot = controller.snapshot();
    assert!(!snapshot.show_feedback);
    assert_eq!(controller.deck().cursor(), 0);
    assert!(controller
        .drain_events()
        .any(|event| matches!(event, Event::TornDown { cancelled_timers: 1 })));
}

#[test]
fn drag_teardown_releases_capture_once() {
    let log = Rc::new(RefCell::new(CaptureLog::default()));
    {
        let mut controller = controller();
        controller.set_pointer_target(Box::new(SharedCapture(Rc::clone(&log))));
        controller.pointer_down(P, Point::default(), ms(0));
        controller.pointer_move(P, Point::new(40.0, 0.0));
    }
    let log = log.borrow();
    assert_eq!(log.captured, vec![P]);
    assert_eq!(log.released, vec![P]);
}

#[test]
fn unknown_category_resolves_to_first_table_entry() {
    static ONLY_DARE: &[Category] = &[Category {
        id: CategoryId::Dare,
        name: "Dare",
        color: "#F97316",
    }];
    let mut controller = DeckController::new(DeckConfig::default(), RngState::from_seed(1))
        .with_categories(CategoryTable::new(ONLY_DARE));
    controller.set_cards(vec![Card::new("t1", "Truth", CategoryId::Truth)]);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.active_card.expect("card").id, "t1");
    assert_eq!(snapshot.active_category.id, CategoryId::Dare);
}

#[test]
fn custom_threshold_is_honored() {
    let config = DeckConfig {
        swipe_threshold: 20.0,
        ..DeckConfig::default()
    };
    let mut controller = DeckController::new(config, RngState::from_seed(9));
    controller.set_cards(cards());
    assert_eq!(swipe(&mut controller, 30.0, 0.0, 0), Some(Outcome::Advance));
}

#[test]
fn release_without_frame_settles_to_idle() {
    let mut controller = controller();
    controller.pointer_down(P, Point::new(0.0, 0.0), ms(0));
    assert!(controller.pointer_move(P, Point::new(10.0, 0.0)));
    assert_eq!(
        controller.pointer_up(P, ms(5)).map(|result| result.outcome),
        Some(Outcome::Cancel)
    );
    controller.tick(ms(500));
    assert!(controller.is_idle());
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn pointer_cancel_classifies_like_release() {
    let mut controller = controller();
    controller.pointer_down(P, Point::new(100.0, 100.0), ms(0));
    controller.pointer_move(P, Point::new(100.0, -20.0));
    let result = controller.pointer_cancel(P, ms(10)).expect("cancelled");
    assert_eq!(result.outcome, Outcome::Advance);
    assert!(controller.snapshot().is_animating);
    assert_eq!(controller.snapshot().live_offset, Offset::new(0.0, -600.0));
    controller.tick(ms(270));
    assert!(controller.is_idle());
    assert_eq!(controller.deck().cursor(), 1);
}

#[test]
fn aborted_drag_is_never_classified() {
    let log = Rc::new(RefCell::new(CaptureLog::default()));
    let mut controller = controller();
    controller.set_pointer_target(Box::new(SharedCapture(Rc::clone(&log))));
    controller.pointer_down(P, Point::new(100.0, 100.0), ms(0));
    controller.pointer_move(P, Point::new(4.0, 100.0));
    controller.frame(ms(5));
    assert!(controller.is_dragging());

    assert!(controller.abort_gesture());
    assert!(!controller.abort_gesture());
    assert!(controller.is_idle());
    assert!(controller.pointer_up(P, ms(10)).is_none());
    controller.tick(ms(2_000));

    let snapshot = controller.snapshot();
    assert!(!snapshot.show_feedback);
    assert_eq!(snapshot.live_offset, Offset::ZERO);
    assert_eq!(controller.deck().cursor(), 0);
    assert_eq!(log.borrow().released, vec![P]);
    let events: Vec<Event> = controller.drain_events().collect();
    assert!(events.contains(&Event::GestureAborted));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::GestureResolved { .. })));
}
