//! Cancellable timers and a coalesced frame slot over host-supplied time.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: Duration,
    task: T,
}

/// Timer queue keyed by deadline. Time only moves when the host calls `due`.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
    frame_requested: bool,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
            frame_requested: false,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward; earlier instants are ignored.
    pub fn observe(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.timers.iter().position(|timer| timer.id == id)?;
        Some(self.timers.remove(index).task)
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.frame_requested = false;
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && !self.frame_requested
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn due(&mut self, now: Duration) -> Vec<T> {
        self.observe(now);
        let mut ready = Vec::new();
        let mut index = 0;
        while index < self.timers.len() {
            if self.timers[index].due <= self.now {
                ready.push(self.timers.remove(index));
            } else {
                index += 1;
            }
        }
        ready.sort_by_key(|timer| (timer.due, timer.id));
        ready.into_iter().map(|timer| timer.task).collect()
    }

    /// Returns true when this call opened a new frame request.
    pub fn request_frame(&mut self) -> bool {
        let fresh = !self.frame_requested;
        self.frame_requested = true;
        fresh
    }

    pub fn take_frame(&mut self) -> bool {
        std::mem::replace(&mut self.frame_requested, false)
    }

    pub fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn tasks_fire_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(300), "late");
        scheduler.schedule(ms(100), "early");
        scheduler.schedule(Duration::ZERO, "now");
        assert_eq!(scheduler.due(ms(50)), vec!["now"]);
        assert_eq!(scheduler.due(ms(400)), vec!["early", "late"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), 1);
        scheduler.schedule(ms(10), 2);
        scheduler.schedule(ms(10), 3);
        assert_eq!(scheduler.due(ms(10)), vec![1, 2, 3]);
    }

    #[test]
    fn delays_are_relative_to_observed_time() {
        let mut scheduler = Scheduler::new();
        scheduler.observe(ms(1_000));
        scheduler.schedule(ms(120), "snap");
        assert!(scheduler.due(ms(1_100)).is_empty());
        assert_eq!(scheduler.next_deadline(), Some(ms(1_120)));
        assert_eq!(scheduler.due(ms(1_120)), vec!["snap"]);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.observe(ms(500));
        scheduler.observe(ms(200));
        assert_eq!(scheduler.now(), ms(500));
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(ms(5), "gone");
        scheduler.schedule(ms(5), "kept");
        assert_eq!(scheduler.cancel(id), Some("gone"));
        assert_eq!(scheduler.cancel(id), None);
        assert_eq!(scheduler.due(ms(10)), vec!["kept"]);
    }

    #[test]
    fn frame_slot_coalesces_requests() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        assert!(scheduler.request_frame());
        assert!(!scheduler.request_frame());
        assert!(scheduler.take_frame());
        assert!(!scheduler.take_frame());
        scheduler.request_frame();
        scheduler.cancel_all();
        assert!(scheduler.is_idle());
    }
}
