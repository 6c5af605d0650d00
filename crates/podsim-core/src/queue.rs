//! Time-ordered event queue.

use std::collections::BinaryHeap;

use serde::Serialize;

use crate::event::{Event, EventId};
use crate::log::log_incorrect_event;

/// Epsilon to compare floating point values for equality.
pub const EPSILON: f64 = 1e-12;

/// Pending events ordered by time, together with the simulation clock.
///
/// Events with equal time are returned in the order they were added.
/// The clock is advanced to the time of each event returned by [`next_event`](Self::next_event).
pub struct EventQueue<D> {
    clock: f64,
    events: BinaryHeap<Event<D>>,
    event_count: u64,
}

impl<D> Default for EventQueue<D> {
    fn default() -> Self {
        Self {
            clock: 0.,
            events: BinaryHeap::new(),
            event_count: 0,
        }
    }
}

impl<D> EventQueue<D>
where
    D: Serialize,
{
    /// Creates an empty queue with the clock set to zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty queue with the clock set to `time`.
    pub fn starting_at(time: f64) -> Self {
        Self {
            clock: time,
            ..Default::default()
        }
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// Schedules an event `delay` time units after the current time.
    ///
    /// Panics if the delay is negative.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use podsim_core::EventQueue;
    ///
    /// let mut queue = EventQueue::new();
    /// queue.add_event("late", 2.0);
    /// queue.add_event("early", 1.0);
    /// assert_eq!(queue.next_event().unwrap().data, "early");
    /// assert_eq!(queue.time(), 1.0);
    /// ```
    pub fn add_event(&mut self, data: D, delay: f64) -> EventId {
        let time = self.clock + delay.max(0.);
        if delay < -EPSILON {
            let event = Event { id: self.event_count, time, data };
            log_incorrect_event(&event, &format!("negative delay {}", delay));
            panic!("Event delay is negative! It is not allowed to add events from the past.");
        }
        self.push(data, time)
    }

    /// Schedules an event at the absolute time `time`.
    ///
    /// Panics if `time` is earlier than the current time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use podsim_core::EventQueue;
    ///
    /// let mut queue = EventQueue::new();
    /// queue.add_event_at("a", 5.0);
    /// queue.add_event_at("b", 5.0);
    /// assert_eq!(queue.next_event().unwrap().data, "a");
    /// assert_eq!(queue.next_event().unwrap().data, "b");
    /// assert!(queue.next_event().is_none());
    /// ```
    pub fn add_event_at(&mut self, data: D, time: f64) -> EventId {
        if time < self.clock - EPSILON {
            let event = Event { id: self.event_count, time, data };
            log_incorrect_event(&event, &format!("time {} is before clock {}", time, self.clock));
            panic!("Event time is in the past! It is not allowed to add events from the past.");
        }
        self.push(data, time.max(self.clock))
    }

    fn push(&mut self, data: D, time: f64) -> EventId {
        let id = self.event_count;
        self.events.push(Event { id, time, data });
        self.event_count += 1;
        id
    }

    /// Removes and returns the earliest event, advancing the clock to its time.
    pub fn next_event(&mut self) -> Option<Event<D>> {
        let event = self.events.pop()?;
        self.clock = event.time;
        Some(event)
    }

    /// Returns the earliest event without removing it.
    pub fn peek_event(&self) -> Option<&Event<D>> {
        self.events.peek()
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if there are no pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the total number of events scheduled so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}

impl<D> EventQueue<D>
where
    D: Serialize + Clone,
{
    /// Returns a copy of the pending events in the order they will be returned.
    pub fn dump_events(&self) -> Vec<Event<D>> {
        let mut output: Vec<_> = self.events.iter().cloned().collect();
        output.sort();
        // Because the sorting order of events is inverted to be used with BinaryHeap
        output.reverse();
        output
    }
}
