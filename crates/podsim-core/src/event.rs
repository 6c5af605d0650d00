//! Simulation events.

use std::cmp::Ordering;

/// Sequence number assigned to an event when it is scheduled.
pub type EventId = u64;

/// Scheduled event with a typed payload.
#[derive(Clone, Debug)]
pub struct Event<D> {
    /// Unique event identifier, increasing in scheduling order.
    pub id: EventId,
    /// Time at which the event fires.
    pub time: f64,
    /// Event payload.
    pub data: D,
}

impl<D> Eq for Event<D> {}

impl<D> PartialEq for Event<D> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// BinaryHeap is a max-heap, so the order is inverted: the earliest event is the greatest one
// and among events with equal time the one scheduled first wins.
impl<D> Ord for Event<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl<D> PartialOrd for Event<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
