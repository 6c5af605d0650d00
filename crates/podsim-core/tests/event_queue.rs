use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::Serialize;

use podsim_core::EventQueue;

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Tagged {
    seq: usize,
}

#[test]
fn test_events_come_out_in_time_order() {
    let mut rng = Pcg64::seed_from_u64(123);
    let mut queue = EventQueue::new();
    for seq in 0..1000 {
        // few distinct timestamps to get a lot of ties
        let time = rng.gen_range(0..50) as f64;
        queue.add_event_at(Tagged { seq }, time);
    }
    let mut last_time = f64::MIN;
    let mut last_seq_at_time: Option<usize> = None;
    while let Some(event) = queue.next_event() {
        assert!(event.time >= last_time);
        if event.time == last_time {
            // ties keep insertion order
            assert!(event.data.seq > last_seq_at_time.unwrap());
        }
        last_time = event.time;
        last_seq_at_time = Some(event.data.seq);
        assert_eq!(queue.time(), event.time);
    }
    assert!(queue.is_empty());
    assert_eq!(queue.event_count(), 1000);
}

#[test]
fn test_equal_time_is_inserted_after_existing() {
    let mut queue = EventQueue::new();
    queue.add_event_at("b", 10.);
    queue.add_event_at("c", 20.);
    queue.add_event_at("a", 0.);
    queue.add_event_at("b2", 10.);
    let order: Vec<_> = std::iter::from_fn(|| queue.next_event().map(|e| e.data)).collect();
    assert_eq!(order, vec!["a", "b", "b2", "c"]);
}

#[test]
fn test_relative_delay_uses_clock() {
    let mut queue = EventQueue::starting_at(100.);
    queue.add_event("first", 5.);
    let event = queue.next_event().unwrap();
    assert_eq!(event.time, 105.);
    queue.add_event("second", 15.);
    assert_eq!(queue.peek_event().unwrap().time, 120.);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_same_event_can_be_scheduled_many_times() {
    let mut queue = EventQueue::new();
    for _ in 0..3 {
        queue.add_event("tick", 15.);
    }
    assert_eq!(queue.len(), 3);
    let dump = queue.dump_events();
    assert_eq!(dump.iter().map(|e| e.id).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_empty_queue() {
    let mut queue: EventQueue<u32> = EventQueue::new();
    assert!(queue.next_event().is_none());
    assert!(queue.peek_event().is_none());
    assert_eq!(queue.time(), 0.);
}

#[test]
#[should_panic]
fn test_event_from_the_past_panics() {
    let mut queue = EventQueue::new();
    queue.add_event_at(1u32, 10.);
    queue.next_event();
    queue.add_event_at(2u32, 5.);
}

#[test]
#[should_panic]
fn test_negative_delay_panics() {
    let mut queue = EventQueue::new();
    queue.add_event(1u32, -1.);
}
