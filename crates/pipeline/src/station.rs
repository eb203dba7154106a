use std::collections::VecDeque;

use tf_core::{Item, Seconds};
use tf_timing::{jittered_duration, Pacer, RandomSource};
use tracing::info;

/// A processing step with its own FIFO queue.
///
/// Items are owned by the queue while they wait; `process_one` hands the head
/// item back to the caller, so the station never keeps a handle to it.
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    average_duration: Seconds,
    queue: VecDeque<Item>,
}

impl Station {
    pub fn new(name: impl Into<String>, average_duration: Seconds) -> Self {
        Self {
            name: name.into(),
            average_duration,
            queue: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn average_duration(&self) -> Seconds {
        self.average_duration
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Ids of waiting items, head first.
    pub fn queued_ids(&self) -> Vec<&str> {
        self.queue.iter().map(Item::id).collect()
    }

    pub fn enqueue(&mut self, item: Item) {
        info!(station = %self.name, item = item.id(), queued = self.queue.len() + 1, "item enqueued");
        self.queue.push_back(item);
    }

    /// Processes the head of the queue, or returns `None` when nothing waits.
    ///
    /// The dwell time is drawn from `[0.5, 1.5)` times the station average and
    /// the pacer blocks for it before the item is updated and returned.
    pub fn process_one(
        &mut self,
        random: &mut dyn RandomSource,
        pacer: &dyn Pacer,
    ) -> Option<Item> {
        let mut item = self.queue.pop_front()?;
        let duration = jittered_duration(self.average_duration, random);
        pacer.pause(duration);
        item.record_stage(&self.name, duration);
        info!(
            station = %self.name,
            item = item.id(),
            duration,
            total = item.total_time(),
            "item processed"
        );
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tf_core::ItemStatus;
    use tf_timing::{FixedRandom, NoPause, SeededRandom};

    use super::*;

    #[derive(Default)]
    struct RecordingPacer {
        pauses: Mutex<Vec<Seconds>>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&self, simulated: Seconds) {
            self.pauses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(simulated);
        }
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut station = Station::new("painting", 3.0);
        let pacer = RecordingPacer::default();
        assert!(station.process_one(&mut FixedRandom::new(0.5), &pacer).is_none());
        assert!(pacer.pauses.lock().unwrap().is_empty());
    }

    #[test]
    fn processing_adds_jittered_time_and_stage() {
        let mut random = SeededRandom::from_seed(3);
        for _ in 0..200 {
            let mut station = Station::new("assembly", 4.0);
            let mut item = Item::new(1, "red");
            item.record_stage("prep", 1.0);
            station.enqueue(item);

            let item = station.process_one(&mut random, &NoPause).expect("queued item");
            let added = item.total_time() - 1.0;
            assert!((2.0..6.0).contains(&added), "{added} out of band");
            assert_eq!(item.completed_stages(), ["prep", "assembly"]);
            assert_eq!(item.status(), ItemStatus::InProgress);
            assert!(station.is_empty());
        }
    }

    #[test]
    fn pacer_sees_the_drawn_duration() {
        let mut station = Station::new("packaging", 2.0);
        station.enqueue(Item::new(4, "blue"));
        let pacer = RecordingPacer::default();
        let item = station
            .process_one(&mut FixedRandom::new(0.25), &pacer)
            .expect("queued item");
        assert_eq!(item.total_time(), 1.5);
        assert_eq!(*pacer.pauses.lock().unwrap(), vec![1.5]);
    }

    #[test]
    fn dequeues_in_arrival_order() {
        let mut station = Station::new("quality-control", 2.0);
        station.enqueue(Item::new(1, "red"));
        station.enqueue(Item::new(2, "blue"));
        assert_eq!(station.queued_ids(), ["TOY-001-RED", "TOY-002-BLUE"]);

        let mut random = FixedRandom::new(0.0);
        let first = station.process_one(&mut random, &NoPause).expect("first");
        let second = station.process_one(&mut random, &NoPause).expect("second");
        assert_eq!(first.id(), "TOY-001-RED");
        assert_eq!(second.id(), "TOY-002-BLUE");
        assert!(station.process_one(&mut random, &NoPause).is_none());
    }
}
