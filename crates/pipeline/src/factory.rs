use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tf_core::{Item, Stage};
use tf_runtime::metrics::MetricsRegistry;
use tf_timing::{Pacer, RandomSource, ScaledSleep, SeededRandom};
use tracing::{debug, info, warn};

use crate::station::Station;
use crate::FactoryConfig;

/// Owns one station per pipeline stage and routes items between them.
///
/// Stations are kept as an ordered list indexed by `Stage::position`, so
/// every walk over them follows assembly, painting, quality-control,
/// packaging.
pub struct Factory {
    stations: Vec<(Stage, Station)>,
    random: Box<dyn RandomSource>,
    pacer: Box<dyn Pacer>,
    metrics: MetricsRegistry,
}

/// What travels between station workers in a concurrent run.
enum Message {
    Item(Item),
    Shutdown,
}

impl Factory {
    pub fn new(cfg: &FactoryConfig) -> Self {
        let random: Box<dyn RandomSource> = match cfg.seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        Self::with_timing(random, Box::new(ScaledSleep::new(cfg.time_scale)))
    }

    pub fn with_timing(random: Box<dyn RandomSource>, pacer: Box<dyn Pacer>) -> Self {
        let stations = Stage::PIPELINE
            .iter()
            .map(|stage| (*stage, Station::new(stage.name(), stage.average_duration())))
            .collect();
        Self {
            stations,
            random,
            pacer,
            metrics: MetricsRegistry::default(),
        }
    }

    pub fn stations(&self) -> impl Iterator<Item = (Stage, &Station)> {
        self.stations.iter().map(|(stage, station)| (*stage, station))
    }

    pub fn station(&self, stage: Stage) -> &Station {
        &self.stations[stage.position()].1
    }

    pub fn station_mut(&mut self, stage: Stage) -> &mut Station {
        &mut self.stations[stage.position()].1
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn enqueue(&mut self, stage: Stage, item: Item) {
        self.metrics.inc_items_enqueued(1);
        self.station_mut(stage).enqueue(item);
    }

    /// Feeds an item into the first stage.
    pub fn inject(&mut self, item: Item) {
        self.enqueue(Stage::first(), item);
    }

    pub fn queued(&self) -> usize {
        self.stations.iter().map(|(_, station)| station.len()).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.stations.iter().all(|(_, station)| station.is_empty())
    }

    /// Runs rounds until every queue is empty and returns finished items in
    /// completion order.
    ///
    /// Each round visits the stages in pipeline order and lets each process at
    /// most one item. A processed item joins the next stage's queue right away,
    /// so it can advance again later in the same round.
    pub fn run_pipeline(&mut self) -> Vec<Item> {
        let mut completed = Vec::new();
        let mut round: u64 = 0;

        while !self.is_idle() {
            round += 1;
            debug!(round, queued = self.queued(), "pipeline round");

            for stage in Stage::PIPELINE {
                let (_, station) = &mut self.stations[stage.position()];
                let Some(item) = station.process_one(self.random.as_mut(), self.pacer.as_ref())
                else {
                    continue;
                };
                self.metrics.inc_items_processed(1);

                match stage.next() {
                    Some(next) => self.enqueue(next, item),
                    None => completed.push(finish(item, &self.metrics)),
                }
            }
            self.metrics.inc_rounds(1);
        }

        info!(rounds = round, completed = completed.len(), "pipeline drained");
        completed
    }

    /// Same contract as [`Factory::run_pipeline`], with one worker thread per
    /// station connected by channels.
    ///
    /// Each worker drains its own queue in FIFO order and forwards items
    /// downstream. A shutdown token enters the first station once the run
    /// starts and is passed on by each worker after its queue is empty.
    /// Workers do not move in lockstep, so the `rounds` counter is not touched.
    pub fn run_pipeline_concurrent(&mut self) -> Vec<Item> {
        if self.is_idle() {
            return Vec::new();
        }

        let (collector_tx, collector_rx) = mpsc::channel::<Item>();
        let (senders, receivers): (Vec<Sender<Message>>, Vec<Receiver<Message>>) =
            Stage::PIPELINE.iter().map(|_| mpsc::channel()).unzip();
        let forks: Vec<Box<dyn RandomSource>> =
            Stage::PIPELINE.iter().map(|_| self.random.fork()).collect();
        let downstream: Vec<Option<Sender<Message>>> = Stage::PIPELINE
            .iter()
            .map(|stage| stage.next().map(|next| senders[next.position()].clone()))
            .collect();
        let entry = senders[Stage::first().position()].clone();
        drop(senders);

        let pacer = self.pacer.as_ref();
        let metrics = &self.metrics;

        thread::scope(|scope| {
            let workers = self
                .stations
                .iter_mut()
                .zip(receivers)
                .zip(downstream)
                .zip(forks);
            for ((((stage, station), inbox), next), random) in workers {
                let worker = StationWorker {
                    stage: *stage,
                    station,
                    inbox,
                    next,
                    collector: collector_tx.clone(),
                    random,
                    pacer,
                    metrics,
                };
                scope.spawn(move || worker.run());
            }
            if entry.send(Message::Shutdown).is_err() {
                warn!("first station hung up before shutdown");
            }
        });

        drop(collector_tx);
        let completed: Vec<Item> = collector_rx.into_iter().collect();
        info!(completed = completed.len(), "concurrent pipeline drained");
        completed
    }
}

fn finish(mut item: Item, metrics: &MetricsRegistry) -> Item {
    item.mark_done();
    metrics.inc_items_completed(1);
    metrics.add_simulated_secs(item.total_time());
    info!(
        item = item.id(),
        total = item.total_time(),
        stages = ?item.completed_stages(),
        "item completed"
    );
    item
}

struct StationWorker<'a> {
    stage: Stage,
    station: &'a mut Station,
    inbox: Receiver<Message>,
    next: Option<Sender<Message>>,
    collector: Sender<Item>,
    random: Box<dyn RandomSource>,
    pacer: &'a dyn Pacer,
    metrics: &'a MetricsRegistry,
}

impl StationWorker<'_> {
    fn run(mut self) {
        debug!(station = %self.stage, queued = self.station.len(), "worker started");
        let mut shutdown = false;

        loop {
            while let Ok(message) = self.inbox.try_recv() {
                shutdown |= self.accept(message);
            }

            if let Some(item) = self.station.process_one(self.random.as_mut(), self.pacer) {
                self.metrics.inc_items_processed(1);
                self.forward(item);
                continue;
            }

            if shutdown {
                break;
            }
            match self.inbox.recv() {
                Ok(message) => shutdown |= self.accept(message),
                Err(_) => break,
            }
        }

        if let Some(next) = &self.next {
            if next.send(Message::Shutdown).is_err() {
                warn!(station = %self.stage, "downstream hung up before shutdown");
            }
        }
        debug!(station = %self.stage, "worker finished");
    }

    /// Returns true for the shutdown token.
    fn accept(&mut self, message: Message) -> bool {
        match message {
            Message::Item(item) => {
                self.metrics.inc_items_enqueued(1);
                self.station.enqueue(item);
                false
            }
            Message::Shutdown => true,
        }
    }

    fn forward(&self, item: Item) {
        match &self.next {
            Some(next) => {
                if let Err(mpsc::SendError(Message::Item(lost))) = next.send(Message::Item(item)) {
                    warn!(station = %self.stage, item = lost.id(), "downstream hung up, item dropped");
                }
            }
            None => {
                let done = finish(item, self.metrics);
                if let Err(mpsc::SendError(lost)) = self.collector.send(done) {
                    warn!(item = lost.id(), "collector hung up, item dropped");
                }
            }
        }
    }
}
