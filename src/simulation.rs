//! Concurrent booking exerciser. A pool of workers fed from a channel fires
//! ride intents at the engine, sampling pickups and dropoffs around a handful
//! of hotspots so a share of the requests is poolable. Useful for shaking out
//! version-conflict handling under real contention.

use std::sync::Arc;

use async_channel::{Receiver, Sender};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use tokio::sync::Mutex;

use crate::api::{RideAPI, RideIntent};
use crate::engine::Engine;
use crate::entities::Location;

#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub requested: u64,
    pub pooled: u64,
    pub solo: u64,
    pub failed: u64,
}

struct Simulation {
    engine: Engine,
    hotspots: Vec<Location>,
    stats: Mutex<Stats>,
}

impl Simulation {
    fn new(engine: Engine) -> Self {
        Self {
            engine,
            hotspots: vec![
                Location::new(40.6413, -73.7781),
                Location::new(40.7580, -73.9855),
                Location::new(40.7061, -74.0087),
                Location::new(40.7794, -73.9632),
            ],
            stats: Mutex::new(Stats::default()),
        }
    }

    fn sample_intent(&self) -> RideIntent {
        let mut rng = rand::thread_rng();

        let die = Uniform::from(0..self.hotspots.len());
        let jitter = Normal::new(0.0, 0.005).unwrap();

        let pickup_hub = self.hotspots[die.sample(&mut rng)];
        let dropoff_hub = self.hotspots[die.sample(&mut rng)];

        let pickup = Location::new(
            pickup_hub.latitude + jitter.sample(&mut rng),
            pickup_hub.longitude + jitter.sample(&mut rng),
        );
        let dropoff = Location::new(
            dropoff_hub.latitude + jitter.sample(&mut rng),
            dropoff_hub.longitude + jitter.sample(&mut rng),
        );

        RideIntent {
            name: format!("rider-{}", rng.gen_range(0..100_000)),
            phone: "555-0100".into(),
            pickup,
            dropoff,
            luggage_count: rng.gen_range(0..3),
            max_detour_minutes: rng.gen_range(10..30),
        }
    }

    async fn book(&self) {
        let intent = self.sample_intent();

        match self.engine.request_ride(intent).await {
            Ok(receipt) => {
                let mut stats = self.stats.lock().await;
                stats.requested += 1;
                if receipt.is_pooled {
                    stats.pooled += 1;
                } else {
                    stats.solo += 1;
                }
            }
            Err(err) => {
                tracing::warn!("booking failed during simulation: {:?}", err);
                self.stats.lock().await.failed += 1;
            }
        }
    }
}

pub struct Executor {
    s: Arc<Simulation>,
}

impl Executor {
    pub fn new(engine: Engine) -> Self {
        Self {
            s: Arc::new(Simulation::new(engine)),
        }
    }

    /// Fire `bookings` requests through `workers` concurrent workers and
    /// return the tallied outcomes.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, workers: usize, bookings: usize) -> Stats {
        let (tx, rx): (Sender<()>, Receiver<()>) = async_channel::unbounded();

        let mut handles = vec![];
        for _ in 0..workers {
            let rx = rx.clone();
            let s = self.s.clone();

            handles.push(tokio::spawn(async move {
                while rx.recv().await.is_ok() {
                    s.book().await;
                }
            }));
        }

        handles.push(tokio::spawn(async move {
            for _ in 0..bookings {
                tx.send(()).await.unwrap();
            }
            tx.close();
        }));

        futures::future::join_all(handles).await;

        let stats = self.s.stats.lock().await;

        tracing::info!(
            "simulation finished: {} requested, {} pooled, {} solo, {} failed",
            stats.requested,
            stats.pooled,
            stats.solo,
            stats.failed
        );

        *stats
    }
}
