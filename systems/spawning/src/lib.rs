#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that releases queued enemies into the world.

use std::{collections::VecDeque, time::Duration};

use harbor_defence_core::{CellCoord, Command, Event, ModifierSet, Rank, Species};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
        }
    }
}

/// Enemy waiting to be released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnOrder {
    /// Species preset to spawn.
    pub species: Species,
    /// Elite tier applied on spawn.
    pub rank: Rank,
    /// Modifiers granted on spawn.
    pub modifiers: ModifierSet,
}

impl SpawnOrder {
    /// Creates a rank one order without modifiers.
    #[must_use]
    pub const fn plain(species: Species) -> Self {
        Self {
            species,
            rank: Rank::BASE,
            modifiers: ModifierSet::EMPTY,
        }
    }
}

/// Pure system that emits one spawn command per elapsed interval while orders remain.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    queue: VecDeque<SpawnOrder>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            queue: VecDeque::new(),
        }
    }

    /// Appends an order to the back of the queue.
    pub fn enqueue(&mut self, order: SpawnOrder) {
        self.queue.push_back(order);
    }

    /// Number of orders not yet released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Consumes events and emits spawn commands at randomly chosen spawners.
    ///
    /// Time only accrues while orders are queued, so an idle spawner does not
    /// burst when new orders arrive.
    pub fn handle(&mut self, events: &[Event], spawners: &[CellCoord], out: &mut Vec<Command>) {
        if self.queue.is_empty() {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() || spawners.is_empty() {
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.spawn_interval {
            let Some(order) = self.queue.pop_front() else {
                self.accumulator = Duration::ZERO;
                break;
            };
            self.accumulator -= self.spawn_interval;

            let spawner = spawners[self.rng.gen_range(0..spawners.len())];
            debug!("releasing {} at {spawner:?}", order.species);
            out.push(Command::SpawnEnemy {
                species: order.species,
                spawner,
                rank: order.rank,
                modifiers: order.modifiers,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(millis: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }
    }

    #[test]
    fn idle_queue_does_not_bank_time() {
        let spawners = [CellCoord::new(0, 0)];
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 7));
        let mut commands = Vec::new();

        spawning.handle(&[tick(5_000)], &spawners, &mut commands);
        spawning.enqueue(SpawnOrder::plain(Species::TinyBird));
        spawning.handle(&[tick(500)], &spawners, &mut commands);

        assert!(commands.is_empty());
        assert_eq!(spawning.pending(), 1);
    }

    #[test]
    fn releases_at_most_the_queued_orders() {
        let spawners = [CellCoord::new(0, 0)];
        let mut spawning = Spawning::new(Config::new(Duration::from_millis(250), 7));
        spawning.enqueue(SpawnOrder::plain(Species::TinyBoat));
        spawning.enqueue(SpawnOrder::plain(Species::BigWhale));
        let mut commands = Vec::new();

        spawning.handle(&[tick(2_000)], &spawners, &mut commands);

        assert_eq!(commands.len(), 2);
        assert_eq!(spawning.pending(), 0);
        assert_eq!(spawning.accumulator, Duration::ZERO);
    }
}
