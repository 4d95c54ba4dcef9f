//! Headless driver wiring the world to its systems.

use std::{fmt, time::Duration};

use anyhow::Result;
use harbor_defence_core::{CellCoord, Command, EnemyView, Event};
use harbor_defence_rendering::{AssetRegistry, EnemyPresentation};
use harbor_defence_system_pathfinding::Routing;
use harbor_defence_system_spawning::{Config, Spawning};
use harbor_defence_world::{self as world, query, World};

use crate::scenario::{Scenario, TurretSpec};

/// Tallies gathered while a scenario runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Report {
    pub(crate) ticks: u32,
    pub(crate) spawned: u32,
    pub(crate) killed: u32,
    pub(crate) escaped: u32,
    pub(crate) rewards: f32,
    pub(crate) shots: u32,
    pub(crate) effects_expired: u32,
    pub(crate) rejected: u32,
    pub(crate) sprites_resolved: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated:  {}", self.ticks)?;
        writeln!(f, "enemies spawned:  {}", self.spawned)?;
        writeln!(f, "enemies killed:   {}", self.killed)?;
        writeln!(f, "enemies escaped:  {}", self.escaped)?;
        writeln!(f, "rewards earned:   {:.1}", self.rewards)?;
        writeln!(f, "turret shots:     {}", self.shots)?;
        writeln!(f, "effects expired:  {}", self.effects_expired)?;
        writeln!(f, "commands rejected: {}", self.rejected)?;
        write!(f, "sprites resolved: {}", self.sprites_resolved)
    }
}

struct Turret {
    spec: TurretSpec,
    ready_in: Duration,
    shots: u32,
}

impl Turret {
    fn new(spec: TurretSpec) -> Self {
        Self {
            spec,
            ready_in: Duration::ZERO,
            shots: 0,
        }
    }

    fn advance(&mut self, dt: Duration, enemies: &EnemyView, out: &mut Vec<Command>) {
        self.ready_in = self.ready_in.saturating_sub(dt);
        if !self.ready_in.is_zero() {
            return;
        }
        let Some(target) = enemies.first_by_priority() else {
            return;
        };

        self.shots += 1;
        self.ready_in = self.spec.cooldown;
        // The effect lands before the damage that may remove the target.
        if let Some(effect) = &self.spec.effect {
            if self.shots % self.spec.effect_every == 0 {
                out.push(Command::AttachEffect {
                    enemy: target.id,
                    effect: effect.clone(),
                });
            }
        }
        out.push(Command::DamageEnemy {
            enemy: target.id,
            amount: self.spec.damage,
        });
    }
}

/// World plus the systems reacting to its events.
pub(crate) struct Simulation {
    world: World,
    spawning: Spawning,
    routing: Routing,
    turret: Option<Turret>,
    spawners: Vec<CellCoord>,
    dt: Duration,
    report: Report,
}

impl Simulation {
    /// Builds the playfield described by the scenario and queues its waves.
    pub(crate) fn new(scenario: &Scenario) -> Self {
        let mut spawning = Spawning::new(Config::new(scenario.spawn_interval, scenario.seed));
        for order in &scenario.orders {
            spawning.enqueue(*order);
        }

        let mut simulation = Self {
            world: World::new(),
            spawning,
            routing: Routing::default(),
            turret: scenario.turret.clone().map(Turret::new),
            spawners: scenario.spawners.clone(),
            dt: scenario.dt,
            report: Report::default(),
        };
        simulation.submit(vec![Command::ConfigureGrid {
            columns: scenario.columns,
            rows: scenario.rows,
            geometry: scenario.geometry,
            exit: scenario.exit,
        }]);
        simulation.submit(
            scenario
                .obstacles
                .iter()
                .map(|cell| Command::SetCellBlocked {
                    cell: *cell,
                    blocked: true,
                })
                .collect(),
        );
        simulation
    }

    /// Runs until `max_ticks` elapse or every queued enemy is gone.
    ///
    /// When a registry is provided every frame is laid out and each sprite it
    /// references must resolve to a texture.
    pub(crate) fn run(mut self, max_ticks: u32, assets: Option<&AssetRegistry>) -> Result<Report> {
        for _ in 0..max_ticks {
            if self.is_finished() {
                break;
            }
            self.step();
            if let Some(assets) = assets {
                self.report.sprites_resolved += self.resolve_frame(assets)?;
            }
        }
        Ok(self.report)
    }

    fn is_finished(&self) -> bool {
        self.spawning.pending() == 0 && query::enemies(&self.world).next().is_none()
    }

    fn step(&mut self) {
        self.report.ticks += 1;
        self.submit(vec![Command::Tick { dt: self.dt }]);

        let mut shots = Vec::new();
        if let Some(turret) = &mut self.turret {
            turret.advance(self.dt, &query::enemy_view(&self.world), &mut shots);
            self.report.shots = turret.shots;
        }
        self.submit(shots);
    }

    fn resolve_frame(&self, assets: &AssetRegistry) -> Result<usize> {
        let mut resolved = 0;
        for enemy in query::enemy_view(&self.world).iter() {
            let presentation = EnemyPresentation::from_snapshot(enemy);
            for key in presentation.sprite_keys() {
                let _ = assets.resolve(key)?;
                resolved += 1;
            }
        }
        Ok(resolved)
    }

    fn submit(&mut self, commands: Vec<Command>) {
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.spawning.handle(&events, &self.spawners, &mut pending);
            self.routing.handle(
                &events,
                query::traversal_map(&self.world),
                query::exit(&self.world),
                &mut pending,
            );
            self.record(&events);
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.report.spawned += 1,
                Event::EnemyKilled { reward, .. } => {
                    self.report.killed += 1;
                    self.report.rewards += *reward;
                }
                Event::EnemyEscaped { .. } => self.report.escaped += 1,
                Event::EffectExpired { .. } => self.report.effects_expired += 1,
                Event::CommandRejected { .. } => self.report.rejected += 1,
                _ => {}
            }
        }
    }
}
