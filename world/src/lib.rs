#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Harbor Defence.

mod effects;
mod enemy;
mod movement;

use std::time::Duration;

use glam::Vec2;
use harbor_defence_core::{
    CellCoord, Command, EffectKind, EnemyId, Event, GridGeometry, RejectionReason, TraversalMap,
};
use log::{debug, trace, warn};

pub use effects::{ActiveEffects, Attachment};
pub use enemy::{DamageOutcome, Enemy};
pub use movement::{MovementStrategy, Route};

const DEFAULT_GRID_COLUMNS: u32 = 31;
const DEFAULT_GRID_ROWS: u32 = 16;
const DEFAULT_EXIT: CellCoord = CellCoord::new(15, 0);

/// Represents the authoritative Harbor Defence world state.
#[derive(Debug)]
pub struct World {
    geometry: GridGeometry,
    map: TraversalMap,
    exit: CellCoord,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    tick_index: u64,
    expired: Vec<EffectKind>,
}

impl World {
    /// Creates a new world on the default playfield without enemies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            geometry: GridGeometry::default(),
            map: TraversalMap::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            exit: DEFAULT_EXIT,
            enemies: Vec::new(),
            next_enemy_id: 0,
            tick_index: 0,
            expired: Vec::new(),
        }
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    fn remove_enemy(&mut self, id: EnemyId) {
        if let Some(index) = self.enemies.iter().position(|enemy| enemy.id() == id) {
            let _ = self.enemies.remove(index);
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn is_on_playfield(&self, position: Vec2) -> bool {
        let (columns, rows) = self.map.dimensions();
        self.geometry.contains(position, columns, rows)
    }

    fn request_routes(&self, out_events: &mut Vec<Event>) {
        for enemy in &self.enemies {
            if enemy.route().is_some() {
                out_events.push(Event::RouteRequested {
                    enemy: enemy.id(),
                    from: enemy.current_cell(&self.geometry),
                });
            }
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            self.expired.clear();
            enemy.tick(dt, &self.geometry, &mut self.expired);
            for kind in self.expired.drain(..) {
                trace!("{kind} expired on enemy {}", enemy.id().get());
                out_events.push(Event::EffectExpired {
                    enemy: enemy.id(),
                    kind,
                });
            }
        }

        let escaped: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| !self.is_on_playfield(enemy.position()))
            .map(Enemy::id)
            .collect();
        if escaped.is_empty() {
            return;
        }
        self.enemies.retain(|enemy| !escaped.contains(&enemy.id()));
        for enemy in escaped {
            debug!("enemy {} escaped the playfield", enemy.get());
            out_events.push(Event::EnemyEscaped { enemy });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn reject(reason: RejectionReason, out_events: &mut Vec<Event>) {
    warn!("command rejected: {reason:?}");
    out_events.push(Event::CommandRejected { reason });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            columns,
            rows,
            geometry,
            exit,
        } => {
            world.map = TraversalMap::new(columns, rows);
            world.geometry = geometry;
            world.exit = exit;
            debug!("grid configured to {columns}x{rows} with exit {exit:?}");
            out_events.push(Event::GridConfigured { columns, rows });
            world.request_routes(out_events);
        }
        Command::SetCellBlocked { cell, blocked } => {
            if !world.map.contains(cell) {
                reject(RejectionReason::CellOutOfBounds(cell), out_events);
                return;
            }
            if world.map.set_blocked(cell, blocked) {
                out_events.push(Event::TraversabilityChanged { cell, blocked });
                world.request_routes(out_events);
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::SpawnEnemy {
            species,
            spawner,
            rank,
            modifiers,
        } => {
            if !world.map.contains(spawner) {
                reject(RejectionReason::SpawnerOutOfBounds(spawner), out_events);
                return;
            }
            let id = world.allocate_enemy_id();
            let position = world.geometry.cell_center(spawner);
            let mut enemy = Enemy::from_species(id, species, position);
            enemy.set_rank(rank);
            let _ = enemy.apply_modifiers(modifiers);
            let needs_route = enemy.route().is_some();
            world.enemies.push(enemy);

            debug!("spawned {species} as enemy {} at {spawner:?}", id.get());
            out_events.push(Event::EnemySpawned {
                enemy: id,
                species,
                position,
            });
            if needs_route {
                out_events.push(Event::RouteRequested {
                    enemy: id,
                    from: spawner,
                });
            }
        }
        Command::AssignRoute { enemy, route } => {
            let Some(target) = world.enemy_mut(enemy) else {
                reject(RejectionReason::MissingEnemy(enemy), out_events);
                return;
            };
            let steps = route.len();
            if target.assign_route(route) {
                out_events.push(Event::RouteAssigned { enemy, steps });
            } else {
                reject(RejectionReason::NotPathFollowing(enemy), out_events);
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            let Some(target) = world.enemy_mut(enemy) else {
                reject(RejectionReason::MissingEnemy(enemy), out_events);
                return;
            };
            let outcome = target.apply_damage(amount);
            let damage = match outcome {
                DamageOutcome::Survived { damage } | DamageOutcome::Killed { damage, .. } => damage,
            };
            out_events.push(Event::EnemyDamaged {
                enemy,
                damage,
                remaining_health: target.current_health(),
            });
            if let DamageOutcome::Killed { reward, .. } = outcome {
                world.remove_enemy(enemy);
                debug!("enemy {} destroyed for {reward}", enemy.get());
                out_events.push(Event::EnemyKilled { enemy, reward });
            }
        }
        Command::AttachEffect { enemy, effect } => {
            let Some(target) = world.enemy_mut(enemy) else {
                reject(RejectionReason::MissingEnemy(enemy), out_events);
                return;
            };
            let kind = effect.kind();
            match target.attach_effect(effect) {
                Attachment::Attached => out_events.push(Event::EffectAttached { enemy, kind }),
                Attachment::Refreshed => out_events.push(Event::EffectRefreshed { enemy, kind }),
            }
        }
        Command::SetRank { enemy, rank } => {
            let Some(target) = world.enemy_mut(enemy) else {
                reject(RejectionReason::MissingEnemy(enemy), out_events);
                return;
            };
            target.set_rank(rank);
            out_events.push(Event::RankChanged { enemy, rank });
        }
        Command::ApplyModifiers { enemy, modifiers } => {
            let Some(target) = world.enemy_mut(enemy) else {
                reject(RejectionReason::MissingEnemy(enemy), out_events);
                return;
            };
            let added = target.apply_modifiers(modifiers);
            if !added.is_empty() {
                out_events.push(Event::ModifiersApplied { enemy, added });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use harbor_defence_core::{CellCoord, EnemyId, EnemyView, GridGeometry, TraversalMap};

    use super::{Enemy, Route, World};

    /// Mapping between grid cells and world positions.
    #[must_use]
    pub fn geometry(world: &World) -> &GridGeometry {
        &world.geometry
    }

    /// Traversability of every cell on the playfield.
    #[must_use]
    pub fn traversal_map(world: &World) -> &TraversalMap {
        &world.map
    }

    /// Cell path-following enemies travel towards.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.exit
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Iterator over live enemies in spawn order.
    pub fn enemies(world: &World) -> impl Iterator<Item = &Enemy> {
        world.enemies.iter()
    }

    /// Live enemy with the provided identifier.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<&Enemy> {
        world.enemies.iter().find(|enemy| enemy.id() == id)
    }

    /// Route stored on a path-following enemy.
    #[must_use]
    pub fn route(world: &World, id: EnemyId) -> Option<&Route> {
        enemy(world, id).and_then(Enemy::route)
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(Enemy::snapshot).collect())
    }
}
