#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Harbor Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable [`EnemyView`] snapshots, and respond with new command
//! batches.

mod effects;
mod grid;
mod modifiers;
mod species;

use std::{cmp::Ordering, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use effects::{Effect, EffectKind, ParseEffectKindError};
pub use grid::{CellCoord, GridGeometry, Pathfinder, TraversalMap};
pub use modifiers::{Modifier, ModifierSet, ParseModifierError};
pub use species::{
    InvalidRank, MovementKind, ParseSpeciesError, Rank, Species, SpeciesProfile, BASE_SPEED,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid, its traversal map and the exit cell.
    ConfigureGrid {
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
        /// Mapping between cells and world positions.
        geometry: GridGeometry,
        /// Cell that path-following enemies travel towards.
        exit: CellCoord,
    },
    /// Marks a cell as blocked or traversable, for example when a tower is built.
    SetCellBlocked {
        /// Cell whose traversability changes.
        cell: CellCoord,
        /// Whether the cell blocks ground and surface movement.
        blocked: bool,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Releases a new enemy at the centre of a spawner cell.
    SpawnEnemy {
        /// Species preset used for the new enemy.
        species: Species,
        /// Cell the enemy appears in.
        spawner: CellCoord,
        /// Elite tier applied after construction.
        rank: Rank,
        /// Modifiers granted after construction.
        modifiers: ModifierSet,
    },
    /// Stores a freshly computed route on a path-following enemy.
    AssignRoute {
        /// Enemy receiving the route.
        enemy: EnemyId,
        /// Ordered cells from the enemy's cell to the exit.
        route: Vec<CellCoord>,
    },
    /// Applies damage from an external source.
    DamageEnemy {
        /// Enemy being hit.
        enemy: EnemyId,
        /// Raw damage before mitigation.
        amount: f32,
    },
    /// Attaches a timed effect, refreshing an existing one of the same kind.
    AttachEffect {
        /// Enemy receiving the effect.
        enemy: EnemyId,
        /// Effect to attach.
        effect: Effect,
    },
    /// Rescales an enemy's health to a new rank.
    SetRank {
        /// Enemy being promoted or demoted.
        enemy: EnemyId,
        /// Rank to apply.
        rank: Rank,
    },
    /// Adds modifiers to an enemy. Already present modifiers are left untouched.
    ApplyModifiers {
        /// Enemy receiving the modifiers.
        enemy: EnemyId,
        /// Modifiers to add.
        modifiers: ModifierSet,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was replaced.
    GridConfigured {
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that the traversal map changed.
    TraversabilityChanged {
        /// Cell whose traversability changed.
        cell: CellCoord,
        /// Whether the cell is now blocked.
        blocked: bool,
    },
    /// Confirms that an enemy entered the simulation.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Species preset of the enemy.
        species: Species,
        /// Position the enemy spawned at.
        position: Vec2,
    },
    /// Asks a pathfinding system for a route from the enemy's current cell.
    RouteRequested {
        /// Enemy awaiting a route.
        enemy: EnemyId,
        /// Cell the enemy currently occupies.
        from: CellCoord,
    },
    /// Confirms that a route was stored on an enemy.
    RouteAssigned {
        /// Enemy that received the route.
        enemy: EnemyId,
        /// Number of cells in the route.
        steps: usize,
    },
    /// Reports damage absorbed by a surviving or dying enemy.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage after mitigation.
        damage: f32,
        /// Health left after the hit.
        remaining_health: f32,
    },
    /// Announces that an enemy was destroyed and removed.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Currency granted for the kill.
        reward: f32,
    },
    /// Announces that an enemy left the playfield and was removed.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
    },
    /// Confirms that a new effect was attached.
    EffectAttached {
        /// Enemy carrying the effect.
        enemy: EnemyId,
        /// Kind of the attached effect.
        kind: EffectKind,
    },
    /// Confirms that an existing effect had its countdown restarted.
    EffectRefreshed {
        /// Enemy carrying the effect.
        enemy: EnemyId,
        /// Kind of the refreshed effect.
        kind: EffectKind,
    },
    /// Reports that an effect ran out and was removed.
    EffectExpired {
        /// Enemy that carried the effect.
        enemy: EnemyId,
        /// Kind of the expired effect.
        kind: EffectKind,
    },
    /// Confirms that an enemy's rank changed.
    RankChanged {
        /// Enemy that was rescaled.
        enemy: EnemyId,
        /// Rank now in effect.
        rank: Rank,
    },
    /// Reports the modifiers that were newly granted to an enemy.
    ModifiersApplied {
        /// Enemy that gained modifiers.
        enemy: EnemyId,
        /// Modifiers that were not present before.
        added: ModifierSet,
    },
    /// Reports that a command could not be executed.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No enemy with the provided identifier exists.
    MissingEnemy(EnemyId),
    /// The enemy flies and therefore cannot hold a route.
    NotPathFollowing(EnemyId),
    /// The spawner cell lies outside the grid.
    SpawnerOutOfBounds(CellCoord),
    /// The cell lies outside the grid.
    CellOutOfBounds(CellCoord),
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Species preset of the enemy.
    pub species: Species,
    /// Centre of the enemy in world units.
    pub position: Vec2,
    /// Velocity applied during the last tick, in world units per second.
    pub velocity: Vec2,
    /// Orientation derived from the last steering update, in degrees.
    pub angle_degrees: f32,
    /// Width and height of the enemy's sprite in world units.
    pub footprint: Vec2,
    /// Health left.
    pub current_health: f32,
    /// Health ceiling.
    pub max_health: f32,
    /// Currency granted on death.
    pub reward: f32,
    /// Elite tier.
    pub rank: Rank,
    /// Behavioural modifiers.
    pub modifiers: ModifierSet,
    /// Targeting priority. Lower values are engaged first.
    pub priority: f32,
    /// Whether the enemy flies.
    pub is_flying: bool,
    /// Whether the enemy is able to submerge.
    pub can_hide: bool,
    /// Whether the enemy is currently submerged.
    pub is_hidden: bool,
    /// Route steps left for path-following enemies.
    pub remaining_steps: Option<usize>,
    /// Active timed effects in attachment order.
    pub effects: Vec<Effect>,
}

/// Read-only snapshot describing all enemies within the simulation.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Snapshots ordered by ascending priority, ties broken by identifier.
    #[must_use]
    pub fn by_priority(&self) -> Vec<&EnemySnapshot> {
        let mut ordered: Vec<_> = self.snapshots.iter().collect();
        ordered.sort_by(|left, right| compare_priority(left, right));
        ordered
    }

    /// Snapshot that targeting should engage first, if any.
    #[must_use]
    pub fn first_by_priority(&self) -> Option<&EnemySnapshot> {
        self.snapshots
            .iter()
            .min_by(|left, right| compare_priority(left, right))
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

fn compare_priority(left: &EnemySnapshot, right: &EnemySnapshot) -> Ordering {
    left.priority
        .total_cmp(&right.priority)
        .then_with(|| left.id.cmp(&right.id))
}
