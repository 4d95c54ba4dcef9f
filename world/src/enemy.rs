//! Enemy entity: health, reward, rank, modifiers, effects and movement.

use std::time::Duration;

use glam::Vec2;
use harbor_defence_core::{
    CellCoord, Effect, EffectKind, EnemyId, EnemySnapshot, GridGeometry, Modifier, ModifierSet,
    Rank, Species,
};

use crate::{
    effects::{ActiveEffects, Attachment},
    movement::{Kinematics, MovementStrategy, Route},
};

/// Priority held by an enemy until its first tick.
const INITIAL_PRIORITY: f32 = 800.0;
const FAST_SPEED_FACTOR: f32 = 1.5;
const SHIELD_DAMAGE_FACTOR: f32 = 0.5;
/// Seconds a regenerating enemy needs to heal from zero to full health.
const REGEN_WINDOW_SECS: f32 = 60.0;

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// The enemy is still alive.
    Survived {
        /// Damage taken after mitigation.
        damage: f32,
    },
    /// Health dropped to zero or below; the enemy must be removed.
    Killed {
        /// Damage taken after mitigation.
        damage: f32,
        /// Currency granted for the kill.
        reward: f32,
    },
}

impl DamageOutcome {
    /// Reward owed to the damage source: the enemy's reward on a kill, zero otherwise.
    #[must_use]
    pub fn reward(self) -> f32 {
        match self {
            Self::Survived { .. } => 0.0,
            Self::Killed { reward, .. } => reward,
        }
    }
}

/// Hostile unit advancing towards the exit.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    species: Species,
    kinematics: Kinematics,
    footprint: Vec2,
    current_health: f32,
    max_health: f32,
    reward: f32,
    rank: Rank,
    modifiers: ModifierSet,
    regen_rate: f32,
    is_flying: bool,
    can_hide: bool,
    is_hidden: bool,
    priority: f32,
    effects: ActiveEffects,
    movement: MovementStrategy,
}

impl Enemy {
    /// Builds a rank one enemy without modifiers from a species preset.
    #[must_use]
    pub fn from_species(id: EnemyId, species: Species, position: Vec2) -> Self {
        let profile = species.profile();
        Self {
            id,
            species,
            kinematics: Kinematics {
                position,
                velocity: Vec2::new(0.0, -profile.speed),
                speed: profile.speed,
                angle_degrees: 0.0,
            },
            footprint: profile.footprint,
            current_health: profile.health,
            max_health: profile.health,
            reward: profile.reward,
            rank: Rank::BASE,
            modifiers: ModifierSet::EMPTY,
            regen_rate: 0.0,
            is_flying: species.is_flying(),
            can_hide: profile.can_hide,
            is_hidden: false,
            priority: INITIAL_PRIORITY,
            effects: ActiveEffects::default(),
            movement: MovementStrategy::for_kind(profile.movement),
        }
    }

    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Species preset the enemy was built from.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Centre of the enemy in world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.kinematics.position
    }

    /// Velocity applied during the last tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.kinematics.velocity
    }

    /// Base speed in world units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.kinematics.speed
    }

    /// Orientation from the last steering update, in degrees.
    #[must_use]
    pub const fn angle_degrees(&self) -> f32 {
        self.kinematics.angle_degrees
    }

    /// Health left. May be negative on the tick the enemy dies.
    #[must_use]
    pub const fn current_health(&self) -> f32 {
        self.current_health
    }

    /// Health ceiling.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Currency granted on death.
    #[must_use]
    pub const fn reward(&self) -> f32 {
        self.reward
    }

    /// Elite tier.
    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    /// Behavioural modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    /// Health regenerated per second.
    #[must_use]
    pub const fn regen_rate(&self) -> f32 {
        self.regen_rate
    }

    /// Targeting priority computed on the last tick. Lower is engaged first.
    #[must_use]
    pub const fn priority(&self) -> f32 {
        self.priority
    }

    /// Whether the enemy flies.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.is_flying
    }

    /// Whether the enemy is able to submerge.
    #[must_use]
    pub const fn can_hide(&self) -> bool {
        self.can_hide
    }

    /// Whether the enemy is submerged. Reserved: no rule toggles it yet.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Timed effects currently active.
    #[must_use]
    pub const fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    /// Route followed by path-following enemies.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.movement.route()
    }

    /// Applies damage, halving it when the enemy is shielded.
    ///
    /// Health is not clamped; the caller removes the enemy on
    /// [`DamageOutcome::Killed`].
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        let damage = if self.modifiers.is_shielded() {
            amount * SHIELD_DAMAGE_FACTOR
        } else {
            amount
        };
        self.current_health -= damage;
        if self.current_health <= 0.0 {
            DamageOutcome::Killed {
                damage,
                reward: self.reward,
            }
        } else {
            DamageOutcome::Survived { damage }
        }
    }

    /// Rescales both health values by `rank / previous rank` and stores the rank.
    pub fn set_rank(&mut self, rank: Rank) {
        let factor = self.rank.scale_to(rank);
        self.max_health *= factor;
        self.current_health *= factor;
        self.rank = rank;
    }

    /// Grants every modifier named in `label`. See [`Enemy::apply_modifiers`].
    pub fn set_modifier(&mut self, label: &str) -> ModifierSet {
        self.apply_modifiers(ModifierSet::from_label(label))
    }

    /// Adds modifiers and applies the one-off effects of those not present yet.
    ///
    /// Newly added `fast` multiplies speed and velocity by 1.5; newly added
    /// `regen` sets the regeneration rate to a sixtieth of maximum health per
    /// second. Returns the modifiers that were actually new.
    pub fn apply_modifiers(&mut self, modifiers: ModifierSet) -> ModifierSet {
        let added = modifiers.newly_added(self.modifiers);
        self.modifiers = self.modifiers.union(modifiers);

        if added.contains(Modifier::Fast) {
            self.kinematics.speed *= FAST_SPEED_FACTOR;
            self.kinematics.velocity *= FAST_SPEED_FACTOR;
        }
        if added.contains(Modifier::Regen) {
            self.regen_rate = self.max_health / REGEN_WINDOW_SECS;
        }
        added
    }

    /// Attaches a timed effect, refreshing an active one of the same kind.
    pub fn attach_effect(&mut self, effect: Effect) -> Attachment {
        self.effects.attach(effect, self.footprint)
    }

    /// Cell currently containing the enemy's centre.
    #[must_use]
    pub fn current_cell(&self, geometry: &GridGeometry) -> CellCoord {
        geometry.nearest_cell(self.kinematics.position)
    }

    /// Replaces the route and rewinds its cursor. Returns `false` for airborne enemies.
    pub fn assign_route(&mut self, cells: Vec<CellCoord>) -> bool {
        let Some(route) = self.movement.route_mut() else {
            return false;
        };
        *route = Route::new(cells);
        true
    }

    /// Advances the enemy by `dt`.
    ///
    /// Steering runs first and sets this tick's velocity and priority. Then
    /// regeneration heals, active effects scale the velocity and count down,
    /// and finally the position is integrated. Kinds of effects that ran out
    /// are appended to `expired`.
    pub fn tick(&mut self, dt: Duration, geometry: &GridGeometry, expired: &mut Vec<EffectKind>) {
        self.priority = self.movement.steer(&mut self.kinematics, geometry);

        let seconds = dt.as_secs_f32();
        if self.modifiers.contains(Modifier::Regen) {
            self.current_health =
                (self.current_health + self.regen_rate * seconds).min(self.max_health);
        }

        self.effects.advance(
            self.kinematics.position,
            &mut self.kinematics.velocity,
            dt,
            expired,
        );

        self.kinematics.position += self.kinematics.velocity * seconds;
    }

    /// Captures an immutable snapshot of the enemy.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            species: self.species,
            position: self.kinematics.position,
            velocity: self.kinematics.velocity,
            angle_degrees: self.kinematics.angle_degrees,
            footprint: self.footprint,
            current_health: self.current_health,
            max_health: self.max_health,
            reward: self.reward,
            rank: self.rank,
            modifiers: self.modifiers,
            priority: self.priority,
            is_flying: self.is_flying,
            can_hide: self.can_hide,
            is_hidden: self.is_hidden,
            remaining_steps: self.movement.route().map(Route::remaining_steps),
            effects: self.effects.iter().cloned().collect(),
        }
    }
}
