//! Enemy species presets and rank scaling.

use std::{fmt, num::NonZeroU32, str::FromStr};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base movement speed shared by every species, in world units per second.
pub const BASE_SPEED: f32 = 48.0;

/// Strategy an enemy uses to reach the exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// Flies straight down, ignoring the grid.
    Airborne,
    /// Follows a grid route computed by the pathfinder.
    PathFollowing,
}

/// Concrete enemy species released by spawners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Small flyer.
    TinyBird,
    /// Light airship.
    SmallShip,
    /// Mid-sized flyer.
    MediumDragon,
    /// Heavy flyer.
    BigDragon,
    /// Light surface vessel.
    TinyBoat,
    /// Submersible serpent.
    SmallSnake,
    /// Heavier surface vessel.
    MediumBoat,
    /// Heavy submersible.
    BigWhale,
}

/// Static stat block shared by every enemy of a species.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeciesProfile {
    /// Starting and maximum health at rank one.
    pub health: f32,
    /// Currency granted when the enemy is destroyed.
    pub reward: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Sprite scale applied by presentation layers.
    pub scale: f32,
    /// Width and height of the scaled sprite in world units.
    pub footprint: Vec2,
    /// Movement strategy used by the species.
    pub movement: MovementKind,
    /// Whether the species is able to submerge.
    pub can_hide: bool,
}

impl Species {
    /// Every species in declaration order.
    pub const ALL: [Species; 8] = [
        Species::TinyBird,
        Species::SmallShip,
        Species::MediumDragon,
        Species::BigDragon,
        Species::TinyBoat,
        Species::SmallSnake,
        Species::MediumBoat,
        Species::BigWhale,
    ];

    /// Stable kebab-case name of the species.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TinyBird => "tiny-bird",
            Self::SmallShip => "small-ship",
            Self::MediumDragon => "medium-dragon",
            Self::BigDragon => "big-dragon",
            Self::TinyBoat => "tiny-boat",
            Self::SmallSnake => "small-snake",
            Self::MediumBoat => "medium-boat",
            Self::BigWhale => "big-whale",
        }
    }

    /// Stat block for the species.
    #[must_use]
    pub fn profile(self) -> SpeciesProfile {
        match self {
            Self::TinyBird => airborne(10.0, 30.0, Vec2::new(32.0, 32.0)),
            Self::SmallShip => airborne(20.0, 60.0, Vec2::new(40.0, 40.0)),
            Self::MediumDragon => airborne(30.0, 100.0, Vec2::new(64.0, 56.0)),
            Self::BigDragon => airborne(70.0, 150.0, Vec2::new(96.0, 80.0)),
            Self::TinyBoat => SpeciesProfile {
                scale: 0.3,
                ..surface(15.0, 30.0, Vec2::new(48.0, 30.0))
            },
            Self::SmallSnake => submerged(25.0, 60.0, Vec2::new(48.0, 24.0)),
            Self::MediumBoat => surface(50.0, 100.0, Vec2::new(60.0, 40.0)),
            Self::BigWhale => submerged(80.0, 150.0, Vec2::new(96.0, 48.0)),
        }
    }

    /// Reports whether the species flies over the grid.
    #[must_use]
    pub fn is_flying(self) -> bool {
        self.profile().movement == MovementKind::Airborne
    }
}

fn airborne(health: f32, reward: f32, footprint: Vec2) -> SpeciesProfile {
    SpeciesProfile {
        health,
        reward,
        speed: BASE_SPEED,
        scale: 1.0,
        footprint,
        movement: MovementKind::Airborne,
        can_hide: false,
    }
}

fn surface(health: f32, reward: f32, footprint: Vec2) -> SpeciesProfile {
    SpeciesProfile {
        movement: MovementKind::PathFollowing,
        ..airborne(health, reward, footprint)
    }
}

fn submerged(health: f32, reward: f32, footprint: Vec2) -> SpeciesProfile {
    SpeciesProfile {
        can_hide: true,
        ..surface(health, reward, footprint)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a species name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown species `{0}`")]
pub struct ParseSpeciesError(String);

impl FromStr for Species {
    type Err = ParseSpeciesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_lowercase().replace('_', "-");
        Species::ALL
            .into_iter()
            .find(|species| species.name() == normalised)
            .ok_or_else(|| ParseSpeciesError(value.trim().to_owned()))
    }
}

/// Elite tier scaling an enemy's health. Ranks start at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rank(NonZeroU32);

/// Error returned when a rank of zero is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("rank must be at least one")]
pub struct InvalidRank;

impl Rank {
    /// Rank assigned to freshly spawned enemies.
    pub const BASE: Rank = Rank(NonZeroU32::MIN);

    /// Creates a rank, rejecting zero.
    pub fn new(value: u32) -> Result<Self, InvalidRank> {
        NonZeroU32::new(value).map(Self).ok_or(InvalidRank)
    }

    /// Numeric value of the rank.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Factor that rescales stats tuned for `self` to `target`.
    #[must_use]
    pub fn scale_to(self, target: Rank) -> f32 {
        target.get() as f32 / self.get() as f32
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::BASE
    }
}

impl TryFrom<u32> for Rank {
    type Error = InvalidRank;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_follow_the_bestiary() {
        let boat = Species::TinyBoat.profile();
        assert_eq!(boat.health, 15.0);
        assert_eq!(boat.reward, 30.0);
        assert_eq!(boat.movement, MovementKind::PathFollowing);
        assert!(!boat.can_hide);

        let whale = Species::BigWhale.profile();
        assert_eq!(whale.health, 80.0);
        assert!(whale.can_hide);

        assert!(Species::BigDragon.is_flying());
        assert!(!Species::SmallSnake.is_flying());
    }

    #[test]
    fn species_names_round_trip_through_from_str() {
        for species in Species::ALL {
            assert_eq!(species.name().parse::<Species>(), Ok(species));
        }
        assert_eq!("Medium_Boat".parse::<Species>(), Ok(Species::MediumBoat));
        assert!("kraken".parse::<Species>().is_err());
    }

    #[test]
    fn rank_rejects_zero() {
        assert_eq!(Rank::new(0), Err(InvalidRank));
        assert_eq!(Rank::new(1), Ok(Rank::BASE));
    }

    #[test]
    fn rank_scale_is_ratio_of_ranks() {
        let two = Rank::new(2).expect("non-zero");
        let three = Rank::new(3).expect("non-zero");

        assert!((two.scale_to(three) - 1.5).abs() < f32::EPSILON);
        assert!((three.scale_to(three) - 1.0).abs() < f32::EPSILON);
    }
}
