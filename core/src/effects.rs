//! Timed buffs and debuffs applied to enemies by external sources.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SLOW_SPEED_MULTIPLIER: f32 = 0.5;
const FREEZE_SPEED_MULTIPLIER: f32 = 0.0;
const VISUAL_SCALE_FACTOR: f32 = 1.2;
const EFFECT_TEXTURE_LENGTH: f32 = 50.0;

/// Identity of an effect. Two effects of the same kind never coexist on one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduces movement speed.
    Slow,
    /// Halts movement entirely.
    Freeze,
}

impl EffectKind {
    /// Every effect kind in declaration order.
    pub const ALL: [EffectKind; 2] = [EffectKind::Slow, EffectKind::Freeze];

    /// Stable lower-case name of the effect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Freeze => "freeze",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an effect name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown effect `{0}`")]
pub struct ParseEffectKindError(String);

impl FromStr for EffectKind {
    type Err = ParseEffectKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_lowercase();
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalised)
            .ok_or_else(|| ParseEffectKindError(value.trim().to_owned()))
    }
}

/// Timed modifier attached to an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    kind: EffectKind,
    duration: Duration,
    remaining: Duration,
    speed_multiplier: f32,
    visual_scale: f32,
    position: Vec2,
}

impl Effect {
    /// Creates an effect that lasts `duration` and scales velocity by `speed_multiplier`.
    #[must_use]
    pub fn new(kind: EffectKind, duration: Duration, speed_multiplier: f32) -> Self {
        Self {
            kind,
            duration,
            remaining: duration,
            speed_multiplier,
            visual_scale: 1.0,
            position: Vec2::ZERO,
        }
    }

    /// Creates a slow effect halving velocity.
    #[must_use]
    pub fn slow(duration: Duration) -> Self {
        Self::new(EffectKind::Slow, duration, SLOW_SPEED_MULTIPLIER)
    }

    /// Creates a freeze effect zeroing velocity.
    #[must_use]
    pub fn freeze(duration: Duration) -> Self {
        Self::new(EffectKind::Freeze, duration, FREEZE_SPEED_MULTIPLIER)
    }

    /// Identity of the effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Full duration the effect was created with.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left before the effect expires.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Factor applied to the owner's velocity every tick.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Presentation scale derived from the owner's footprint.
    #[must_use]
    pub const fn visual_scale(&self) -> f32 {
        self.visual_scale
    }

    /// Presentation position, kept in sync with the owner.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Derives the presentation scale from the owner's width and height.
    pub fn fit_to_footprint(&mut self, footprint: Vec2) {
        self.visual_scale = VISUAL_SCALE_FACTOR * footprint.max_element() / EFFECT_TEXTURE_LENGTH;
    }

    /// Moves the effect's presentation anchor.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Restarts the countdown from `duration`.
    pub fn refresh(&mut self, duration: Duration) {
        self.remaining = duration;
    }

    /// Consumes `dt` of the remaining time.
    pub fn advance(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }

    /// Reports whether no time remains.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}
