#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Harbor Defence adapters.
//!
//! Everything here is derived from [`EnemySnapshot`] values: the world owns no
//! textures, and backends resolve the [`SpriteKey`] values produced here
//! through an [`AssetRegistry`].

mod assets;

use std::{fmt, str::FromStr};

use anyhow::bail;
use glam::Vec2;
use harbor_defence_core::{EffectKind, EnemySnapshot, Modifier, ModifierSet, Species};

pub use assets::AssetRegistry;

const HEALTH_BAR_HEIGHT: f32 = 4.0;
const AURA_PADDING: f32 = 4.0;
const FLYING_AURA_HEIGHT_FACTOR: f32 = 0.6;
const FLYING_AURA_OFFSET: f32 = 2.0;
/// Edge length of aura textures in pixels.
const AURA_TEXTURE_SIZE: f32 = 64.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Permanent overlay advertising an enemy's defensive modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aura {
    /// Drawn for `ice shield`.
    IceShield,
    /// Drawn for `fire shield`.
    FireShield,
    /// Drawn for `regen`.
    Regen,
}

impl Aura {
    /// Every aura in precedence order.
    pub const ALL: [Aura; 3] = [Aura::IceShield, Aura::FireShield, Aura::Regen];

    /// Highest precedence aura granted by the modifiers, if any.
    #[must_use]
    pub fn for_modifiers(modifiers: ModifierSet) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|aura| modifiers.contains(aura.modifier()))
    }

    /// Stable kebab-case name used in asset manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IceShield => "ice-shield",
            Self::FireShield => "fire-shield",
            Self::Regen => "regen",
        }
    }

    const fn modifier(self) -> Modifier {
        match self {
            Self::IceShield => Modifier::IceShield,
            Self::FireShield => Modifier::FireShield,
            Self::Regen => Modifier::Regen,
        }
    }
}

impl fmt::Display for Aura {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aura {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match Self::ALL.into_iter().find(|aura| aura.name() == value) {
            Some(aura) => Ok(aura),
            None => bail!("unknown aura `{value}`"),
        }
    }
}

/// Identifies a texture that backends must be able to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Regular body of a species.
    Species(Species),
    /// Body of a hideable species while it is submerged.
    Submerged(Species),
    /// Overlay of a timed effect.
    Effect(EffectKind),
    /// Overlay of a permanent modifier.
    Aura(Aura),
}

/// Request to draw a texture centred at a world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePlacement {
    /// Texture to draw.
    pub key: SpriteKey,
    /// Centre of the texture in world units.
    pub center: Vec2,
    /// Uniform scale applied to the texture.
    pub scale: f32,
    /// Rotation in degrees.
    pub angle_degrees: f32,
}

/// Two-segment bar resting on top of an enemy's sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Bottom-left corner of the bar in world units.
    pub origin: Vec2,
    /// Full width of the bar, equal to the enemy's maximum health.
    pub width: f32,
    /// Height of the bar.
    pub height: f32,
    /// Width of the segment covering the health left.
    pub filled_width: f32,
}

impl HealthBar {
    /// Color of the segment covering the health left.
    pub const REMAINING: Color = Color::from_rgb_u8(0x00, 0xff, 0x00);
    /// Color of the segment covering the health lost.
    pub const LOST: Color = Color::from_rgb_u8(0xff, 0x00, 0x00);

    /// Lays out the bar for an enemy.
    #[must_use]
    pub fn for_enemy(enemy: &EnemySnapshot) -> Self {
        let width = enemy.max_health;
        let fraction = if enemy.max_health > 0.0 {
            (enemy.current_health / enemy.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            origin: Vec2::new(
                enemy.position.x - width / 2.0,
                enemy.position.y + enemy.footprint.y / 2.0,
            ),
            width,
            height: HEALTH_BAR_HEIGHT,
            filled_width: width * fraction,
        }
    }

    /// Width of the segment covering the health lost.
    #[must_use]
    pub fn lost_width(&self) -> f32 {
        self.width - self.filled_width
    }
}

/// Aura overlay sized to the enemy's footprint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifierAura {
    /// Aura to draw.
    pub aura: Aura,
    /// Edge length of the aura in world units.
    pub size: f32,
    /// Placement of the aura texture.
    pub placement: SpritePlacement,
}

impl ModifierAura {
    /// Aura for the enemy's highest precedence modifier, if it has one.
    #[must_use]
    pub fn for_enemy(enemy: &EnemySnapshot) -> Option<Self> {
        let aura = Aura::for_modifiers(enemy.modifiers)?;
        let (size, offset) = if enemy.is_flying {
            (
                enemy
                    .footprint
                    .x
                    .max(enemy.footprint.y * FLYING_AURA_HEIGHT_FACTOR)
                    + AURA_PADDING,
                FLYING_AURA_OFFSET,
            )
        } else {
            (enemy.footprint.max_element() + AURA_PADDING, 0.0)
        };
        Some(Self {
            aura,
            size,
            placement: SpritePlacement {
                key: SpriteKey::Aura(aura),
                center: enemy.position + Vec2::new(0.0, offset),
                scale: size / AURA_TEXTURE_SIZE,
                angle_degrees: 0.0,
            },
        })
    }
}

/// Everything a backend needs to draw one enemy, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Body of the enemy.
    pub body: SpritePlacement,
    /// Permanent modifier overlay.
    pub aura: Option<ModifierAura>,
    /// Timed effect overlays in attachment order.
    pub effects: Vec<SpritePlacement>,
    /// Health bar drawn last.
    pub health_bar: HealthBar,
}

impl EnemyPresentation {
    /// Derives the presentation of an enemy snapshot.
    #[must_use]
    pub fn from_snapshot(enemy: &EnemySnapshot) -> Self {
        let key = if enemy.can_hide && enemy.is_hidden {
            SpriteKey::Submerged(enemy.species)
        } else {
            SpriteKey::Species(enemy.species)
        };
        let effects = enemy
            .effects
            .iter()
            .map(|effect| SpritePlacement {
                key: SpriteKey::Effect(effect.kind()),
                center: effect.position(),
                scale: effect.visual_scale(),
                angle_degrees: 0.0,
            })
            .collect();

        Self {
            body: SpritePlacement {
                key,
                center: enemy.position,
                scale: enemy.species.profile().scale,
                angle_degrees: enemy.angle_degrees,
            },
            aura: ModifierAura::for_enemy(enemy),
            effects,
            health_bar: HealthBar::for_enemy(enemy),
        }
    }

    /// Texture keys referenced by the presentation.
    pub fn sprite_keys(&self) -> impl Iterator<Item = SpriteKey> + '_ {
        std::iter::once(self.body.key)
            .chain(self.aura.map(|aura| aura.placement.key))
            .chain(self.effects.iter().map(|effect| effect.key))
    }
}
