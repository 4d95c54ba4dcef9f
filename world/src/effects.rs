//! Active effect bookkeeping for a single enemy.

use std::time::Duration;

use glam::Vec2;
use harbor_defence_core::{Effect, EffectKind};

/// Outcome of attaching an effect to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// The effect was new and has been appended.
    Attached,
    /// An effect of the same kind existed and had its countdown restarted.
    Refreshed,
}

/// Ordered collection holding at most one effect per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveEffects {
    entries: Vec<Effect>,
}

impl ActiveEffects {
    /// Attaches an effect sized for the owner's `footprint`.
    ///
    /// When an effect of the same kind is already active its remaining time is
    /// reset to the new effect's duration and the new instance is dropped.
    pub fn attach(&mut self, mut effect: Effect, footprint: Vec2) -> Attachment {
        effect.fit_to_footprint(footprint);
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|existing| existing.kind() == effect.kind())
        {
            existing.refresh(effect.duration());
            return Attachment::Refreshed;
        }
        self.entries.push(effect);
        Attachment::Attached
    }

    /// Active effect of the provided kind, if any.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&Effect> {
        self.entries.iter().find(|effect| effect.kind() == kind)
    }

    /// Iterator over active effects in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.entries.iter()
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs one tick over every active effect.
    ///
    /// Each effect is moved to `position`, scales `velocity` by its multiplier
    /// and consumes `dt`. Effects that ran out are removed once the pass is
    /// complete and their kinds are appended to `expired`.
    pub(crate) fn advance(
        &mut self,
        position: Vec2,
        velocity: &mut Vec2,
        dt: Duration,
        expired: &mut Vec<EffectKind>,
    ) {
        for effect in &mut self.entries {
            effect.set_position(position);
            *velocity *= effect.speed_multiplier();
            effect.advance(dt);
            if effect.is_expired() {
                expired.push(effect.kind());
            }
        }
        self.entries.retain(|effect| !effect.is_expired());
    }
}
