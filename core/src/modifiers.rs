//! Named behavioural modifiers attached to enemies at spawn time.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Special behaviour that may be granted to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Multiplies movement speed by one and a half.
    Fast,
    /// Heals a sixtieth of maximum health every second.
    Regen,
    /// Halves incoming damage.
    Shield,
    /// Shield variant presented with an ice aura.
    IceShield,
    /// Shield variant presented with a fire aura.
    FireShield,
}

impl Modifier {
    /// Every modifier in declaration order.
    pub const ALL: [Modifier; 5] = [
        Modifier::Fast,
        Modifier::Regen,
        Modifier::Shield,
        Modifier::IceShield,
        Modifier::FireShield,
    ];

    /// Lower-case tag used in modifier labels.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Regen => "regen",
            Self::Shield => "shield",
            Self::IceShield => "ice shield",
            Self::FireShield => "fire shield",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Fast => 1 << 0,
            Self::Regen => 1 << 1,
            Self::Shield => 1 << 2,
            Self::IceShield => 1 << 3,
            Self::FireShield => 1 << 4,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a modifier tag is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown modifier `{0}`")]
pub struct ParseModifierError(String);

impl FromStr for Modifier {
    type Err = ParseModifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_lowercase();
        Modifier::ALL
            .into_iter()
            .find(|modifier| modifier.tag() == normalised)
            .ok_or_else(|| ParseModifierError(value.trim().to_owned()))
    }
}

/// Additive set of modifiers carried by a single enemy.
///
/// Both shield variants imply [`Modifier::Shield`], so damage mitigation only
/// ever needs to consult the plain shield flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierSet {
    bits: u8,
}

impl ModifierSet {
    /// Set containing no modifiers.
    pub const EMPTY: ModifierSet = ModifierSet { bits: 0 };

    /// Derives a modifier set from a free-form label.
    ///
    /// Every known tag contained anywhere in the label (case-insensitively) is
    /// included, so `"Fast ice shield"` yields fast, shield and ice shield.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let normalised = label.to_lowercase();
        let mut set = Self::EMPTY;
        for modifier in Modifier::ALL {
            if normalised.contains(modifier.tag()) {
                let _ = set.insert(modifier);
            }
        }
        set
    }

    /// Returns a copy of the set with the provided modifier added.
    #[must_use]
    pub fn with(mut self, modifier: Modifier) -> Self {
        let _ = self.insert(modifier);
        self
    }

    /// Adds a modifier, returning whether it was absent before.
    pub fn insert(&mut self, modifier: Modifier) -> bool {
        let was_present = self.contains(modifier);
        self.bits |= modifier.bit();
        if matches!(modifier, Modifier::IceShield | Modifier::FireShield) {
            self.bits |= Modifier::Shield.bit();
        }
        !was_present
    }

    /// Reports whether the set contains the modifier.
    #[must_use]
    pub const fn contains(self, modifier: Modifier) -> bool {
        self.bits & modifier.bit() != 0
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Reports whether incoming damage should be halved.
    #[must_use]
    pub const fn is_shielded(self) -> bool {
        self.contains(Modifier::Shield)
    }

    /// Union of both sets.
    #[must_use]
    pub const fn union(self, other: ModifierSet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Modifiers present in `self` but missing from `previous`.
    #[must_use]
    pub const fn newly_added(self, previous: ModifierSet) -> Self {
        Self {
            bits: self.bits & !previous.bits,
        }
    }

    /// Iterates over the contained modifiers in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(move |modifier| self.contains(*modifier))
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for modifier in iter {
            let _ = set.insert(modifier);
        }
        set
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let implied_shield =
            self.contains(Modifier::IceShield) || self.contains(Modifier::FireShield);
        let mut first = true;
        for modifier in self.iter() {
            if modifier == Modifier::Shield && implied_shield {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(modifier.tag())?;
        }
        Ok(())
    }
}

impl FromStr for ModifierSet {
    type Err = ParseModifierError;

    /// Parses a comma or `+` separated list of modifier tags.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .split([',', '+'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse::<Modifier>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_matching_is_case_insensitive_and_cumulative() {
        let set = ModifierSet::from_label("FAST Ice Shield");

        assert!(set.contains(Modifier::Fast));
        assert!(set.contains(Modifier::IceShield));
        assert!(set.is_shielded());
        assert!(!set.contains(Modifier::Regen));
        assert!(!set.contains(Modifier::FireShield));
    }

    #[test]
    fn empty_label_yields_empty_set() {
        assert!(ModifierSet::from_label("").is_empty());
        assert!(ModifierSet::from_label("elite").is_empty());
    }

    #[test]
    fn newly_added_ignores_previous_tags() {
        let previous = ModifierSet::EMPTY.with(Modifier::Fast);
        let next = previous.with(Modifier::Regen);

        let added = next.newly_added(previous);

        assert_eq!(added, ModifierSet::EMPTY.with(Modifier::Regen));
    }

    #[test]
    fn parses_separated_lists() {
        let set: ModifierSet = "fast + fire shield, regen".parse().expect("valid list");

        assert!(set.contains(Modifier::Fast));
        assert!(set.contains(Modifier::FireShield));
        assert!(set.contains(Modifier::Regen));
        assert!(set.is_shielded());
        assert_eq!("".parse::<ModifierSet>(), Ok(ModifierSet::EMPTY));
        assert!("fast, sneaky".parse::<ModifierSet>().is_err());
    }

    #[test]
    fn display_hides_implied_shield() {
        let set = ModifierSet::from_label("regen ice shield");

        assert_eq!(set.to_string(), "regen, ice shield");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn insert_is_idempotent(
                modifiers in prop::collection::vec(prop::sample::select(Modifier::ALL.to_vec()), 0..8)
            ) {
                let once: ModifierSet = modifiers.iter().copied().collect();
                let twice = modifiers.iter().copied().fold(once, ModifierSet::with);

                prop_assert_eq!(once, twice);
                prop_assert!(twice.newly_added(once).is_empty());
            }
        }
    }
}
