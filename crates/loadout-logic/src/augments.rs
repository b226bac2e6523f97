//! Special augments and the flags they switch on.
//!
//! A handful of augments change how the rest of the loadout is judged.
//! They are resolved to a [`SpecialAugment`] once, when the catalog loads,
//! and the rule code only ever asks [`AugmentFlags`] about them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::loadout::Loadout;
use crate::slots::{Slot, AUGMENT_SLOTS};

/// Augments that toggle systemic rule behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAugment {
    /// Unlocks attachments flagged as requiring a technician.
    Technician,
    /// Relaxes weapon class matching and device uniqueness.
    Versatile,
    /// Repurposes the backup slot for heavy weapons.
    HeavyWeapons,
    /// Unlocks special-access devices.
    NeuroHacker,
    /// Unlocks experimental devices.
    Experimental,
    /// Removes primary weapons from eligibility.
    Professional,
    /// Removes primary and secondary weapons, restricts devices to an allow-list.
    Studied,
}

impl SpecialAugment {
    pub fn all() -> &'static [SpecialAugment] {
        &[
            Self::Technician,
            Self::Versatile,
            Self::HeavyWeapons,
            Self::NeuroHacker,
            Self::Experimental,
            Self::Professional,
            Self::Studied,
        ]
    }

    /// Name used for the name-based fallback lookup.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Technician => "Technician",
            Self::Versatile => "Versatile",
            Self::HeavyWeapons => "Heavy Weapons",
            Self::NeuroHacker => "Neuro-Hacker",
            Self::Experimental => "Experimental",
            Self::Professional => "Professional",
            Self::Studied => "Studied",
        }
    }

    /// Stable id the game data ships with, where one is known.
    pub fn default_stable_id(self) -> Option<&'static str> {
        match self {
            Self::Technician => Some("23"),
            Self::Versatile => Some("61"),
            Self::HeavyWeapons => Some("19"),
            Self::NeuroHacker => Some("68"),
            Self::Experimental => Some("17"),
            Self::Professional | Self::Studied => None,
        }
    }

    /// Whether an augment's display name refers to this kind.
    ///
    /// Case, spaces, hyphens and underscores are ignored so "Heavy-Weapons"
    /// and "heavy weapons" both match.
    pub fn matches_name(self, name: &str) -> bool {
        normalize(name) == normalize(self.canonical_name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for SpecialAugment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Flags derived from the augments currently equipped.
///
/// Recomputed from scratch on every evaluation pass; never cached across
/// loadout changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentFlags {
    pub technician: bool,
    pub versatile: bool,
    pub heavy_weapons: bool,
    pub neuro_hacker: bool,
    pub experimental: bool,
    pub professional: bool,
    pub studied: bool,
}

impl AugmentFlags {
    /// Derive flags from the four augment slots.
    ///
    /// Ids the catalog does not know, and augments with no special meaning,
    /// contribute nothing.
    pub fn from_loadout(catalog: &Catalog, loadout: &Loadout) -> Self {
        let mut flags = Self::default();
        for i in 0..AUGMENT_SLOTS {
            let special = loadout
                .get(Slot::Augment(i))
                .and_then(|id| catalog.special_augment(id));
            if let Some(kind) = special {
                flags.set(kind, true);
            }
        }
        flags
    }

    pub fn has(&self, kind: SpecialAugment) -> bool {
        match kind {
            SpecialAugment::Technician => self.technician,
            SpecialAugment::Versatile => self.versatile,
            SpecialAugment::HeavyWeapons => self.heavy_weapons,
            SpecialAugment::NeuroHacker => self.neuro_hacker,
            SpecialAugment::Experimental => self.experimental,
            SpecialAugment::Professional => self.professional,
            SpecialAugment::Studied => self.studied,
        }
    }

    pub fn set(&mut self, kind: SpecialAugment, value: bool) {
        let flag = match kind {
            SpecialAugment::Technician => &mut self.technician,
            SpecialAugment::Versatile => &mut self.versatile,
            SpecialAugment::HeavyWeapons => &mut self.heavy_weapons,
            SpecialAugment::NeuroHacker => &mut self.neuro_hacker,
            SpecialAugment::Experimental => &mut self.experimental,
            SpecialAugment::Professional => &mut self.professional,
            SpecialAugment::Studied => &mut self.studied,
        };
        *flag = value;
    }

    /// The kinds currently active, in declaration order.
    pub fn active(&self) -> Vec<SpecialAugment> {
        SpecialAugment::all()
            .iter()
            .copied()
            .filter(|&k| self.has(k))
            .collect()
    }
}
