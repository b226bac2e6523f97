//! Rule policy — the tunable parts of the rule set.
//!
//! Some interactions in the game data have changed between revisions, and
//! a few lists (the Studied device allow-list, special-access devices) are
//! data rather than logic. Those live here instead of in the rule code.
//!
//! ```
//! use loadout_logic::policy::{validate_policy, RestrictionOrder, RulePolicy};
//!
//! let policy = RulePolicy::from_json(r#"{ "studied_devices": ["Stim Pack"] }"#).unwrap();
//! assert_eq!(policy.restriction_order, RestrictionOrder::AfterVersatile);
//! assert!(validate_policy(&policy).is_empty());
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::augments::SpecialAugment;

/// When the Professional/Studied class restrictions apply relative to the
/// Versatile slot expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionOrder {
    /// Restrictions strip classes from the expanded set, so they always win.
    #[default]
    AfterVersatile,
    /// Restrictions strip classes from the base set and Versatile re-admits
    /// primary, secondary and backup weapons on top.
    BeforeVersatile,
}

/// Stable-id overrides for the special augments.
///
/// `None` falls back to the kind's built-in id, then to a name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentIds {
    pub technician: Option<String>,
    pub versatile: Option<String>,
    pub heavy_weapons: Option<String>,
    pub neuro_hacker: Option<String>,
    pub experimental: Option<String>,
    pub professional: Option<String>,
    pub studied: Option<String>,
}

impl AugmentIds {
    /// The id to try first for `kind`.
    pub fn id_for(&self, kind: SpecialAugment) -> Option<&str> {
        let configured = match kind {
            SpecialAugment::Technician => &self.technician,
            SpecialAugment::Versatile => &self.versatile,
            SpecialAugment::HeavyWeapons => &self.heavy_weapons,
            SpecialAugment::NeuroHacker => &self.neuro_hacker,
            SpecialAugment::Experimental => &self.experimental,
            SpecialAugment::Professional => &self.professional,
            SpecialAugment::Studied => &self.studied,
        };
        configured.as_deref().or_else(|| kind.default_stable_id())
    }
}

/// Tunable rule behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePolicy {
    /// Order of class restrictions versus Versatile expansion.
    pub restriction_order: RestrictionOrder,
    /// Let Versatile widen the backup slot too (while Heavy-Weapons is off).
    pub versatile_backup_slot: bool,
    /// Device names that stay legal while Studied is equipped.
    pub studied_devices: Vec<String>,
    /// Device names that require Neuro-Hacker regardless of their data flag.
    pub special_access_devices: Vec<String>,
    /// Special augment id overrides.
    pub augment_ids: AugmentIds,
    /// Whether option lists include disabled entries (grayed out) or omit them.
    pub show_disabled: bool,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            restriction_order: RestrictionOrder::AfterVersatile,
            versatile_backup_slot: false,
            studied_devices: Vec::new(),
            special_access_devices: vec!["Deadzone".to_string()],
            augment_ids: AugmentIds::default(),
            show_disabled: true,
        }
    }
}

impl RulePolicy {
    /// Parse a policy document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Policy problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The policy document did not parse.
    Json(String),
    /// A configured augment id is blank.
    EmptyAugmentId(SpecialAugment),
    /// Two special augments resolve to the same stable id.
    DuplicateAugmentId(String),
    /// A device list contains a blank name.
    BlankDeviceName,
}

impl From<serde_json::Error> for PolicyError {
    fn from(e: serde_json::Error) -> Self {
        PolicyError::Json(e.to_string())
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Json(e) => write!(f, "Policy parse error: {}", e),
            PolicyError::EmptyAugmentId(kind) => write!(f, "Empty augment id for {}", kind),
            PolicyError::DuplicateAugmentId(id) => {
                write!(f, "Augment id {} is assigned to more than one special augment", id)
            }
            PolicyError::BlankDeviceName => write!(f, "Device list contains a blank name"),
        }
    }
}

impl std::error::Error for PolicyError {}

/// Validate a policy, returning all problems found.
pub fn validate_policy(policy: &RulePolicy) -> Vec<PolicyError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for &kind in SpecialAugment::all() {
        let Some(id) = policy.augment_ids.id_for(kind) else {
            continue;
        };
        if id.trim().is_empty() {
            errors.push(PolicyError::EmptyAugmentId(kind));
        } else if !seen.insert(id.trim()) {
            errors.push(PolicyError::DuplicateAugmentId(id.trim().to_string()));
        }
    }

    let blank = policy
        .studied_devices
        .iter()
        .chain(&policy.special_access_devices)
        .any(|name| name.trim().is_empty());
    if blank {
        errors.push(PolicyError::BlankDeviceName);
    }

    errors
}
