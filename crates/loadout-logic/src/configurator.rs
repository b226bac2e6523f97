//! Loadout configurator — the single owner of catalog, policy and selection.
//!
//! A front end drives one [`Configurator`]: it asks for each slot's options,
//! forwards the user's pick to [`Configurator::select`], and re-renders from
//! the returned [`SettleReport`]. Every mutation settles before returning,
//! so the loadout it exposes is always rule-consistent.
//!
//! A configurator can only be built from a loaded [`Catalog`], so nothing
//! accepts input until the catalog load has succeeded.
//!
//! ```
//! use loadout_logic::catalog::Catalog;
//! use loadout_logic::configurator::Configurator;
//! use loadout_logic::policy::RulePolicy;
//! use loadout_logic::slots::{Slot, WeaponSlot};
//!
//! let catalog = Catalog::from_json(
//!     r#"{ "Shells": { "Recon": 2 }, "Augments": { "Versatile": 61 } }"#,
//!     r#"[{ "name": "Fists", "stats": { "slot": "Backup" } }]"#,
//!     "[]",
//!     "[]",
//!     &RulePolicy::default(),
//! )
//! .unwrap();
//! let mut editor = Configurator::new(catalog, RulePolicy::default());
//! let secondary = Slot::Weapon(WeaponSlot::Secondary);
//!
//! assert!(editor.select_by_name(secondary, "Fists").is_err());
//! editor.select_by_name(Slot::Augment(0), "Versatile").unwrap();
//! editor.select_by_name(secondary, "Fists").unwrap();
//!
//! // Dropping Versatile strands the backup-class weapon.
//! let report = editor.clear(Slot::Augment(0));
//! assert!(report.was_cleared(secondary));
//! ```

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::augments::AugmentFlags;
use crate::catalog::{Catalog, CatalogError, ItemId};
use crate::code::{self, CodeError};
use crate::loadout::Loadout;
use crate::policy::RulePolicy;
use crate::rules::{RuleContext, SlotOption, Verdict};
use crate::settle::{self, SettleReport};
use crate::slots::Slot;

/// Why a selection was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The item is not a legal choice for the slot right now.
    Illegal {
        slot: Slot,
        item: ItemId,
        verdict: Verdict,
    },
    /// No item of the slot's category has this name.
    UnknownName { slot: Slot, name: String },
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::Illegal { slot, verdict, .. } => {
                write!(f, "Cannot select for {}: {}", slot, verdict)
            }
            SelectError::UnknownName { slot, name } => {
                write!(f, "No {} named {}", slot.category(), name)
            }
        }
    }
}

impl std::error::Error for SelectError {}

/// Owns the editor state and keeps it consistent.
#[derive(Debug, Clone)]
pub struct Configurator {
    catalog: Catalog,
    policy: RulePolicy,
    loadout: Loadout,
}

impl Configurator {
    /// Start with an empty loadout.
    pub fn new(catalog: Catalog, policy: RulePolicy) -> Self {
        Self {
            catalog,
            policy,
            loadout: Loadout::new(),
        }
    }

    /// Load the catalog documents and start an empty loadout.
    pub fn load(
        ids: &str,
        weapons: &str,
        devices: &str,
        attachments: &str,
        policy: RulePolicy,
    ) -> Result<Self, CatalogError> {
        let catalog = Catalog::from_json(ids, weapons, devices, attachments, &policy)?;
        Ok(Self::new(catalog, policy))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &RulePolicy {
        &self.policy
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn flags(&self) -> AugmentFlags {
        AugmentFlags::from_loadout(&self.catalog, &self.loadout)
    }

    /// Verdict for putting `item` in `slot` right now.
    pub fn verdict(&self, slot: Slot, item: ItemId) -> Verdict {
        self.context().evaluate(slot, item)
    }

    /// Options to present for `slot`.
    ///
    /// Hidden options are always omitted; disabled ones are kept (for a
    /// grayed-out entry) unless the policy turns them off.
    pub fn options(&self, slot: Slot) -> Vec<SlotOption> {
        self.context()
            .options(slot)
            .into_iter()
            .filter(|o| match o.verdict {
                Verdict::Legal => true,
                Verdict::IllegalDisabled(_) => self.policy.show_disabled,
                Verdict::IllegalHidden(_) => false,
            })
            .collect()
    }

    /// Label for `slot` given the current augments.
    pub fn slot_label(&self, slot: Slot) -> String {
        slot.label(&self.flags())
    }

    /// Put `item` in `slot` if it is legal there, then settle.
    pub fn select(&mut self, slot: Slot, item: ItemId) -> Result<SettleReport, SelectError> {
        let verdict = self.verdict(slot, item);
        if !verdict.is_legal() {
            return Err(SelectError::Illegal {
                slot,
                item,
                verdict,
            });
        }
        self.loadout.set(slot, Some(item));
        Ok(self.settle())
    }

    /// [`Self::select`] by display name within the slot's category.
    pub fn select_by_name(&mut self, slot: Slot, name: &str) -> Result<SettleReport, SelectError> {
        let item = self
            .catalog
            .by_name(slot.category(), name)
            .ok_or_else(|| SelectError::UnknownName {
                slot,
                name: name.to_string(),
            })?;
        self.select(slot, item)
    }

    /// Empty `slot`, then settle whatever depended on it.
    pub fn clear(&mut self, slot: Slot) -> SettleReport {
        self.loadout.clear(slot);
        self.settle()
    }

    /// Empty every slot.
    pub fn reset(&mut self) {
        self.loadout = Loadout::new();
    }

    /// Replace the whole loadout and settle it.
    pub fn apply_loadout(&mut self, incoming: Loadout) -> SettleReport {
        let report = settle::apply_loadout(&self.catalog, &self.policy, &mut self.loadout, incoming);
        if !report.is_stable() {
            log::info!("Applied loadout; {} slot(s) cleared", report.cleared.len());
        }
        report
    }

    /// Decode a loadout code and apply it.
    pub fn apply_code(&mut self, code: &str) -> Result<SettleReport, CodeError> {
        let decoded = code::decode(&self.catalog, code)?;
        Ok(self.apply_loadout(decoded))
    }

    /// Encode the current loadout.
    pub fn code(&self) -> Result<String, CodeError> {
        code::encode(&self.catalog, &self.loadout)
    }

    /// Fill every slot in canonical order with a random legal option, or
    /// leave it empty, then settle.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SettleReport {
        self.reset();
        for slot in Slot::ALL {
            let legal: Vec<ItemId> = self
                .context()
                .options(slot)
                .into_iter()
                .filter(|o| o.verdict.is_legal())
                .map(|o| o.item)
                .collect();
            // One extra draw for "leave empty".
            if rng.gen_range(0..=legal.len()) == legal.len() {
                continue;
            }
            if let Some(&item) = legal.choose(rng) {
                self.loadout.set(slot, Some(item));
            }
        }
        self.settle()
    }

    fn settle(&mut self) -> SettleReport {
        settle::settle(&self.catalog, &self.policy, &mut self.loadout)
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(&self.catalog, &self.policy, &self.loadout)
    }
}
