//! Forced-clear settling — bring a loadout back to a rule-consistent state.
//!
//! Clearing one slot can invalidate others: dropping Technician can strand
//! technician ammo, dropping Versatile can strand a backup-class weapon in
//! the secondary slot, dropping a weapon strands its attachments. Settling
//! repeats evaluate-then-clear passes until a pass clears nothing.
//!
//! A pass walks [`Slot::ALL`] front to back and evaluates each held item
//! against the loadout as already modified earlier in the same pass, so
//! upstream clears cascade within one pass. Passes only ever empty slots,
//! which bounds the loop by the number of slots.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemId};
use crate::loadout::Loadout;
use crate::policy::RulePolicy;
use crate::rules::{RuleContext, Verdict};
use crate::slots::{Slot, SLOT_COUNT};

/// A slot emptied by settling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedSlot {
    pub slot: Slot,
    pub item: ItemId,
    /// Why the held item stopped being legal.
    pub verdict: Verdict,
}

/// What a settle run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleReport {
    /// Passes that cleared at least one slot.
    pub passes: usize,
    /// Every clear, in the order it happened.
    pub cleared: Vec<ClearedSlot>,
}

impl SettleReport {
    /// True when the loadout was already consistent.
    pub fn is_stable(&self) -> bool {
        self.cleared.is_empty()
    }

    pub fn was_cleared(&self, slot: Slot) -> bool {
        self.cleared.iter().any(|c| c.slot == slot)
    }

    /// Fold a later report into this one.
    pub fn absorb(&mut self, other: SettleReport) {
        self.passes += other.passes;
        self.cleared.extend(other.cleared);
    }
}

/// Clear every slot whose held item is illegal, until nothing changes.
pub fn settle(catalog: &Catalog, policy: &RulePolicy, loadout: &mut Loadout) -> SettleReport {
    let mut report = SettleReport::default();

    // Each clearing pass empties at least one of SLOT_COUNT slots, so the
    // pass after the last possible clear is guaranteed to be quiet.
    for _ in 0..=SLOT_COUNT {
        let cleared_before = report.cleared.len();
        for slot in Slot::ALL {
            let verdict = RuleContext::new(catalog, policy, loadout).evaluate_held(slot);
            let Some(verdict) = verdict.filter(|v| !v.is_legal()) else {
                continue;
            };
            if let Some(item) = loadout.clear(slot) {
                log::debug!(
                    "Cleared {} ({}): {}",
                    slot,
                    catalog.name(item).unwrap_or("unknown item"),
                    verdict
                );
                report.cleared.push(ClearedSlot {
                    slot,
                    item,
                    verdict,
                });
            }
        }
        if report.cleared.len() == cleared_before {
            return report;
        }
        report.passes += 1;
    }

    log::warn!("Settle did not converge after {} passes", report.passes);
    report
}

/// Replace `loadout` with `incoming` (e.g. a decoded code) and settle it.
///
/// Slots holding ids that are illegal or unknown to the catalog come back
/// empty, exactly as if the user had made the selections one by one.
pub fn apply_loadout(
    catalog: &Catalog,
    policy: &RulePolicy,
    loadout: &mut Loadout,
    incoming: Loadout,
) -> SettleReport {
    *loadout = incoming;
    settle(catalog, policy, loadout)
}
