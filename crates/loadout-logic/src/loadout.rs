//! The current selection for every slot.

use serde::{Deserialize, Serialize};

use crate::catalog::ItemId;
use crate::slots::{Slot, SLOT_COUNT};

/// A full assignment of every slot, each empty or holding one item.
///
/// A loadout is plain data: it can hold ids that are illegal, duplicated or
/// unknown to the catalog. [`crate::settle::settle`] is what brings it back
/// to a rule-consistent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    slots: [Option<ItemId>; SLOT_COUNT],
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item in `slot`. Invalid slots are always empty.
    pub fn get(&self, slot: Slot) -> Option<ItemId> {
        slot.position().and_then(|i| self.slots[i])
    }

    /// Put `item` in `slot`, returning what was there before.
    ///
    /// Writes to an invalid slot are dropped.
    pub fn set(&mut self, slot: Slot, item: Option<ItemId>) -> Option<ItemId> {
        let Some(i) = slot.position() else {
            log::warn!("Ignoring write to invalid slot {:?}", slot);
            return None;
        };
        std::mem::replace(&mut self.slots[i], item)
    }

    pub fn clear(&mut self, slot: Slot) -> Option<ItemId> {
        self.set(slot, None)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots and their items, in canonical order.
    pub fn occupied(&self) -> impl Iterator<Item = (Slot, ItemId)> + '_ {
        Slot::ALL
            .iter()
            .filter_map(move |&slot| self.get(slot).map(|id| (slot, id)))
    }

    /// Items held in any of `slots`.
    pub fn held_in(&self, slots: &[Slot]) -> Vec<ItemId> {
        slots.iter().filter_map(|&s| self.get(s)).collect()
    }

    /// The slot among `slots` that holds `item`, if any.
    pub fn holder_of(&self, item: ItemId, slots: &[Slot]) -> Option<Slot> {
        slots.iter().copied().find(|&s| self.get(s) == Some(item))
    }
}
