//! Eligibility rules — which item may sit in which slot, given the rest of
//! the loadout.
//!
//! Every check is a pure function of `(catalog, policy, loadout)`. Checks
//! run in a fixed order and the first failure decides the verdict:
//!
//! 1. Identity: the item exists and belongs to the slot's category.
//! 2. Structure (hidden): weapon class against slot, heavy lock, parent
//!    weapon present, attachment compatibility.
//! 3. Access (disabled): augment requirements and Professional/Studied
//!    restrictions.
//! 4. Uniqueness (disabled): the same item in a peer slot.
//!
//! Hidden verdicts mean the option makes no sense in the slot at all;
//! disabled verdicts are options a different augment or slot choice would
//! unlock, which a front end may gray out with the reason.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::augments::{AugmentFlags, SpecialAugment};
use crate::catalog::{AttachmentInfo, Catalog, Category, DeviceInfo, ItemId, ItemMeta, WeaponClass, WeaponInfo};
use crate::loadout::Loadout;
use crate::policy::{RestrictionOrder, RulePolicy};
use crate::slots::{Mount, Slot, WeaponSlot};

/// Outcome of judging one candidate for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Legal,
    /// Not a meaningful choice for this slot; omit it.
    IllegalHidden(HiddenReason),
    /// Blocked by another selection; may be shown grayed out.
    IllegalDisabled(DisableReason),
}

impl Verdict {
    pub fn is_legal(&self) -> bool {
        matches!(self, Verdict::Legal)
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Verdict::IllegalHidden(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Legal => write!(f, "legal"),
            Verdict::IllegalHidden(r) => write!(f, "{}", r),
            Verdict::IllegalDisabled(r) => write!(f, "{}", r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiddenReason {
    /// The slot index is outside the fixed layout.
    NoSuchSlot,
    /// The id is not in the catalog.
    UnknownItem,
    /// The item belongs to a different category than the slot.
    WrongCategory,
    /// The weapon has no usable class in the source data.
    NoWeaponClass,
    /// The slot does not accept this weapon class.
    ClassMismatch(WeaponClass),
    /// Heavy weapons need the backup slot and Heavy-Weapons.
    HeavyLocked,
    /// The owning weapon slot is empty.
    NoWeapon,
    /// The attachment does not fit the owning weapon.
    Incompatible,
}

impl fmt::Display for HiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiddenReason::NoSuchSlot => write!(f, "no such slot"),
            HiddenReason::UnknownItem => write!(f, "unknown item"),
            HiddenReason::WrongCategory => write!(f, "wrong category for slot"),
            HiddenReason::NoWeaponClass => write!(f, "weapon has no class"),
            HiddenReason::ClassMismatch(c) => write!(f, "slot does not accept {:?} weapons", c),
            HiddenReason::HeavyLocked => write!(f, "heavy weapons need Heavy Weapons in the backup slot"),
            HiddenReason::NoWeapon => write!(f, "no weapon selected"),
            HiddenReason::Incompatible => write!(f, "not compatible with the selected weapon"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisableReason {
    /// Already held by `holder`.
    Duplicate { holder: Slot },
    /// Needs the given augment equipped.
    RequiresAugment(SpecialAugment),
    /// Removed by the given augment.
    RestrictedBy(SpecialAugment),
    /// Studied is equipped and the device is not on its allow-list.
    NotStudiedApproved,
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisableReason::Duplicate { holder } => write!(f, "already equipped in {}", holder),
            DisableReason::RequiresAugment(a) => write!(f, "requires {}", a),
            DisableReason::RestrictedBy(a) => write!(f, "not available with {}", a),
            DisableReason::NotStudiedApproved => write!(f, "not usable with Studied"),
        }
    }
}

/// One entry in a slot's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOption {
    pub item: ItemId,
    pub name: String,
    pub verdict: Verdict,
    /// A device duplicated across device slots, tolerated by Versatile.
    pub soft_duplicate: bool,
}

/// Which peers count for the uniqueness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeerScope {
    /// Every other slot in the group; used for candidates.
    All,
    /// Only peers before this slot; used for held items so a duplicated
    /// pair keeps the first copy.
    Earlier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Judgement {
    verdict: Verdict,
    soft_duplicate: bool,
}

impl From<Verdict> for Judgement {
    fn from(verdict: Verdict) -> Self {
        Self {
            verdict,
            soft_duplicate: false,
        }
    }
}

fn hidden(reason: HiddenReason) -> Verdict {
    Verdict::IllegalHidden(reason)
}

fn disabled(reason: DisableReason) -> Verdict {
    Verdict::IllegalDisabled(reason)
}

/// A single evaluation pass over one loadout state.
///
/// Augment flags are derived once on construction; build a fresh context
/// after the loadout changes.
pub struct RuleContext<'a> {
    catalog: &'a Catalog,
    policy: &'a RulePolicy,
    loadout: &'a Loadout,
    flags: AugmentFlags,
}

impl<'a> RuleContext<'a> {
    pub fn new(catalog: &'a Catalog, policy: &'a RulePolicy, loadout: &'a Loadout) -> Self {
        Self {
            catalog,
            policy,
            loadout,
            flags: AugmentFlags::from_loadout(catalog, loadout),
        }
    }

    pub fn flags(&self) -> &AugmentFlags {
        &self.flags
    }

    /// Judge `item` as a candidate for `slot`.
    pub fn evaluate(&self, slot: Slot, item: ItemId) -> Verdict {
        self.judge(slot, item, PeerScope::All).verdict
    }

    /// Judge whatever `slot` currently holds. `None` for an empty slot.
    pub fn evaluate_held(&self, slot: Slot) -> Option<Verdict> {
        self.loadout
            .get(slot)
            .map(|item| self.judge(slot, item, PeerScope::Earlier).verdict)
    }

    /// Every item of the slot's category with its verdict, sorted by name.
    pub fn options(&self, slot: Slot) -> Vec<SlotOption> {
        self.catalog
            .items_in(slot.category())
            .iter()
            .filter_map(|&id| {
                let item = self.catalog.get(id)?;
                let judgement = self.judge(slot, id, PeerScope::All);
                Some(SlotOption {
                    item: id,
                    name: item.name.clone(),
                    verdict: judgement.verdict,
                    soft_duplicate: judgement.soft_duplicate,
                })
            })
            .collect()
    }

    fn judge(&self, slot: Slot, id: ItemId, scope: PeerScope) -> Judgement {
        if !slot.is_valid() {
            return hidden(HiddenReason::NoSuchSlot).into();
        }
        let Some(item) = self.catalog.get(id) else {
            return hidden(HiddenReason::UnknownItem).into();
        };
        if item.category != slot.category() {
            return hidden(HiddenReason::WrongCategory).into();
        }

        let checked = match (slot, &item.meta) {
            (Slot::Shell | Slot::Augment(_), _) => Ok(()),
            (Slot::Weapon(w), ItemMeta::Weapon(info)) => self.check_weapon(w, info),
            (Slot::Device(_), ItemMeta::Device(info)) => self.check_device(id, info),
            (Slot::Optic(m) | Slot::Ammo(m) | Slot::Mod(m, _), ItemMeta::Attachment(info)) => {
                self.check_attachment(m, info)
            }
            _ => Err(hidden(HiddenReason::WrongCategory)),
        };
        if let Err(verdict) = checked {
            return verdict.into();
        }

        self.check_unique(slot, id, scope)
    }

    fn check_weapon(&self, slot: WeaponSlot, info: &WeaponInfo) -> Result<(), Verdict> {
        let Some(class) = info.class else {
            return Err(hidden(HiddenReason::NoWeaponClass));
        };
        let heavy_active = self.flags.heavy_weapons;

        if class == WeaponClass::Heavy {
            return if slot == WeaponSlot::Backup && heavy_active {
                Ok(())
            } else {
                Err(hidden(HiddenReason::HeavyLocked))
            };
        }

        let base = match slot {
            WeaponSlot::Backup => !heavy_active && class == WeaponClass::Backup,
            WeaponSlot::Secondary => class == WeaponClass::Secondary,
            WeaponSlot::Primary => class == WeaponClass::Primary,
        };
        // Versatile admits any non-heavy class.
        let expanded = self.flags.versatile
            && match slot {
                WeaponSlot::Backup => !heavy_active && self.policy.versatile_backup_slot,
                WeaponSlot::Secondary | WeaponSlot::Primary => true,
            };
        if !base && !expanded {
            return Err(hidden(HiddenReason::ClassMismatch(class)));
        }

        if let Some(by) = self.class_restriction(class) {
            let readmitted =
                expanded && self.policy.restriction_order == RestrictionOrder::BeforeVersatile;
            if !readmitted {
                return Err(disabled(DisableReason::RestrictedBy(by)));
            }
        }
        Ok(())
    }

    /// The augment that strips `class` from eligibility, Studied first.
    fn class_restriction(&self, class: WeaponClass) -> Option<SpecialAugment> {
        let studied_strips = matches!(class, WeaponClass::Primary | WeaponClass::Secondary);
        if self.flags.studied && studied_strips {
            Some(SpecialAugment::Studied)
        } else if self.flags.professional && class == WeaponClass::Primary {
            Some(SpecialAugment::Professional)
        } else {
            None
        }
    }

    fn check_device(&self, id: ItemId, info: &DeviceInfo) -> Result<(), Verdict> {
        if self.flags.studied {
            // The allow-list overrides both access flags.
            return if self.catalog.is_studied_device(id) {
                Ok(())
            } else {
                Err(disabled(DisableReason::NotStudiedApproved))
            };
        }
        if info.special_access && !self.flags.neuro_hacker {
            return Err(disabled(DisableReason::RequiresAugment(
                SpecialAugment::NeuroHacker,
            )));
        }
        if info.experimental && !self.flags.experimental {
            return Err(disabled(DisableReason::RequiresAugment(
                SpecialAugment::Experimental,
            )));
        }
        Ok(())
    }

    fn check_attachment(&self, mount: Mount, info: &AttachmentInfo) -> Result<(), Verdict> {
        let weapon = self
            .loadout
            .get(Slot::Weapon(mount.weapon_slot()))
            .filter(|&w| {
                self.catalog
                    .get(w)
                    .is_some_and(|item| item.category == Category::Weapon)
            });
        let Some(weapon) = weapon else {
            return Err(hidden(HiddenReason::NoWeapon));
        };
        if !info.compatible.contains(&weapon) {
            return Err(hidden(HiddenReason::Incompatible));
        }
        if info.requires_technician && !self.flags.technician {
            return Err(disabled(DisableReason::RequiresAugment(
                SpecialAugment::Technician,
            )));
        }
        Ok(())
    }

    fn check_unique(&self, slot: Slot, id: ItemId, scope: PeerScope) -> Judgement {
        let peers: Vec<Slot> = slot
            .peers()
            .into_iter()
            .filter(|p| scope == PeerScope::All || p.index() < slot.index())
            .collect();
        match self.loadout.holder_of(id, &peers) {
            None => Verdict::Legal.into(),
            Some(_) if matches!(slot, Slot::Device(_)) && self.flags.versatile => Judgement {
                verdict: Verdict::Legal,
                soft_duplicate: true,
            },
            Some(holder) => disabled(DisableReason::Duplicate { holder }).into(),
        }
    }
}

/// Judge `item` as a candidate for `slot` in `loadout`.
pub fn evaluate(
    catalog: &Catalog,
    policy: &RulePolicy,
    loadout: &Loadout,
    slot: Slot,
    item: ItemId,
) -> Verdict {
    RuleContext::new(catalog, policy, loadout).evaluate(slot, item)
}

/// Judge the item `slot` currently holds, if any.
pub fn evaluate_held(
    catalog: &Catalog,
    policy: &RulePolicy,
    loadout: &Loadout,
    slot: Slot,
) -> Option<Verdict> {
    RuleContext::new(catalog, policy, loadout).evaluate_held(slot)
}

/// Full option list for `slot`, sorted by display name.
pub fn slot_options(
    catalog: &Catalog,
    policy: &RulePolicy,
    loadout: &Loadout,
    slot: Slot,
) -> Vec<SlotOption> {
    RuleContext::new(catalog, policy, loadout).options(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_catalog;

    struct Fixture {
        catalog: Catalog,
        policy: RulePolicy,
        loadout: Loadout,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_policy(RulePolicy {
                studied_devices: vec!["Stim Pack".to_string(), "Phase Shift".to_string()],
                ..RulePolicy::default()
            })
        }

        fn with_policy(policy: RulePolicy) -> Self {
            Self {
                catalog: sample_catalog(&policy),
                policy,
                loadout: Loadout::new(),
            }
        }

        fn id(&self, category: Category, name: &str) -> ItemId {
            self.catalog
                .by_name(category, name)
                .unwrap_or_else(|| panic!("{name} not in catalog"))
        }

        fn put(&mut self, slot: Slot, category: Category, name: &str) {
            let id = self.id(category, name);
            self.loadout.set(slot, Some(id));
        }

        fn augment(&mut self, index: u8, name: &str) {
            self.put(Slot::Augment(index), Category::Augment, name);
        }

        fn verdict(&self, slot: Slot, category: Category, name: &str) -> Verdict {
            evaluate(&self.catalog, &self.policy, &self.loadout, slot, self.id(category, name))
        }

        fn weapon(&self, slot: WeaponSlot, name: &str) -> Verdict {
            self.verdict(Slot::Weapon(slot), Category::Weapon, name)
        }
    }

    const BACKUP: WeaponSlot = WeaponSlot::Backup;
    const SECONDARY: WeaponSlot = WeaponSlot::Secondary;
    const PRIMARY: WeaponSlot = WeaponSlot::Primary;

    // ── Identity ──

    #[test]
    fn shell_has_no_restrictions() {
        let fx = Fixture::new();
        assert_eq!(fx.verdict(Slot::Shell, Category::Shell, "Recon"), Verdict::Legal);
    }

    #[test]
    fn wrong_category_is_hidden() {
        let fx = Fixture::new();
        let v = fx.verdict(Slot::Shell, Category::Augment, "Technician");
        assert_eq!(v, hidden(HiddenReason::WrongCategory));
        let v = fx.verdict(Slot::Weapon(PRIMARY), Category::Mod, "Grip");
        assert_eq!(v, hidden(HiddenReason::WrongCategory));
    }

    #[test]
    fn unknown_item_is_hidden() {
        let fx = Fixture::new();
        let v = evaluate(&fx.catalog, &fx.policy, &fx.loadout, Slot::Shell, ItemId(9999));
        assert_eq!(v, hidden(HiddenReason::UnknownItem));
    }

    #[test]
    fn out_of_range_slot_is_hidden() {
        let fx = Fixture::new();
        let v = fx.verdict(Slot::Augment(9), Category::Augment, "Versatile");
        assert_eq!(v, hidden(HiddenReason::NoSuchSlot));
        let options = slot_options(&fx.catalog, &fx.policy, &fx.loadout, Slot::Device(5));
        assert!(options.iter().all(|o| o.verdict.is_hidden()));
    }

    // ── Augments ──

    #[test]
    fn augments_are_strictly_unique() {
        let mut fx = Fixture::new();
        fx.augment(0, "Versatile");
        let v = fx.verdict(Slot::Augment(2), Category::Augment, "Versatile");
        assert_eq!(v, disabled(DisableReason::Duplicate { holder: Slot::Augment(0) }));
        // The holder itself stays legal.
        let v = fx.verdict(Slot::Augment(0), Category::Augment, "Versatile");
        assert_eq!(v, Verdict::Legal);
    }

    // ── Weapons ──

    #[test]
    fn weapons_match_slot_class_without_versatile() {
        let fx = Fixture::new();
        assert_eq!(fx.weapon(BACKUP, "Fists"), Verdict::Legal);
        assert_eq!(fx.weapon(SECONDARY, "Major"), Verdict::Legal);
        assert_eq!(fx.weapon(PRIMARY, "Vector"), Verdict::Legal);
        assert_eq!(
            fx.weapon(SECONDARY, "Vector"),
            hidden(HiddenReason::ClassMismatch(WeaponClass::Primary))
        );
        assert_eq!(
            fx.weapon(PRIMARY, "Fists"),
            hidden(HiddenReason::ClassMismatch(WeaponClass::Backup))
        );
    }

    #[test]
    fn heavy_needs_backup_slot_and_augment() {
        let mut fx = Fixture::new();
        assert_eq!(fx.weapon(BACKUP, "Minigun"), hidden(HiddenReason::HeavyLocked));
        fx.augment(1, "Heavy Weapons");
        assert_eq!(fx.weapon(BACKUP, "Minigun"), Verdict::Legal);
        assert_eq!(fx.weapon(PRIMARY, "Minigun"), hidden(HiddenReason::HeavyLocked));
    }

    #[test]
    fn heavy_weapons_repurposes_backup_slot() {
        let mut fx = Fixture::new();
        fx.augment(0, "Heavy Weapons");
        assert_eq!(
            fx.weapon(BACKUP, "Fists"),
            hidden(HiddenReason::ClassMismatch(WeaponClass::Backup))
        );
        // Versatile does not bring backup weapons back into the heavy slot.
        fx.augment(1, "Versatile");
        assert!(fx.weapon(BACKUP, "Fists").is_hidden());
    }

    #[test]
    fn versatile_widens_secondary_and_primary() {
        let mut fx = Fixture::new();
        fx.augment(0, "Versatile");
        assert_eq!(fx.weapon(SECONDARY, "Fists"), Verdict::Legal);
        assert_eq!(fx.weapon(SECONDARY, "Vector"), Verdict::Legal);
        assert_eq!(fx.weapon(PRIMARY, "Major"), Verdict::Legal);
        assert_eq!(fx.weapon(PRIMARY, "Minigun"), hidden(HiddenReason::HeavyLocked));
        // Backup slot keeps its class unless the policy widens it.
        assert!(fx.weapon(BACKUP, "Major").is_hidden());
    }

    #[test]
    fn versatile_backup_slot_policy() {
        let mut fx = Fixture::with_policy(RulePolicy {
            versatile_backup_slot: true,
            ..RulePolicy::default()
        });
        assert!(fx.weapon(BACKUP, "Major").is_hidden());
        fx.augment(0, "Versatile");
        assert_eq!(fx.weapon(BACKUP, "Major"), Verdict::Legal);
        fx.augment(1, "Heavy Weapons");
        assert!(fx.weapon(BACKUP, "Major").is_hidden());
    }

    #[test]
    fn professional_removes_primary() {
        let mut fx = Fixture::new();
        fx.augment(0, "Professional");
        assert_eq!(
            fx.weapon(PRIMARY, "Vector"),
            disabled(DisableReason::RestrictedBy(SpecialAugment::Professional))
        );
        assert_eq!(fx.weapon(SECONDARY, "Major"), Verdict::Legal);
    }

    #[test]
    fn studied_removes_primary_and_secondary() {
        let mut fx = Fixture::new();
        fx.augment(0, "Studied");
        fx.augment(1, "Professional");
        assert_eq!(
            fx.weapon(PRIMARY, "Vector"),
            disabled(DisableReason::RestrictedBy(SpecialAugment::Studied))
        );
        assert_eq!(
            fx.weapon(SECONDARY, "Major"),
            disabled(DisableReason::RestrictedBy(SpecialAugment::Studied))
        );
        assert_eq!(fx.weapon(BACKUP, "Fists"), Verdict::Legal);
    }

    #[test]
    fn restrictions_apply_after_versatile_by_default() {
        let mut fx = Fixture::new();
        fx.augment(0, "Studied");
        fx.augment(1, "Versatile");
        assert!(!fx.weapon(PRIMARY, "Vector").is_legal());
        assert!(!fx.weapon(PRIMARY, "Major").is_legal());
        assert_eq!(fx.weapon(PRIMARY, "Fists"), Verdict::Legal);
    }

    #[test]
    fn versatile_readmits_when_restrictions_come_first() {
        let mut fx = Fixture::with_policy(RulePolicy {
            restriction_order: RestrictionOrder::BeforeVersatile,
            ..RulePolicy::default()
        });
        fx.augment(0, "Studied");
        assert!(!fx.weapon(PRIMARY, "Vector").is_legal());
        fx.augment(1, "Versatile");
        assert_eq!(fx.weapon(PRIMARY, "Vector"), Verdict::Legal);
        assert_eq!(fx.weapon(SECONDARY, "Major"), Verdict::Legal);
    }

    #[test]
    fn weapons_unique_even_with_versatile() {
        let mut fx = Fixture::new();
        fx.augment(0, "Versatile");
        fx.put(Slot::Weapon(BACKUP), Category::Weapon, "Fists");
        assert_eq!(
            fx.weapon(SECONDARY, "Fists"),
            disabled(DisableReason::Duplicate { holder: Slot::Weapon(BACKUP) })
        );
    }

    #[test]
    fn classless_weapon_never_legal() {
        let mut fx = Fixture::new();
        fx.augment(0, "Versatile");
        for &slot in WeaponSlot::all() {
            assert_eq!(fx.weapon(slot, "Prototype"), hidden(HiddenReason::NoWeaponClass));
        }
    }

    // ── Devices ──

    #[test]
    fn device_access_flags() {
        let mut fx = Fixture::new();
        let device = |fx: &Fixture, name| fx.verdict(Slot::Device(0), Category::Device, name);
        assert_eq!(
            device(&fx, "Deadzone"),
            disabled(DisableReason::RequiresAugment(SpecialAugment::NeuroHacker))
        );
        assert_eq!(
            device(&fx, "Phase Shift"),
            disabled(DisableReason::RequiresAugment(SpecialAugment::Experimental))
        );
        assert_eq!(device(&fx, "Overcharge"), Verdict::Legal);
        fx.augment(0, "Neuro-Hacker");
        fx.augment(1, "Experimental");
        assert_eq!(device(&fx, "Deadzone"), Verdict::Legal);
        assert_eq!(device(&fx, "Phase Shift"), Verdict::Legal);
    }

    #[test]
    fn studied_allow_list_overrides_access() {
        let mut fx = Fixture::new();
        fx.augment(0, "Studied");
        fx.augment(1, "Neuro-Hacker");
        let device = |fx: &Fixture, name| fx.verdict(Slot::Device(1), Category::Device, name);
        // Allowed without Experimental.
        assert_eq!(device(&fx, "Phase Shift"), Verdict::Legal);
        assert_eq!(device(&fx, "Stim Pack"), Verdict::Legal);
        // Not allowed even with Neuro-Hacker.
        assert_eq!(
            device(&fx, "Deadzone"),
            disabled(DisableReason::NotStudiedApproved)
        );
        assert_eq!(
            device(&fx, "Overcharge"),
            disabled(DisableReason::NotStudiedApproved)
        );
    }

    #[test]
    fn device_duplicate_needs_versatile() {
        let mut fx = Fixture::new();
        fx.put(Slot::Device(0), Category::Device, "Overcharge");
        assert_eq!(
            fx.verdict(Slot::Device(1), Category::Device, "Overcharge"),
            disabled(DisableReason::Duplicate { holder: Slot::Device(0) })
        );
        fx.augment(0, "Versatile");
        assert_eq!(
            fx.verdict(Slot::Device(1), Category::Device, "Overcharge"),
            Verdict::Legal
        );
        let ctx = RuleContext::new(&fx.catalog, &fx.policy, &fx.loadout);
        let overcharge = fx.id(Category::Device, "Overcharge");
        let option = ctx
            .options(Slot::Device(1))
            .into_iter()
            .find(|o| o.item == overcharge)
            .unwrap();
        assert!(option.soft_duplicate);
        assert!(option.verdict.is_legal());
    }

    // ── Attachments ──

    #[test]
    fn attachments_need_a_weapon() {
        let fx = Fixture::new();
        let v = fx.verdict(Slot::Optic(Mount::Primary), Category::Optic, "Red Dot");
        assert_eq!(v, hidden(HiddenReason::NoWeapon));
        let options = slot_options(&fx.catalog, &fx.policy, &fx.loadout, Slot::Mod(Mount::Secondary, 0));
        assert!(options.iter().all(|o| o.verdict.is_hidden()));
    }

    #[test]
    fn attachments_follow_compatibility() {
        let mut fx = Fixture::new();
        fx.put(Slot::Weapon(SECONDARY), Category::Weapon, "Major");
        let optic = Slot::Optic(Mount::Secondary);
        assert_eq!(fx.verdict(optic, Category::Optic, "Red Dot"), Verdict::Legal);
        assert_eq!(
            fx.verdict(optic, Category::Optic, "Holo Sight"),
            hidden(HiddenReason::Incompatible)
        );
        // The primary mount is still empty.
        assert_eq!(
            fx.verdict(Slot::Optic(Mount::Primary), Category::Optic, "Red Dot"),
            hidden(HiddenReason::NoWeapon)
        );
    }

    #[test]
    fn technician_attachments() {
        let mut fx = Fixture::new();
        fx.put(Slot::Weapon(SECONDARY), Category::Weapon, "Major");
        let ammo = Slot::Ammo(Mount::Secondary);
        assert_eq!(
            fx.verdict(ammo, Category::Ammo, "Shred Ammo"),
            disabled(DisableReason::RequiresAugment(SpecialAugment::Technician))
        );
        fx.augment(3, "Technician");
        assert_eq!(fx.verdict(ammo, Category::Ammo, "Shred Ammo"), Verdict::Legal);
    }

    #[test]
    fn mods_unique_per_weapon() {
        let mut fx = Fixture::new();
        fx.put(Slot::Weapon(SECONDARY), Category::Weapon, "Major");
        fx.put(Slot::Weapon(PRIMARY), Category::Weapon, "Vector");
        fx.put(Slot::Mod(Mount::Secondary, 0), Category::Mod, "Grip");
        assert_eq!(
            fx.verdict(Slot::Mod(Mount::Secondary, 3), Category::Mod, "Grip"),
            disabled(DisableReason::Duplicate {
                holder: Slot::Mod(Mount::Secondary, 0)
            })
        );
        // Same mod on the other weapon is fine.
        assert_eq!(
            fx.verdict(Slot::Mod(Mount::Primary, 0), Category::Mod, "Grip"),
            Verdict::Legal
        );
    }

    // ── Held items and options ──

    #[test]
    fn held_duplicate_blames_later_slot() {
        let mut fx = Fixture::new();
        fx.put(Slot::Device(0), Category::Device, "Overcharge");
        fx.put(Slot::Device(1), Category::Device, "Overcharge");
        let ctx = RuleContext::new(&fx.catalog, &fx.policy, &fx.loadout);
        assert_eq!(ctx.evaluate_held(Slot::Device(0)), Some(Verdict::Legal));
        assert_eq!(
            ctx.evaluate_held(Slot::Device(1)),
            Some(disabled(DisableReason::Duplicate { holder: Slot::Device(0) }))
        );
        assert_eq!(ctx.evaluate_held(Slot::Shell), None);
    }

    #[test]
    fn options_cover_category_sorted() {
        let fx = Fixture::new();
        let options = slot_options(&fx.catalog, &fx.policy, &fx.loadout, Slot::Weapon(PRIMARY));
        assert_eq!(options.len(), fx.catalog.items_in(Category::Weapon).len());
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
        let legal: Vec<&str> = options
            .iter()
            .filter(|o| o.verdict.is_legal())
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(legal, vec!["Lancer", "Ripper", "Vector"]);
    }

    #[test]
    fn reasons_render() {
        let v = disabled(DisableReason::RequiresAugment(SpecialAugment::Technician));
        assert_eq!(v.to_string(), "requires Technician");
        let v = disabled(DisableReason::Duplicate { holder: Slot::Device(0) });
        assert_eq!(v.to_string(), "already equipped in device-1");
    }
}
