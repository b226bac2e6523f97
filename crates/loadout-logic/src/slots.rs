//! Slot layout — every position a loadout can fill.
//!
//! The set of slots is fixed: one shell, four augments, two devices, three
//! weapons, and an optic, ammo and four mod slots on each of the two
//! moddable weapons. The backup weapon is never moddable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::augments::AugmentFlags;
use crate::catalog::{AttachmentKind, Category};

/// Number of augment slots.
pub const AUGMENT_SLOTS: u8 = 4;
/// Number of device slots.
pub const DEVICE_SLOTS: u8 = 2;
/// Number of mod slots on each moddable weapon.
pub const MOD_SLOTS: u8 = 4;
/// Total number of slots in a loadout.
pub const SLOT_COUNT: usize = 22;

/// The three weapon positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum WeaponSlot {
    Backup = 0,
    Secondary = 1,
    Primary = 2,
}

impl WeaponSlot {
    pub fn all() -> &'static [WeaponSlot] {
        &[Self::Backup, Self::Secondary, Self::Primary]
    }

    /// The mount that carries attachments for this weapon, if any.
    pub fn mount(self) -> Option<Mount> {
        match self {
            Self::Backup => None,
            Self::Secondary => Some(Mount::Secondary),
            Self::Primary => Some(Mount::Primary),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Secondary => "secondary",
            Self::Primary => "primary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Backup => "Backup",
            Self::Secondary => "Secondary",
            Self::Primary => "Primary",
        }
    }
}

/// A weapon position that accepts attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mount {
    Secondary = 0,
    Primary = 1,
}

impl Mount {
    pub fn all() -> &'static [Mount] {
        &[Self::Secondary, Self::Primary]
    }

    pub fn weapon_slot(self) -> WeaponSlot {
        match self {
            Self::Secondary => WeaponSlot::Secondary,
            Self::Primary => WeaponSlot::Primary,
        }
    }

    /// Every attachment slot hanging off this mount, optic first.
    pub fn attachment_slots(self) -> [Slot; 6] {
        [
            Slot::Optic(self),
            Slot::Ammo(self),
            Slot::Mod(self, 0),
            Slot::Mod(self, 1),
            Slot::Mod(self, 2),
            Slot::Mod(self, 3),
        ]
    }
}

/// A single position in a loadout.
///
/// Indexed variants are zero-based; `Display` renders them one-based
/// (`augment-1`, `primary-mod-4`). An out-of-range index (`Augment(4)`)
/// names no slot: it holds nothing, accepts nothing and fails to
/// deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SlotRepr")]
pub enum Slot {
    Shell,
    Augment(u8),
    Device(u8),
    Weapon(WeaponSlot),
    Optic(Mount),
    Ammo(Mount),
    Mod(Mount, u8),
}

/// Wire form of [`Slot`], checked on the way in.
#[derive(Deserialize)]
enum SlotRepr {
    Shell,
    Augment(u8),
    Device(u8),
    Weapon(WeaponSlot),
    Optic(Mount),
    Ammo(Mount),
    Mod(Mount, u8),
}

/// A slot index outside the fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSlot(pub Slot);

impl fmt::Display for InvalidSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No such slot: {:?}", self.0)
    }
}

impl std::error::Error for InvalidSlot {}

impl TryFrom<SlotRepr> for Slot {
    type Error = InvalidSlot;

    fn try_from(repr: SlotRepr) -> Result<Self, Self::Error> {
        let slot = match repr {
            SlotRepr::Shell => Slot::Shell,
            SlotRepr::Augment(i) => Slot::Augment(i),
            SlotRepr::Device(i) => Slot::Device(i),
            SlotRepr::Weapon(w) => Slot::Weapon(w),
            SlotRepr::Optic(m) => Slot::Optic(m),
            SlotRepr::Ammo(m) => Slot::Ammo(m),
            SlotRepr::Mod(m, i) => Slot::Mod(m, i),
        };
        if slot.is_valid() {
            Ok(slot)
        } else {
            Err(InvalidSlot(slot))
        }
    }
}

impl Slot {
    /// All slots in canonical order.
    ///
    /// Rule dependencies only point backwards in this order (devices and
    /// weapons read augments, attachments read weapons), so a settle pass
    /// walking it front to back sees every upstream clear before it
    /// evaluates a dependent slot. Loadout codes use the same order.
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::Shell,
        Slot::Augment(0),
        Slot::Augment(1),
        Slot::Augment(2),
        Slot::Augment(3),
        Slot::Device(0),
        Slot::Device(1),
        Slot::Weapon(WeaponSlot::Backup),
        Slot::Weapon(WeaponSlot::Secondary),
        Slot::Weapon(WeaponSlot::Primary),
        Slot::Optic(Mount::Secondary),
        Slot::Ammo(Mount::Secondary),
        Slot::Mod(Mount::Secondary, 0),
        Slot::Mod(Mount::Secondary, 1),
        Slot::Mod(Mount::Secondary, 2),
        Slot::Mod(Mount::Secondary, 3),
        Slot::Optic(Mount::Primary),
        Slot::Ammo(Mount::Primary),
        Slot::Mod(Mount::Primary, 0),
        Slot::Mod(Mount::Primary, 1),
        Slot::Mod(Mount::Primary, 2),
        Slot::Mod(Mount::Primary, 3),
    ];

    /// Whether the slot's index is inside the fixed layout.
    pub fn is_valid(self) -> bool {
        match self {
            Slot::Augment(i) => i < AUGMENT_SLOTS,
            Slot::Device(i) => i < DEVICE_SLOTS,
            Slot::Mod(_, i) => i < MOD_SLOTS,
            Slot::Shell | Slot::Weapon(_) | Slot::Optic(_) | Slot::Ammo(_) => true,
        }
    }

    /// Position of this slot in [`Slot::ALL`], `None` for an invalid slot.
    pub fn position(self) -> Option<usize> {
        self.is_valid().then(|| self.index())
    }

    /// Position of a valid slot in [`Slot::ALL`].
    ///
    /// Invalid slots map past or onto other slots; storage goes through
    /// [`Slot::position`].
    pub fn index(self) -> usize {
        match self {
            Slot::Shell => 0,
            Slot::Augment(i) => 1 + i as usize,
            Slot::Device(i) => 5 + i as usize,
            Slot::Weapon(w) => 7 + w as usize,
            Slot::Optic(m) => 10 + 6 * m as usize,
            Slot::Ammo(m) => 11 + 6 * m as usize,
            Slot::Mod(m, i) => 12 + 6 * m as usize + i as usize,
        }
    }

    /// The item category this slot holds.
    pub fn category(self) -> Category {
        match self {
            Slot::Shell => Category::Shell,
            Slot::Augment(_) => Category::Augment,
            Slot::Device(_) => Category::Device,
            Slot::Weapon(_) => Category::Weapon,
            Slot::Optic(_) => Category::Optic,
            Slot::Ammo(_) => Category::Ammo,
            Slot::Mod(..) => Category::Mod,
        }
    }

    /// Attachment kind and owning mount for attachment slots.
    pub fn attachment(self) -> Option<(AttachmentKind, Mount)> {
        match self {
            Slot::Optic(m) => Some((AttachmentKind::Optic, m)),
            Slot::Ammo(m) => Some((AttachmentKind::Ammo, m)),
            Slot::Mod(m, _) => Some((AttachmentKind::Mod, m)),
            _ => None,
        }
    }

    /// Slots that share a uniqueness group with this one (excluding itself).
    ///
    /// Shell, optic and ammo slots are singletons and have no peers.
    pub fn peers(self) -> Vec<Slot> {
        let group: Vec<Slot> = match self {
            Slot::Augment(_) => (0..AUGMENT_SLOTS).map(Slot::Augment).collect(),
            Slot::Device(_) => (0..DEVICE_SLOTS).map(Slot::Device).collect(),
            Slot::Weapon(_) => WeaponSlot::all().iter().map(|&w| Slot::Weapon(w)).collect(),
            Slot::Mod(m, _) => (0..MOD_SLOTS).map(|i| Slot::Mod(m, i)).collect(),
            Slot::Shell | Slot::Optic(_) | Slot::Ammo(_) => Vec::new(),
        };
        group.into_iter().filter(|&s| s != self).collect()
    }

    /// Display label for the slot.
    ///
    /// The backup position is repurposed while Heavy-Weapons is equipped.
    pub fn label(self, flags: &AugmentFlags) -> String {
        match self {
            Slot::Shell => "Shell".to_string(),
            Slot::Augment(i) => format!("Augment {}", i + 1),
            Slot::Device(i) => format!("Device {}", i + 1),
            Slot::Weapon(WeaponSlot::Backup) if flags.heavy_weapons => {
                "Heavy (Unmoddable)".to_string()
            }
            Slot::Weapon(WeaponSlot::Backup) => "Backup (Unmoddable)".to_string(),
            Slot::Weapon(WeaponSlot::Secondary) => "Secondary".to_string(),
            Slot::Weapon(WeaponSlot::Primary) => "Primary".to_string(),
            Slot::Optic(m) => format!("{} Optic", m.weapon_slot().title()),
            Slot::Ammo(m) => format!("{} Ammo", m.weapon_slot().title()),
            Slot::Mod(m, i) => format!("{} Mod {}", m.weapon_slot().title(), i + 1),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Shell => write!(f, "shell"),
            Slot::Augment(i) => write!(f, "augment-{}", i + 1),
            Slot::Device(i) => write!(f, "device-{}", i + 1),
            Slot::Weapon(w) => write!(f, "{}-weapon", w.key()),
            Slot::Optic(m) => write!(f, "{}-optic", m.weapon_slot().key()),
            Slot::Ammo(m) => write!(f, "{}-ammo", m.weapon_slot().key()),
            Slot::Mod(m, i) => write!(f, "{}-mod-{}", m.weapon_slot().key(), i + 1),
        }
    }
}
