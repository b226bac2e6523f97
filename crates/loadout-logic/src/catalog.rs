//! Item catalog — the read-only reference data every rule consults.
//!
//! The catalog is assembled once from four JSON documents:
//!
//! | Document | Shape |
//! |----------|-------|
//! | `id.json` | `{ "<Category>": { "<item name>": <id> } }` |
//! | `weapons.json` | `[{ "name", "stats": { "slot" } }]` |
//! | `devices.json` | `[{ "name", "experimental"?, "neurohacker"? }]` |
//! | `attachments.json` | `[{ "name", "type", "technician"?, "compatibility"? }]` |
//!
//! Shells and augments come straight from `id.json`; every other category
//! takes its stable id from its own `id.json` section by name, falling back
//! to the name. Stable ids are unique per category only, and numeric ids
//! are stored in canonical form (`"007"` becomes `"7"`).
//!
//! Missing or malformed *categories* fail the whole load. A malformed
//! *field* on one item only excludes that item from the rules that read the
//! field: a weapon with no recognised class is never legal in any weapon
//! slot, an attachment with no compatibility list fits nothing, and an
//! attachment with no recognised type is dropped.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::augments::SpecialAugment;
use crate::policy::RulePolicy;

/// Opaque handle for a catalog item.
///
/// Only meaningful against the catalog that issued it. An id the catalog
/// does not know is treated as an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub(crate) u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Category {
    Shell = 0,
    Augment = 1,
    Device = 2,
    Weapon = 3,
    Ammo = 4,
    Optic = 5,
    Mod = 6,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Self::Shell,
            Self::Augment,
            Self::Device,
            Self::Weapon,
            Self::Ammo,
            Self::Optic,
            Self::Mod,
        ]
    }

    /// Key of this category in `id.json`.
    pub fn id_key(self) -> &'static str {
        match self {
            Self::Shell => "Shells",
            Self::Augment => "Augments",
            Self::Device => "Devices",
            Self::Weapon => "Weapons",
            Self::Ammo => "Ammo",
            Self::Optic => "Optics",
            Self::Mod => "Mods",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_key())
    }
}

/// Weapon class, fixed at catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    Primary,
    Secondary,
    Backup,
    Heavy,
}

impl WeaponClass {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            "backup" => Some(Self::Backup),
            "heavy" => Some(Self::Heavy),
            _ => None,
        }
    }
}

/// Kind of weapon attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    Ammo,
    Optic,
    Mod,
}

impl AttachmentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ammo" => Some(Self::Ammo),
            "optic" => Some(Self::Optic),
            "mod" => Some(Self::Mod),
            _ => None,
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::Ammo => Category::Ammo,
            Self::Optic => Category::Optic,
            Self::Mod => Category::Mod,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponInfo {
    /// `None` when the source data had no recognisable slot.
    pub class: Option<WeaponClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub experimental: bool,
    pub special_access: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub kind: AttachmentKind,
    pub compatible: BTreeSet<ItemId>,
    pub requires_technician: bool,
}

/// Category-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMeta {
    Plain,
    Weapon(WeaponInfo),
    Device(DeviceInfo),
    Attachment(AttachmentInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Id from the game data (numeric in practice), used by loadout codes.
    pub stable_id: String,
    pub name: String,
    pub category: Category,
    pub meta: ItemMeta,
}

impl Item {
    pub fn weapon(&self) -> Option<&WeaponInfo> {
        match &self.meta {
            ItemMeta::Weapon(w) => Some(w),
            _ => None,
        }
    }

    pub fn device(&self) -> Option<&DeviceInfo> {
        match &self.meta {
            ItemMeta::Device(d) => Some(d),
            _ => None,
        }
    }

    pub fn attachment(&self) -> Option<&AttachmentInfo> {
        match &self.meta {
            ItemMeta::Attachment(a) => Some(a),
            _ => None,
        }
    }
}

// ── Source documents ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawWeapon {
    pub name: String,
    #[serde(default)]
    pub stats: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    pub name: String,
    #[serde(default)]
    pub experimental: Option<Value>,
    #[serde(default)]
    pub neurohacker: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAttachment {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub technician: Option<Value>,
    #[serde(default)]
    pub compatibility: Option<Value>,
}

/// The four parsed source documents.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    /// `id.json`: category name to a `{ item name: id }` object.
    pub ids: serde_json::Map<String, Value>,
    pub weapons: Vec<RawWeapon>,
    pub devices: Vec<RawDevice>,
    pub attachments: Vec<RawAttachment>,
}

impl CatalogSources {
    /// Parse the four documents, naming the one that failed.
    pub fn from_json(
        ids: &str,
        weapons: &str,
        devices: &str,
        attachments: &str,
    ) -> Result<Self, CatalogError> {
        let parse_err =
            |file: &'static str| move |error: serde_json::Error| CatalogError::Json { file, error };
        Ok(Self {
            ids: serde_json::from_str(ids).map_err(parse_err("id.json"))?,
            weapons: serde_json::from_str(weapons).map_err(parse_err("weapons.json"))?,
            devices: serde_json::from_str(devices).map_err(parse_err("devices.json"))?,
            attachments: serde_json::from_str(attachments)
                .map_err(parse_err("attachments.json"))?,
        })
    }
}

/// `true`, `"true"` (any case) are set; anything else, including absence, is not.
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(canonical_stable_id(&n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(canonical_stable_id(s)),
        _ => None,
    }
}

/// Trimmed, with numeric ids reduced to their plain decimal form.
fn canonical_stable_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Reasons a catalog fails to load. Any of them aborts the whole load.
#[derive(Debug)]
pub enum CatalogError {
    Json {
        file: &'static str,
        error: serde_json::Error,
    },
    MissingCategory(Category),
    Empty(Category),
    DuplicateItem {
        category: Category,
        name: String,
    },
    /// Two items of one category share a stable id.
    DuplicateStableId {
        category: Category,
        stable_id: String,
        first: String,
        second: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Json { file, error } => write!(f, "Failed to parse {}: {}", file, error),
            CatalogError::MissingCategory(c) => write!(f, "Catalog is missing category {}", c),
            CatalogError::Empty(c) => write!(f, "Catalog category {} has no items", c),
            CatalogError::DuplicateItem { category, name } => {
                write!(f, "{} lists {} more than once", category, name)
            }
            CatalogError::DuplicateStableId {
                category,
                stable_id,
                first,
                second,
            } => write!(
                f,
                "{} stable id {} is shared by {} and {}",
                category, stable_id, first, second
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Json { error, .. } => Some(error),
            _ => None,
        }
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────

/// Fully loaded, validated, immutable item catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    by_stable: HashMap<(Category, String), ItemId>,
    by_name: HashMap<(Category, String), ItemId>,
    by_category: HashMap<Category, Vec<ItemId>>,
    special: HashMap<ItemId, SpecialAugment>,
    studied_devices: HashSet<ItemId>,
}

impl Catalog {
    /// Parse and load the four source documents.
    pub fn from_json(
        ids: &str,
        weapons: &str,
        devices: &str,
        attachments: &str,
        policy: &RulePolicy,
    ) -> Result<Self, CatalogError> {
        let sources = CatalogSources::from_json(ids, weapons, devices, attachments)?;
        Self::from_sources(sources, policy)
    }

    /// Build a catalog from parsed sources.
    pub fn from_sources(sources: CatalogSources, policy: &RulePolicy) -> Result<Self, CatalogError> {
        // (category, name) -> stable id, one id.json section per category.
        let mut stable_ids: HashMap<(Category, String), String> = HashMap::new();
        for &category in Category::all() {
            if let Some(Value::Object(entries)) = sources.ids.get(category.id_key()) {
                for (name, raw) in entries {
                    if let Some(id) = id_text(raw) {
                        stable_ids.insert((category, name.clone()), id);
                    }
                }
            }
        }
        let stable_for = |category: Category, name: &str| {
            stable_ids
                .get(&(category, name.to_string()))
                .cloned()
                .unwrap_or_else(|| canonical_stable_id(name))
        };

        let mut builder = CatalogBuilder::default();

        for category in [Category::Shell, Category::Augment] {
            let entries = match sources.ids.get(category.id_key()) {
                Some(Value::Object(entries)) => entries,
                _ => return Err(CatalogError::MissingCategory(category)),
            };
            if entries.is_empty() {
                return Err(CatalogError::Empty(category));
            }
            for name in entries.keys() {
                builder.push(stable_for(category, name), name.clone(), category, ItemMeta::Plain)?;
            }
        }

        if sources.weapons.is_empty() {
            return Err(CatalogError::Empty(Category::Weapon));
        }
        let mut weapon_ids: HashMap<&str, ItemId> = HashMap::new();
        for raw in &sources.weapons {
            let class = raw
                .stats
                .as_ref()
                .and_then(|s| s.get("slot"))
                .and_then(Value::as_str)
                .and_then(WeaponClass::parse);
            if class.is_none() {
                log::warn!("Weapon {} has no recognised slot; it will never be offered", raw.name);
            }
            let id = builder.push(
                stable_for(Category::Weapon, &raw.name),
                raw.name.clone(),
                Category::Weapon,
                ItemMeta::Weapon(WeaponInfo { class }),
            )?;
            weapon_ids.insert(raw.name.as_str(), id);
        }

        for raw in &sources.devices {
            let special_access = flag(raw.neurohacker.as_ref())
                || policy
                    .special_access_devices
                    .iter()
                    .any(|n| n.trim().eq_ignore_ascii_case(raw.name.trim()));
            builder.push(
                stable_for(Category::Device, &raw.name),
                raw.name.clone(),
                Category::Device,
                ItemMeta::Device(DeviceInfo {
                    experimental: flag(raw.experimental.as_ref()),
                    special_access,
                }),
            )?;
        }

        for raw in &sources.attachments {
            let Some(kind) = raw
                .kind
                .as_ref()
                .and_then(Value::as_str)
                .and_then(AttachmentKind::parse)
            else {
                log::warn!("Attachment {} has no recognised type; skipped", raw.name);
                continue;
            };
            let mut compatible = BTreeSet::new();
            if let Some(Value::Array(names)) = &raw.compatibility {
                for name in names.iter().filter_map(Value::as_str) {
                    match weapon_ids.get(name) {
                        Some(&id) => {
                            compatible.insert(id);
                        }
                        None => log::warn!(
                            "Attachment {} lists unknown weapon {}; ignored",
                            raw.name,
                            name
                        ),
                    }
                }
            }
            builder.push(
                stable_for(kind.category(), &raw.name),
                raw.name.clone(),
                kind.category(),
                ItemMeta::Attachment(AttachmentInfo {
                    kind,
                    compatible,
                    requires_technician: flag(raw.technician.as_ref()),
                }),
            )?;
        }

        let mut catalog = builder.finish();
        catalog.resolve_special_augments(policy);
        catalog.resolve_studied_devices(policy);

        log::info!(
            "Catalog loaded: {} items ({} weapons, {} devices, {} special augments)",
            catalog.items.len(),
            catalog.items_in(Category::Weapon).len(),
            catalog.items_in(Category::Device).len(),
            catalog.special.len()
        );
        Ok(catalog)
    }

    fn resolve_special_augments(&mut self, policy: &RulePolicy) {
        for &kind in SpecialAugment::all() {
            let by_id = policy
                .augment_ids
                .id_for(kind)
                .and_then(|id| self.by_stable_id(Category::Augment, id));
            let found = by_id.or_else(|| {
                self.items_in(Category::Augment)
                    .iter()
                    .copied()
                    .find(|&id| kind.matches_name(&self.items[id.index()].name))
            });
            match found {
                Some(id) if self.special.contains_key(&id) => log::warn!(
                    "Augment {} already resolved as {}; {} left unresolved",
                    self.items[id.index()].name,
                    self.special[&id],
                    kind
                ),
                Some(id) => {
                    self.special.insert(id, kind);
                }
                None => log::warn!("Special augment {} not found in catalog", kind),
            }
        }
    }

    fn resolve_studied_devices(&mut self, policy: &RulePolicy) {
        for name in &policy.studied_devices {
            match self.by_name(Category::Device, name.trim()) {
                Some(id) => {
                    self.studied_devices.insert(id);
                }
                None => log::warn!("Studied allow-list names unknown device {}", name),
            }
        }
    }

    /// Look up an item. Unknown ids yield `None`.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn name(&self, id: ItemId) -> Option<&str> {
        self.get(id).map(|item| item.name.as_str())
    }

    /// Look up an item by its stable id within one category.
    ///
    /// Numeric ids match regardless of zero padding.
    pub fn by_stable_id(&self, category: Category, stable_id: &str) -> Option<ItemId> {
        self.by_stable
            .get(&(category, canonical_stable_id(stable_id)))
            .copied()
    }

    pub fn by_name(&self, category: Category, name: &str) -> Option<ItemId> {
        self.by_name.get(&(category, name.to_string())).copied()
    }

    /// All items of a category, sorted by display name.
    pub fn items_in(&self, category: Category) -> &[ItemId] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The special meaning of an augment, if it has one.
    pub fn special_augment(&self, id: ItemId) -> Option<SpecialAugment> {
        self.special.get(&id).copied()
    }

    /// The augment item resolved for `kind`, if the catalog has one.
    pub fn augment_for(&self, kind: SpecialAugment) -> Option<ItemId> {
        self.special
            .iter()
            .find(|(_, &k)| k == kind)
            .map(|(&id, _)| id)
    }

    pub fn is_studied_device(&self, id: ItemId) -> bool {
        self.studied_devices.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}

#[derive(Default)]
struct CatalogBuilder {
    items: Vec<Item>,
    by_stable: HashMap<(Category, String), ItemId>,
    by_name: HashMap<(Category, String), ItemId>,
}

impl CatalogBuilder {
    fn push(
        &mut self,
        stable_id: String,
        name: String,
        category: Category,
        meta: ItemMeta,
    ) -> Result<ItemId, CatalogError> {
        if self.by_name.contains_key(&(category, name.clone())) {
            return Err(CatalogError::DuplicateItem { category, name });
        }
        let stable_key = (category, stable_id.clone());
        if let Some(&other) = self.by_stable.get(&stable_key) {
            return Err(CatalogError::DuplicateStableId {
                category,
                stable_id,
                first: self.items[other.index()].name.clone(),
                second: name,
            });
        }
        let id = ItemId(self.items.len() as u32);
        self.by_stable.insert(stable_key, id);
        self.by_name.insert((category, name.clone()), id);
        self.items.push(Item {
            id,
            stable_id,
            name,
            category,
            meta,
        });
        Ok(id)
    }

    fn finish(self) -> Catalog {
        let mut by_category: HashMap<Category, Vec<ItemId>> = HashMap::new();
        for item in &self.items {
            by_category.entry(item.category).or_default().push(item.id);
        }
        for ids in by_category.values_mut() {
            ids.sort_by(|&a, &b| {
                let (a, b) = (&self.items[a.index()].name, &self.items[b.index()].name);
                a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
            });
        }
        Catalog {
            items: self.items,
            by_stable: self.by_stable,
            by_name: self.by_name,
            by_category,
            special: HashMap::new(),
            studied_devices: HashSet::new(),
        }
    }
}

/// The bundled sample catalog, for unit tests.
#[cfg(test)]
pub(crate) fn sample_catalog(policy: &RulePolicy) -> Catalog {
    Catalog::from_json(
        include_str!("../../../data/id.json"),
        include_str!("../../../data/weapons.json"),
        include_str!("../../../data/devices.json"),
        include_str!("../../../data/attachments.json"),
        policy,
    )
    .expect("bundled catalog loads")
}
