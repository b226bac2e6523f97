//! Integration tests for the rule engine driven through the configurator.
//!
//! Exercises: catalog load → select / clear → settle → options → codes,
//! against the same data files the harness ships with.

use loadout_logic::augments::SpecialAugment;
use loadout_logic::catalog::{Category, ItemId};
use loadout_logic::configurator::{Configurator, SelectError};
use loadout_logic::policy::{RestrictionOrder, RulePolicy};
use loadout_logic::rules::{DisableReason, HiddenReason, Verdict};
use loadout_logic::slots::{Mount, Slot, WeaponSlot};

const IDS_JSON: &str = include_str!("../../../data/id.json");
const WEAPONS_JSON: &str = include_str!("../../../data/weapons.json");
const DEVICES_JSON: &str = include_str!("../../../data/devices.json");
const ATTACHMENTS_JSON: &str = include_str!("../../../data/attachments.json");
const POLICY_JSON: &str = include_str!("../../../data/policy.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn editor_with(policy: RulePolicy) -> Configurator {
    Configurator::load(IDS_JSON, WEAPONS_JSON, DEVICES_JSON, ATTACHMENTS_JSON, policy)
        .expect("shipped data loads")
}

fn editor() -> Configurator {
    editor_with(RulePolicy::from_json(POLICY_JSON).expect("shipped policy parses"))
}

fn id(editor: &Configurator, category: Category, name: &str) -> ItemId {
    editor
        .catalog()
        .by_name(category, name)
        .unwrap_or_else(|| panic!("{name} missing from catalog"))
}

fn pick(editor: &mut Configurator, slot: Slot, name: &str) {
    editor
        .select_by_name(slot, name)
        .unwrap_or_else(|e| panic!("selecting {name} for {slot}: {e}"));
}

const BACKUP: Slot = Slot::Weapon(WeaponSlot::Backup);
const SECONDARY: Slot = Slot::Weapon(WeaponSlot::Secondary);
const PRIMARY: Slot = Slot::Weapon(WeaponSlot::Primary);

// ── Worked scenarios ───────────────────────────────────────────────────

#[test]
fn removing_technician_clears_technician_ammo() {
    let mut editor = editor();
    pick(&mut editor, Slot::Augment(1), "Technician");
    pick(&mut editor, SECONDARY, "Major");
    pick(&mut editor, Slot::Ammo(Mount::Secondary), "Shred Ammo");

    let report = editor.clear(Slot::Augment(1));

    assert_eq!(editor.loadout().get(Slot::Ammo(Mount::Secondary)), None);
    assert_eq!(
        editor.loadout().get(SECONDARY),
        Some(id(&editor, Category::Weapon, "Major"))
    );
    assert_eq!(report.cleared.len(), 1);
    assert_eq!(
        report.cleared[0].verdict,
        Verdict::IllegalDisabled(DisableReason::RequiresAugment(SpecialAugment::Technician))
    );
}

#[test]
fn versatile_admits_backup_weapon_in_secondary() {
    let mut editor = editor();
    let fists = id(&editor, Category::Weapon, "Fists");
    assert!(editor.verdict(SECONDARY, fists).is_hidden());

    pick(&mut editor, Slot::Augment(0), "Versatile");
    assert_eq!(editor.verdict(SECONDARY, fists), Verdict::Legal);
    pick(&mut editor, SECONDARY, "Fists");

    let report = editor.clear(Slot::Augment(0));
    assert!(report.was_cleared(SECONDARY));
    assert_eq!(editor.loadout().get(SECONDARY), None);
}

#[test]
fn duplicate_devices_without_versatile() {
    let mut editor = editor();
    let overcharge = id(&editor, Category::Device, "Overcharge");
    pick(&mut editor, Slot::Device(0), "Overcharge");

    assert_eq!(
        editor.verdict(Slot::Device(1), overcharge),
        Verdict::IllegalDisabled(DisableReason::Duplicate {
            holder: Slot::Device(0)
        })
    );

    // A loaded build carrying both copies keeps the first.
    let mut both = editor.loadout().clone();
    both.set(Slot::Device(1), Some(overcharge));
    let report = editor.apply_loadout(both);
    assert!(report.was_cleared(Slot::Device(1)));
    assert_eq!(editor.loadout().get(Slot::Device(0)), Some(overcharge));
}

#[test]
fn duplicate_devices_with_versatile() {
    let mut editor = editor();
    pick(&mut editor, Slot::Augment(3), "Versatile");
    pick(&mut editor, Slot::Device(0), "Overcharge");
    pick(&mut editor, Slot::Device(1), "Overcharge");

    let options = editor.options(Slot::Device(1));
    let overcharge = options
        .iter()
        .find(|o| o.name == "Overcharge")
        .expect("overcharge offered");
    assert!(overcharge.verdict.is_legal());
    assert!(overcharge.soft_duplicate);

    let report = editor.clear(Slot::Augment(3));
    assert!(report.was_cleared(Slot::Device(1)));
    assert!(!report.was_cleared(Slot::Device(0)));
}

// ── Structural rules ───────────────────────────────────────────────────

#[test]
fn heavy_weapons_confined_to_backup() {
    let mut editor = editor();
    let minigun = id(&editor, Category::Weapon, "Minigun");
    pick(&mut editor, Slot::Augment(0), "Versatile");
    assert_eq!(
        editor.verdict(BACKUP, minigun),
        Verdict::IllegalHidden(HiddenReason::HeavyLocked)
    );

    pick(&mut editor, Slot::Augment(1), "Heavy Weapons");
    assert_eq!(editor.verdict(BACKUP, minigun), Verdict::Legal);
    // Versatile never carries heavy weapons out of the backup slot.
    assert!(editor.verdict(PRIMARY, minigun).is_hidden());
    assert!(editor.verdict(SECONDARY, minigun).is_hidden());

    pick(&mut editor, BACKUP, "Minigun");
    assert_eq!(editor.slot_label(BACKUP), "Heavy (Unmoddable)");
    let report = editor.clear(Slot::Augment(1));
    assert!(report.was_cleared(BACKUP));
    assert_eq!(editor.slot_label(BACKUP), "Backup (Unmoddable)");
}

#[test]
fn heavy_weapons_displaces_backup_class() {
    let mut editor = editor();
    pick(&mut editor, BACKUP, "Knife");
    let report = editor
        .select_by_name(Slot::Augment(0), "Heavy Weapons")
        .expect("heavy weapons is selectable");
    assert!(report.was_cleared(BACKUP));
}

#[test]
fn weapons_unique_even_with_versatile() {
    let mut editor = editor();
    pick(&mut editor, Slot::Augment(0), "Versatile");
    pick(&mut editor, PRIMARY, "Vector");
    let vector = id(&editor, Category::Weapon, "Vector");
    assert_eq!(
        editor.verdict(SECONDARY, vector),
        Verdict::IllegalDisabled(DisableReason::Duplicate { holder: PRIMARY })
    );
}

#[test]
fn augments_are_unique() {
    let mut editor = editor();
    pick(&mut editor, Slot::Augment(0), "Sprinter");
    let err = editor
        .select_by_name(Slot::Augment(2), "Sprinter")
        .unwrap_err();
    assert!(matches!(
        err,
        SelectError::Illegal {
            verdict: Verdict::IllegalDisabled(DisableReason::Duplicate { .. }),
            ..
        }
    ));
}

#[test]
fn clearing_weapon_clears_its_attachments() {
    let mut editor = editor();
    pick(&mut editor, PRIMARY, "Vector");
    pick(&mut editor, Slot::Optic(Mount::Primary), "Holo Sight");
    pick(&mut editor, Slot::Ammo(Mount::Primary), "Hollow Point");
    pick(&mut editor, Slot::Mod(Mount::Primary, 0), "Stock");
    pick(&mut editor, Slot::Mod(Mount::Primary, 3), "Grip");

    let report = editor.clear(PRIMARY);
    assert_eq!(report.passes, 1);
    assert_eq!(report.cleared.len(), 4);
    for slot in Mount::Primary.attachment_slots() {
        assert_eq!(editor.loadout().get(slot), None);
        assert!(editor.options(slot).is_empty(), "{slot} still offers options");
    }
}

#[test]
fn swapping_weapon_drops_incompatible_attachments() {
    let mut editor = editor();
    pick(&mut editor, PRIMARY, "Vector");
    pick(&mut editor, Slot::Optic(Mount::Primary), "Red Dot");
    pick(&mut editor, Slot::Mod(Mount::Primary, 0), "Stock");

    // Ripper takes Red Dot but not Stock.
    let report = editor.select_by_name(PRIMARY, "Ripper").expect("ripper legal");
    assert!(report.was_cleared(Slot::Mod(Mount::Primary, 0)));
    assert!(!report.was_cleared(Slot::Optic(Mount::Primary)));
}

#[test]
fn mods_unique_per_weapon_only() {
    let mut editor = editor();
    pick(&mut editor, SECONDARY, "Major");
    pick(&mut editor, PRIMARY, "Vector");
    pick(&mut editor, Slot::Mod(Mount::Secondary, 0), "Suppressor");

    let suppressor = id(&editor, Category::Mod, "Suppressor");
    assert_eq!(
        editor.verdict(Slot::Mod(Mount::Secondary, 2), suppressor),
        Verdict::IllegalDisabled(DisableReason::Duplicate {
            holder: Slot::Mod(Mount::Secondary, 0)
        })
    );
    assert_eq!(
        editor.verdict(Slot::Mod(Mount::Primary, 0), suppressor),
        Verdict::Legal
    );
}

// ── Access augments ────────────────────────────────────────────────────

#[test]
fn neuro_hacker_and_experimental_unlock_devices() {
    let mut editor = editor();
    let deadzone = id(&editor, Category::Device, "Deadzone");
    let phase_shift = id(&editor, Category::Device, "Phase Shift");
    assert_eq!(
        editor.verdict(Slot::Device(0), deadzone),
        Verdict::IllegalDisabled(DisableReason::RequiresAugment(SpecialAugment::NeuroHacker))
    );
    assert_eq!(
        editor.verdict(Slot::Device(0), phase_shift),
        Verdict::IllegalDisabled(DisableReason::RequiresAugment(SpecialAugment::Experimental))
    );

    pick(&mut editor, Slot::Augment(0), "Neuro-Hacker");
    pick(&mut editor, Slot::Augment(1), "Experimental");
    pick(&mut editor, Slot::Device(0), "Deadzone");
    pick(&mut editor, Slot::Device(1), "Phase Shift");

    let report = editor.clear(Slot::Augment(0));
    assert!(report.was_cleared(Slot::Device(0)));
    assert!(!report.was_cleared(Slot::Device(1)));
}

#[test]
fn professional_strips_primary() {
    let mut editor = editor();
    pick(&mut editor, PRIMARY, "Lancer");
    let report = editor
        .select_by_name(Slot::Augment(0), "Professional")
        .expect("professional selectable");
    assert!(report.was_cleared(PRIMARY));

    let lancer = id(&editor, Category::Weapon, "Lancer");
    assert_eq!(
        editor.verdict(PRIMARY, lancer),
        Verdict::IllegalDisabled(DisableReason::RestrictedBy(SpecialAugment::Professional))
    );
    let major = id(&editor, Category::Weapon, "Major");
    assert_eq!(editor.verdict(SECONDARY, major), Verdict::Legal);
}

#[test]
fn studied_strips_weapons_and_limits_devices() {
    let mut editor = editor();
    pick(&mut editor, Slot::Augment(0), "Studied");

    let major = id(&editor, Category::Weapon, "Major");
    assert_eq!(
        editor.verdict(SECONDARY, major),
        Verdict::IllegalDisabled(DisableReason::RestrictedBy(SpecialAugment::Studied))
    );
    let fists = id(&editor, Category::Weapon, "Fists");
    assert_eq!(editor.verdict(BACKUP, fists), Verdict::Legal);

    let legal: Vec<String> = editor
        .options(Slot::Device(0))
        .into_iter()
        .filter(|o| o.verdict.is_legal())
        .map(|o| o.name)
        .collect();
    // The allow-list overrides Phase Shift's experimental flag.
    assert_eq!(legal, vec!["Phase Shift", "Stim Pack"]);
}

#[test]
fn restriction_order_is_configurable() {
    let policy = RulePolicy::from_json(POLICY_JSON).expect("shipped policy parses");
    let mut after = editor_with(policy.clone());
    let mut before = editor_with(RulePolicy {
        restriction_order: RestrictionOrder::BeforeVersatile,
        ..policy
    });
    for editor in [&mut after, &mut before] {
        pick(editor, Slot::Augment(0), "Versatile");
        pick(editor, Slot::Augment(1), "Professional");
    }
    let lancer = id(&after, Category::Weapon, "Lancer");

    assert_eq!(
        after.verdict(SECONDARY, lancer),
        Verdict::IllegalDisabled(DisableReason::RestrictedBy(SpecialAugment::Professional))
    );
    assert_eq!(before.verdict(SECONDARY, lancer), Verdict::Legal);
}

// ── Options and codes ──────────────────────────────────────────────────

#[test]
fn options_sorted_by_name() {
    let editor = editor();
    let names: Vec<String> = editor
        .options(Slot::Augment(0))
        .into_iter()
        .map(|o| o.name)
        .collect();
    let mut sorted = names.clone();
    sorted.sort_by_key(|n| n.to_lowercase());
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 9);
}

#[test]
fn unknown_weapon_class_never_offered() {
    let editor = editor();
    for slot in [BACKUP, SECONDARY, PRIMARY] {
        assert!(editor.options(slot).iter().all(|o| o.name != "Prototype"));
    }
}

#[test]
fn shared_code_rebuilds_loadout() {
    let mut editor = editor();
    pick(&mut editor, Slot::Shell, "Recon");
    pick(&mut editor, Slot::Augment(0), "Technician");
    pick(&mut editor, Slot::Augment(1), "Heavy Weapons");
    pick(&mut editor, Slot::Device(0), "Decoy");
    pick(&mut editor, BACKUP, "Launcher");
    pick(&mut editor, SECONDARY, "Major");
    pick(&mut editor, Slot::Mod(Mount::Secondary, 0), "Laser");
    let code = editor.code().expect("all ids encodable");

    let mut other = editor_with(editor.policy().clone());
    let report = other.apply_code(&code).expect("code decodes");
    assert!(report.is_stable());
    assert_eq!(other.loadout(), editor.loadout());
}

#[test]
fn malformed_code_leaves_loadout_alone() {
    let mut editor = editor();
    pick(&mut editor, Slot::Shell, "Assault");
    let before = editor.loadout().clone();
    assert!(editor.apply_code("not a code").is_err());
    assert_eq!(editor.loadout(), &before);
}
