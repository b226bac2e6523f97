//! Loadout Editor Headless Rule Harness
//!
//! Validates catalog data and rule behavior without a UI.
//! Runs entirely in-process — no browser, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p loadout-simtest
//!   cargo run -p loadout-simtest -- --verbose

use std::collections::HashSet;

use loadout_logic::augments::SpecialAugment;
use loadout_logic::catalog::{Catalog, Category, ItemId, WeaponClass};
use loadout_logic::code::{self, MAX_CODE_ID};
use loadout_logic::configurator::Configurator;
use loadout_logic::policy::{self, RestrictionOrder, RulePolicy};
use loadout_logic::rules::{self, Verdict};
use loadout_logic::settle::SettleReport;
use loadout_logic::slots::{Mount, Slot, WeaponSlot, SLOT_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Catalog sources (same JSON the front end loads) ─────────────────────
const IDS_JSON: &str = include_str!("../../../data/id.json");
const WEAPONS_JSON: &str = include_str!("../../../data/weapons.json");
const DEVICES_JSON: &str = include_str!("../../../data/devices.json");
const ATTACHMENTS_JSON: &str = include_str!("../../../data/attachments.json");
const POLICY_JSON: &str = include_str!("../../../data/policy.json");

const SWEEP_SEEDS: u64 = 500;
const MUTATIONS_PER_SEED: usize = 20;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Loadout Rule Harness ===\n");

    let mut results = Vec::new();

    // 1. Policy parsing & validation
    let policy = match validate_policy(&mut results) {
        Some(p) => p,
        None => finish(results, verbose),
    };

    // 2. Catalog load & data integrity
    let catalog = match validate_catalog(&policy, &mut results) {
        Some(c) => c,
        None => finish(results, verbose),
    };

    // 3. Worked rule scenarios
    results.extend(validate_scenarios(&catalog, &policy));

    // 4. Randomized settle sweep, both restriction orders
    for order in [RestrictionOrder::AfterVersatile, RestrictionOrder::BeforeVersatile] {
        let swept = RulePolicy {
            restriction_order: order,
            ..policy.clone()
        };
        results.extend(sweep_random_loadouts(&catalog, &swept, verbose));
    }

    // 5. Loadout code round trip
    results.extend(validate_codes(&catalog, &policy));

    finish(results, verbose)
}

fn finish(results: Vec<TestResult>, verbose: bool) -> ! {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    std::process::exit(if failed > 0 { 1 } else { 0 });
}

// ── 1. Policy ───────────────────────────────────────────────────────────

fn validate_policy(results: &mut Vec<TestResult>) -> Option<RulePolicy> {
    println!("--- Rule Policy ---");

    let parsed = match RulePolicy::from_json(POLICY_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "policy_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };

    let errors = policy::validate_policy(&parsed);
    results.push(TestResult {
        name: "policy_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!(
                "{:?}, {} studied device(s), {} special-access device(s)",
                parsed.restriction_order,
                parsed.studied_devices.len(),
                parsed.special_access_devices.len()
            )
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    Some(parsed)
}

// ── 2. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(policy: &RulePolicy, results: &mut Vec<TestResult>) -> Option<Catalog> {
    println!("--- Catalog ---");

    let catalog = match Catalog::from_json(IDS_JSON, WEAPONS_JSON, DEVICES_JSON, ATTACHMENTS_JSON, policy) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_load".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };

    let counts: Vec<String> = Category::all()
        .iter()
        .map(|&c| format!("{} {}", catalog.items_in(c).len(), c))
        .collect();
    results.push(TestResult {
        name: "catalog_load".into(),
        passed: !catalog.is_empty(),
        detail: counts.join(", "),
    });

    // Every slot needs something to offer
    let empty: Vec<String> = Category::all()
        .iter()
        .filter(|&&c| catalog.items_in(c).is_empty())
        .map(|c| c.to_string())
        .collect();
    results.push(TestResult {
        name: "catalog_categories_populated".into(),
        passed: empty.is_empty(),
        detail: if empty.is_empty() {
            "every category has items".into()
        } else {
            format!("empty: {}", empty.join(", "))
        },
    });

    // Special augments resolved
    let missing: Vec<String> = SpecialAugment::all()
        .iter()
        .filter(|&&a| catalog.augment_for(a).is_none())
        .map(|a| a.to_string())
        .collect();
    results.push(TestResult {
        name: "catalog_special_augments".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            format!("all {} special augments resolved", SpecialAugment::all().len())
        } else {
            format!("unresolved: {}", missing.join(", "))
        },
    });

    // Weapon classes
    let unclassed: Vec<&str> = catalog
        .iter()
        .filter(|i| i.weapon().is_some_and(|w| w.class.is_none()))
        .map(|i| i.name.as_str())
        .collect();
    let heavy = catalog
        .iter()
        .filter(|i| i.weapon().is_some_and(|w| w.class == Some(WeaponClass::Heavy)))
        .count();
    results.push(TestResult {
        name: "catalog_weapon_classes".into(),
        passed: heavy > 0,
        detail: format!(
            "{} heavy weapon(s); never offered (no class): {}",
            heavy,
            if unclassed.is_empty() { "none".to_string() } else { unclassed.join(", ") }
        ),
    });

    // Attachments fit at least one weapon
    let orphaned: Vec<&str> = catalog
        .iter()
        .filter(|i| i.attachment().is_some_and(|a| a.compatible.is_empty()))
        .map(|i| i.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_attachments_fit".into(),
        passed: orphaned.is_empty(),
        detail: if orphaned.is_empty() {
            "every attachment fits some weapon".into()
        } else {
            format!("no compatible weapon: {}", orphaned.join(", "))
        },
    });

    // Codes can carry every classed item
    let unencodable: Vec<&str> = catalog
        .iter()
        .filter(|i| i.weapon().map_or(true, |w| w.class.is_some()))
        .filter(|i| {
            !i.stable_id
                .parse::<u32>()
                .is_ok_and(|v| (1..=MAX_CODE_ID).contains(&v))
        })
        .map(|i| i.name.as_str())
        .collect();
    results.push(TestResult {
        name: "catalog_ids_encodable".into(),
        passed: unencodable.is_empty(),
        detail: if unencodable.is_empty() {
            "all offerable stable ids fit a loadout code".into()
        } else {
            format!("not encodable: {}", unencodable.join(", "))
        },
    });

    Some(catalog)
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn scenario(
    name: &str,
    catalog: &Catalog,
    policy: &RulePolicy,
    run: impl FnOnce(&mut Configurator) -> Result<String, String>,
) -> TestResult {
    let mut editor = Configurator::new(catalog.clone(), policy.clone());
    let outcome = run(&mut editor);
    TestResult {
        name: name.into(),
        passed: outcome.is_ok(),
        detail: outcome.unwrap_or_else(|e| e),
    }
}

fn pick(editor: &mut Configurator, slot: Slot, name: &str) -> Result<SettleReport, String> {
    editor
        .select_by_name(slot, name)
        .map_err(|e| format!("select {} in {}: {}", name, slot, e))
}

fn validate_scenarios(catalog: &Catalog, policy: &RulePolicy) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let secondary = Slot::Weapon(WeaponSlot::Secondary);

    vec![
        scenario("technician_ammo_cleared", catalog, policy, |e| {
            pick(e, Slot::Augment(0), "Technician")?;
            pick(e, secondary, "Major")?;
            pick(e, Slot::Ammo(Mount::Secondary), "Shred Ammo")?;
            let report = e.clear(Slot::Augment(0));
            if report.was_cleared(Slot::Ammo(Mount::Secondary)) && e.loadout().get(secondary).is_some() {
                Ok(format!("{} clear(s) in {} pass(es)", report.cleared.len(), report.passes))
            } else {
                Err(format!("unexpected settle result: {:?}", report))
            }
        }),
        scenario("versatile_backup_in_secondary", catalog, policy, |e| {
            pick(e, Slot::Augment(0), "Versatile")?;
            pick(e, secondary, "Fists")?;
            let report = e.clear(Slot::Augment(0));
            if report.was_cleared(secondary) {
                Ok("Fists cleared once Versatile left".into())
            } else {
                Err("Fists survived without Versatile".into())
            }
        }),
        scenario("device_duplicates", catalog, policy, |e| {
            pick(e, Slot::Device(0), "Overcharge")?;
            if pick(e, Slot::Device(1), "Overcharge").is_ok() {
                return Err("duplicate device accepted without Versatile".into());
            }
            pick(e, Slot::Augment(0), "Versatile")?;
            pick(e, Slot::Device(1), "Overcharge")?;
            let report = e.clear(Slot::Augment(0));
            if report.was_cleared(Slot::Device(1)) && e.loadout().get(Slot::Device(0)).is_some() {
                Ok("first copy kept, second cleared".into())
            } else {
                Err(format!("unexpected settle result: {:?}", report))
            }
        }),
        scenario("heavy_weapon_confinement", catalog, policy, |e| {
            let backup = Slot::Weapon(WeaponSlot::Backup);
            pick(e, Slot::Augment(0), "Heavy Weapons")?;
            pick(e, backup, "Minigun")?;
            let label = e.slot_label(backup);
            let report = e.clear(Slot::Augment(0));
            if report.was_cleared(backup) {
                Ok(format!("'{}' slot emptied when Heavy Weapons left", label))
            } else {
                Err("heavy weapon outlived its augment".into())
            }
        }),
    ]
}

// ── 4. Random sweep ─────────────────────────────────────────────────────

/// Every held item legal and the uniqueness groups clean.
fn check_consistent(editor: &Configurator) -> Result<(), String> {
    let (catalog, policy, loadout) = (editor.catalog(), editor.policy(), editor.loadout());
    for slot in Slot::ALL {
        match rules::evaluate_held(catalog, policy, loadout, slot) {
            None | Some(Verdict::Legal) => {}
            Some(v) => return Err(format!("{} holds illegal item ({})", slot, v)),
        }
    }
    let mut groups: Vec<Vec<Slot>> = vec![
        (0..4).map(Slot::Augment).collect(),
        WeaponSlot::all().iter().map(|&w| Slot::Weapon(w)).collect(),
    ];
    for &m in Mount::all() {
        groups.push((0..4).map(|i| Slot::Mod(m, i)).collect());
    }
    for group in &groups {
        let held = loadout.held_in(group);
        let distinct: HashSet<ItemId> = held.iter().copied().collect();
        if distinct.len() != held.len() {
            return Err(format!("duplicate in {}", group[0]));
        }
    }
    Ok(())
}

fn sweep_random_loadouts(catalog: &Catalog, policy: &RulePolicy, verbose: bool) -> Vec<TestResult> {
    println!("--- Random Sweep ({:?}) ---", policy.restriction_order);
    let mut results = Vec::new();
    let mut editor = Configurator::new(catalog.clone(), policy.clone());

    let mut failures = Vec::new();
    let mut max_passes = 0;
    let mut total_clears = 0;
    let mut filled = 0;

    for seed in 0..SWEEP_SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let report = editor.randomize(&mut rng);
        if !report.is_stable() {
            failures.push(format!("seed {}: randomize needed {} clear(s)", seed, report.cleared.len()));
        }
        filled += editor.loadout().occupied().count();

        for _ in 0..MUTATIONS_PER_SEED {
            let slot = Slot::ALL[rng.gen_range(0..SLOT_COUNT)];
            let report = if rng.gen_bool(0.3) {
                editor.clear(slot)
            } else {
                let pool = editor.catalog().items_in(slot.category());
                if pool.is_empty() {
                    continue;
                }
                let item = pool[rng.gen_range(0..pool.len())];
                editor.select(slot, item).unwrap_or_default()
            };
            max_passes = max_passes.max(report.passes);
            total_clears += report.cleared.len();
            if report.passes > SLOT_COUNT {
                failures.push(format!("seed {}: {} passes", seed, report.passes));
            }
            if let Err(e) = check_consistent(&editor) {
                failures.push(format!("seed {}: {}", seed, e));
            }
        }

        if verbose && seed == 0 {
            if let Ok(json) = serde_json::to_string(editor.loadout()) {
                println!("  sample loadout: {}", json);
            }
        }
    }

    let tag = match policy.restriction_order {
        RestrictionOrder::AfterVersatile => "after",
        RestrictionOrder::BeforeVersatile => "before",
    };
    results.push(TestResult {
        name: format!("sweep_consistent_{}", tag),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!(
                "{} seeds x {} mutations, avg {:.1} slots filled, {} forced clears, max {} pass(es)",
                SWEEP_SEEDS,
                MUTATIONS_PER_SEED,
                filled as f64 / SWEEP_SEEDS as f64,
                total_clears,
                max_passes
            )
        } else {
            format!("{} failure(s), first: {}", failures.len(), failures[0])
        },
    });

    // Determinism: same seed, same loadout
    let mut a = Configurator::new(catalog.clone(), policy.clone());
    let mut b = Configurator::new(catalog.clone(), policy.clone());
    a.randomize(&mut StdRng::seed_from_u64(42));
    b.randomize(&mut StdRng::seed_from_u64(42));
    results.push(TestResult {
        name: format!("sweep_deterministic_{}", tag),
        passed: a.loadout() == b.loadout(),
        detail: "seed 42 reproduces the same loadout".into(),
    });

    results
}

// ── 5. Codes ────────────────────────────────────────────────────────────

fn validate_codes(catalog: &Catalog, policy: &RulePolicy) -> Vec<TestResult> {
    println!("--- Loadout Codes ---");
    let mut results = Vec::new();
    let mut editor = Configurator::new(catalog.clone(), policy.clone());
    let mut mismatches = Vec::new();

    for seed in 0..SWEEP_SEEDS {
        editor.randomize(&mut StdRng::seed_from_u64(seed));
        let outcome = editor
            .code()
            .map_err(|e| e.to_string())
            .and_then(|c| code::decode(catalog, &c).map_err(|e| e.to_string()));
        match outcome {
            Ok(decoded) if &decoded == editor.loadout() => {}
            Ok(_) => mismatches.push(format!("seed {}: decoded loadout differs", seed)),
            Err(e) => mismatches.push(format!("seed {}: {}", seed, e)),
        }
    }
    results.push(TestResult {
        name: "code_round_trip".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            format!("{} random loadouts survive encode/decode", SWEEP_SEEDS)
        } else {
            format!("{} mismatch(es), first: {}", mismatches.len(), mismatches[0])
        },
    });

    let rejected = editor.apply_code("A123").is_err();
    results.push(TestResult {
        name: "code_rejects_malformed".into(),
        passed: rejected,
        detail: "short code refused".into(),
    });

    results
}
