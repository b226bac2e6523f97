//! Pure rule logic for the loadout editor.
//!
//! This crate contains the item catalog, the slot eligibility rules and the
//! forced-clear settling loop, independent of any UI. Functions take plain
//! data and return results, so every rule is unit-testable and the same
//! logic can back a web front end, a CLI or the headless simulation harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`augments`] | The seven special augments and the flags derived from a loadout |
//! | [`catalog`] | Item catalog loaded from the four JSON source documents |
//! | [`code`] | Fixed-width base-36 loadout codes for sharing builds |
//! | [`configurator`] | Editor state owner: select, clear, options, randomize |
//! | [`loadout`] | Slot-indexed selection state |
//! | [`policy`] | Tunable rule decisions (restriction order, Studied allow-list) |
//! | [`rules`] | Eligibility checks and Legal / Hidden / Disabled verdicts |
//! | [`settle`] | Fixed-point forced-clear loop after every change |
//! | [`slots`] | The 22 loadout slots, their categories, peers and labels |

pub mod augments;
pub mod catalog;
pub mod code;
pub mod configurator;
pub mod loadout;
pub mod policy;
pub mod rules;
pub mod settle;
pub mod slots;
