//! Loadout codes — a compact, fixed-width text form of a loadout.
//!
//! Layout: one version character followed by three base-36 digits per slot
//! in [`Slot::ALL`] order. Each triple is the item's numeric stable id,
//! looked up in the slot's own category; `000` is an empty slot.
//!
//! ```text
//! A 001 017 061 000 000 ...
//! ^ shell augment-1 augment-2 ...
//! ```
//!
//! Decoding never validates rules. Feed the result through
//! [`crate::settle::apply_loadout`] so illegal selections are cleared the
//! same way they would be on user input.

use std::fmt;

use crate::catalog::Catalog;
use crate::loadout::Loadout;
use crate::slots::{Slot, SLOT_COUNT};

/// Current code version marker.
pub const CODE_VERSION: char = 'A';
/// Digits per slot.
const DIGITS: usize = 3;
const RADIX: u32 = 36;
/// Length of a full code.
pub const CODE_LEN: usize = 1 + SLOT_COUNT * DIGITS;
/// Largest stable id that fits in one slot.
pub const MAX_CODE_ID: u32 = RADIX * RADIX * RADIX - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    BadLength { expected: usize, found: usize },
    BadVersion(char),
    BadDigit { position: usize, found: char },
    /// The item's stable id is not a number in `1..=MAX_CODE_ID`.
    Unencodable { slot: Slot, name: String },
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeError::BadLength { expected, found } => {
                write!(f, "Code length mismatch: expected {}, found {}", expected, found)
            }
            CodeError::BadVersion(c) => write!(f, "Unsupported code version {}", c),
            CodeError::BadDigit { position, found } => {
                write!(f, "Invalid character {:?} at position {}", found, position)
            }
            CodeError::Unencodable { slot, name } => {
                write!(f, "{} in {} has no numeric id and cannot be encoded", name, slot)
            }
        }
    }
}

impl std::error::Error for CodeError {}

/// Encode a loadout. Ids the catalog does not know encode as empty.
pub fn encode(catalog: &Catalog, loadout: &Loadout) -> Result<String, CodeError> {
    let mut code = String::with_capacity(CODE_LEN);
    code.push(CODE_VERSION);
    for slot in Slot::ALL {
        let Some(item) = loadout.get(slot).and_then(|id| catalog.get(id)) else {
            code.push_str("000");
            continue;
        };
        let value = item
            .stable_id
            .parse::<u32>()
            .ok()
            .filter(|v| (1..=MAX_CODE_ID).contains(v))
            .ok_or_else(|| CodeError::Unencodable {
                slot,
                name: item.name.clone(),
            })?;
        push_base36(&mut code, value);
    }
    Ok(code)
}

fn push_base36(out: &mut String, value: u32) {
    let mut digits = [b'0'; DIGITS];
    let mut rest = value;
    for d in digits.iter_mut().rev() {
        // `rest % RADIX` is always a valid digit.
        *d = char::from_digit(rest % RADIX, RADIX).map_or(b'0', |c| c.to_ascii_uppercase() as u8);
        rest /= RADIX;
    }
    out.extend(digits.iter().map(|&b| b as char));
}

/// Decode a code into a raw, unsettled loadout.
///
/// Case-insensitive; surrounding whitespace is ignored. Ids missing from
/// the catalog become empty slots.
pub fn decode(catalog: &Catalog, code: &str) -> Result<Loadout, CodeError> {
    let chars: Vec<char> = code.trim().chars().collect();
    if chars.len() != CODE_LEN {
        return Err(CodeError::BadLength {
            expected: CODE_LEN,
            found: chars.len(),
        });
    }
    if !chars[0].eq_ignore_ascii_case(&CODE_VERSION) {
        return Err(CodeError::BadVersion(chars[0]));
    }

    let mut loadout = Loadout::new();
    for (i, slot) in Slot::ALL.into_iter().enumerate() {
        let start = 1 + i * DIGITS;
        let mut value = 0u32;
        for (offset, &c) in chars[start..start + DIGITS].iter().enumerate() {
            let digit = c.to_digit(RADIX).ok_or(CodeError::BadDigit {
                position: start + offset,
                found: c,
            })?;
            value = value * RADIX + digit;
        }
        if value == 0 {
            continue;
        }
        match catalog.by_stable_id(slot.category(), &value.to_string()) {
            Some(id) => {
                loadout.set(slot, Some(id));
            }
            None => log::debug!("Code references unknown id {} in {}; left empty", value, slot),
        }
    }
    Ok(loadout)
}
