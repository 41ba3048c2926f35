#![forbid(unsafe_code)]

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Inclusive range of eligible uppercase initials.
const FIRST_ELIGIBLE : char = 'A';
const LAST_ELIGIBLE  : char = 'M';

// ---------------------------------------------------------------------------
// is_eligible:
// ---------------------------------------------------------------------------
/** Determine whether a name qualifies for a greeting.  Only the first
 * character (code point, not byte) is inspected.  It must be alphabetic and
 * its uppercase form must lie between 'A' and 'M' inclusive.
 *
 * The comparison is on raw scalar values, so a non-Latin letter whose
 * uppercase form is an ASCII letter in range (dotless ı becomes I) also
 * qualifies.  Characters without a single-character uppercase form are
 * compared as is.
 */
pub fn is_eligible(name: &str) -> bool {
    let first = match name.chars().next() {
        Some(c) => c,
        None => return false,
    };

    if !first.is_alphabetic() {
        return false;
    }

    (FIRST_ELIGIBLE..=LAST_ELIGIBLE).contains(&simple_uppercase(first))
}

// ---------------------------------------------------------------------------
// simple_uppercase:
// ---------------------------------------------------------------------------
// One-to-one uppercase mapping; multi-character expansions leave c unchanged.
fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
