//! Condition mutation.

use crate::rules::{Condition, Symbol};
use rand::Rng;

/// Mutate the specified attributes of `condition` in index order.
///
/// Each specified attribute is hit with probability `mu`. Without
/// `symbols` a hit generalizes the attribute; with symbols a fair coin picks
/// between generalizing and rewriting it to a uniformly drawn symbol.
///
/// Returns whether anything changed.
pub fn mutate_condition<R: Rng>(
    condition: &mut Condition,
    mu: f64,
    symbols: &[Symbol],
    rng: &mut R,
) -> bool {
    let mut changed = false;
    for i in 0..condition.len() {
        if condition.is_wildcard(i) || !rng.gen_bool(mu) {
            continue;
        }
        if symbols.is_empty() || rng.gen_bool(0.5) {
            condition.generalize(i);
            changed = true;
        } else {
            let symbol = symbols[rng.gen_range(0..symbols.len())];
            changed |= condition[i] != symbol;
            condition.specialize(i, symbol);
        }
    }
    changed
}
