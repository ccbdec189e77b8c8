use std::collections::HashSet;

use corelib::TradeRecord;

/// Drop records whose input `amount` repeats an earlier one.
///
/// The simulator occasionally re-samples the same size near a distribution
/// boundary. The first occurrence wins and the original order is preserved.
/// Nothing else is validated here.
pub fn dedup_by_input(mut records: Vec<TradeRecord>) -> Vec<TradeRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|r| seen.insert(amount_key(r.amount)));
    records
}

/// Bit pattern used as the hash key; `-0.0` and `0.0` compare equal so they
/// must share a key.
fn amount_key(amount: f64) -> u64 {
    if amount == 0.0 { 0 } else { amount.to_bits() }
}
