//! Per-field sums over a record collection.

use crate::money::round_to_cents;
use crate::record::{FieldKind, Record};

/// Field-wise sums over a collection, including the derived field.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals<F: Copy + Eq> {
    entries: Vec<(F, f64)>,
}

impl<F: Copy + Eq> Totals<F> {
    /// The sum for one field; zero for fields that do not carry amounts.
    pub fn get(&self, field: F) -> f64 {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, sum)| *sum)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(F, f64)] {
        &self.entries
    }
}

/// Sum every amount and derived field over the collection.
///
/// Stateless and recomputed on demand whenever the collection changes;
/// totals are never incrementally maintained, so they cannot drift.
pub fn totals<R: Record>(records: &[R]) -> Totals<R::Field> {
    let entries = R::fields()
        .iter()
        .copied()
        .filter(|field| matches!(R::kind(*field), FieldKind::Amount | FieldKind::Derived))
        .map(|field| {
            let sum: f64 = records
                .iter()
                .filter_map(|record| record.get(field).as_amount())
                .sum();
            (field, round_to_cents(sum))
        })
        .collect();
    Totals { entries }
}
