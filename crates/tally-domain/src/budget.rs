//! The budget summary dataset.
//!
//! Unlike projects and subscriptions the remote store has no per-row routes
//! for the summary; rows are edited locally and pushed as a whole collection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::round_to_cents;
use crate::record::{expect_amount, expect_text, FieldKind, FieldTypeError, FieldValue, Record, RecordId};

/// One budget summary line. `remaining = planned - actual`; overspent lines
/// go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    pub id: RecordId,
    pub ordinal: u32,
    pub category: String,
    pub planned: f64,
    pub actual: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetField {
    Category,
    Planned,
    Actual,
    Remaining,
}

impl fmt::Display for BudgetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetField::Category => "category",
            BudgetField::Planned => "planned",
            BudgetField::Actual => "actual",
            BudgetField::Remaining => "remaining",
        })
    }
}

impl Record for BudgetLine {
    type Field = BudgetField;

    const DATASET: &'static str = "budget";
    const CACHE_KEY: &'static str = "budgetData";

    fn fields() -> &'static [BudgetField] {
        &[
            BudgetField::Category,
            BudgetField::Planned,
            BudgetField::Actual,
            BudgetField::Remaining,
        ]
    }

    fn kind(field: BudgetField) -> FieldKind {
        match field {
            BudgetField::Category => FieldKind::Text,
            BudgetField::Planned | BudgetField::Actual => FieldKind::Amount,
            BudgetField::Remaining => FieldKind::Derived,
        }
    }

    fn derived_field() -> BudgetField {
        BudgetField::Remaining
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn ordinal(&self) -> u32 {
        self.ordinal
    }

    fn set_ordinal(&mut self, ordinal: u32) {
        self.ordinal = ordinal;
    }

    fn get(&self, field: BudgetField) -> FieldValue {
        match field {
            BudgetField::Category => FieldValue::Text(self.category.clone()),
            BudgetField::Planned => FieldValue::Amount(self.planned),
            BudgetField::Actual => FieldValue::Amount(self.actual),
            BudgetField::Remaining => FieldValue::Amount(self.remaining),
        }
    }

    fn set(&mut self, field: BudgetField, value: FieldValue) -> Result<(), FieldTypeError> {
        match field {
            BudgetField::Category => self.category = expect_text(field, value)?,
            BudgetField::Planned => self.planned = expect_amount(field, value)?,
            BudgetField::Actual => self.actual = expect_amount(field, value)?,
            BudgetField::Remaining => self.remaining = expect_amount(field, value)?,
        }
        Ok(())
    }

    fn recompute_derived(&mut self) {
        self.remaining = round_to_cents(self.planned - self.actual);
    }

    fn blank() -> Self {
        BudgetLine {
            id: RecordId::temporary(),
            ordinal: 0,
            category: String::new(),
            planned: 0.0,
            actual: 0.0,
            remaining: 0.0,
        }
    }
}

pub fn seed_budget() -> Vec<BudgetLine> {
    let mut records = vec![
        BudgetLine {
            id: RecordId::from("1"),
            ordinal: 1,
            category: "Payroll".to_string(),
            planned: 200000.0,
            actual: 175000.0,
            remaining: 0.0,
        },
        BudgetLine {
            id: RecordId::from("2"),
            ordinal: 2,
            category: "Marketing".to_string(),
            planned: 50000.0,
            actual: 61250.0,
            remaining: 0.0,
        },
        BudgetLine {
            id: RecordId::from("3"),
            ordinal: 3,
            category: "Infrastructure".to_string(),
            planned: 30000.0,
            actual: 21340.75,
            remaining: 0.0,
        },
    ];
    for record in &mut records {
        record.recompute_derived();
    }
    records
}
