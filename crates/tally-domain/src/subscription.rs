//! The subscriptions dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::round_to_cents;
use crate::record::{expect_amount, expect_text, FieldKind, FieldTypeError, FieldValue, Record, RecordId};

/// One subscription row. `yearly` is derived:
/// `yearly = (monthly + extra) * 12`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: RecordId,
    pub ordinal: u32,
    pub name: String,
    pub status: String,
    pub monthly: f64,
    pub extra: f64,
    pub yearly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionField {
    Name,
    Status,
    Monthly,
    Extra,
    Yearly,
}

impl fmt::Display for SubscriptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionField::Name => "name",
            SubscriptionField::Status => "status",
            SubscriptionField::Monthly => "monthly",
            SubscriptionField::Extra => "extra",
            SubscriptionField::Yearly => "yearly",
        })
    }
}

impl Record for Subscription {
    type Field = SubscriptionField;

    const DATASET: &'static str = "subscriptions";
    const CACHE_KEY: &'static str = "subscriptionData";

    fn fields() -> &'static [SubscriptionField] {
        &[
            SubscriptionField::Name,
            SubscriptionField::Status,
            SubscriptionField::Monthly,
            SubscriptionField::Extra,
            SubscriptionField::Yearly,
        ]
    }

    fn kind(field: SubscriptionField) -> FieldKind {
        match field {
            SubscriptionField::Name => FieldKind::Text,
            SubscriptionField::Status => FieldKind::Status,
            SubscriptionField::Monthly | SubscriptionField::Extra => FieldKind::Amount,
            SubscriptionField::Yearly => FieldKind::Derived,
        }
    }

    fn derived_field() -> SubscriptionField {
        SubscriptionField::Yearly
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

    fn get(&self, field: SubscriptionField) -> FieldValue {
        match field {
            SubscriptionField::Name => FieldValue::Text(self.name.clone()),
            SubscriptionField::Status => FieldValue::Text(self.status.clone()),
            SubscriptionField::Monthly => FieldValue::Amount(self.monthly),
            SubscriptionField::Extra => FieldValue::Amount(self.extra),
            SubscriptionField::Yearly => FieldValue::Amount(self.yearly),
        }
    }

    fn set(&mut self, field: SubscriptionField, value: FieldValue) -> Result<(), FieldTypeError> {
        match field {
            SubscriptionField::Name => self.name = expect_text(field, value)?,
            SubscriptionField::Status => self.status = expect_text(field, value)?,
            SubscriptionField::Monthly => self.monthly = expect_amount(field, value)?,
            SubscriptionField::Extra => self.extra = expect_amount(field, value)?,
            SubscriptionField::Yearly => self.yearly = expect_amount(field, value)?,
        }
        Ok(())
    }

    fn recompute_derived(&mut self) {
        self.yearly = round_to_cents((self.monthly + self.extra) * 12.0);
    }

    fn blank() -> Self {
        Subscription {
            id: RecordId::temporary(),
            ordinal: 0,
            name: String::new(),
            status: String::new(),
            monthly: 0.0,
            extra: 0.0,
            yearly: 0.0,
        }
    }
}

pub fn seed_subscriptions() -> Vec<Subscription> {
    let mut records = vec![
        Subscription {
            id: RecordId::from("1"),
            ordinal: 1,
            name: "Cloud hosting".to_string(),
            status: "active".to_string(),
            monthly: 240.0,
            extra: 20.0,
            yearly: 0.0,
        },
        Subscription {
            id: RecordId::from("2"),
            ordinal: 2,
            name: "Issue tracker".to_string(),
            status: "trial".to_string(),
            monthly: 89.5,
            extra: 0.0,
            yearly: 0.0,
        },
    ];
    for record in &mut records {
        record.recompute_derived();
    }
    records
}
