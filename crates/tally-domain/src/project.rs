//! The projects dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::round_to_cents;
use crate::record::{expect_amount, expect_text, FieldKind, FieldTypeError, FieldValue, Record, RecordId};

/// One project row. `total` is derived:
/// `total = dev + extra + invest - gettingAmount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RecordId,
    pub ordinal: u32,
    pub name: String,
    pub status: String,
    pub dev: f64,
    pub extra: f64,
    pub invest: f64,
    pub getting_amount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Status,
    Dev,
    Extra,
    Invest,
    GettingAmount,
    Total,
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectField::Name => "name",
            ProjectField::Status => "status",
            ProjectField::Dev => "dev",
            ProjectField::Extra => "extra",
            ProjectField::Invest => "invest",
            ProjectField::GettingAmount => "gettingAmount",
            ProjectField::Total => "total",
        })
    }
}

impl Record for Project {
    type Field = ProjectField;

    const DATASET: &'static str = "projects";
    const CACHE_KEY: &'static str = "projectData";

    fn fields() -> &'static [ProjectField] {
        &[
            ProjectField::Name,
            ProjectField::Status,
            ProjectField::Dev,
            ProjectField::Extra,
            ProjectField::Invest,
            ProjectField::GettingAmount,
            ProjectField::Total,
        ]
    }

    fn kind(field: ProjectField) -> FieldKind {
        match field {
            ProjectField::Name => FieldKind::Text,
            ProjectField::Status => FieldKind::Status,
            ProjectField::Dev
            | ProjectField::Extra
            | ProjectField::Invest
            | ProjectField::GettingAmount => FieldKind::Amount,
            ProjectField::Total => FieldKind::Derived,
        }
    }

    fn derived_field() -> ProjectField {
        ProjectField::Total
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

    fn get(&self, field: ProjectField) -> FieldValue {
        match field {
            ProjectField::Name => FieldValue::Text(self.name.clone()),
            ProjectField::Status => FieldValue::Text(self.status.clone()),
            ProjectField::Dev => FieldValue::Amount(self.dev),
            ProjectField::Extra => FieldValue::Amount(self.extra),
            ProjectField::Invest => FieldValue::Amount(self.invest),
            ProjectField::GettingAmount => FieldValue::Amount(self.getting_amount),
            ProjectField::Total => FieldValue::Amount(self.total),
        }
    }

    fn set(&mut self, field: ProjectField, value: FieldValue) -> Result<(), FieldTypeError> {
        match field {
            ProjectField::Name => self.name = expect_text(field, value)?,
            ProjectField::Status => self.status = expect_text(field, value)?,
            ProjectField::Dev => self.dev = expect_amount(field, value)?,
            ProjectField::Extra => self.extra = expect_amount(field, value)?,
            ProjectField::Invest => self.invest = expect_amount(field, value)?,
            ProjectField::GettingAmount => self.getting_amount = expect_amount(field, value)?,
            ProjectField::Total => self.total = expect_amount(field, value)?,
        }
        Ok(())
    }

    fn recompute_derived(&mut self) {
        self.total = round_to_cents(self.dev + self.extra + self.invest - self.getting_amount);
    }

    fn blank() -> Self {
        Project {
            id: RecordId::temporary(),
            ordinal: 0,
            name: String::new(),
            status: String::new(),
            dev: 0.0,
            extra: 0.0,
            invest: 0.0,
            getting_amount: 0.0,
            total: 0.0,
        }
    }
}

/// Built-in defaults used when neither the remote store nor the cache mirror
/// has data.
pub fn seed_projects() -> Vec<Project> {
    let mut records = vec![
        Project {
            id: RecordId::from("1"),
            ordinal: 1,
            name: "Website relaunch".to_string(),
            status: "active".to_string(),
            dev: 120000.0,
            extra: 15000.0,
            invest: 30000.0,
            getting_amount: 60000.0,
            total: 0.0,
        },
        Project {
            id: RecordId::from("2"),
            ordinal: 2,
            // Seed data carries a comma-joined status; kept literally.
            name: "Mobile app".to_string(),
            status: "active,priority".to_string(),
            dev: 90000.0,
            extra: 5000.0,
            invest: 12000.0,
            getting_amount: 40000.0,
            total: 0.0,
        },
    ];
    for record in &mut records {
        record.recompute_derived();
    }
    records
}
