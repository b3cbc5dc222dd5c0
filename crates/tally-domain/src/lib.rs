//! Dataset record model for the tally financial editor.
//!
//! Pure data layer, no I/O:
//!
//! - **Record**: the typed per-dataset row abstraction (identity, ordinal,
//!   fields, derived-field calculator)
//! - **Datasets**: projects, subscriptions, budget summary
//! - **Totals**: field-wise sums over a collection
//! - **Money**: cent rounding and amount parsing

pub mod budget;
pub mod money;
pub mod project;
pub mod record;
pub mod subscription;
pub mod totals;

pub use budget::{seed_budget, BudgetField, BudgetLine};
pub use money::{parse_amount, round_to_cents};
pub use project::{seed_projects, Project, ProjectField};
pub use record::{FieldKind, FieldTypeError, FieldValue, Record, RecordId};
pub use subscription::{seed_subscriptions, Subscription, SubscriptionField};
pub use totals::{totals, Totals};
