//! The cell edit session.
//!
//! A single-slot state machine governing one in-progress cell edit: Idle or
//! Editing exactly one (row, field) with a draft string, the value at session
//! start, and an optional validation error. The session is pure state; the
//! sheet editor wires its committed values into the sync engine.

use tally_domain::{parse_amount, round_to_cents, FieldKind, FieldValue, Record};

use crate::error::ValidationError;

/// The live state of an active edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit<F> {
    pub index: usize,
    pub field: F,
    original: FieldValue,
    pub draft: String,
    pub error: Option<ValidationError>,
}

/// What a commit attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<F> {
    /// No session was active.
    Idle,
    /// A validation error is present; the session stays Editing.
    Refused(ValidationError),
    /// The normalized value equals the original; nothing to apply.
    Unchanged,
    /// The normalized value differs; apply it to the record store.
    Apply {
        index: usize,
        field: F,
        value: FieldValue,
    },
}

pub struct EditSession<R: Record> {
    active: Option<ActiveEdit<R::Field>>,
}

impl<R: Record> Default for EditSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> EditSession<R> {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveEdit<R::Field>> {
        self.active.as_ref()
    }

    /// Enter Editing for one cell, seeding the draft with the original
    /// value's string form. The derived field can never be entered; the
    /// session stays Idle and `false` is returned.
    ///
    /// The caller must have committed any prior session first.
    pub fn start(&mut self, index: usize, field: R::Field, original: FieldValue) -> bool {
        if R::kind(field) == FieldKind::Derived {
            tracing::debug!(field = %field, "edit refused: derived field");
            return false;
        }
        let draft = original.display_string();
        self.active = Some(ActiveEdit {
            index,
            field,
            original,
            draft,
            error: None,
        });
        true
    }

    /// Update the draft; amount fields are validated on every keystroke.
    pub fn input(&mut self, text: impl Into<String>) {
        let Some(edit) = self.active.as_mut() else {
            return;
        };
        edit.draft = text.into();
        edit.error = match R::kind(edit.field) {
            FieldKind::Amount => validate_amount(&edit.draft).err(),
            _ => None,
        };
    }

    /// Attempt to commit (blur, Enter, or Tab).
    ///
    /// Refused while a validation error is present; the session stays
    /// Editing. Otherwise the draft is normalized (amounts: empty or `"0"`
    /// become 0, else parsed and rounded to cents; text: trimmed) and the
    /// session returns to Idle regardless of what the caller does with the
    /// outcome.
    pub fn commit(&mut self) -> CommitOutcome<R::Field> {
        let Some(edit) = self.active.take() else {
            return CommitOutcome::Idle;
        };
        if let Some(error) = edit.error {
            // Stays Editing until the draft is fixed or cancelled.
            self.active = Some(edit);
            return CommitOutcome::Refused(error);
        }
        let value = match R::kind(edit.field) {
            FieldKind::Amount => {
                // Validation kept the draft parseable; a failed parse here
                // means empty input, which normalizes to zero.
                let amount = parse_amount(&edit.draft).unwrap_or(0.0);
                FieldValue::Amount(round_to_cents(amount))
            }
            _ => FieldValue::Text(edit.draft.trim().to_string()),
        };

        if value == edit.original {
            CommitOutcome::Unchanged
        } else {
            CommitOutcome::Apply {
                index: edit.index,
                field: edit.field,
                value,
            }
        }
    }

    /// Discard the draft and return to Idle (Escape). No store mutation.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

fn validate_amount(draft: &str) -> Result<(), ValidationError> {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(()),
        Ok(value) if value.is_finite() => Err(ValidationError::Negative),
        _ => Err(ValidationError::NotANumber),
    }
}
