//! Feature flows, one module per endpoint.
//!
//! Every flow follows the same shape: validate the input, render the prompt,
//! call the [`crate::Generator`], decode the typed output. No flow calls
//! another.

pub mod chat;
pub mod college;
pub mod form_guide;
pub mod project_ideas;
pub mod smart_notes;
pub mod speech;
pub mod timetable;
pub mod tutor;

use crate::error::FieldError;

/// Record a field error when `value` is empty or whitespace-only.
pub(crate) fn check_nonempty(details: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        details.push(FieldError::new(field, "must be a non-empty string"));
    }
}
