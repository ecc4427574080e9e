//! Form domain layer
//!
//! Turns an inspection template into editable fields, validates them and
//! aggregates the values into a response document.

mod dispatch;
mod error;
mod field;
mod form_state;
mod path;
mod tree;

pub use dispatch::FieldKind;
pub use error::{FieldRef, FormError, ValidationError};
pub use field::FormField;
pub use form_state::{FocusTarget, Form, FormAction, FormRow, FormSession};
pub use path::FieldPath;
pub use tree::DEFAULT_EXPANDED_DEPTH;

#[cfg(test)]
pub use path::SectionPath;
