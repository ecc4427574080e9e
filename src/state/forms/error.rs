//! Errors raised by the form renderer core

use super::path::{FieldPath, SectionPath};
use thiserror::Error;

/// Why a single field value was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("This field is required")]
    Required,
    #[error("Must be a number")]
    NotANumber,
    #[error("Minimum: {0}")]
    BelowMinimum(f64),
    #[error("Maximum: {0}")]
    AboveMaximum(f64),
    #[error("Expected a date as YYYY-MM-DD")]
    InvalidDate,
    #[error("Select one of the listed options")]
    UnknownOption,
}

/// Identifies the field a validation error belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldRef {
    /// Header field, by position in the template's verification list
    Verification(usize),
    Answer(FieldPath),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: FieldRef,
    pub label: String,
    pub error: ValidationError,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("section {path} is nested deeper than {max} levels")]
    SectionTooDeep { path: SectionPath, max: usize },
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
}
