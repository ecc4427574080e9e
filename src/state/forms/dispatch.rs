//! Maps a question's declared response type to input behavior and validation

use super::error::ValidationError;
use crate::state::template::{AnswerValue, ResponseConfig, ResponseOption, VerificationKind};
use chrono::NaiveDate;

/// Wire format of date answers
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input behavior selected for a question or verification field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    SingleChoice { options: Vec<ResponseOption> },
    Text,
    MultilineText,
    Number { min: Option<f64>, max: Option<f64> },
    Boolean,
    Date,
    /// Free text with suggestions from an external list
    Autocomplete,
    /// Response type the renderer does not know; shown as an error marker
    Unsupported(String),
}

impl FieldKind {
    pub fn from_config(config: &ResponseConfig) -> Self {
        match config.kind.as_str() {
            "si_no_na" => Self::SingleChoice {
                options: config.options.clone(),
            },
            "text" => Self::Text,
            "textarea" => Self::MultilineText,
            "number" => Self::Number {
                min: config.min,
                max: config.max,
            },
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn from_verification(kind: VerificationKind, has_source: bool) -> Self {
        match kind {
            VerificationKind::Text | VerificationKind::Other => Self::Text,
            VerificationKind::Number => Self::Number {
                min: None,
                max: None,
            },
            VerificationKind::Date => Self::Date,
            VerificationKind::Autocomplete if has_source => Self::Autocomplete,
            VerificationKind::Autocomplete => Self::Text,
        }
    }

    /// Whether an optional free-text note is rendered next to the answer.
    ///
    /// Booleans carry no note. This mirrors the deployed forms and is kept
    /// until product confirms whether it is intended.
    pub fn has_note(&self) -> bool {
        !matches!(self, Self::Boolean | Self::Unsupported(_))
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, Self::MultilineText)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Whether a typed character is accepted by this input
    pub fn accepts_char(&self, c: char) -> bool {
        match self {
            Self::Number { .. } => c.is_ascii_digit() || matches!(c, '-' | '.' | ','),
            Self::Date => c.is_ascii_digit() || c == '-',
            Self::SingleChoice { .. } | Self::Boolean | Self::Unsupported(_) => false,
            Self::Text | Self::MultilineText | Self::Autocomplete => true,
        }
    }

    /// Check a raw text value against this kind's rules
    pub fn validate_text(&self, raw: &str, required: bool) -> Result<(), ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return if required {
                Err(ValidationError::Required)
            } else {
                Ok(())
            };
        }

        match self {
            Self::Number { min, max } => {
                let n = parse_number(value).ok_or(ValidationError::NotANumber)?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(ValidationError::BelowMinimum(*min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(ValidationError::AboveMaximum(*max));
                    }
                }
                Ok(())
            }
            Self::Date => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(|_| ())
                .map_err(|_| ValidationError::InvalidDate),
            _ => Ok(()),
        }
    }

    /// Check a choice selection against the declared options
    pub fn validate_choice(
        &self,
        selected: Option<usize>,
        required: bool,
    ) -> Result<(), ValidationError> {
        let Self::SingleChoice { options } = self else {
            return Ok(());
        };
        match selected {
            None if required => Err(ValidationError::Required),
            None => Ok(()),
            Some(i) if i < options.len() => Ok(()),
            Some(_) => Err(ValidationError::UnknownOption),
        }
    }

    /// Convert raw text into the value sent to the API
    pub fn text_answer(&self, raw: &str) -> Option<AnswerValue> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        match self {
            Self::Number { .. } => parse_number(value).map(AnswerValue::Number),
            Self::Unsupported(_) | Self::Boolean | Self::SingleChoice { .. } => None,
            _ => Some(AnswerValue::Text(raw.to_string())),
        }
    }
}

/// Parse a number typed by the user, accepting a decimal comma
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite())
}
