//! Form field value objects

use super::dispatch::FieldKind;
use super::error::ValidationError;
use crate::state::template::{AnswerValue, ResponseOption};

/// Type-safe field values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Index into the field's declared options
    Choice(Option<usize>),
    Boolean(bool),
}

impl FieldValue {
    fn initial(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::SingleChoice { .. } => FieldValue::Choice(None),
            FieldKind::Boolean => FieldValue::Boolean(false),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    /// Key of the field in the response document
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: FieldValue,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl FormField {
    /// Create an empty field of the given kind
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        let value = FieldValue::initial(&kind);
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            value,
            required: false,
            placeholder: None,
        }
    }

    /// Create an optional free-text note field
    pub fn note(name: impl Into<String>) -> Self {
        Self::new(name, "Notes (optional)", FieldKind::MultilineText)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn is_multiline(&self) -> bool {
        self.kind.is_multiline()
    }

    /// Whether this field edits through key toggling instead of typing
    pub fn is_toggle(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::SingleChoice { .. } | FieldKind::Boolean
        )
    }

    /// Get the text value (returns empty string for choice/boolean fields)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    #[cfg(test)]
    pub fn as_bool(&self) -> bool {
        matches!(self.value, FieldValue::Boolean(true))
    }

    fn options(&self) -> &[ResponseOption] {
        match &self.kind {
            FieldKind::SingleChoice { options } => options,
            _ => &[],
        }
    }

    pub fn selected_option(&self) -> Option<&ResponseOption> {
        match self.value {
            FieldValue::Choice(Some(i)) => self.options().get(i),
            _ => None,
        }
    }

    /// Set the text value
    pub fn set_text(&mut self, value: impl Into<String>) {
        if let FieldValue::Text(s) = &mut self.value {
            *s = value.into();
        }
    }

    pub fn set_bool(&mut self, value: bool) {
        if matches!(self.kind, FieldKind::Boolean) {
            self.value = FieldValue::Boolean(value);
        }
    }

    /// Select the option whose value equals `value`, if declared
    pub fn select_value(&mut self, value: &AnswerValue) -> bool {
        let found = self.options().iter().position(|o| &o.value == value);
        if found.is_some() {
            self.value = FieldValue::Choice(found);
        }
        found.is_some()
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        if !self.kind.accepts_char(c) {
            return;
        }
        if let FieldValue::Text(s) = &mut self.value {
            s.push(c);
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        if let FieldValue::Text(s) = &mut self.value {
            s.pop();
        }
    }

    /// Flip a boolean or advance a choice (wrapping back to "no selection")
    pub fn toggle(&mut self) {
        let count = self.options().len();
        match &mut self.value {
            FieldValue::Boolean(b) => *b = !*b,
            FieldValue::Choice(selected) => {
                *selected = match *selected {
                    None if count > 0 => Some(0),
                    Some(i) if i + 1 < count => Some(i + 1),
                    _ => None,
                };
            }
            FieldValue::Text(_) => {}
        }
    }

    /// Move a choice selection backwards
    pub fn toggle_back(&mut self) {
        let count = self.options().len();
        match &mut self.value {
            FieldValue::Choice(selected) => {
                *selected = match *selected {
                    None if count > 0 => Some(count - 1),
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
            }
            FieldValue::Boolean(b) => *b = !*b,
            FieldValue::Text(_) => {}
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.value {
            FieldValue::Text(s) => self.kind.validate_text(s, self.required),
            FieldValue::Choice(selected) => self.kind.validate_choice(*selected, self.required),
            FieldValue::Boolean(_) => Ok(()),
        }
    }

    /// The value to send, or `None` when nothing was entered
    pub fn answer(&self) -> Option<AnswerValue> {
        if !self.kind.is_supported() {
            return None;
        }
        match &self.value {
            FieldValue::Text(s) => self.kind.text_answer(s),
            FieldValue::Choice(_) => self.selected_option().map(|o| o.value.clone()),
            FieldValue::Boolean(b) => Some(AnswerValue::Bool(*b)),
        }
    }

    /// Load a previously stored answer into this field
    pub fn restore(&mut self, value: &AnswerValue) {
        match (&self.kind, value) {
            (FieldKind::Boolean, AnswerValue::Bool(b)) => self.set_bool(*b),
            (FieldKind::SingleChoice { .. }, v) => {
                self.select_value(v);
            }
            (FieldKind::Unsupported(_), _) => {}
            (_, AnswerValue::Text(s)) => self.set_text(s.clone()),
            (_, AnswerValue::Number(n)) => self.set_text(n.to_string()),
            (_, AnswerValue::Bool(_)) => {}
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(true) => "[x] Yes".to_string(),
            FieldValue::Boolean(false) => "[ ] Yes".to_string(),
            FieldValue::Choice(_) => self
                .options()
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    if self.value == FieldValue::Choice(Some(i)) {
                        format!("(•) {}", o.label)
                    } else {
                        format!("( ) {}", o.label)
                    }
                })
                .collect::<Vec<_>>()
                .join("  "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_field() -> FormField {
        let options = ["si", "no", "na"]
            .iter()
            .map(|v| ResponseOption {
                label: v.to_uppercase(),
                value: AnswerValue::Text(v.to_string()),
                color: None,
            })
            .collect();
        FormField::new("responses.s0.q0", "Harness ok?", FieldKind::SingleChoice { options })
    }

    #[test]
    fn test_boolean_defaults_to_false() {
        let field = FormField::new("responses.s0.q1", "Checked", FieldKind::Boolean);
        assert!(!field.as_bool());
        assert_eq!(field.answer(), Some(AnswerValue::Bool(false)));
        assert_eq!(field.display_value(), "[ ] Yes");
    }

    #[test]
    fn test_boolean_toggle() {
        let mut field = FormField::new("b", "Checked", FieldKind::Boolean);
        field.toggle();
        assert!(field.as_bool());
        field.toggle();
        assert!(!field.as_bool());
    }

    #[test]
    fn test_choice_cycles_through_none() {
        let mut field = choice_field();
        assert!(field.selected_option().is_none());
        field.toggle();
        assert_eq!(field.selected_option().unwrap().label, "SI");
        field.toggle();
        field.toggle();
        assert_eq!(field.selected_option().unwrap().label, "NA");
        field.toggle();
        assert!(field.selected_option().is_none());
        field.toggle_back();
        assert_eq!(field.selected_option().unwrap().label, "NA");
    }

    #[test]
    fn test_choice_answer_is_option_value() {
        let mut field = choice_field();
        assert_eq!(field.answer(), None);
        field.toggle();
        field.toggle();
        assert_eq!(field.answer(), Some(AnswerValue::Text("no".to_string())));
        assert!(field.display_value().contains("(•) NO"));
    }

    #[test]
    fn test_required_choice_validation() {
        let mut field = choice_field().required(true);
        assert_eq!(field.validate(), Err(ValidationError::Required));
        field.toggle();
        assert_eq!(field.validate(), Ok(()));
    }

    #[test]
    fn test_push_char_respects_kind() {
        let mut field = FormField::new("n", "Count", FieldKind::Number { min: None, max: None });
        for c in "1a2".chars() {
            field.push_char(c);
        }
        assert_eq!(field.as_text(), "12");
        field.pop_char();
        assert_eq!(field.as_text(), "1");
    }

    #[test]
    fn test_unsupported_field_never_answers() {
        let mut field = FormField::new("u", "Sign", FieldKind::Unsupported("signature".into()));
        field.push_char('x');
        assert_eq!(field.as_text(), "");
        assert_eq!(field.answer(), None);
        assert_eq!(field.validate(), Ok(()));
    }

    #[test]
    fn test_restore_values() {
        let mut choice = choice_field();
        choice.restore(&AnswerValue::Text("na".into()));
        assert_eq!(choice.selected_option().unwrap().label, "NA");

        let mut number = FormField::new("n", "Count", FieldKind::Number { min: None, max: None });
        number.restore(&AnswerValue::Number(4.5));
        assert_eq!(number.as_text(), "4.5");

        let mut flag = FormField::new("b", "Flag", FieldKind::Boolean);
        flag.restore(&AnswerValue::Bool(true));
        assert!(flag.as_bool());
    }

    #[test]
    fn test_note_field_is_optional_multiline() {
        let note = FormField::note("responses.s0.q0.observacion");
        assert!(note.is_multiline());
        assert!(!note.required);
        assert_eq!(note.validate(), Ok(()));
    }
}
