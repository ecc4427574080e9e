//! Editable state of one template being filled in

use super::dispatch::FieldKind;
use super::error::{FieldError, FieldRef, FormError, ValidationError};
use super::field::{FieldValue, FormField};
use super::path::FieldPath;
use super::tree::{NodeId, SectionNode, SectionTree};
use crate::state::response::{QuestionResponse, ResponseDocument, ResponseStatus};
use crate::state::template::{DataSource, QuestionImage, Template};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> Option<&mut FormField>;
}

/// Buttons at the bottom of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    SaveDraft,
    Submit,
}

impl FormAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SaveDraft => "Save Draft",
            Self::Submit => "Submit",
        }
    }
}

/// Anything that can hold keyboard focus in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    Verification(usize),
    Section(NodeId),
    Answer(FieldPath),
    Note(FieldPath),
    Action(FormAction),
}

/// Header field with its autocomplete suggestions
#[derive(Debug, Clone)]
pub struct VerificationEntry {
    pub field: FormField,
    pub source: Option<DataSource>,
    pub suggestions: Vec<String>,
    /// Text typed by the user, used to filter suggestions
    query: String,
    suggestion_cursor: Option<usize>,
}

impl VerificationEntry {
    /// Suggestions containing the typed text, case-insensitively
    pub fn matching_suggestions(&self) -> Vec<&str> {
        let query = self.query.to_lowercase();
        self.suggestions
            .iter()
            .filter(|s| s.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    fn cycle_suggestion(&mut self, forward: bool) {
        let picked = {
            let matches = self.matching_suggestions();
            if matches.is_empty() {
                return;
            }
            let count = matches.len();
            let next = match (self.suggestion_cursor, forward) {
                (None, true) => 0,
                (None, false) => count - 1,
                (Some(i), true) => (i + 1) % count,
                (Some(i), false) => (i + count - 1) % count,
            };
            (next, matches[next].to_string())
        };
        self.suggestion_cursor = Some(picked.0);
        self.field.set_text(picked.1);
    }

    fn typed(&mut self) {
        self.query = self.field.as_text().to_string();
        self.suggestion_cursor = None;
    }
}

/// A question's answer slot plus its paired note
#[derive(Debug, Clone)]
pub struct AnswerEntry {
    pub question_id: Option<String>,
    pub field: FormField,
    pub note: Option<FormField>,
    pub image: Option<QuestionImage>,
}

/// Row of the rendered form body
#[derive(Debug, Clone, Copy)]
pub enum FormRow<'a> {
    Section {
        id: NodeId,
        node: &'a SectionNode,
        expanded: bool,
    },
    Question {
        path: &'a FieldPath,
        entry: &'a AnswerEntry,
        depth: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FormSession {
    template: Template,
    tree: SectionTree,
    verification: Vec<VerificationEntry>,
    answers: BTreeMap<FieldPath, AnswerEntry>,
    expanded: HashSet<NodeId>,
    focus: FocusTarget,
    errors: BTreeMap<FieldRef, ValidationError>,
}

impl FormSession {
    #[cfg(test)]
    pub fn new(template: Template) -> Result<Self, FormError> {
        Self::with_expanded_depth(template, super::tree::DEFAULT_EXPANDED_DEPTH)
    }

    pub fn with_expanded_depth(template: Template, expanded_depth: usize) -> Result<Self, FormError> {
        let tree = SectionTree::build(&template.sections)?;

        let verification = template
            .verification_fields
            .iter()
            .enumerate()
            .map(|(i, vf)| {
                let source = vf.data_source();
                let kind = FieldKind::from_verification(vf.kind, source.is_some());
                VerificationEntry {
                    field: FormField::new(format!("verification.{i}"), vf.label.clone(), kind)
                        .required(true),
                    source,
                    suggestions: vf.options.clone(),
                    query: String::new(),
                    suggestion_cursor: None,
                }
            })
            .collect();

        let answers = tree
            .leaf_questions()
            .map(|(path, question)| {
                let kind = FieldKind::from_config(&question.response_config);
                let note = kind.has_note().then(|| FormField::note(path.note_key()));
                let field = FormField::new(path.to_string(), question.text.clone(), kind)
                    .required(question.required)
                    .with_placeholder(question.response_config.placeholder.clone());
                let entry = AnswerEntry {
                    question_id: question.id.clone(),
                    field,
                    note,
                    image: question.image.clone(),
                };
                (path, entry)
            })
            .collect();

        let expanded = tree.initially_expanded(expanded_depth).into_iter().collect();

        let mut session = Self {
            template,
            tree,
            verification,
            answers,
            expanded,
            focus: FocusTarget::Action(FormAction::Submit),
            errors: BTreeMap::new(),
        };
        if let Some(first) = session.focus_targets().into_iter().next() {
            session.focus = first;
        }
        Ok(session)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn verification(&self) -> &[VerificationEntry] {
        &self.verification
    }

    pub fn answers(&self) -> &BTreeMap<FieldPath, AnswerEntry> {
        &self.answers
    }

    #[cfg(test)]
    pub fn answer(&self, path: &FieldPath) -> Option<&AnswerEntry> {
        self.answers.get(path)
    }

    pub fn focus(&self) -> &FocusTarget {
        &self.focus
    }

    pub fn is_focused(&self, target: &FocusTarget) -> bool {
        &self.focus == target
    }

    #[cfg(test)]
    pub fn set_focus(&mut self, target: FocusTarget) {
        self.focus = target;
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Collapse or expand a section; focus stays on the section header
    pub fn toggle_section(&mut self, id: NodeId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    /// Data sources the header needs suggestions from
    pub fn data_sources(&self) -> Vec<(usize, DataSource)> {
        self.verification
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.source.map(|s| (i, s)))
            .collect()
    }

    pub fn set_suggestions(&mut self, index: usize, suggestions: Vec<String>) {
        if let Some(entry) = self.verification.get_mut(index) {
            entry.suggestions = suggestions;
            entry.suggestion_cursor = None;
        }
    }

    /// Visible rows of the form body, in display order
    pub fn rows(&self) -> Vec<FormRow<'_>> {
        let mut rows = Vec::new();
        for id in self.tree.visible(|id| self.is_expanded(id)) {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            let expanded = self.is_expanded(id);
            rows.push(FormRow::Section { id, node, expanded });
            if !expanded || node.is_group {
                continue;
            }
            for index in 0..node.questions.len() {
                let path = node.path.question(index);
                if let Some((path, entry)) = self.answers.get_key_value(&path) {
                    rows.push(FormRow::Question {
                        path,
                        entry,
                        depth: node.depth(),
                    });
                }
            }
        }
        rows
    }

    /// Focus order: header fields, visible sections and their inputs, buttons
    pub fn focus_targets(&self) -> Vec<FocusTarget> {
        let mut targets: Vec<FocusTarget> = (0..self.verification.len())
            .map(FocusTarget::Verification)
            .collect();

        for row in self.rows() {
            match row {
                FormRow::Section { id, .. } => targets.push(FocusTarget::Section(id)),
                FormRow::Question { path, entry, .. } => {
                    if entry.field.kind.is_supported() {
                        targets.push(FocusTarget::Answer(path.clone()));
                    }
                    if entry.note.is_some() {
                        targets.push(FocusTarget::Note(path.clone()));
                    }
                }
            }
        }

        targets.push(FocusTarget::Action(FormAction::SaveDraft));
        targets.push(FocusTarget::Action(FormAction::Submit));
        targets
    }

    fn field_for(&self, target: &FocusTarget) -> Option<&FormField> {
        match target {
            FocusTarget::Verification(i) => self.verification.get(*i).map(|v| &v.field),
            FocusTarget::Answer(path) => self.answers.get(path).map(|a| &a.field),
            FocusTarget::Note(path) => self.answers.get(path).and_then(|a| a.note.as_ref()),
            FocusTarget::Section(_) | FocusTarget::Action(_) => None,
        }
    }

    fn field_ref(target: &FocusTarget) -> Option<FieldRef> {
        match target {
            FocusTarget::Verification(i) => Some(FieldRef::Verification(*i)),
            FocusTarget::Answer(path) => Some(FieldRef::Answer(path.clone())),
            _ => None,
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.field_for(&self.focus)
    }

    /// Re-check the focused field if it currently shows an error
    fn revalidate_focused(&mut self) {
        let Some(field_ref) = Self::field_ref(&self.focus) else {
            return;
        };
        if !self.errors.contains_key(&field_ref) {
            return;
        }
        match self.focused_field().map(FormField::validate) {
            Some(Err(err)) => {
                self.errors.insert(field_ref, err);
            }
            _ => {
                self.errors.remove(&field_ref);
            }
        }
    }

    /// Type a character into the focused field
    pub fn input_char(&mut self, c: char) {
        if let FocusTarget::Verification(i) = self.focus {
            if let Some(entry) = self.verification.get_mut(i) {
                entry.field.push_char(c);
                entry.typed();
            }
        } else if let Some(field) = self.get_active_field_mut() {
            field.push_char(c);
        }
        self.revalidate_focused();
    }

    pub fn backspace(&mut self) {
        if let FocusTarget::Verification(i) = self.focus {
            if let Some(entry) = self.verification.get_mut(i) {
                entry.field.pop_char();
                entry.typed();
            }
        } else if let Some(field) = self.get_active_field_mut() {
            field.pop_char();
        }
        self.revalidate_focused();
    }

    /// Newline in multi-line inputs; returns false when not applicable
    pub fn newline(&mut self) -> bool {
        match self.get_active_field_mut() {
            Some(field) if field.is_multiline() => {
                if let FieldValue::Text(s) = &mut field.value {
                    s.push('\n');
                }
                true
            }
            _ => false,
        }
    }

    /// Toggle a boolean, advance a choice or pick the next suggestion
    pub fn toggle(&mut self, forward: bool) {
        match self.focus.clone() {
            FocusTarget::Verification(i) => {
                if let Some(entry) = self.verification.get_mut(i) {
                    entry.cycle_suggestion(forward);
                }
            }
            FocusTarget::Section(id) => self.toggle_section(id),
            _ => {
                if let Some(field) = self.get_active_field_mut() {
                    if forward {
                        field.toggle();
                    } else {
                        field.toggle_back();
                    }
                }
            }
        }
        self.revalidate_focused();
    }

    pub fn error_for(&self, field: &FieldRef) -> Option<&ValidationError> {
        self.errors.get(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Validate every field and remember the failures for inline display
    pub fn validate(&mut self) -> Vec<FieldError> {
        let mut failures = Vec::new();

        for (i, entry) in self.verification.iter().enumerate() {
            if let Err(error) = entry.field.validate() {
                tracing::debug!(field = %entry.field.name, %error, "validation failed");
                failures.push(FieldError {
                    field: FieldRef::Verification(i),
                    label: entry.field.label.clone(),
                    error,
                });
            }
        }

        for (path, entry) in &self.answers {
            if let Err(error) = entry.field.validate() {
                tracing::debug!(field = %entry.field.name, %error, "validation failed");
                failures.push(FieldError {
                    field: FieldRef::Answer(path.clone()),
                    label: entry.field.label.clone(),
                    error,
                });
            }
        }

        self.errors = failures
            .iter()
            .map(|f| (f.field.clone(), f.error.clone()))
            .collect();
        failures
    }

    /// Bundle the current values into a response document
    pub fn build_document(&self, status: ResponseStatus, submitted_at: DateTime<Utc>) -> ResponseDocument {
        let verification_data = self
            .verification
            .iter()
            .filter_map(|v| v.field.answer().map(|value| (v.field.label.clone(), value)))
            .collect();

        let responses = self
            .answers
            .iter()
            .filter_map(|(path, entry)| {
                let value = entry.field.answer()?;
                let note = entry
                    .note
                    .as_ref()
                    .map(|n| n.as_text().trim())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                Some((
                    path.clone(),
                    QuestionResponse {
                        value,
                        note,
                        question_id: entry.question_id.clone(),
                    },
                ))
            })
            .collect();

        ResponseDocument {
            template_id: self.template.id.clone(),
            verification_data,
            responses,
            submitted_at,
            status,
        }
    }

    /// Draft documents are built without validation
    pub fn save_draft(&self, now: DateTime<Utc>) -> ResponseDocument {
        self.build_document(ResponseStatus::Draft, now)
    }

    /// Validate, then build a completed document
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<ResponseDocument, FormError> {
        let failures = self.validate();
        if !failures.is_empty() {
            if let Some(first) = failures.first() {
                self.focus = match &first.field {
                    FieldRef::Verification(i) => FocusTarget::Verification(*i),
                    FieldRef::Answer(path) => {
                        self.reveal(path);
                        FocusTarget::Answer(path.clone())
                    }
                };
            }
            return Err(FormError::Invalid(failures));
        }
        Ok(self.build_document(ResponseStatus::Completed, now))
    }

    /// Expand every ancestor of the section holding `path`
    fn reveal(&mut self, path: &FieldPath) {
        let mut current = self
            .tree
            .nodes()
            .iter()
            .position(|n| &n.path == path.section());
        while let Some(id) = current {
            self.expanded.insert(id);
            current = self.tree.node(id).and_then(|n| n.parent);
        }
    }

    /// Load values from a saved document, matching questions by durable id
    /// first and by position second
    pub fn restore(&mut self, doc: &ResponseDocument) -> usize {
        let mut restored = 0;

        for entry in &mut self.verification {
            if let Some(value) = doc.verification_data.get(&entry.field.label) {
                entry.field.restore(value);
                entry.typed();
            }
        }

        for (path, entry) in &mut self.answers {
            let saved = match &entry.question_id {
                Some(id) => doc
                    .answer_by_question_id(id)
                    .or_else(|| doc.answer(path).filter(|r| r.question_id.is_none())),
                None => doc.answer(path).filter(|r| r.question_id.is_none()),
            };
            let Some(saved) = saved else {
                continue;
            };
            entry.field.restore(&saved.value);
            if let (Some(note), Some(text)) = (entry.note.as_mut(), saved.note.as_ref()) {
                note.set_text(text.clone());
            }
            restored += 1;
        }

        restored
    }

    /// (answered, answerable) question counts
    pub fn progress(&self) -> (usize, usize) {
        let answerable = self
            .answers
            .values()
            .filter(|a| a.field.kind.is_supported() && !matches!(a.field.kind, FieldKind::Boolean));
        let total = answerable.clone().count();
        let answered = answerable.filter(|a| a.field.answer().is_some()).count();
        (answered, total)
    }
}

impl Form for FormSession {
    fn field_count(&self) -> usize {
        self.focus_targets().len()
    }

    fn active_field(&self) -> usize {
        self.focus_targets()
            .iter()
            .position(|t| t == &self.focus)
            .unwrap_or(0)
    }

    fn set_active_field(&mut self, index: usize) {
        let targets = self.focus_targets();
        if let Some(target) = targets.get(index.min(targets.len().saturating_sub(1))) {
            self.focus = target.clone();
        }
    }

    fn get_active_field_mut(&mut self) -> Option<&mut FormField> {
        match &self.focus {
            FocusTarget::Verification(i) => self.verification.get_mut(*i).map(|v| &mut v.field),
            FocusTarget::Answer(path) => self.answers.get_mut(path).map(|a| &mut a.field),
            FocusTarget::Note(path) => self.answers.get_mut(path).and_then(|a| a.note.as_mut()),
            FocusTarget::Section(_) | FocusTarget::Action(_) => None,
        }
    }
}
