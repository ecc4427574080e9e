//! Inspection template model as served by the templates endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an inspection is carried out internally or by a third party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TemplateKind {
    #[default]
    #[serde(rename = "interna")]
    Internal,
    #[serde(rename = "externa")]
    External,
}

impl TemplateKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Internal => "Internal inspection",
            Self::External => "External inspection",
        }
    }
}

/// A reusable inspection form definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub code: String,
    pub revision: String,
    #[serde(rename = "type", default)]
    pub kind: TemplateKind,
    #[serde(default)]
    pub verification_fields: Vec<VerificationField>,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference picture attached to a section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionImage {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// A node in the template's section forest.
///
/// Grouping nodes (`isParent`) only hold subsections; their `questions` are
/// never rendered nor answered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<SectionImage>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default)]
    pub is_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

impl Section {
    pub fn is_group(&self) -> bool {
        self.is_parent
    }
}

/// Illustrative picture attached to a question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionImage {
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(rename = "obligatorio", default)]
    pub required: bool,
    pub response_config: ResponseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<QuestionImage>,
}

/// Declared input behavior of a question
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResponseConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<ResponseOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Value carried by a choice option or an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseOption {
    pub label: String,
    pub value: AnswerValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Input kind of a header-level verification field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    #[default]
    Text,
    Number,
    Date,
    Autocomplete,
    /// Any other tag; rendered as plain text
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationField {
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: VerificationKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl VerificationField {
    /// The lookup source for autocomplete fields, if the tag is a known one
    pub fn data_source(&self) -> Option<DataSource> {
        if self.kind != VerificationKind::Autocomplete {
            return None;
        }
        self.data_source.as_deref().and_then(DataSource::parse)
    }
}

/// External lookup lists available to autocomplete fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Area,
    Superintendencia,
    Trabajador,
    Gerencia,
    Cargo,
    Equipo,
}

impl DataSource {
    pub const ALL: [DataSource; 6] = [
        Self::Area,
        Self::Superintendencia,
        Self::Trabajador,
        Self::Gerencia,
        Self::Cargo,
        Self::Equipo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Superintendencia => "superintendencia",
            Self::Trabajador => "trabajador",
            Self::Gerencia => "gerencia",
            Self::Cargo => "cargo",
            Self::Equipo => "equipo",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }
}
