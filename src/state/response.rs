//! Response document handed to the save/submit endpoints

use super::forms::FieldPath;
use super::template::AnswerValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Draft,
    Completed,
}

impl ResponseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
        }
    }
}

/// Answer to a single question plus its optional note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub value: AnswerValue,
    #[serde(rename = "observacion", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Durable id of the question, when the template provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDocument {
    pub template_id: String,
    pub verification_data: BTreeMap<String, AnswerValue>,
    pub responses: BTreeMap<FieldPath, QuestionResponse>,
    pub submitted_at: DateTime<Utc>,
    pub status: ResponseStatus,
}

impl ResponseDocument {
    pub fn answer(&self, path: &FieldPath) -> Option<&QuestionResponse> {
        self.responses.get(path)
    }

    /// Find an entry by the durable question id
    pub fn answer_by_question_id(&self, id: &str) -> Option<&QuestionResponse> {
        self.responses
            .values()
            .find(|r| r.question_id.as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::SectionPath;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> ResponseDocument {
        let mut responses = BTreeMap::new();
        responses.insert(
            SectionPath::root(0).question(0),
            QuestionResponse {
                value: AnswerValue::Text("si".to_string()),
                note: Some("Costura lateral gastada".to_string()),
                question_id: Some("q-1".to_string()),
            },
        );
        responses.insert(
            SectionPath::root(1).child(0).question(2),
            QuestionResponse {
                value: AnswerValue::Bool(false),
                note: None,
                question_id: None,
            },
        );

        let mut verification_data = BTreeMap::new();
        verification_data.insert("Área".to_string(), AnswerValue::Text("Mina".to_string()));

        ResponseDocument {
            template_id: "tpl-1".to_string(),
            verification_data,
            responses,
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            status: ResponseStatus::Draft,
        }
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "templateId": "tpl-1",
                "verificationData": { "Área": "Mina" },
                "responses": {
                    "responses.s0.q0": {
                        "value": "si",
                        "observacion": "Costura lateral gastada",
                        "questionId": "q-1"
                    },
                    "responses.s1.sub0.q2": { "value": false }
                },
                "submittedAt": "2024-05-01T12:00:00Z",
                "status": "draft"
            })
        );
    }

    #[test]
    fn test_deserialize_back() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: ResponseDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_lookup_by_question_id() {
        let doc = sample();
        assert_eq!(
            doc.answer_by_question_id("q-1").unwrap().value,
            AnswerValue::Text("si".to_string())
        );
        assert!(doc.answer_by_question_id("missing").is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ResponseStatus::Draft.label(), "draft");
        assert_eq!(ResponseStatus::Completed.label(), "completed");
    }
}
