//! Wire shapes for the server's JSON envelopes and their mapping into domain
//! types. Kept separate from the transport so decoding failures and domain
//! validation failures surface as `GatewayError::Serialization` uniformly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use quiz_core::model::{Answer, AnswerId, Question, QuestionId, ScoreReport};

use crate::contract::{GatewayError, Submission};

fn ser<E: core::fmt::Display>(e: E) -> GatewayError {
    GatewayError::Serialization(e.to_string())
}

fn rejected(message: Option<String>) -> GatewayError {
    GatewayError::Rejected(message.unwrap_or_else(|| "request failed".into()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerWire {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionWire {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default)]
    pub answers: Vec<AnswerWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrectAnswersEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub correct_answers: Vec<AnswerWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub percentage: f64,
}

/// Request body for the submit endpoint. Question ids become string keys,
/// matching what a JSON object literal carries on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody {
    pub test_id: u64,
    pub answers: BTreeMap<String, Vec<u64>>,
    pub time_spent: u64,
}

impl SubmitBody {
    pub(crate) fn from_submission(submission: &Submission) -> Self {
        let answers = submission
            .answers
            .iter()
            .map(|(question_id, ids)| {
                (
                    question_id.to_string(),
                    ids.iter().map(AnswerId::value).collect(),
                )
            })
            .collect();

        Self {
            test_id: submission.test_id.value(),
            answers,
            time_spent: submission.time_spent_secs,
        }
    }
}

fn answer_from_wire(wire: AnswerWire) -> Result<Answer, GatewayError> {
    Answer::new(AnswerId::new(wire.id), wire.text).map_err(ser)
}

fn question_from_wire(wire: QuestionWire) -> Result<Question, GatewayError> {
    let answers = wire
        .answers
        .into_iter()
        .map(answer_from_wire)
        .collect::<Result<Vec<_>, _>>()?;

    Question::new(
        QuestionId::new(wire.id),
        wire.text,
        wire.image,
        wire.is_multiple,
        answers,
    )
    .map_err(ser)
}

pub(crate) fn map_questions(envelope: QuestionsEnvelope) -> Result<Vec<Question>, GatewayError> {
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    envelope
        .questions
        .into_iter()
        .map(question_from_wire)
        .collect()
}

pub(crate) fn map_correct_answers(
    envelope: CorrectAnswersEnvelope,
) -> Result<Vec<Answer>, GatewayError> {
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    envelope
        .correct_answers
        .into_iter()
        .map(answer_from_wire)
        .collect()
}

pub(crate) fn map_report(envelope: SubmitEnvelope) -> Result<ScoreReport, GatewayError> {
    if !envelope.success {
        return Err(rejected(envelope.message));
    }
    ScoreReport::new(envelope.score, envelope.total, envelope.percentage).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::TestId;

    #[test]
    fn decodes_question_envelope() {
        let raw = r#"{
            "success": true,
            "questions": [
                {
                    "id": 4,
                    "text": "Which layers sit below TCP?",
                    "image": null,
                    "is_multiple": true,
                    "answers": [
                        {"id": 40, "text": "IP"},
                        {"id": 41, "text": "HTTP"}
                    ]
                }
            ]
        }"#;

        let envelope: QuestionsEnvelope = serde_json::from_str(raw).unwrap();
        let questions = map_questions(envelope).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id(), QuestionId::new(4));
        assert!(questions[0].is_multiple());
        assert_eq!(questions[0].image(), None);
        assert_eq!(questions[0].answers()[1].text(), "HTTP");
    }

    #[test]
    fn rejected_envelope_maps_to_rejected_error() {
        let raw = r#"{"success": false, "message": "not authorized"}"#;
        let envelope: QuestionsEnvelope = serde_json::from_str(raw).unwrap();
        let err = map_questions(envelope).unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(m) if m == "not authorized"));
    }

    #[test]
    fn invalid_question_payload_maps_to_serialization_error() {
        let raw = r#"{
            "success": true,
            "questions": [{"id": 1, "text": "   ", "answers": [{"id": 2, "text": "x"}]}]
        }"#;
        let envelope: QuestionsEnvelope = serde_json::from_str(raw).unwrap();
        let err = map_questions(envelope).unwrap_err();
        assert!(matches!(err, GatewayError::Serialization(_)));
    }

    #[test]
    fn decodes_correct_answers_envelope() {
        let raw = r#"{"success": true, "correct_answers": [{"id": 9, "text": "IP"}]}"#;
        let envelope: CorrectAnswersEnvelope = serde_json::from_str(raw).unwrap();
        let answers = map_correct_answers(envelope).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].id(), AnswerId::new(9));
    }

    #[test]
    fn decodes_submit_envelope() {
        let raw = r#"{"success": true, "score": 2, "total": 3, "percentage": 66.67}"#;
        let envelope: SubmitEnvelope = serde_json::from_str(raw).unwrap();
        let report = map_report(envelope).unwrap();
        assert_eq!(report.score(), 2);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn submit_body_uses_string_keys_and_keeps_empty_entries() {
        let mut answers = BTreeMap::new();
        answers.insert(QuestionId::new(7), vec![AnswerId::new(70)]);
        answers.insert(QuestionId::new(8), Vec::new());
        let submission = Submission {
            test_id: TestId::new(3),
            answers,
            time_spent_secs: 95,
        };

        let body = SubmitBody::from_submission(&submission);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["test_id"], 3);
        assert_eq!(json["time_spent"], 95);
        assert_eq!(json["answers"]["7"][0], 70);
        assert!(json["answers"]["8"].as_array().unwrap().is_empty());
    }
}
