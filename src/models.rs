use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Text,
    Rating,
    YesNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Draft,
    Active,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub description: String,
    pub required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<SurveyStatus>,
    #[serde(default)]
    pub public_link: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub response_count: Option<i64>,
}

/// Payload for `POST /surveys/`, deserialized from a survey definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSurvey {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOption {
    pub text: String,
    #[serde(default)]
    pub order: i64,
}

/// Partial update for `PATCH /surveys/{id}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SurveyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SurveyStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentInfo {
    pub email: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
}

impl RespondentInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.department.is_none()
    }
}

/// Payload for `POST /responses/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub survey: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question: i64,
    pub answer_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyResults {
    #[serde(rename = "totalResponses")]
    pub total_responses: u64,
    pub questions: Vec<QuestionResults>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResults {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default)]
    pub responses: QuestionResponses,
    #[serde(rename = "averageRating", default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub distribution: Option<Vec<RatingCount>>,
}

/// Choice questions report option tallies; text questions report raw answers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuestionResponses {
    Options(Vec<OptionCount>),
    Texts(Vec<String>),
}

impl Default for QuestionResponses {
    fn default() -> Self {
        QuestionResponses::Texts(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingCount {
    pub rating: u32,
    pub count: u64,
}

/// One day of response volume, as charted on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub count: u32,
}

/// A point on the fitted trend line; derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub name: String,
    pub completed: u64,
    pub incomplete: u64,
}
