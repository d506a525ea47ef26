use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{AnswerPayload, Question, ResponsePayload, RespondentInfo, Survey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    CollectingRespondentInfo,
    AnsweringQuestion(usize),
    Submitting,
    Submitted,
}

/// Linear response-collection machine: respondent info, one question at a
/// time, then a single submission. Illegal transitions are silent no-ops so
/// callers can wire controls directly to the methods. A failed submission
/// drops back to the last question with the error attached; answers survive
/// and resubmission is allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFlow {
    survey: Survey,
    respondent: RespondentInfo,
    answers: HashMap<i64, String>,
    state: FlowState,
    last_error: Option<String>,
}

impl ResponseFlow {
    pub fn new(survey: Survey) -> Self {
        ResponseFlow {
            survey,
            respondent: RespondentInfo::default(),
            answers: HashMap::new(),
            state: FlowState::CollectingRespondentInfo,
            last_error: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Respondent info is captured once, before paging begins. Callers that
    /// do not collect it simply call `begin_questions` directly.
    pub fn set_respondent_info(&mut self, info: RespondentInfo) -> bool {
        if self.state != FlowState::CollectingRespondentInfo {
            return false;
        }
        self.respondent = info;
        true
    }

    pub fn begin_questions(&mut self) -> bool {
        if self.state != FlowState::CollectingRespondentInfo || self.survey.questions.is_empty() {
            return false;
        }
        self.state = FlowState::AnsweringQuestion(0);
        true
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            FlowState::AnsweringQuestion(index) => self.survey.questions.get(index),
            _ => None,
        }
    }

    /// Records the answer for the question currently on screen. One answer
    /// per question; answering again overwrites.
    pub fn record_answer(&mut self, text: impl Into<String>) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        let id = question.id;
        self.answers.insert(id, text.into());
        true
    }

    pub fn is_answered(&self, question: &Question) -> bool {
        self.answers.contains_key(&question.id) || !question.required
    }

    fn gate_open(&self, index: usize) -> bool {
        self.survey
            .questions
            .get(index)
            .map(|q| self.is_answered(q))
            .unwrap_or(false)
    }

    /// Moves to the next question when the current one is answered or
    /// optional. Never moves past the last question; `begin_submit` owns
    /// that edge.
    pub fn advance(&mut self) -> bool {
        let FlowState::AnsweringQuestion(index) = self.state else {
            return false;
        };
        if index + 1 >= self.survey.questions.len() || !self.gate_open(index) {
            return false;
        }
        self.state = FlowState::AnsweringQuestion(index + 1);
        true
    }

    /// Pages back one question, or back to the respondent-info step from the
    /// first question.
    pub fn back(&mut self) -> bool {
        match self.state {
            FlowState::AnsweringQuestion(0) => {
                self.state = FlowState::CollectingRespondentInfo;
                true
            }
            FlowState::AnsweringQuestion(index) => {
                self.state = FlowState::AnsweringQuestion(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Legal only from the last question with its gate satisfied (or straight
    /// from respondent info for a survey without questions). Returns the
    /// payload for the one network call of this attempt; answers are ordered
    /// by the survey's question order, not by when they were given.
    pub fn begin_submit(&mut self) -> Option<ResponsePayload> {
        let allowed = match self.state {
            FlowState::AnsweringQuestion(index) => {
                index + 1 == self.survey.questions.len() && self.gate_open(index)
            }
            FlowState::CollectingRespondentInfo => self.survey.questions.is_empty(),
            _ => false,
        };
        if !allowed {
            return None;
        }

        self.state = FlowState::Submitting;
        self.last_error = None;
        Some(self.payload())
    }

    pub fn submit_succeeded(&mut self) -> bool {
        if self.state != FlowState::Submitting {
            return false;
        }
        self.state = FlowState::Submitted;
        true
    }

    pub fn submit_failed(&mut self, message: impl Into<String>) -> bool {
        if self.state != FlowState::Submitting {
            return false;
        }
        self.last_error = Some(message.into());
        self.state = match self.survey.questions.len() {
            0 => FlowState::CollectingRespondentInfo,
            n => FlowState::AnsweringQuestion(n - 1),
        };
        true
    }

    fn payload(&self) -> ResponsePayload {
        ResponsePayload {
            survey: self.survey.id,
            respondent_email: self.respondent.email.clone(),
            respondent_name: self.respondent.name.clone(),
            department: self.respondent.department.clone(),
            answers: self
                .survey
                .questions
                .iter()
                .filter_map(|question| {
                    self.answers.get(&question.id).map(|text| AnswerPayload {
                        question: question.id,
                        answer_text: text.clone(),
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;

    fn question(id: i64, required: bool) -> Question {
        Question {
            id,
            kind: QuestionKind::Text,
            question: format!("Question {id}"),
            description: String::new(),
            required,
            order: id,
            options: Vec::new(),
        }
    }

    fn survey(questions: Vec<Question>) -> Survey {
        Survey {
            id: 7,
            title: "Customer Satisfaction".to_string(),
            description: String::new(),
            status: None,
            public_link: None,
            questions,
            response_count: None,
        }
    }

    fn started(questions: Vec<Question>) -> ResponseFlow {
        let mut flow = ResponseFlow::new(survey(questions));
        flow.begin_questions();
        flow
    }

    #[test]
    fn required_question_blocks_advance() {
        let mut flow = started(vec![question(1, true), question(2, true)]);
        assert!(!flow.advance());
        assert_eq!(flow.state(), FlowState::AnsweringQuestion(0));

        flow.record_answer("Yes");
        assert!(flow.advance());
        assert_eq!(flow.state(), FlowState::AnsweringQuestion(1));
    }

    #[test]
    fn optional_question_may_be_skipped() {
        let mut flow = started(vec![question(1, false), question(2, true)]);
        assert!(flow.advance());
        assert_eq!(flow.state(), FlowState::AnsweringQuestion(1));
    }

    #[test]
    fn submit_only_from_answered_last_question() {
        let mut flow = started(vec![question(1, true), question(2, true)]);
        flow.record_answer("first");
        assert!(flow.begin_submit().is_none());

        flow.advance();
        assert!(flow.begin_submit().is_none());

        flow.record_answer("second");
        let payload = flow.begin_submit().expect("submit should open");
        assert_eq!(flow.state(), FlowState::Submitting);
        assert_eq!(payload.survey, 7);
        assert_eq!(payload.answers.len(), 2);
    }

    #[test]
    fn answers_follow_question_order() {
        let mut flow = started(vec![question(1, false), question(2, true)]);
        flow.advance();
        flow.record_answer("second");
        flow.back();
        flow.record_answer("first");
        flow.advance();

        let payload = flow.begin_submit().unwrap();
        let ids: Vec<i64> = payload.answers.iter().map(|a| a.question).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(payload.answers[0].answer_text, "first");
    }

    #[test]
    fn submitted_is_terminal() {
        let mut flow = started(vec![question(1, true)]);
        flow.record_answer("done");
        flow.begin_submit().unwrap();
        assert!(flow.submit_succeeded());
        assert_eq!(flow.state(), FlowState::Submitted);

        assert!(!flow.record_answer("late"));
        assert!(!flow.advance());
        assert!(!flow.back());
        assert!(flow.begin_submit().is_none());
    }

    #[test]
    fn failure_reverts_to_last_question_and_keeps_answers() {
        let mut flow = started(vec![question(1, true), question(2, true)]);
        flow.record_answer("a");
        flow.advance();
        flow.record_answer("b");
        flow.begin_submit().unwrap();
        assert!(flow.submit_failed("server returned 500: request failed"));

        assert_eq!(flow.state(), FlowState::AnsweringQuestion(1));
        assert_eq!(flow.last_error(), Some("server returned 500: request failed"));

        // Retry without re-entering anything.
        let payload = flow.begin_submit().expect("resubmission allowed");
        assert_eq!(payload.answers.len(), 2);
        assert!(flow.last_error().is_none());
    }

    #[test]
    fn respondent_info_is_captured_once() {
        let mut flow = ResponseFlow::new(survey(vec![question(1, false)]));
        assert!(flow.set_respondent_info(RespondentInfo {
            email: Some("sam@example.com".to_string()),
            name: Some("Sam".to_string()),
            department: None,
        }));
        flow.begin_questions();
        assert!(!flow.set_respondent_info(RespondentInfo::default()));

        let payload = flow.begin_submit().unwrap();
        assert_eq!(payload.respondent_email.as_deref(), Some("sam@example.com"));
    }

    #[test]
    fn first_question_pages_back_to_respondent_info() {
        let mut flow = started(vec![question(1, false)]);
        assert!(flow.back());
        assert_eq!(flow.state(), FlowState::CollectingRespondentInfo);
        assert!(flow.begin_questions());
    }

    #[test]
    fn empty_survey_submits_from_respondent_info() {
        let mut flow = ResponseFlow::new(survey(Vec::new()));
        assert!(!flow.begin_questions());
        let payload = flow.begin_submit().expect("nothing to answer");
        assert!(payload.answers.is_empty());
    }
}
