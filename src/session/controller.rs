use tracing::{debug, info, warn};

use super::SessionStatus;
use crate::context::SessionContext;
use crate::error::{PreconditionError, Result, SessionError};
use crate::models::{
    AnswerSet, OptionLetter, Question, QuestionId, QuizDefinition, QuizId, SubmissionResult,
    UserId,
};
use crate::utils::time::format_countdown;

/// Payload to send to the backend when a session leaves `Active`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub quiz_id: QuizId,
    pub user_id: UserId,
    pub answers: AnswerSet,
}

/// State machine for one attempt at one quiz.
///
/// The session owns no timer and performs no I/O. The host calls [`tick`]
/// once per period and forwards backend outcomes through
/// [`finish_loading`] and [`finish_submission`]. Every transition that
/// produces a [`SubmissionRequest`] goes through the single
/// `Active -> Submitting` edge, so at most one request is in flight.
///
/// [`tick`]: QuizSession::tick
/// [`finish_loading`]: QuizSession::finish_loading
/// [`finish_submission`]: QuizSession::finish_submission
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: QuizId,
    user_id: Option<UserId>,
    status: SessionStatus,
    quiz: Option<QuizDefinition>,
    answers: AnswerSet,
    current: usize,
    remaining_seconds: u32,
    result: Option<SubmissionResult>,
    error: Option<SessionError>,
    submissions_sent: u32,
}

impl QuizSession {
    pub fn new(quiz_id: QuizId, context: &SessionContext) -> Self {
        Self {
            quiz_id,
            user_id: context.current_user_id().cloned(),
            status: SessionStatus::Loading,
            quiz: None,
            answers: AnswerSet::new(),
            current: 0,
            remaining_seconds: 0,
            result: None,
            error: None,
            submissions_sent: 0,
        }
    }

    /// Applies the outcome of the quiz fetch. Returns `false` when the
    /// session was no longer waiting for it.
    pub fn finish_loading(&mut self, outcome: Result<QuizDefinition>) -> bool {
        if self.status != SessionStatus::Loading {
            debug!(quiz_id = %self.quiz_id, status = %self.status, "discarding quiz load outcome");
            return false;
        }

        match outcome.map_err(|e| e.to_string()).and_then(|quiz| {
            quiz.validate()?;
            Ok(quiz)
        }) {
            Ok(quiz) => {
                info!(
                    quiz_id = %self.quiz_id,
                    questions = quiz.question_count(),
                    minutes = quiz.time_limit_minutes,
                    "quiz loaded"
                );
                self.remaining_seconds = quiz.time_limit_seconds();
                self.quiz = Some(quiz);
                self.answers.clear();
                self.current = 0;
                self.error = None;
                self.status = SessionStatus::Active;
            }
            Err(reason) => {
                warn!(quiz_id = %self.quiz_id, %reason, "quiz failed to load");
                self.error = Some(SessionError::Load(reason));
                self.status = SessionStatus::LoadFailed;
            }
        }
        true
    }

    /// Advances the countdown by one period. Returns the submission to send
    /// when this tick exhausted the time limit.
    pub fn tick(&mut self) -> Option<SubmissionRequest> {
        if self.status != SessionStatus::Active || self.remaining_seconds == 0 {
            return None;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds > 0 {
            return None;
        }

        info!(quiz_id = %self.quiz_id, "time is up, submitting automatically");
        match self.begin_submission() {
            Ok(request) => Some(request),
            Err(err) => {
                warn!(quiz_id = %self.quiz_id, error = %err, "automatic submission refused");
                self.error = Some(err);
                None
            }
        }
    }

    /// Manual submission. Honoured from `Active`, and from `SubmitFailed` as a retry.
    pub fn submit(&mut self) -> std::result::Result<SubmissionRequest, SessionError> {
        match self.status {
            SessionStatus::Active | SessionStatus::SubmitFailed => {}
            status => {
                return Err(PreconditionError::InvalidState {
                    operation: "submit",
                    status,
                }
                .into())
            }
        }
        let outcome = self.begin_submission();
        if let Err(err) = &outcome {
            self.error = Some(err.clone());
        }
        outcome
    }

    fn begin_submission(&mut self) -> std::result::Result<SubmissionRequest, SessionError> {
        let user_id = self
            .user_id
            .clone()
            .ok_or(PreconditionError::MissingUser)?;

        self.status = SessionStatus::Submitting;
        self.error = None;
        self.submissions_sent += 1;
        info!(
            quiz_id = %self.quiz_id,
            answered = self.answers.len(),
            "submitting answers"
        );

        Ok(SubmissionRequest {
            quiz_id: self.quiz_id.clone(),
            user_id,
            answers: self.answers.clone(),
        })
    }

    /// Applies the backend's response to a submission. Returns `false` when
    /// no submission was pending.
    pub fn finish_submission(&mut self, outcome: Result<SubmissionResult>) -> bool {
        if self.status != SessionStatus::Submitting {
            debug!(quiz_id = %self.quiz_id, status = %self.status, "discarding submission outcome");
            return false;
        }

        match outcome.map_err(|e| e.to_string()).and_then(|result| {
            result.validate()?;
            Ok(result)
        }) {
            Ok(result) => {
                info!(
                    quiz_id = %self.quiz_id,
                    score = result.score,
                    passed = result.passed,
                    "quiz submitted"
                );
                self.result = Some(result);
                self.status = SessionStatus::Completed;
            }
            Err(reason) => {
                warn!(quiz_id = %self.quiz_id, %reason, "quiz submission failed");
                self.error = Some(SessionError::Submission(reason));
                self.status = SessionStatus::SubmitFailed;
            }
        }
        true
    }

    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> std::result::Result<(), SessionError> {
        let quiz = self.active_quiz("select an answer")?;
        let question = quiz
            .find_question(&question_id)
            .ok_or_else(|| PreconditionError::UnknownQuestion(question_id.clone()))?;
        if !question.has_option(letter) {
            return Err(PreconditionError::UnavailableOption {
                question_id,
                letter,
            }
            .into());
        }

        self.answers.select(question_id, letter);
        Ok(())
    }

    /// Selects an option on the question under the cursor.
    pub fn select_current(&mut self, letter: OptionLetter) -> std::result::Result<(), SessionError> {
        let question_id = self
            .active_quiz("select an answer")?
            .question(self.current)
            .map(|q| q.id.clone())
            .ok_or(PreconditionError::IndexOutOfRange {
                index: self.current,
                count: self.question_count(),
            })?;
        self.select_answer(question_id, letter)
    }

    pub fn go_to(&mut self, index: usize) -> std::result::Result<(), SessionError> {
        let count = self.active_quiz("navigate")?.question_count();
        if index >= count {
            return Err(PreconditionError::IndexOutOfRange { index, count }.into());
        }
        self.current = index;
        Ok(())
    }

    pub fn next(&mut self) -> std::result::Result<usize, SessionError> {
        let count = self.active_quiz("navigate")?.question_count();
        if self.current + 1 < count {
            self.current += 1;
        }
        Ok(self.current)
    }

    pub fn previous(&mut self) -> std::result::Result<usize, SessionError> {
        self.active_quiz("navigate")?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Starts a new attempt on the already loaded quiz.
    pub fn restart(&mut self) -> std::result::Result<(), SessionError> {
        if self.status != SessionStatus::Completed {
            return Err(PreconditionError::InvalidState {
                operation: "restart",
                status: self.status,
            }
            .into());
        }
        let Some(quiz) = self.quiz.as_ref() else {
            return Err(PreconditionError::InvalidState {
                operation: "restart",
                status: self.status,
            }
            .into());
        };

        self.remaining_seconds = quiz.time_limit_seconds();
        self.answers.clear();
        self.current = 0;
        self.result = None;
        self.error = None;
        self.status = SessionStatus::Active;
        info!(quiz_id = %self.quiz_id, "quiz restarted");
        Ok(())
    }

    /// Tears the session down. Later backend outcomes are ignored.
    pub fn close(&mut self) {
        if self.status != SessionStatus::Closed {
            debug!(quiz_id = %self.quiz_id, from = %self.status, "session closed");
            self.status = SessionStatus::Closed;
        }
    }

    fn active_quiz(&self, operation: &'static str) -> std::result::Result<&QuizDefinition, PreconditionError> {
        let invalid = PreconditionError::InvalidState {
            operation,
            status: self.status,
        };
        if self.status != SessionStatus::Active {
            return Err(invalid);
        }
        self.quiz.as_ref().ok_or(invalid)
    }

    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn quiz(&self) -> Option<&QuizDefinition> {
        self.quiz.as_ref()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.as_ref().and_then(|q| q.question(self.current))
    }

    pub fn question_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, QuizDefinition::question_count)
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.question_count()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Number of submission requests this session has handed out.
    pub fn submissions_sent(&self) -> u32 {
        self.submissions_sent
    }

    /// `(current + 1) / count`, or zero for an empty quiz.
    pub fn progress(&self) -> f64 {
        match self.question_count() {
            0 => 0.0,
            count => (self.current + 1) as f64 / count as f64,
        }
    }

    pub fn progress_percent(&self) -> u32 {
        (self.progress() * 100.0).round() as u32
    }

    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.answers.is_answered(question_id)
    }

    /// Answered flag for each question, in quiz order.
    pub fn answered_flags(&self) -> Vec<bool> {
        self.quiz
            .as_ref()
            .map(|quiz| {
                quiz.questions
                    .iter()
                    .map(|q| self.answers.is_answered(&q.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn formatted_remaining(&self) -> String {
        format_countdown(self.remaining_seconds)
    }
}
