use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::controller::{QuizSession, SubmissionRequest};
use super::view::SessionView;
use super::SessionStatus;
use crate::error::{Error, Result};
use crate::models::{OptionLetter, QuestionId, QuizDefinition, SubmissionResult};
use crate::services::quiz_service::QuizBackend;

const COMMAND_BUFFER: usize = 32;

/// User intents forwarded to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SelectAnswer {
        question_id: QuestionId,
        letter: OptionLetter,
    },
    SelectCurrent(OptionLetter),
    GoTo(usize),
    Next,
    Previous,
    Submit,
    Restart,
    Close,
}

impl FromStr for SessionCommand {
    type Err = String;

    /// Parses the terminal shorthand: `a`-`d`, `n`, `p`, `g <n>` (1-based), `s`, `r`, `q`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let head = parts.next().unwrap_or_default().to_ascii_lowercase();
        let command = match head.as_str() {
            "a" | "b" | "c" | "d" => SessionCommand::SelectCurrent(head.parse()?),
            "n" => SessionCommand::Next,
            "p" => SessionCommand::Previous,
            "s" => SessionCommand::Submit,
            "r" => SessionCommand::Restart,
            "q" => SessionCommand::Close,
            "g" => {
                let number: usize = parts
                    .next()
                    .and_then(|n| n.parse().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| "usage: g <question number>".to_string())?;
                SessionCommand::GoTo(number - 1)
            }
            other => return Err(format!("unknown command: {}", other)),
        };
        if parts.next().is_some() {
            return Err(format!("unexpected input after '{}'", head));
        }
        Ok(command)
    }
}

enum Outcome {
    Loaded(Result<QuizDefinition>),
    Submitted(Result<SubmissionResult>),
}

/// Hosts a [`QuizSession`] on the tokio runtime.
///
/// The runner is the only owner of the countdown interval and the only
/// caller of the session's transition methods. Backend calls run as
/// detached tasks and report back over a channel, so a response that
/// arrives after close finds nobody listening.
pub struct SessionRunner<B> {
    backend: Arc<B>,
    session: QuizSession,
    tick_period: Duration,
}

pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    views: watch::Receiver<SessionView>,
    task: JoinHandle<QuizSession>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::Anyhow(anyhow::anyhow!("quiz session is no longer running")))
    }

    pub fn views(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    pub fn current_view(&self) -> SessionView {
        self.views.borrow().clone()
    }

    /// Closes the session and waits for the runner to hand it back.
    pub async fn close(self) -> Result<QuizSession> {
        let _ = self.commands.send(SessionCommand::Close).await;
        self.task
            .await
            .map_err(|e| Error::Anyhow(anyhow::anyhow!("quiz session task failed: {}", e)))
    }
}

impl<B> SessionRunner<B>
where
    B: QuizBackend + 'static,
{
    pub fn new(backend: Arc<B>, session: QuizSession, tick_period: Duration) -> Self {
        Self {
            backend,
            session,
            tick_period,
        }
    }

    pub fn spawn(self) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (views_tx, views_rx) = watch::channel(SessionView::from(&self.session));
        let task = tokio::spawn(self.run(commands_rx, views_tx));
        SessionHandle {
            commands: commands_tx,
            views: views_rx,
            task,
        }
    }

    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        views: watch::Sender<SessionView>,
    ) -> QuizSession {
        let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
        self.spawn_load(&outcome_tx);

        let mut ticker = time::interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick(), if self.session.status() == SessionStatus::Active => {
                    if let Some(request) = self.session.tick() {
                        self.spawn_submit(request, &outcome_tx);
                    }
                }
                Some(outcome) = outcomes.recv() => {
                    self.apply_outcome(outcome, &mut ticker);
                }
                command = commands.recv() => {
                    match command {
                        None | Some(SessionCommand::Close) => {
                            self.session.close();
                            views.send_replace(SessionView::from(&self.session));
                            break;
                        }
                        Some(command) => self.apply_command(command, &outcome_tx, &mut ticker),
                    }
                }
            }
            views.send_replace(SessionView::from(&self.session));
        }

        info!(quiz_id = %self.session.quiz_id(), "quiz session runner stopped");
        self.session
    }

    fn apply_outcome(&mut self, outcome: Outcome, ticker: &mut Interval) {
        match outcome {
            Outcome::Loaded(result) => {
                if self.session.finish_loading(result)
                    && self.session.status() == SessionStatus::Active
                {
                    ticker.reset();
                }
            }
            Outcome::Submitted(result) => {
                self.session.finish_submission(result);
            }
        }
    }

    fn apply_command(
        &mut self,
        command: SessionCommand,
        outcome_tx: &mpsc::UnboundedSender<Outcome>,
        ticker: &mut Interval,
    ) {
        let applied = match command.clone() {
            SessionCommand::SelectAnswer {
                question_id,
                letter,
            } => self.session.select_answer(question_id, letter),
            SessionCommand::SelectCurrent(letter) => self.session.select_current(letter),
            SessionCommand::GoTo(index) => self.session.go_to(index),
            SessionCommand::Next => self.session.next().map(|_| ()),
            SessionCommand::Previous => self.session.previous().map(|_| ()),
            SessionCommand::Submit => self.session.submit().map(|request| {
                self.spawn_submit(request, outcome_tx);
            }),
            SessionCommand::Restart => self.session.restart().map(|_| ticker.reset()),
            SessionCommand::Close => Ok(()),
        };

        if let Err(err) = applied {
            debug!(?command, error = %err, "command rejected");
        }
    }

    fn spawn_load(&self, outcome_tx: &mpsc::UnboundedSender<Outcome>) {
        let backend = Arc::clone(&self.backend);
        let quiz_id = self.session.quiz_id().clone();
        let tx = outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.fetch_quiz(&quiz_id).await;
            let _ = tx.send(Outcome::Loaded(outcome));
        });
    }

    fn spawn_submit(&self, request: SubmissionRequest, outcome_tx: &mpsc::UnboundedSender<Outcome>) {
        let backend = Arc::clone(&self.backend);
        let tx = outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = backend
                .submit_quiz(&request.quiz_id, &request.user_id, &request.answers)
                .await;
            let _ = tx.send(Outcome::Submitted(outcome));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SessionContext;
    use crate::models::{AnswerSet, Id, Question, QuizId, Role, User, UserId};
    use crate::services::quiz_service::MockQuizBackend;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::assert_ok;

    fn context() -> SessionContext {
        SessionContext::signed_in(
            User {
                id: Id::from(42),
                email: "sara@uca.ma".to_string(),
                first_name: "Sara".to_string(),
                last_name: "Benali".to_string(),
                role: Role::Student,
                profile_picture: None,
            },
            "jwt",
        )
    }

    fn two_question_quiz(minutes: u32) -> QuizDefinition {
        QuizDefinition {
            id: Id::from(7),
            title: Some("Spring".to_string()),
            time_limit_minutes: minutes,
            passing_score: 50,
            questions: ["q1", "q2"]
                .iter()
                .map(|id| Question {
                    id: Id::from(*id),
                    question_text: format!("Question {}", id),
                    options: OptionLetter::ALL
                        .iter()
                        .map(|l| (*l, l.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                })
                .collect(),
        }
    }

    fn full_marks() -> SubmissionResult {
        SubmissionResult {
            score: 100,
            correct_answers: 2,
            total_questions: 2,
            passed: true,
        }
    }

    #[test]
    fn parses_terminal_shorthand() {
        assert_eq!("B".parse::<SessionCommand>(), Ok(SessionCommand::SelectCurrent(OptionLetter::B)));
        assert_eq!(" n ".parse::<SessionCommand>(), Ok(SessionCommand::Next));
        assert_eq!("g 3".parse::<SessionCommand>(), Ok(SessionCommand::GoTo(2)));
        assert_eq!("q".parse::<SessionCommand>(), Ok(SessionCommand::Close));
        assert!("g 0".parse::<SessionCommand>().is_err());
        assert!("g".parse::<SessionCommand>().is_err());
        assert!("s now".parse::<SessionCommand>().is_err());
        assert!("e".parse::<SessionCommand>().is_err());
        assert!("".parse::<SessionCommand>().is_err());
    }

    fn spawn_runner<B: QuizBackend + 'static>(backend: B) -> SessionHandle {
        let session = QuizSession::new(Id::from(7), &context());
        SessionRunner::new(Arc::new(backend), session, Duration::from_secs(1)).spawn()
    }

    async fn wait_for_status(handle: &SessionHandle, status: SessionStatus) -> SessionView {
        let mut views = handle.views();
        let view = views
            .wait_for(|v| v.status == status)
            .await
            .expect("runner stopped early")
            .clone();
        view
    }

    #[tokio::test]
    async fn manual_submission_is_sent_once() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .times(1)
            .returning(|_| Ok(two_question_quiz(10)));
        backend
            .expect_submit_quiz()
            .withf(|quiz_id, user_id, answers| {
                quiz_id.as_str() == "7"
                    && user_id.as_str() == "42"
                    && answers.get(&Id::from("q1")) == Some(OptionLetter::A)
                    && answers.get(&Id::from("q2")) == Some(OptionLetter::B)
            })
            .times(1)
            .returning(|_, _, _| Ok(full_marks()));

        let handle = spawn_runner(backend);
        wait_for_status(&handle, SessionStatus::Active).await;

        assert_ok!(handle.send(SessionCommand::SelectCurrent(OptionLetter::A)).await);
        assert_ok!(handle.send(SessionCommand::Next).await);
        handle
            .send(SessionCommand::SelectAnswer {
                question_id: Id::from("q2"),
                letter: OptionLetter::B,
            })
            .await
            .unwrap();
        assert_ok!(handle.send(SessionCommand::Submit).await);
        assert_ok!(handle.send(SessionCommand::Submit).await);

        let view = wait_for_status(&handle, SessionStatus::Completed).await;
        assert_eq!(view.result.unwrap().headline, "You Passed!");

        let session = handle.close().await.unwrap();
        assert_eq!(session.submissions_sent(), 1);
        assert_eq!(session.result(), Some(&full_marks()));
        assert_eq!(session.status(), SessionStatus::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_submits_automatically() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .times(1)
            .returning(|_| Ok(two_question_quiz(1)));
        backend
            .expect_submit_quiz()
            .withf(|_, _, answers| answers.len() == 1)
            .times(1)
            .returning(|_, _, _| {
                Ok(SubmissionResult {
                    score: 50,
                    correct_answers: 1,
                    total_questions: 2,
                    passed: true,
                })
            });

        let handle = spawn_runner(backend);
        wait_for_status(&handle, SessionStatus::Active).await;
        assert_ok!(handle.send(SessionCommand::SelectCurrent(OptionLetter::C)).await);

        let view = wait_for_status(&handle, SessionStatus::Completed).await;
        assert_eq!(view.timer, "00:00");

        let session = handle.close().await.unwrap();
        assert_eq!(session.submissions_sent(), 1);
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[tokio::test]
    async fn load_failure_is_published() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .times(1)
            .returning(|_| Err(Error::NotFound("quiz 7".to_string())));
        backend.expect_submit_quiz().never();

        let handle = spawn_runner(backend);
        let view = wait_for_status(&handle, SessionStatus::LoadFailed).await;
        assert!(view.error.unwrap().contains("Failed to load quiz"));

        assert_ok!(handle.send(SessionCommand::Submit).await);
        let session = handle.close().await.unwrap();
        assert_eq!(session.submissions_sent(), 0);
    }

    struct SlowBackend {
        submissions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QuizBackend for SlowBackend {
        async fn fetch_quiz(&self, _quiz_id: &QuizId) -> Result<QuizDefinition> {
            Ok(two_question_quiz(5))
        }

        async fn submit_quiz(
            &self,
            _quiz_id: &QuizId,
            _user_id: &UserId,
            _answers: &AnswerSet,
        ) -> Result<SubmissionResult> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(full_marks())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn response_after_close_is_discarded() {
        let submissions = Arc::new(AtomicUsize::new(0));
        let handle = spawn_runner(SlowBackend {
            submissions: Arc::clone(&submissions),
        });
        wait_for_status(&handle, SessionStatus::Active).await;

        assert_ok!(handle.send(SessionCommand::Submit).await);
        wait_for_status(&handle, SessionStatus::Submitting).await;

        let session = handle.close().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(session.status(), SessionStatus::Closed);
        assert!(session.result().is_none());
        assert_eq!(submissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_stops_once_completed() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .times(1)
            .returning(|_| Ok(two_question_quiz(1)));
        backend
            .expect_submit_quiz()
            .times(1)
            .returning(|_, _, _| Ok(full_marks()));

        let handle = spawn_runner(backend);
        wait_for_status(&handle, SessionStatus::Active).await;
        assert_ok!(handle.send(SessionCommand::Submit).await);
        wait_for_status(&handle, SessionStatus::Completed).await;

        let mut views = handle.views();
        let timer = views.borrow_and_update().timer.clone();
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(1001)).await;
        }
        assert!(!views.has_changed().unwrap());
        assert_eq!(views.borrow().timer, timer);

        let session = handle.close().await.unwrap();
        assert_eq!(session.submissions_sent(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_runs_a_fresh_countdown() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .times(1)
            .returning(|_| Ok(two_question_quiz(1)));
        backend
            .expect_submit_quiz()
            .times(1)
            .returning(|_, _, _| Ok(full_marks()));

        let handle = spawn_runner(backend);
        wait_for_status(&handle, SessionStatus::Active).await;
        assert_ok!(handle.send(SessionCommand::Submit).await);
        wait_for_status(&handle, SessionStatus::Completed).await;

        assert_ok!(handle.send(SessionCommand::Restart).await);
        let view = wait_for_status(&handle, SessionStatus::Active).await;
        assert_eq!(view.timer, "01:00");
        assert!(view.dots.iter().all(|d| *d != crate::session::NavDot::Answered));

        let session = handle.close().await.unwrap();
        assert!(session.answers().is_empty());
        assert_eq!(session.current_index(), 0);
    }
}
