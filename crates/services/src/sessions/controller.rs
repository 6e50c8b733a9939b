use std::sync::Arc;

use tracing::{info, warn};

use client::{ClientError, TestBackend};
use quiz_core::Clock;
use quiz_core::model::{AttemptId, Test, TestId};

use crate::error::{SessionError, StartError};
use super::events::{Effect, Notice, SessionEvent};
use super::service::Session;
use super::submit::{AnswerSubmitter, SubmitOutcome};
use super::timer::TimerTick;
use super::view::SessionView;

/// Outcome of one controller step: notices to surface, and the results
/// handoff once the attempt has been finalized.
#[derive(Debug, Default)]
pub struct Step {
    pub notices: Vec<Notice>,
    pub end: Option<SessionEnd>,
}

/// Handoff to the results collaborator, keyed by the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEnd {
    pub attempt_id: AttemptId,
}

/// Orchestrates one test-taking session.
///
/// Owns the session state machine and the submitter, loads the test and
/// creates the attempt on start, and interprets the effects each event
/// produces: answer submissions, attempt finalization, user notices.
pub struct SessionController {
    backend: Arc<dyn TestBackend>,
    submitter: AnswerSubmitter,
    session: Session,
}

impl SessionController {
    /// Starts a session for a test addressed by id.
    ///
    /// # Errors
    ///
    /// Returns `StartError::TestUnavailable` when the test cannot be
    /// loaded and `StartError::AttemptCreation` when the backend refuses
    /// to open an attempt. Both are fatal for the session.
    pub async fn start_by_test_id(
        backend: Arc<dyn TestBackend>,
        clock: Clock,
        test_id: TestId,
    ) -> Result<Self, StartError> {
        let test = backend
            .fetch_test(test_id)
            .await
            .map_err(StartError::TestUnavailable)?;
        Self::start(backend, clock, test).await
    }

    /// Starts a session for a test addressed by its public share token.
    ///
    /// # Errors
    ///
    /// Same failure modes as `start_by_test_id`.
    pub async fn start_by_share_token(
        backend: Arc<dyn TestBackend>,
        clock: Clock,
        token: &str,
    ) -> Result<Self, StartError> {
        let test = backend
            .fetch_test_by_token(token)
            .await
            .map_err(StartError::TestUnavailable)?;
        Self::start(backend, clock, test).await
    }

    async fn start(
        backend: Arc<dyn TestBackend>,
        clock: Clock,
        test: Test,
    ) -> Result<Self, StartError> {
        let attempt_id = backend
            .start_attempt(test.id())
            .await
            .map_err(StartError::AttemptCreation)?;
        info!(test_id = %test.id(), attempt_id = %attempt_id, "attempt started");

        let session = Session::new(test, attempt_id, clock.now());
        Ok(Self {
            backend,
            submitter: AnswerSubmitter::new(),
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Projects the current state for rendering.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::project(&self.session)
    }

    /// Applies one event and runs the resulting effects.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` when the backend invalidates the
    /// session token; every other backend failure becomes a notice.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<Step, SessionError> {
        let effects = self.session.apply(event);
        self.run_effects(effects).await
    }

    /// Delivers one wall-clock second to the question timer.
    ///
    /// The driver calls this once per second; expiry is translated into a
    /// `TimerExpired` event.
    ///
    /// # Errors
    ///
    /// Same failure modes as `handle`.
    pub async fn tick(&mut self) -> Result<Step, SessionError> {
        match self.session.tick_timer() {
            TimerTick::Expired => self.handle(SessionEvent::TimerExpired).await,
            TimerTick::Idle | TimerTick::Running(_) => Ok(Step::default()),
        }
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) -> Result<Step, SessionError> {
        let mut step = Step::default();
        for effect in effects {
            match effect {
                Effect::Notify(notice) => step.notices.push(notice),
                Effect::SubmitAnswer { question_id, value } => {
                    let outcome = self
                        .submitter
                        .submit(
                            self.backend.as_ref(),
                            self.session.attempt_id(),
                            question_id,
                            &value,
                        )
                        .await?;
                    if let SubmitOutcome::Failed(notice) = outcome {
                        step.notices.push(notice);
                    }
                }
                Effect::FinishAttempt => {
                    let attempt_id = self.session.attempt_id();
                    match self.backend.finish_attempt(attempt_id).await {
                        Ok(()) => {
                            info!(attempt_id = %attempt_id, "attempt finished");
                            self.session.mark_finished();
                            step.end = Some(SessionEnd { attempt_id });
                            step.notices.push(Notice::info("Test finished"));
                        }
                        Err(ClientError::Unauthorized) => return Err(SessionError::Expired),
                        Err(err) => {
                            warn!(attempt_id = %attempt_id, error = %err, "finish failed");
                            self.session.finish_failed();
                            step.notices
                                .push(Notice::error(format!("Could not finish the test: {err}")));
                        }
                    }
                }
            }
        }
        Ok(step)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
