use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use client::{ClientError, TestBackend};
use quiz_core::model::{AnswerValue, AttemptId, QuestionId};

use crate::error::SessionError;
use super::events::Notice;

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend acknowledged the answer.
    Sent,
    /// A submission was already in flight; this one was dropped without a
    /// request. Happens on rapid duplicate clicks.
    Dropped,
    /// The backend rejected or failed the request. The buffered answer is
    /// kept; the notice is shown to the user. Nothing is retried.
    Failed(Notice),
}

/// Sends answers to the backend, at most one request in flight per session.
///
/// Local state is optimistic: the answer buffer is written before the
/// request goes out and is never rolled back on failure, so the UI always
/// reflects the user's last choice.
#[derive(Debug, Default)]
pub struct AnswerSubmitter {
    in_flight: AtomicBool,
}

impl AnswerSubmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks a submission as in flight. Returns false when one already is.
    fn try_begin(&self) -> bool {
        !self.in_flight.swap(true, Ordering::AcqRel)
    }

    fn end(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Submits one answer in wire encoding.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Expired` when the backend answers 401; every
    /// other failure is downgraded to `SubmitOutcome::Failed`.
    pub async fn submit(
        &self,
        backend: &dyn TestBackend,
        attempt_id: AttemptId,
        question_id: QuestionId,
        value: &AnswerValue,
    ) -> Result<SubmitOutcome, SessionError> {
        if !self.try_begin() {
            debug!(question_id = %question_id, "submission already in flight, dropping");
            return Ok(SubmitOutcome::Dropped);
        }

        let result = backend.submit_answer(attempt_id, question_id, value).await;
        self.end();

        match result {
            Ok(()) => Ok(SubmitOutcome::Sent),
            Err(ClientError::Unauthorized) => Err(SessionError::Expired),
            Err(err) => {
                warn!(
                    attempt_id = %attempt_id,
                    question_id = %question_id,
                    error = %err,
                    "answer submission failed"
                );
                Ok(SubmitOutcome::Failed(Notice::error(
                    "Could not save the answer",
                )))
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use client::InMemoryBackend;
    use quiz_core::model::{Question, QuestionKind, Test, TestId};

    async fn backend_with_attempt() -> (InMemoryBackend, AttemptId) {
        let backend = InMemoryBackend::new();
        let question = Question::new(
            QuestionId::new(1),
            "Q1",
            QuestionKind::SingleChoice,
            vec!["A".to_string(), "B".to_string()],
            None,
        )
        .unwrap();
        backend.insert_test(Test::new(TestId::new(1), "T", None, vec![question]).unwrap());
        let attempt = backend.start_attempt(TestId::new(1)).await.unwrap();
        (backend, attempt)
    }

    #[tokio::test]
    async fn submit_sends_and_releases_the_flag() {
        let (backend, attempt) = backend_with_attempt().await;
        let submitter = AnswerSubmitter::new();

        let outcome = submitter
            .submit(&backend, attempt, QuestionId::new(1), &AnswerValue::choice(2))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Sent);
        assert!(!submitter.is_in_flight());

        // A second sequential submission goes through as well.
        let outcome = submitter
            .submit(&backend, attempt, QuestionId::new(1), &AnswerValue::choice(1))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(backend.submission_count(), 2);
    }

    #[tokio::test]
    async fn duplicate_submission_is_dropped_while_in_flight() {
        let (backend, attempt) = backend_with_attempt().await;
        let submitter = AnswerSubmitter::new();

        // Simulate the first request still being on the wire.
        assert!(submitter.try_begin());

        let outcome = submitter
            .submit(&backend, attempt, QuestionId::new(1), &AnswerValue::choice(2))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Dropped);
        assert_eq!(backend.submission_count(), 0);

        submitter.end();
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn failure_downgrades_to_notice() {
        let (backend, attempt) = backend_with_attempt().await;
        backend.fail_submits(true);
        let submitter = AnswerSubmitter::new();

        let outcome = submitter
            .submit(&backend, attempt, QuestionId::new(1), &AnswerValue::choice(2))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        // The flag is released; the next submission may go out.
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn unauthorized_is_fatal() {
        let (backend, attempt) = backend_with_attempt().await;
        backend.set_unauthorized(true);
        let submitter = AnswerSubmitter::new();

        let err = submitter
            .submit(&backend, attempt, QuestionId::new(1), &AnswerValue::choice(2))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Expired));
        assert!(!submitter.is_in_flight());
    }
}
