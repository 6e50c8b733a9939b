use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use quiz_core::model::{AnswerValue, AttemptId, QuestionId, Test, TestId};

use crate::api::{ClientError, TestBackend};

/// One recorded answer submission, in wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub attempt_id: AttemptId,
    pub question_id: QuestionId,
    pub value: String,
}

#[derive(Default)]
struct Inner {
    tests: HashMap<TestId, Test>,
    tokens: HashMap<String, TestId>,
    next_attempt: u64,
    attempts: HashMap<AttemptId, TestId>,
    submitted: Vec<SubmittedAnswer>,
    finished: HashSet<AttemptId>,
    fail_submits: bool,
    fail_finishes: bool,
    unauthorized: bool,
}

/// In-memory backend for tests and prototyping.
///
/// Records every submission and supports injecting the failure modes the
/// session core has to survive: rejected submissions, rejected finishes,
/// and an invalidated session token.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a test for id-based access.
    ///
    /// # Panics
    ///
    /// Panics if the backing lock is poisoned.
    pub fn insert_test(&self, test: Test) {
        self.lock().tests.insert(test.id(), test);
    }

    /// Registers a test reachable through a public share token.
    ///
    /// # Panics
    ///
    /// Panics if the backing lock is poisoned.
    pub fn insert_shared_test(&self, token: &str, test: Test) {
        let mut inner = self.lock();
        inner.tokens.insert(token.to_string(), test.id());
        inner.tests.insert(test.id(), test);
    }

    /// Makes every answer submission fail with an application error.
    pub fn fail_submits(&self, fail: bool) {
        self.lock().fail_submits = fail;
    }

    /// Makes every finish call fail with an application error.
    pub fn fail_finishes(&self, fail: bool) {
        self.lock().fail_finishes = fail;
    }

    /// Simulates an invalidated bearer token (401 on every write).
    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.lock().unauthorized = unauthorized;
    }

    /// Every submission recorded so far, in order.
    #[must_use]
    pub fn submitted(&self) -> Vec<SubmittedAnswer> {
        self.lock().submitted.clone()
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.lock().submitted.len()
    }

    #[must_use]
    pub fn is_finished(&self, attempt_id: AttemptId) -> bool {
        self.lock().finished.contains(&attempt_id)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("in-memory backend lock poisoned")
    }

    fn try_lock(&self) -> Result<MutexGuard<'_, Inner>, ClientError> {
        self.inner
            .lock()
            .map_err(|e| ClientError::Connection(e.to_string()))
    }

    fn guard(inner: &Inner) -> Result<(), ClientError> {
        if inner.unauthorized {
            return Err(ClientError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl TestBackend for InMemoryBackend {
    async fn fetch_test(&self, id: TestId) -> Result<Test, ClientError> {
        let inner = self.try_lock()?;
        Self::guard(&inner)?;
        inner.tests.get(&id).cloned().ok_or(ClientError::NotFound)
    }

    async fn fetch_test_by_token(&self, token: &str) -> Result<Test, ClientError> {
        let inner = self.try_lock()?;
        Self::guard(&inner)?;
        let id = inner.tokens.get(token).ok_or(ClientError::NotFound)?;
        inner.tests.get(id).cloned().ok_or(ClientError::NotFound)
    }

    async fn start_attempt(&self, test_id: TestId) -> Result<AttemptId, ClientError> {
        let mut inner = self.try_lock()?;
        Self::guard(&inner)?;
        if !inner.tests.contains_key(&test_id) {
            return Err(ClientError::NotFound);
        }
        inner.next_attempt += 1;
        let attempt_id = AttemptId::new(inner.next_attempt);
        inner.attempts.insert(attempt_id, test_id);
        Ok(attempt_id)
    }

    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        value: &AnswerValue,
    ) -> Result<(), ClientError> {
        let mut inner = self.try_lock()?;
        Self::guard(&inner)?;
        if inner.fail_submits {
            return Err(ClientError::Api("injected submit failure".into()));
        }
        if !inner.attempts.contains_key(&attempt_id) {
            return Err(ClientError::NotFound);
        }
        inner.submitted.push(SubmittedAnswer {
            attempt_id,
            question_id,
            value: value.to_wire(),
        });
        Ok(())
    }

    async fn finish_attempt(&self, attempt_id: AttemptId) -> Result<(), ClientError> {
        let mut inner = self.try_lock()?;
        Self::guard(&inner)?;
        if inner.fail_finishes {
            return Err(ClientError::Api("injected finish failure".into()));
        }
        if !inner.attempts.contains_key(&attempt_id) {
            return Err(ClientError::NotFound);
        }
        inner.finished.insert(attempt_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionKind};

    fn build_test(id: u64) -> Test {
        let question = Question::new(
            QuestionId::new(1),
            "Q1",
            QuestionKind::SingleChoice,
            vec!["A".to_string(), "B".to_string()],
            None,
        )
        .unwrap();
        Test::new(TestId::new(id), format!("Test {id}"), None, vec![question]).unwrap()
    }

    #[tokio::test]
    async fn round_trips_test_by_id_and_token() {
        let backend = InMemoryBackend::new();
        backend.insert_test(build_test(1));
        backend.insert_shared_test("abc123", build_test(2));

        assert_eq!(backend.fetch_test(TestId::new(1)).await.unwrap().id(), TestId::new(1));
        assert_eq!(
            backend.fetch_test_by_token("abc123").await.unwrap().id(),
            TestId::new(2)
        );
        assert!(matches!(
            backend.fetch_test(TestId::new(9)).await.unwrap_err(),
            ClientError::NotFound
        ));
    }

    #[tokio::test]
    async fn attempts_are_issued_monotonically() {
        let backend = InMemoryBackend::new();
        backend.insert_test(build_test(1));

        let first = backend.start_attempt(TestId::new(1)).await.unwrap();
        let second = backend.start_attempt(TestId::new(1)).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn records_submissions_in_order() {
        let backend = InMemoryBackend::new();
        backend.insert_test(build_test(1));
        let attempt = backend.start_attempt(TestId::new(1)).await.unwrap();

        backend
            .submit_answer(attempt, QuestionId::new(1), &AnswerValue::choice(2))
            .await
            .unwrap();
        backend
            .submit_answer(attempt, QuestionId::new(1), &AnswerValue::choice(1))
            .await
            .unwrap();

        let submitted = backend.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].value, "2");
        assert_eq!(submitted[1].value, "1");
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let backend = InMemoryBackend::new();
        backend.insert_test(build_test(1));
        let attempt = backend.start_attempt(TestId::new(1)).await.unwrap();

        backend.fail_submits(true);
        let err = backend
            .submit_answer(attempt, QuestionId::new(1), &AnswerValue::choice(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));

        backend.fail_finishes(true);
        let err = backend.finish_attempt(attempt).await.unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));

        backend.set_unauthorized(true);
        let err = backend.finish_attempt(attempt).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn finish_marks_attempt_complete() {
        let backend = InMemoryBackend::new();
        backend.insert_test(build_test(1));
        let attempt = backend.start_attempt(TestId::new(1)).await.unwrap();

        assert!(!backend.is_finished(attempt));
        backend.finish_attempt(attempt).await.unwrap();
        assert!(backend.is_finished(attempt));
    }
}
