use async_trait::async_trait;
use thiserror::Error;

use quiz_core::model::{AnswerValue, AttemptId, QuestionId, Test, TestId};

/// Errors surfaced by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The test, token, or attempt does not exist or is not published.
    #[error("not found")]
    NotFound,

    /// The bearer token was rejected; the session is no longer valid.
    #[error("session expired")]
    Unauthorized,

    /// The backend answered with an application-level failure.
    #[error("backend rejected the request: {0}")]
    Api(String),

    /// The backend answered with a payload the client cannot use.
    #[error("malformed backend response: {0}")]
    InvalidResponse(String),

    /// The backend could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Backend contract for the test-taking flow.
///
/// Covers exactly the REST operations the session core consumes: loading a
/// test (by id or by public share token), starting an attempt, submitting
/// answers, and finishing the attempt. Results retrieval belongs to the
/// results view and is not part of this contract.
#[async_trait]
pub trait TestBackend: Send + Sync {
    /// Fetch a test with its questions by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the test is missing or not
    /// published, or other client errors.
    async fn fetch_test(&self, id: TestId) -> Result<Test, ClientError>;

    /// Fetch a test through its public share token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown or unpublished token,
    /// or other client errors.
    async fn fetch_test_by_token(&self, token: &str) -> Result<Test, ClientError>;

    /// Start a new attempt for the given test.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the test is missing, or other
    /// client errors.
    async fn start_attempt(&self, test_id: TestId) -> Result<AttemptId, ClientError>;

    /// Record the answer for one question of an attempt.
    ///
    /// The value is encoded in the wire format (1-based option index,
    /// comma-joined indices, or free text).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` when the session token was
    /// rejected, or other client errors.
    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        value: &AnswerValue,
    ) -> Result<(), ClientError>;

    /// Mark an attempt as complete. Scoring happens backend-side.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown attempt, or other
    /// client errors.
    async fn finish_attempt(&self, attempt_id: AttemptId) -> Result<(), ClientError>;
}
