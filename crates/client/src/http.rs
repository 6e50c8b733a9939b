use std::env;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use async_trait::async_trait;
use quiz_core::model::{
    AnswerValue, AttemptId, Question, QuestionId, QuestionKind, Test, TestId,
};

use crate::api::{ClientError, TestBackend};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub bearer_token: Option<String>,
}

impl ClientConfig {
    /// Builds a config from a base URL string and an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` for an invalid base URL.
    pub fn new(base_url: &str, bearer_token: Option<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            bearer_token: bearer_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Reads `QUIZ_API_BASE_URL` and `QUIZ_API_TOKEN` from the environment.
    ///
    /// The base URL falls back to the local development default; the token
    /// is optional (share-token access is unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` when the configured base URL is invalid.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let base_url =
            env::var("QUIZ_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let bearer_token = env::var("QUIZ_API_TOKEN").ok();
        Self::new(&base_url, bearer_token)
    }
}

//
// ─── HTTP BACKEND ──────────────────────────────────────────────────────────────
//

/// `TestBackend` implementation over the REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.as_str().trim_end_matches('/'))
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Reads the standard `{ success, data, error }` envelope.
///
/// Status is inspected before the body: 401 invalidates the session no
/// matter what the payload says, 404 maps to `NotFound`.
async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let envelope = read_envelope::<T>(response).await?;
    envelope
        .data
        .ok_or_else(|| ClientError::InvalidResponse("missing data field".into()))
}

/// Like `read_data`, but for acknowledgement responses whose payload the
/// client does not consume.
async fn read_ack(response: Response) -> Result<(), ClientError> {
    read_envelope::<serde_json::Value>(response).await.map(|_| ())
}

async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<Envelope<T>, ClientError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => return Err(ClientError::Unauthorized),
        StatusCode::NOT_FOUND => return Err(ClientError::NotFound),
        _ => {}
    }
    let status = response.status();
    let envelope: Envelope<T> = response.json().await?;
    if !status.is_success() || !envelope.success {
        let message = envelope.error.unwrap_or_else(|| status.to_string());
        return Err(ClientError::Api(message));
    }
    Ok(envelope)
}

#[async_trait]
impl TestBackend for HttpBackend {
    async fn fetch_test(&self, id: TestId) -> Result<Test, ClientError> {
        debug!(test_id = %id, "fetching test");
        let response = self.get(self.endpoint(&format!("tests/{id}"))).send().await?;
        let dto: TestDto = read_data(response).await?;
        dto.into_test()
    }

    async fn fetch_test_by_token(&self, token: &str) -> Result<Test, ClientError> {
        debug!("fetching test by share token");
        let response = self
            .get(self.endpoint(&format!("tests/link/{token}")))
            .send()
            .await?;
        let dto: TestDto = read_data(response).await?;
        dto.into_test()
    }

    async fn start_attempt(&self, test_id: TestId) -> Result<AttemptId, ClientError> {
        debug!(test_id = %test_id, "starting attempt");
        let response = self
            .post(self.endpoint(&format!("tests/{test_id}/attempts")))
            .send()
            .await?;
        let dto: AttemptDto = read_data(response).await?;
        Ok(AttemptId::new(dto.id))
    }

    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        value: &AnswerValue,
    ) -> Result<(), ClientError> {
        debug!(attempt_id = %attempt_id, question_id = %question_id, "submitting answer");
        let payload = SubmitAnswerRequest {
            question_id: question_id.value(),
            answer: value.to_wire(),
        };
        let response = self
            .post(self.endpoint(&format!("attempts/{attempt_id}/answers")))
            .json(&payload)
            .send()
            .await?;
        read_ack(response).await
    }

    async fn finish_attempt(&self, attempt_id: AttemptId) -> Result<(), ClientError> {
        debug!(attempt_id = %attempt_id, "finishing attempt");
        let response = self
            .post(self.endpoint(&format!("attempts/{attempt_id}/finish")))
            .send()
            .await?;
        read_ack(response).await
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitAnswerRequest {
    question_id: u64,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct AttemptDto {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct TestDto {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    id: u64,
    question_text: String,
    question_type: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    order_index: i64,
    #[serde(default)]
    correct_answer: Option<serde_json::Value>,
}

impl TestDto {
    /// Convert the wire test into the domain `Test`.
    ///
    /// Questions are sorted by `order_index` before conversion, and every
    /// field goes through the validating domain constructors.
    fn into_test(mut self) -> Result<Test, ClientError> {
        self.questions.sort_by_key(|q| q.order_index);
        let questions = self
            .questions
            .into_iter()
            .map(QuestionDto::into_question)
            .collect::<Result<Vec<Question>, ClientError>>()?;

        Test::new(TestId::new(self.id), self.title, self.description, questions)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, ClientError> {
        let kind: QuestionKind = self
            .question_type
            .parse()
            .map_err(|err: quiz_core::model::QuestionError| {
                ClientError::InvalidResponse(err.to_string())
            })?;

        // The correct answer stays opaque; it is carried, never interpreted.
        let correct_answer = self.correct_answer.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Question::new(
            QuestionId::new(self.id),
            self.question_text,
            kind,
            self.options,
            correct_answer,
        )
        .map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
