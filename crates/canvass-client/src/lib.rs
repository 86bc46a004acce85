//! Survey backend client.
//!
//! The conversation engine treats the survey backend as an external
//! collaborator reached over five endpoints: question fetch, batch answer
//! submission, status and duration updates, and empathic-response
//! generation. [`SurveyBackend`] is the port the orchestrator depends on;
//! [`SurveyClient`] is the HTTP implementation.
//!
//! Submission idempotence is a payload property: the batch is a pure
//! function of the accumulated answer set, so retrying `submit_answers`
//! re-sends an identical body and the backend can deduplicate on
//! `SurveyId` + content.

mod error;

pub use error::ClientError;

use std::time::Duration;

use async_trait::async_trait;
use canvass_types::{
    AnswerBatch, DurationUpdate, StatusUpdate, SurveyQuestions, SurveyStatus, SympathyReply,
    SympathyRequest,
};

/// Fixed acknowledgment used whenever empathic-response generation fails.
/// The failure is fully absorbed; respondents never see an error here.
pub const SYMPATHY_FALLBACK: &str = "Thank you for your response.";

/// Bound on every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The survey backend boundary as the orchestrator sees it.
#[async_trait]
pub trait SurveyBackend: Send + Sync {
    /// Fetches the survey's question set, sorted by `order` ascending.
    async fn fetch_questions(&self, survey_id: &str) -> Result<SurveyQuestions, ClientError>;

    /// Submits the accumulated answer set in one batch. Safe to retry with
    /// the same batch.
    async fn submit_answers(&self, batch: &AnswerBatch) -> Result<(), ClientError>;

    /// Updates the survey lifecycle status.
    async fn update_status(&self, survey_id: &str, status: SurveyStatus)
        -> Result<(), ClientError>;

    /// Reports the completion duration in whole seconds.
    async fn update_duration(&self, survey_id: &str, seconds: i64) -> Result<(), ClientError>;

    /// Generates a short empathic acknowledgment for an answered question.
    /// Infallible by contract: any failure yields [`SYMPATHY_FALLBACK`].
    async fn sympathize(&self, question: &str, response: &str) -> String;
}

/// HTTP implementation of [`SurveyBackend`].
#[derive(Debug, Clone)]
pub struct SurveyClient {
    base_url: String,
    client: reqwest::Client,
}

impl SurveyClient {
    /// Builds a client for the given backend base URL (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn ensure_success(
        response: &reqwest::Response,
        path: &str,
    ) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path: path.to_string(),
            })
        }
    }
}

#[async_trait]
impl SurveyBackend for SurveyClient {
    async fn fetch_questions(&self, survey_id: &str) -> Result<SurveyQuestions, ClientError> {
        let path = format!("/api/surveys/{survey_id}/questions");
        let response = self.client.get(self.url(&path)).send().await?;
        Self::ensure_success(&response, &path)?;

        let mut survey: SurveyQuestions = response.json().await?;
        survey.questions.sort_by_key(|q| q.order);
        tracing::debug!(
            survey_id,
            template = %survey.template_name,
            count = survey.questions.len(),
            "fetched survey questions"
        );
        Ok(survey)
    }

    async fn submit_answers(&self, batch: &AnswerBatch) -> Result<(), ClientError> {
        let path = "/api/answers/qna";
        let response = self
            .client
            .post(self.url(path))
            .json(batch)
            .send()
            .await?;
        Self::ensure_success(&response, path)?;
        tracing::info!(
            survey_id = %batch.survey_id,
            answers = batch.questions_with_ans.len(),
            "submitted answer batch"
        );
        Ok(())
    }

    async fn update_status(
        &self,
        survey_id: &str,
        status: SurveyStatus,
    ) -> Result<(), ClientError> {
        let path = format!("/api/surveys/{survey_id}/status");
        let response = self
            .client
            .patch(self.url(&path))
            .json(&StatusUpdate { status })
            .send()
            .await?;
        Self::ensure_success(&response, &path)
    }

    async fn update_duration(&self, survey_id: &str, seconds: i64) -> Result<(), ClientError> {
        let path = format!("/api/surveys/{survey_id}/duration");
        let response = self
            .client
            .post(self.url(&path))
            .json(&DurationUpdate {
                completion_duration: seconds,
            })
            .send()
            .await?;
        Self::ensure_success(&response, &path)
    }

    async fn sympathize(&self, question: &str, response: &str) -> String {
        let path = "/api/questions/sympathize";
        let request = SympathyRequest {
            question: question.to_string(),
            response: response.to_string(),
        };

        let result = async {
            let response = self
                .client
                .post(self.url(path))
                .json(&request)
                .send()
                .await?;
            Self::ensure_success(&response, path)?;
            let reply: SympathyReply = response.json().await?;
            Ok::<SympathyReply, ClientError>(reply)
        }
        .await;

        match result {
            Ok(reply) => reply
                .text()
                .map(str::to_string)
                .unwrap_or_else(|| SYMPATHY_FALLBACK.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "sympathize call failed, using fallback text");
                SYMPATHY_FALLBACK.to_string()
            }
        }
    }
}
