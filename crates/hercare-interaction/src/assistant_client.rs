//! AssistantApiClient - REST client for the AskHerCare assistant service.
//!
//! Talks to the service's fixed request/response contract:
//! `POST /chat`, `POST /simplify`, `POST /explain-term`,
//! `GET /categories`. Every call is a single best-effort attempt.
//! Configuration priority: explicit base URL > `HERCARE_API_URL` >
//! the local development default.

use std::env;

use async_trait::async_trait;
use hercare_core::category::HealthCategory;
use hercare_core::gateway::{AssistantGateway, ChatPrompt, ChatReply, TermExplanation};
use hercare_core::message::Source;
use hercare_core::{HerCareError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const API_URL_ENV: &str = "HERCARE_API_URL";

/// HTTP client for the assistant service.
#[derive(Clone)]
pub struct AssistantApiClient {
    client: Client,
    base_url: String,
}

impl AssistantApiClient {
    /// Creates a new client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Builds a client from the environment.
    ///
    /// Reads `HERCARE_API_URL`, falling back to the local development
    /// default (`http://localhost:8000`).
    pub fn from_env() -> Self {
        let base_url = env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|err| {
                HerCareError::transport(format!("assistant service request failed: {err}"))
            })?;
        Self::read_json(response).await
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(self.url(path)).send().await.map_err(|err| {
            HerCareError::transport(format!("assistant service request failed: {err}"))
        })?;
        Self::read_json(response).await
    }

    async fn read_json<T>(response: reqwest::Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read assistant error body".to_string());
            return Err(map_http_error(status, body));
        }

        response.json::<T>().await.map_err(|err| {
            HerCareError::transport(format!("failed to parse assistant response: {err}"))
        })
    }
}

#[async_trait]
impl AssistantGateway for AssistantApiClient {
    async fn chat(&self, prompt: &ChatPrompt) -> Result<ChatReply> {
        tracing::debug!(
            personality = prompt.personality_mode.as_str(),
            category = prompt.category.as_deref(),
            "dispatching chat request"
        );

        let request = ChatRequest {
            message: &prompt.message,
            personality_mode: prompt.personality_mode.as_str(),
            category: prompt.category.as_deref(),
        };
        let response: ChatResponse = self.post_json("/chat", &request).await?;

        Ok(ChatReply {
            message: response.message,
            sources: response
                .sources
                .into_iter()
                .map(|source| Source {
                    content: source.content,
                    score: source.score,
                })
                .collect(),
            confidence: response.confidence,
        })
    }

    async fn simplify(&self, text: &str) -> Result<String> {
        let response: SimplifyResponse = self
            .post_json("/simplify", &SimplifyRequest { text })
            .await?;
        Ok(response.simplified_text)
    }

    async fn explain_term(&self, term: &str) -> Result<TermExplanation> {
        let response: ExplainTermResponse = self
            .post_json("/explain-term", &ExplainTermRequest { term })
            .await?;
        Ok(TermExplanation {
            term: response.term,
            explanation: response.explanation,
        })
    }

    async fn categories(&self) -> Result<Vec<HealthCategory>> {
        let response: CategoriesResponse = self.get_json("/categories").await?;
        Ok(response.categories)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    personality_mode: &'a str,
    category: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: String,
    #[serde(default)]
    sources: Vec<SourcePayload>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Deserialize)]
struct SourcePayload {
    content: String,
    score: f64,
}

#[derive(Serialize)]
struct SimplifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SimplifyResponse {
    simplified_text: String,
}

#[derive(Serialize)]
struct ExplainTermRequest<'a> {
    term: &'a str,
}

#[derive(Deserialize)]
struct ExplainTermResponse {
    term: String,
    explanation: String,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: Vec<HealthCategory>,
}

/// FastAPI-style error bodies carry the message in a `detail` field.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

fn map_http_error(status: StatusCode, body: String) -> HerCareError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);
    HerCareError::api(status.as_u16(), message)
}
