use std::env;
use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lit_core::cache::{LastQuery, ReadingCache};
use lit_core::model::{Recommendation, TextAnalysis};

use crate::config::{ENV_AI_API_KEY, ENV_AI_BASE_URL, ENV_AI_MODEL};
use crate::error::RecommendationError;

const MAX_TOKENS: u32 = 800;

const RECOMMEND_PROMPT: &str = "You are a literary assistant who recommends Ukrainian literature. \
Analyse the reader's request and suggest books they may enjoy, giving priority to Ukrainian \
classic and modern literature. Requests may be in Ukrainian or English; always answer in \
Ukrainian. Reply with a JSON object: \
{\"recommendations\": [\"Title - Author\", ...], \"explanation\": \"why these books\"}";

const ANALYZE_PROMPT: &str = "You are a literary analyst. Analyse the given text in the context \
of Ukrainian and world literature, name its main themes and suggest similar works. Texts may be \
in Ukrainian or English; always answer in Ukrainian. Reply with a JSON object: \
{\"summary\": \"short summary\", \"themes\": [\"theme\", ...], \"recommendation\": \"similar works\"}";

const UNAVAILABLE: &str = "Recommendations are unavailable right now. Please try again later.";
const NOT_CONFIGURED: &str = "Recommendations are not configured.";
const NO_EXPLANATION: &str = "No explanation was given for these recommendations.";

#[derive(Clone)]
pub struct RecommendationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for RecommendationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .finish()
    }
}

impl RecommendationConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(ENV_AI_API_KEY).ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var(ENV_AI_BASE_URL).unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var(ENV_AI_MODEL).unwrap_or_else(|_| "gpt-4o".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Book suggestions and text analysis from an OpenAI-compatible chat API.
///
/// The infallible entry points never fail the caller: any error becomes an
/// empty answer with an explanation.
#[derive(Clone)]
pub struct RecommendationService {
    client: Client,
    config: Option<RecommendationConfig>,
    cache: Arc<dyn ReadingCache>,
}

impl RecommendationService {
    #[must_use]
    pub fn new(config: Option<RecommendationConfig>, cache: Arc<dyn ReadingCache>) -> Self {
        Self {
            client: Client::new(),
            config,
            cache,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// The last successful query and its answer.
    #[must_use]
    pub fn last_query(&self) -> Option<LastQuery> {
        self.cache.last_query()
    }

    /// Suggest works for a free-text query, degrading on any failure.
    pub async fn recommend(&self, query: &str) -> Recommendation {
        match self.try_recommend(query).await {
            Ok(result) => result,
            Err(RecommendationError::Disabled) => Recommendation::unavailable(NOT_CONFIGURED),
            Err(RecommendationError::EmptyQuery) => {
                Recommendation::unavailable("Enter a query to get recommendations.")
            }
            Err(err) => {
                warn!(error = %err, "recommendation request failed");
                Recommendation::unavailable(UNAVAILABLE)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `RecommendationError` when the query is blank, the service is
    /// disabled, the request fails, or the reply is empty or malformed.
    pub async fn try_recommend(&self, query: &str) -> Result<Recommendation, RecommendationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecommendationError::EmptyQuery);
        }
        let mut result: Recommendation = self.complete(RECOMMEND_PROMPT, query, 0.7).await?;
        if result.explanation.trim().is_empty() {
            result.explanation = NO_EXPLANATION.to_owned();
        }
        info!(count = result.recommendations.len(), "recommendations received");

        let last = LastQuery {
            query: query.to_owned(),
            result: result.clone(),
        };
        if let Err(err) = self.cache.set_last_query(last) {
            warn!(error = %err, "failed to cache last query");
        }
        Ok(result)
    }

    /// Summarise a passage, degrading on any failure.
    pub async fn analyze_text(&self, text: &str) -> TextAnalysis {
        match self.try_analyze_text(text).await {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(error = %err, "text analysis failed");
                TextAnalysis {
                    summary: "The text could not be analysed.".into(),
                    themes: Vec::new(),
                    recommendation: "No recommendations could be made.".into(),
                }
            }
        }
    }

    /// # Errors
    ///
    /// Same as [`RecommendationService::try_recommend`].
    pub async fn try_analyze_text(&self, text: &str) -> Result<TextAnalysis, RecommendationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RecommendationError::EmptyQuery);
        }
        let mut analysis: TextAnalysis = self.complete(ANALYZE_PROMPT, text, 0.5).await?;
        if analysis.summary.trim().is_empty() {
            analysis.summary = "No summary could be produced.".into();
        }
        if analysis.recommendation.trim().is_empty() {
            analysis.recommendation = "No recommendations.".into();
        }
        Ok(analysis)
    }

    async fn complete<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<T, RecommendationError> {
        let config = self
            .config
            .as_ref()
            .ok_or(RecommendationError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecommendationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(RecommendationError::EmptyResponse)?;

        Ok(serde_json::from_str(content.trim())?)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
