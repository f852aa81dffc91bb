use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error};

use wunschbox_types::api::{Claims, GiftSuggestion, SuggestionRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Source of gift ideas for a child.
#[async_trait]
pub trait GiftSuggester: Send + Sync {
    async fn suggest(&self, req: &SuggestionRequest) -> Result<Vec<GiftSuggestion>>;
}

/// Used when no API key is configured.
pub struct DisabledSuggester;

#[async_trait]
impl GiftSuggester for DisabledSuggester {
    async fn suggest(&self, _req: &SuggestionRequest) -> Result<Vec<GiftSuggestion>> {
        debug!("Gift suggestions disabled, no API key configured");
        Ok(Vec::new())
    }
}

pub struct GeminiSuggester {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiSuggester {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl GiftSuggester for GeminiSuggester {
    async fn suggest(&self, req: &SuggestionRequest) -> Result<Vec<GiftSuggestion>> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(req))
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini returned {}: {}", status, body);
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .context("Gemini response was not JSON")?;

        parse_suggestions(payload)
    }
}

fn prompt(req: &SuggestionRequest) -> String {
    format!(
        "Ich brauche Geschenkideen für ein Kind.\n\
         Name: {}\n\
         Alter: {}\n\
         Geschlecht: {}\n\
         Interessen: {}\n\
         Budget: {}\n\n\
         Bitte schlage 3-5 konkrete Geschenkideen vor.\n\
         Gib die Antwort als JSON zurück.",
        req.child_name, req.age, req.gender, req.interests, req.budget
    )
}

fn request_body(req: &SuggestionRequest) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt(req) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "estimatedPriceRange": { "type": "STRING" }
                    }
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// The model answers with a JSON array encoded as text in the first part.
fn parse_suggestions(payload: GenerateContentResponse) -> Result<Vec<GiftSuggestion>> {
    let text = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);

    match text {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(&text).context("Gemini text was not a suggestion array")
        }
        _ => Ok(Vec::new()),
    }
}

/// POST /api/suggestions. Upstream failures degrade to an empty list.
pub async fn suggest_gifts(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    JsonBody(req): JsonBody<SuggestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.child_name.trim().is_empty() {
        return Err(ApiError::Validation("childName is required".into()));
    }

    let suggestions = match state.suggester.suggest(&req).await {
        Ok(list) => list,
        Err(e) => {
            error!("Gift suggestion failed: {:#}", e);
            Vec::new()
        }
    };

    Ok(Json(suggestions))
}
