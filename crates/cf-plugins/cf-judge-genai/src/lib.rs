//! # cf-judge-genai
//!
//! `MatchJudge` implementation against a Gemini-style `generateContent`
//! endpoint. Requests carry the item texts plus any inline image payloads
//! and force a JSON response; the model's JSON answer is parsed back into
//! the judgment schema. Every transport, status, or parse failure maps to
//! `ExternalCallFailure` with a readable message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::{Candidate, InlineImage, MatchJudgment, PairRequest};
use cf_core::traits::MatchJudge;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GenAiJudge {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiJudge {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("http client init failed: {e}")))?;
        Ok(GenAiJudge {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// One `generateContent` round trip; returns the model's text answer.
    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalCallFailure(format!("judgment call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalCallFailure(format!(
                "model endpoint returned {status}"
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ExternalCallFailure(format!("unreadable model response: {e}"))
        })?;
        extract_text(parsed)
    }
}

#[async_trait]
impl MatchJudge for GenAiJudge {
    async fn judge_pair(&self, request: &PairRequest) -> Result<MatchJudgment> {
        let text = self.generate(pair_parts(request)).await?;
        parse_pair_verdict(&text)
    }

    async fn judge_similar(&self, source: &Candidate, pool: &[Candidate]) -> Result<Vec<Uuid>> {
        let text = self.generate(similar_parts(source, pool)).await?;
        parse_similar_verdict(&text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &InlineImage) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Output schema for pair judgments.
#[derive(Deserialize)]
struct PairVerdict {
    #[serde(rename = "matchProbability")]
    match_probability: f64,
    reasoning: String,
}

/// Output schema for find-similar judgments.
#[derive(Deserialize)]
struct SimilarVerdict {
    #[serde(rename = "similarItemIds")]
    similar_item_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Prompt assembly and response parsing
// ---------------------------------------------------------------------------

fn pair_parts(request: &PairRequest) -> Vec<Part> {
    let mut parts = vec![Part::text(
        "You are helping a campus lost-and-found desk decide whether a found \
         item is the same object as a lost item report. Consider partial \
         matches in the descriptions and any photos. Answer with a JSON \
         object: {\"matchProbability\": <number between 0 and 1>, \
         \"reasoning\": <string>}.",
    )];
    parts.push(Part::text(format!(
        "Lost item description: {}",
        request.lost_description
    )));
    if let Some(image) = &request.lost_image {
        parts.push(Part::text("Lost item photo:"));
        parts.push(Part::image(image));
    }
    parts.push(Part::text(format!(
        "Found item description: {}",
        request.found_description
    )));
    if let Some(image) = &request.found_image {
        parts.push(Part::text("Found item photo:"));
        parts.push(Part::image(image));
    }
    parts
}

fn similar_parts(source: &Candidate, pool: &[Candidate]) -> Vec<Part> {
    let mut listing = String::new();
    for candidate in pool {
        listing.push_str(&format!(
            "- ID: {}\n  Name: {}\n  Description: {}\n  Category: {}\n",
            candidate.id, candidate.name, candidate.description, candidate.category
        ));
    }
    vec![Part::text(format!(
        "You compare a source item against a list of candidate items from a \
         campus lost-and-found and pick the plausible matches. A strong match \
         shares the category and has a very similar name and description.\n\n\
         Source item:\n- Name: {}\n- Description: {}\n- Category: {}\n\n\
         Candidates:\n{}\n\
         Answer with a JSON object: {{\"similarItemIds\": [<ids of strong \
         matches, or an empty array>]}}.",
        source.name, source.description, source.category, listing
    ))]
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::ExternalCallFailure("empty model response".into()))
}

/// Models sometimes wrap JSON answers in markdown fences despite the
/// response mime type; tolerate that.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|t| t.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn parse_pair_verdict(text: &str) -> Result<MatchJudgment> {
    let verdict: PairVerdict = serde_json::from_str(strip_fences(text))
        .map_err(|e| AppError::ExternalCallFailure(format!("malformed pair verdict: {e}")))?;
    Ok(MatchJudgment {
        probability: verdict.match_probability,
        reasoning: verdict.reasoning,
    }
    .clamped())
}

fn parse_similar_verdict(text: &str) -> Result<Vec<Uuid>> {
    let verdict: SimilarVerdict = serde_json::from_str(strip_fences(text))
        .map_err(|e| AppError::ExternalCallFailure(format!("malformed similar verdict: {e}")))?;
    // Ids the model garbled are skipped rather than failing the whole call.
    Ok(verdict
        .similar_item_ids
        .iter()
        .filter_map(|raw| match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("model returned unparseable candidate id: {raw}");
                None
            }
        })
        .collect())
}
