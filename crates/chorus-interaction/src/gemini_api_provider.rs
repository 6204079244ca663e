//! GeminiApiProvider - Direct REST API implementation of `GenerationProvider`.
//!
//! Text and image generation both go through `models/{model}:generateContent`;
//! only the model and the generation config differ.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chorus_core::config::ProviderConfig;
use chorus_core::error::{ChorusError, Result};
use chorus_core::generation::{
    ContextTurn, FailureSignal, GenerationProvider, ImagePart, ImageRequest, ImageResponse,
    InlineImage, TextRequest, TextResponse,
};
use chorus_core::session::{Citation, MessageRole};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider implementation that talks to the Gemini HTTP API.
///
/// One instance is built per API key; after the key changes a new provider
/// replaces this one.
#[derive(Clone)]
pub struct GeminiApiProvider {
    client: Client,
    api_key: String,
    config: ProviderConfig,
}

impl GeminiApiProvider {
    /// Creates a provider with the given key and endpoint configuration.
    pub fn new(api_key: impl Into<String>, config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChorusError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    pub fn text_model(&self) -> &str {
        &self.config.text_model
    }

    pub fn image_model(&self) -> &str {
        &self.config.image_model
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, FailureSignal> {
        let url = format!(
            "{}/{model}:generateContent",
            self.config.base_url.trim_end_matches('/'),
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| FailureSignal::network(describe_transport_error(err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text, retry_after));
        }

        // An undecodable success body is the provider's fault, not ours.
        response.json().await.map_err(|err| {
            FailureSignal::status(
                StatusCode::BAD_GATEWAY.as_u16(),
                format!("Failed to parse Gemini response: {}", describe_transport_error(err)),
            )
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiApiProvider {
    async fn generate_text(
        &self,
        request: TextRequest,
    ) -> std::result::Result<TextResponse, FailureSignal> {
        tracing::debug!(
            "[GeminiApiProvider] generateContent model={} turns={}",
            self.config.text_model,
            request.contents.len()
        );
        let body = build_text_request(&request);
        let response = self.send_request(&self.config.text_model, &body).await?;
        Ok(extract_text_response(response))
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> std::result::Result<ImageResponse, FailureSignal> {
        tracing::debug!(
            "[GeminiApiProvider] generateContent model={} aspect={}",
            self.config.image_model,
            request.aspect_ratio.as_str()
        );
        let body = build_image_request(&request);
        let response = self.send_request(&self.config.image_model, &body).await?;
        Ok(extract_image_response(response))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

// ============================================================================
// Request building and response extraction
// ============================================================================

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Model => "model",
    }
}

fn to_content(turn: &ContextTurn) -> Content {
    Content {
        role: Some(role_name(turn.role).to_string()),
        parts: vec![Part {
            text: turn.text.clone(),
        }],
    }
}

fn build_text_request(request: &TextRequest) -> GenerateContentRequest {
    let system_instruction = Some(request.system_instruction.trim())
        .filter(|text| !text.is_empty())
        .map(|text| Content {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        });

    let tools = if request.grounding_enabled {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents: request.contents.iter().map(to_content).collect(),
        system_instruction,
        tools,
        generation_config: Some(GenerationConfig {
            temperature: Some(request.temperature),
            image_config: None,
        }),
    }
}

fn build_image_request(request: &ImageRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some(role_name(MessageRole::User).to_string()),
            parts: vec![Part {
                text: request.prompt.clone(),
            }],
        }],
        system_instruction: None,
        tools: Vec::new(),
        generation_config: Some(GenerationConfig {
            temperature: None,
            image_config: Some(ImageConfig {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
            }),
        }),
    }
}

fn first_candidate(response: GenerateContentResponse) -> Candidate {
    response.candidates.into_iter().next().unwrap_or_default()
}

/// Concatenates the text parts of the first candidate and collects its web
/// grounding chunks in order.
fn extract_text_response(response: GenerateContentResponse) -> TextResponse {
    let candidate = first_candidate(response);

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|uri| !uri.is_empty())?;
                    let title = web
                        .title
                        .filter(|title| !title.is_empty())
                        .unwrap_or_else(|| uri.clone());
                    Some(Citation { title, uri })
                })
                .collect()
        })
        .unwrap_or_default();

    TextResponse {
        text: Some(text).filter(|text| !text.is_empty()),
        citations,
    }
}

/// Keeps every part of the first candidate. Inline data that is not valid
/// base64 is dropped so it can never become a broken data URI.
fn extract_image_response(response: GenerateContentResponse) -> ImageResponse {
    let parts = first_candidate(response)
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .map(|part| ImagePart {
            text: part.text,
            inline_image: part.inline_data.and_then(|inline| {
                if BASE64_STANDARD.decode(inline.data.as_bytes()).is_err() {
                    tracing::warn!("[GeminiApiProvider] Dropping inline data that is not base64");
                    return None;
                }
                Some(InlineImage {
                    mime_type: inline.mime_type,
                    data: inline.data,
                })
            }),
        })
        .collect();

    ImageResponse { parts }
}

fn describe_transport_error(err: reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect error"
    } else if err.is_decode() {
        "decode error"
    } else {
        "network error"
    };
    // Strip the URL, which carries the API key as a query parameter.
    format!("Gemini API request failed ({kind}): {}", err.without_url())
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> FailureSignal {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    let message = match retry_after {
        Some(delay) => format!("{message} (retry after {}s)", delay.as_secs()),
        None => message,
    };

    FailureSignal::status(status.as_u16(), message)
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
