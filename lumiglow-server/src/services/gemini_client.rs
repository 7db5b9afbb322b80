use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use crate::configs::Generation;
use crate::errors::GenerationError;
use crate::services::{GenerationRequest, Generator};

const AUDIO_INSTRUCTION: &str = "You are a personalized lighting assistant. Listen to the \
recording, work out the speaker's mood, activity and surroundings, and answer with one \
lighting recommendation as JSON. lightSetting.power is required. When the light is on, set \
either color (three channel values from 0 to 255, [0,0,0] is darkest) or dynamic, never both. \
dynamic is one of AUTO, SLOW, QUICK, FLASH, JUMP3, JUMP7, FADE3, FADE7, MUSIC1, MUSIC2, \
MUSIC3, MUSIC4 and is only for parties, workouts or music. emotion.main is Positive, \
Negative or Neutral with up to three subcategories. recommendation explains the choice in \
one or two friendly sentences and context describes the situation in ten to twenty words.";

const HISTORY_INSTRUCTION: &str = "You are a personalized lighting assistant that predicts \
what a user is likely doing now from their past lighting choices around this time of the \
week. Prefer the most frequent or most fitting past activity over the latest one and answer \
with one lighting recommendation as JSON. lightSetting.power is required. When the light is \
on, set either color (three channel values from 0 to 255) or dynamic, never both. dynamic \
is one of AUTO, SLOW, QUICK, FLASH, JUMP3, JUMP7, FADE3, FADE7, MUSIC1, MUSIC2, MUSIC3, \
MUSIC4. emotion.main is Positive, Negative or Neutral with up to three subcategories.";

const NEW_USER_PROMPT: &str = "Generate a lighting recommendation for a new user.";

/// [`Generator`] backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    settings: Generation,
}

impl GeminiClient {
    pub fn new(settings: Generation) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn build_body(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let (instruction, temperature, parts) = match request {
            GenerationRequest::Audio { mime_type, data } => {
                if data.is_empty() {
                    return Err(GenerationError::InvalidRequest("empty recording".into()));
                }

                (
                    AUDIO_INSTRUCTION,
                    self.settings.temperature,
                    json!([
                        {"text": "Follow the system instruction."},
                        {"inlineData": {"mimeType": mime_type, "data": STANDARD.encode(data)}}
                    ]),
                )
            }
            GenerationRequest::History { records } => {
                let prompt = if records.is_empty() {
                    NEW_USER_PROMPT.to_string()
                } else {
                    let history = serde_json::to_string(records)
                        .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;
                    format!(
                        "Based on these past responses: {history}, generate a lighting recommendation."
                    )
                };

                (
                    HISTORY_INSTRUCTION,
                    self.settings.surprise_temperature,
                    json!([{"text": prompt}]),
                )
            }
        };

        Ok(json!({
            "systemInstruction": {"parts": [{"text": instruction}]},
            "contents": [{"role": "user", "parts": parts}],
            "generationConfig": {
                "temperature": temperature,
                "topP": self.settings.top_p,
                "topK": self.settings.top_k,
                "maxOutputTokens": self.settings.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        }))
    }
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "required": ["lightSetting", "emotion", "recommendation", "context"],
        "properties": {
            "lightSetting": {
                "type": "OBJECT",
                "required": ["power"],
                "properties": {
                    "power": {"type": "BOOLEAN"},
                    "color": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "dynamic": {"type": "STRING"}
                }
            },
            "emotion": {
                "type": "OBJECT",
                "required": ["main", "subcategories"],
                "properties": {
                    "main": {"type": "STRING"},
                    "subcategories": {"type": "ARRAY", "items": {"type": "STRING"}}
                }
            },
            "recommendation": {"type": "STRING"},
            "context": {"type": "STRING"}
        }
    })
}

/// Concatenated text parts of the first candidate.
fn extract_text(response: &Value) -> Result<String, GenerationError> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|part| part["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = self.build_body(request)?;

        let response = self
            .http_client
            .post(self.url())
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        extract_text(&value)
    }
}
