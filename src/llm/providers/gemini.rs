use crate::config::{GEMINI_CHAT_TEMPERATURE, GEMINI_IMAGE_TEMPERATURE};
use crate::llm::http_utils::{create_http_client, extract_text_content, send_json_request};
use crate::llm::{LlmError, LlmProvider, Message};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEXT_PATH: &[&str] = &["candidates", "0", "content", "parts", "0", "text"];

/// AI provider implementation for Google Gemini
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    #[must_use]
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            http_client: create_http_client(timeout_secs),
            api_key,
        }
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{GEMINI_API_BASE}/{model_id}:generateContent?key={}", self.api_key)
    }
}

/// Maps history to Gemini `contents`, Gemini calls the assistant role "model"
fn history_contents(history: &[Message]) -> Vec<Value> {
    history
        .iter()
        .map(|msg| {
            let role = if msg.role == "user" { "user" } else { "model" };
            json!({
                "role": role,
                "parts": [{"text": msg.content}]
            })
        })
        .collect()
}

fn chat_body(history: &[Message], user_message: &str, max_tokens: u32) -> Value {
    let mut contents = history_contents(history);
    contents.push(json!({
        "role": "user",
        "parts": [{"text": user_message}]
    }));

    json!({
        "contents": contents,
        "generationConfig": {
            "temperature": GEMINI_CHAT_TEMPERATURE,
            "maxOutputTokens": max_tokens
        }
    })
}

fn image_body(image_jpeg: &[u8], text_prompt: &str, history: &[Message], max_tokens: u32) -> Value {
    let mut contents = history_contents(history);
    contents.push(json!({
        "role": "user",
        "parts": [
            {"text": text_prompt},
            {
                "inline_data": {
                    "mime_type": "image/jpeg",
                    "data": BASE64.encode(image_jpeg)
                }
            }
        ]
    }));

    json!({
        "contents": contents,
        "generationConfig": {
            "temperature": GEMINI_IMAGE_TEMPERATURE,
            "maxOutputTokens": max_tokens
        }
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn chat_completion(
        &self,
        history: &[Message],
        user_message: &str,
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = chat_body(history, user_message, max_tokens);
        let res_json = send_json_request(&self.http_client, &self.endpoint(model_id), &body, &[]).await?;
        extract_text_content(&res_json, TEXT_PATH)
    }

    async fn analyze_image(
        &self,
        image_jpeg: Vec<u8>,
        text_prompt: &str,
        history: &[Message],
        model_id: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = image_body(&image_jpeg, text_prompt, history, max_tokens);
        let res_json = send_json_request(&self.http_client, &self.endpoint(model_id), &body, &[]).await?;
        extract_text_content(&res_json, TEXT_PATH)
    }
}
