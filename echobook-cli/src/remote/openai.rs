//! OpenAI-compatible chat-completion and speech endpoints
//!
//! Both adapters share one blocking HTTP client with bearer auth and a
//! request timeout. Failures map to [`ServiceError`]; the core decides what
//! to do with a failed sentence.

use crate::config::{AudioConfig, ServicesConfig, TranslationConfig};
use crate::error::CliError;
use anyhow::{Context, Result};
use echobook_core::{LanguageCode, ServiceError, SpeechSynthesizer, Translator};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shared HTTP client for one API base
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_base: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client, reading the key from the configured environment variable
    pub fn from_config(services: &ServicesConfig) -> Result<Self> {
        let api_key = std::env::var(&services.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CliError::MissingApiKey(services.api_key_env.clone()))?;
        Self::new(&services.api_base, &api_key, services.timeout_secs)
    }

    pub fn new(api_base: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(concat!("echobook/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, ServiceError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(ServiceError::Response(format!("HTTP {status}: {}", detail.trim())));
        }
        Ok(response)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn system_prompt(language_name: &str) -> String {
    format!("You are a translator. Translate the following text to {language_name}.")
}

fn first_choice(response: ChatResponse) -> Result<String, ServiceError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ServiceError::Response("no choices in completion".to_string()))
}

/// Translator backed by a chat-completion model
#[derive(Debug, Clone)]
pub struct ChatTranslator {
    client: OpenAiClient,
    model: String,
    temperature: f32,
}

impl ChatTranslator {
    pub fn new(client: OpenAiClient, settings: &TranslationConfig) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

impl Translator for ChatTranslator {
    fn translate(&self, text: &str, target: &LanguageCode) -> Result<String, ServiceError> {
        let language_name = target
            .display_name()
            .ok_or_else(|| ServiceError::UnsupportedLanguage(target.to_string()))?;
        let prompt = system_prompt(language_name);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.temperature,
        };
        let response: ChatResponse = self
            .client
            .post("chat/completions", &request)?
            .json()
            .map_err(|e| ServiceError::Response(e.to_string()))?;
        first_choice(response)
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Speech synthesizer backed by the `audio/speech` endpoint
#[derive(Debug, Clone)]
pub struct SpeechClient {
    client: OpenAiClient,
    model: String,
    voice: String,
    format: String,
}

impl SpeechClient {
    pub fn new(client: OpenAiClient, settings: &AudioConfig) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            voice: settings.voice.clone(),
            format: settings.format.clone(),
        }
    }
}

impl SpeechSynthesizer for SpeechClient {
    fn synthesize(&self, text: &str, _language: &LanguageCode) -> Result<Vec<u8>, ServiceError> {
        let request = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: &self.format,
        };
        let bytes = self
            .client
            .post("audio/speech", &request)?
            .bytes()
            .map_err(|e| ServiceError::Response(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ServiceError::Response("empty audio body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}
