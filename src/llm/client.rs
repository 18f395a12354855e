//! Generation API client supporting Gemini and OpenAI-compatible backends
//!
//! Uses ureq (sync HTTP) — no async runtime needed.

use crate::config::GenerationConfig;
use crate::llm::{CodeGenerator, GenError, GenResult};
use crate::models::GenerationAttempt;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

/// System instruction sent with every generation request
pub const SYSTEM_INSTRUCTION: &str = "You are an expert Linux kernel developer. Generate clean, \
    production-quality Linux device driver code in C that strictly adheres to kernel coding \
    standards. Ensure proper module structure, error handling, and memory management. Output \
    only valid C code with no explanations or markdown formatting.";

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenBackend {
    #[default]
    Gemini,
    OpenAi,
    OpenRouter,
    Ollama,
}

impl GenBackend {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gemini" => Some(GenBackend::Gemini),
            "openai" => Some(GenBackend::OpenAi),
            "openrouter" => Some(GenBackend::OpenRouter),
            "ollama" => Some(GenBackend::Ollama),
            _ => None,
        }
    }

    pub fn env_key(&self) -> &'static str {
        match self {
            GenBackend::Gemini => "GEMINI_API_KEY",
            GenBackend::OpenAi => "OPENAI_API_KEY",
            GenBackend::OpenRouter => "OPENROUTER_API_KEY",
            GenBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn api_url(&self, model: &str) -> String {
        match self {
            GenBackend::Gemini => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model
            ),
            GenBackend::OpenAi => "https://api.openai.com/v1/chat/completions".to_string(),
            GenBackend::OpenRouter => {
                "https://openrouter.ai/api/v1/chat/completions".to_string()
            }
            GenBackend::Ollama => "http://localhost:11434/v1/chat/completions".to_string(),
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(
            self,
            GenBackend::OpenAi | GenBackend::OpenRouter | GenBackend::Ollama
        )
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, GenBackend::Ollama)
    }
}

impl std::fmt::Display for GenBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenBackend::Gemini => write!(f, "gemini"),
            GenBackend::OpenAi => write!(f, "openai"),
            GenBackend::OpenRouter => write!(f, "openrouter"),
            GenBackend::Ollama => write!(f, "ollama"),
        }
    }
}

/// Sync generation client querying every configured model variant
pub struct GenClient {
    backend: GenBackend,
    models: Vec<String>,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes handled explicitly below
        .timeout_global(Some(std::time::Duration::from_secs(120))) // Generation can be slow
        .build()
        .new_agent()
}

impl GenClient {
    pub fn new(backend: GenBackend, config: &GenerationConfig, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            models: config.models.clone(),
            api_key: api_key.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            agent: make_agent(),
        }
    }

    /// Build from config with the API key read from the backend's
    /// environment variable.
    pub fn from_env(config: &GenerationConfig) -> GenResult<Self> {
        let backend = GenBackend::parse(&config.backend).ok_or_else(|| GenError::ParseError(
            format!("Unknown backend '{}'", config.backend),
        ))?;

        if !backend.requires_api_key() {
            return Ok(Self::new(backend, config, "ollama"));
        }

        let env_key = backend.env_key();
        let api_key = env::var(env_key).map_err(|_| GenError::MissingApiKey {
            env_var: env_key.to_string(),
        })?;
        Ok(Self::new(backend, config, api_key))
    }

    pub fn backend(&self) -> GenBackend {
        self.backend
    }

    fn generate_one(&self, model: &str, prompt: &str) -> GenResult<String> {
        let text = if self.backend.is_openai_compatible() {
            self.generate_openai(model, prompt)?
        } else {
            self.generate_gemini(model, prompt)?
        };

        let code = strip_code_fences(&text);
        if code.trim().is_empty() {
            return Err(GenError::EmptyResponse {
                model: model.to_string(),
                reason: "no text content".to_string(),
            });
        }
        Ok(code)
    }

    fn generate_gemini(&self, model: &str, prompt: &str) -> GenResult<String> {
        let body = GeminiRequest {
            system_instruction: GeminiContent::text(SYSTEM_INSTRUCTION),
            contents: vec![GeminiContent::user(prompt)],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .agent
            .post(&self.backend.api_url(model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .map_err(|e| GenError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: GeminiResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenError::EmptyResponse {
                model: model.to_string(),
                reason: "no candidates".to_string(),
            })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenError::EmptyResponse {
                model: model.to_string(),
                reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }
        Ok(text)
    }

    fn generate_openai(&self, model: &str, prompt: &str) -> GenResult<String> {
        let body = OpenAiRequest {
            model: model.to_string(),
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut req = self
            .agent
            .post(&self.backend.api_url(model))
            .header("Content-Type", "application/json");

        if self.backend.requires_api_key() {
            req = req.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        let response = req.send_json(&body).map_err(|e| GenError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(GenError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: OpenAiResponse = response
            .into_body()
            .read_json()
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenError::ParseError("No response choices".to_string()))
    }
}

impl CodeGenerator for GenClient {
    fn variants(&self) -> &[String] {
        &self.models
    }

    fn generate(&self, prompt: &str) -> Vec<GenerationAttempt> {
        let mut attempts = Vec::with_capacity(self.models.len());

        for model in &self.models {
            info!("Requesting {} via {}", model, self.backend);
            match self.generate_one(model, prompt) {
                Ok(code) => attempts.push(GenerationAttempt::ok(model, code)),
                Err(e) => {
                    warn!("Model {} failed: {}", model, e);
                    attempts.push(GenerationAttempt::failed(model, e.to_string()));
                }
            }
        }

        attempts
    }
}

/// Drop a wrapping markdown code fence if the model emitted one anyway.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let without_open = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return String::new(),
    };
    without_open
        .trim_end()
        .trim_end_matches("```")
        .trim_end()
        .to_string()
}

// Gemini API types
#[derive(Serialize)]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPartOut>,
}

impl GeminiContent {
    fn text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![GeminiPartOut {
                text: text.to_string(),
            }],
        }
    }

    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPartOut {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct GeminiPartOut {
    text: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentIn>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentIn {
    #[serde(default)]
    parts: Vec<GeminiPartIn>,
}

#[derive(Deserialize)]
struct GeminiPartIn {
    text: Option<String>,
}

// OpenAI-compatible API types
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessageIn,
}

#[derive(Deserialize)]
struct OpenAiMessageIn {
    content: String,
}
