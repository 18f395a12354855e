//! Code-generation service client
//!
//! Thin sync wrapper over the generation APIs (Gemini plus the
//! OpenAI-compatible family). BYOK: API keys come from environment
//! variables, never from config files.
//!
//! The harness only depends on the [`CodeGenerator`] trait, so tests can
//! substitute a canned generator without touching the network.

mod client;

pub use client::{strip_code_fences, GenBackend, GenClient, SYSTEM_INSTRUCTION};

use crate::models::GenerationAttempt;
use thiserror::Error;

/// Errors from the generation client
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Missing API key: {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Model {model} produced an empty response. Finish reason: {reason}")]
    EmptyResponse { model: String, reason: String },
}

pub type GenResult<T> = Result<T, GenError>;

/// Source of candidate driver code, one attempt per model variant.
///
/// A variant failure is recorded in its attempt; it never aborts the
/// other variants.
pub trait CodeGenerator {
    /// Names of the model variants this generator queries
    fn variants(&self) -> &[String];

    /// Generate one attempt per variant for the given prompt
    fn generate(&self, prompt: &str) -> Vec<GenerationAttempt>;
}
