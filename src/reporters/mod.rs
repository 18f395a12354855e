//! Output reporters for evaluation runs
//!
//! Supports:
//! - `text` - terminal output with colors
//! - `json` - machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::models::EvalRun;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a run report in the specified format
pub fn report(run: &EvalRun, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(run, fmt)
}

/// Render a run report using an OutputFormat enum
pub fn report_with_format(run: &EvalRun, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(run),
        OutputFormat::Json => json::render(run),
        OutputFormat::Markdown => markdown::render(run),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Create a minimal EvalRun for testing
    pub(crate) fn test_run() -> EvalRun {
        use crate::models::*;

        let scores = CodeScores {
            compilation: CompilationReport {
                success: true,
                warning_count: 1,
                error_count: 0,
                raw_output: "CC [M] driver_under_test.o".to_string(),
                timed_out: false,
                tool_available: true,
            },
            security: SecurityReport {
                kernel_memory_safety: 0.6,
                kernel_concurrency: 1.0,
                kernel_api_misuse: 0.6,
                issues: vec![Issue {
                    category: "unsafe_string_function".to_string(),
                    severity: Severity::Critical,
                    bucket: Bucket::ApiMisuse,
                    line: Some(12),
                    recommendation: "Use strscpy.".to_string(),
                }],
            },
            quality: QualityReport {
                style_compliance: 0.9,
                documentation: 0.75,
                maintainability: 0.85,
                clang_available: true,
            },
            functionality: FunctionalityReport {
                basic_operations: 1.0,
                error_handling: 0.66,
                edge_cases: 0.8,
            },
        };

        EvalRun::new(vec![PromptEvaluation {
            prompt: "Write a character device driver.".to_string(),
            prompt_weight: 0.42,
            evaluated: vec![ModelEvaluation {
                model: "gemini-1.5-flash".to_string(),
                code: "static int noop(void) { return 0; }".to_string(),
                scores,
            }],
            skipped: vec![SkippedGeneration {
                model: "gemini-2.5-flash".to_string(),
                reason: "empty response".to_string(),
            }],
        }])
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert!(OutputFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_every_format_renders() {
        let run = test_run();
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown] {
            let out = report_with_format(&run, format).expect("render");
            assert!(!out.is_empty());
        }
    }
}
