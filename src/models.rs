//! Core data models for kerneval
//!
//! These records are produced by the evaluators and assembled into the
//! per-run report. Every score is a float in [0, 1] rounded to two
//! decimals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity levels for detected issues
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Fixed score penalty applied per issue of this severity.
    pub fn penalty(&self) -> f64 {
        match self {
            Severity::Critical => 0.40,
            Severity::High => 0.25,
            Severity::Medium => 0.15,
            Severity::Low => 0.05,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Scoring buckets for security issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    MemorySafety,
    Concurrency,
    ApiMisuse,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::MemorySafety, Bucket::Concurrency, Bucket::ApiMisuse];

    /// Metric name used in reports.
    pub fn metric_name(&self) -> &'static str {
        match self {
            Bucket::MemorySafety => "kernel_memory_safety",
            Bucket::Concurrency => "kernel_concurrency",
            Bucket::ApiMisuse => "kernel_api_misuse",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.metric_name())
    }
}

/// One detected vulnerability pattern match.
///
/// At most one issue is recorded per category for a given source, no
/// matter how many times its patterns match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub category: String,
    pub severity: Severity,
    pub bucket: Bucket,
    /// 1-based line of the first match
    pub line: Option<u32>,
    pub recommendation: String,
}

/// Security bucket scores plus the issues that produced them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    pub kernel_memory_safety: f64,
    pub kernel_concurrency: f64,
    pub kernel_api_misuse: f64,
    pub issues: Vec<Issue>,
}

impl SecurityReport {
    pub fn bucket_score(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::MemorySafety => self.kernel_memory_safety,
            Bucket::Concurrency => self.kernel_concurrency,
            Bucket::ApiMisuse => self.kernel_api_misuse,
        }
    }
}

/// Result of one out-of-tree module build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationReport {
    pub success: bool,
    pub warning_count: usize,
    pub error_count: usize,
    pub raw_output: String,
    pub timed_out: bool,
    /// False when the build tool could not be spawned at all
    pub tool_available: bool,
}

impl CompilationReport {
    pub fn timeout(timeout_secs: u64) -> Self {
        Self {
            success: false,
            warning_count: 0,
            error_count: 1,
            raw_output: format!("Build process timed out after {}s.", timeout_secs),
            timed_out: true,
            tool_available: true,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            success: false,
            warning_count: 0,
            error_count: 1,
            raw_output: message.into(),
            timed_out: false,
            tool_available: false,
        }
    }
}

/// Style/documentation/maintainability scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub style_compliance: f64,
    pub documentation: f64,
    pub maintainability: f64,
    /// False when clang-tidy was missing; style/maintainability are then
    /// the unpenalized defaults
    pub clang_available: bool,
}

/// Driver-functionality heuristic scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalityReport {
    pub basic_operations: f64,
    pub error_handling: f64,
    pub edge_cases: f64,
}

/// Output of the generation service for one model variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub model: String,
    pub success: bool,
    /// Generated code on success, error text on failure
    pub output: String,
}

impl GenerationAttempt {
    pub fn ok(model: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            success: true,
            output: code.into(),
        }
    }

    pub fn failed(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            success: false,
            output: reason.into(),
        }
    }
}

/// All evaluator outputs for one candidate source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeScores {
    pub compilation: CompilationReport,
    pub security: SecurityReport,
    pub quality: QualityReport,
    pub functionality: FunctionalityReport,
}

/// One scored (prompt, model) unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub model: String,
    pub code: String,
    #[serde(flatten)]
    pub scores: CodeScores,
}

/// A model variant excluded from scoring because generation failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedGeneration {
    pub model: String,
    pub reason: String,
}

/// Full evaluation of one prompt across all model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptEvaluation {
    pub prompt: String,
    pub prompt_weight: f64,
    pub evaluated: Vec<ModelEvaluation>,
    pub skipped: Vec<SkippedGeneration>,
}

/// Top-level report for one harness run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRun {
    pub generated_at: DateTime<Utc>,
    pub prompts: Vec<PromptEvaluation>,
}

impl EvalRun {
    pub fn new(prompts: Vec<PromptEvaluation>) -> Self {
        Self {
            generated_at: Utc::now(),
            prompts,
        }
    }
}

/// Round to two decimals, the precision used for every reported score.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_penalties() {
        assert_eq!(Severity::Critical.penalty(), 0.40);
        assert_eq!(Severity::High.penalty(), 0.25);
        assert_eq!(Severity::Medium.penalty(), 0.15);
        assert_eq!(Severity::Low.penalty(), 0.05);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_bucket_metric_names() {
        assert_eq!(Bucket::MemorySafety.metric_name(), "kernel_memory_safety");
        assert_eq!(Bucket::Concurrency.metric_name(), "kernel_concurrency");
        assert_eq!(Bucket::ApiMisuse.metric_name(), "kernel_api_misuse");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.3333), 0.33);
        assert_eq!(round2(0.356), 0.36);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn test_compilation_report_timeout() {
        let report = CompilationReport::timeout(60);
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert!(report.timed_out);
        assert!(report.raw_output.contains("timed out"));
    }
}
