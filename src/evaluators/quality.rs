//! Hybrid code-quality analyzer
//!
//! Style and maintainability come from clang-tidy issues; documentation
//! is a regex heuristic (comment density plus documented-function ratio),
//! since clang-tidy does not measure it.

use crate::config::ToolsConfig;
use crate::evaluators::clang_tidy::{ClangSeverity, ClangTidy, IssueArea};
use crate::models::{round2, QualityReport};
use regex::Regex;
use std::sync::OnceLock;

/// A 20% comment ratio earns a full documentation score
const FULL_COMMENT_RATIO: f64 = 0.2;

static FUNCTION_DEF: OnceLock<Regex> = OnceLock::new();

fn function_def() -> &'static Regex {
    FUNCTION_DEF.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:static\s+)?\w+\s+\w+\s*\([^)]*\)\s*\{").expect("function pattern")
    })
}

/// Combines clang-tidy lint results with documentation heuristics
pub struct QualityAnalyzer {
    tidy: ClangTidy,
}

impl QualityAnalyzer {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            tidy: ClangTidy::new(tools),
        }
    }

    pub fn evaluate(&self, code: &str) -> QualityReport {
        let clang = self.tidy.analyze(code);

        let mut style_penalty: f64 = 0.0;
        let mut maintainability_penalty: f64 = 0.0;

        for issue in &clang.issues {
            // Errors weigh more than warnings/notes
            let amount = if issue.severity == ClangSeverity::Error {
                0.15
            } else {
                0.05
            };
            match issue.area {
                IssueArea::Style => style_penalty += amount,
                IssueArea::Maintainability | IssueArea::Performance | IssueArea::Security => {
                    maintainability_penalty += amount
                }
                IssueArea::General => {}
            }
        }

        QualityReport {
            style_compliance: round2((1.0 - style_penalty).max(0.0)),
            maintainability: round2((1.0 - maintainability_penalty).max(0.0)),
            documentation: round2(documentation_score(code)),
            clang_available: clang.available,
        }
    }
}

/// Documentation heuristic: half the score is overall comment density,
/// half is the fraction of function definitions with a comment on the
/// preceding line.
pub fn documentation_score(code: &str) -> f64 {
    let lines: Vec<&str> = code.lines().collect();
    let non_empty: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .collect();
    if non_empty.is_empty() {
        return 0.0;
    }

    let comment_lines = non_empty
        .iter()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with("//") || t.starts_with("/*") || t.starts_with("*/") || t.starts_with('*')
        })
        .count();
    let comment_ratio = comment_lines as f64 / non_empty.len() as f64;
    let comment_ratio_score = (comment_ratio / FULL_COMMENT_RATIO).min(1.0);

    let functions: Vec<_> = function_def().find_iter(code).collect();
    let function_doc_score = if functions.is_empty() {
        1.0
    } else {
        let documented = functions
            .iter()
            .filter(|m| {
                let line_idx = code[..m.start()].matches('\n').count();
                line_idx > 0
                    && lines
                        .get(line_idx - 1)
                        .map(|prev| {
                            let t = prev.trim_start();
                            t.starts_with("*/") || t.starts_with("//") || t.starts_with("/*")
                        })
                        .unwrap_or(false)
            })
            .count();
        documented as f64 / functions.len() as f64
    };

    comment_ratio_score * 0.5 + function_doc_score * 0.5
}
