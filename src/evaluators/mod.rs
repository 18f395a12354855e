//! Heuristic evaluators for candidate driver sources
//!
//! Each evaluator is an independent pass over one source string:
//! - `security` - regex vulnerability scanner with bucket scoring
//! - `compilation` - out-of-tree module build via make
//! - `clang_tidy` / `quality` - lint-backed style and documentation scores
//! - `functionality` - file-operations and error-handling heuristics
//! - `prompt_weight` - complexity weight of the generation prompt
//!
//! No evaluator shares state with another; each (prompt, model) unit can
//! be scored in any order.

pub mod clang_tidy;
pub mod compilation;
pub mod functionality;
pub mod prompt_weight;
pub mod quality;
pub mod security;

pub use clang_tidy::{ClangIssue, ClangReport, ClangTidy};
pub use compilation::ModuleCompiler;
pub use functionality::FunctionalityAnalyzer;
pub use prompt_weight::prompt_weight;
pub use quality::QualityAnalyzer;
pub use security::VulnScanner;
