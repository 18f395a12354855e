//! clang-tidy runner and diagnostic parser
//!
//! Runs clang-tidy with a fixed kernel-oriented check list against a
//! candidate source materialized in a scratch directory, and parses
//! diagnostics of the form `<file>:<line>:<col>: <severity>: <message>
//! [<check-name>]` from combined output. A missing or broken clang-tidy
//! degrades to an explicit unavailable result.

use crate::config::ToolsConfig;
use crate::tools::{run_tool, tool_available};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Checks relevant to freestanding kernel C
const KERNEL_CHECKS: &[&str] = &[
    "bugprone-unused-parameter",
    "bugprone-unused-variable",
    "misc-unused-parameters",
    "misc-unused-variables",
    "readability-braces-around-statements",
    "readability-misleading-indentation",
    "performance-unnecessary-copy-initialization",
    "clang-analyzer-core.NullDereference",
    "clang-analyzer-deadcode.DeadStores",
];

/// Preprocessor definitions that let kernel sources preprocess without a
/// real kernel tree
const KERNEL_DEFINES: &[&str] = &[
    "-D__KERNEL__",
    "-DMODULE",
    "-DREAD_ONCE(x)=(x)",
    "-DWRITE_ONCE(x,v)=((x)=(v))",
    "-D__user=",
    "-D__iomem=",
    "-D__must_check=",
];

const SOURCE_FILE: &str = "driver_under_test.c";

static DIAGNOSTIC: OnceLock<Regex> = OnceLock::new();

fn diagnostic_pattern() -> &'static Regex {
    DIAGNOSTIC.get_or_init(|| {
        Regex::new(r"([^:]+):(\d+):(\d+):\s+(warning|error|note):\s+(.+?)\s+\[([^\]]+)\]")
            .expect("diagnostic pattern")
    })
}

/// Diagnostic level reported by clang-tidy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClangSeverity {
    Error,
    Warning,
    Note,
}

/// Rough area a check name belongs to, used for quality scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueArea {
    Security,
    Style,
    Maintainability,
    Performance,
    General,
}

impl IssueArea {
    pub fn from_check(check_name: &str) -> Self {
        let check = check_name.to_lowercase();
        if check.contains("security") || check.contains("null") {
            IssueArea::Security
        } else if check.contains("readability") {
            IssueArea::Style
        } else if check.contains("bugprone")
            || check.contains("unused")
            || check.contains("deadcode")
        {
            IssueArea::Maintainability
        } else if check.contains("performance") {
            IssueArea::Performance
        } else {
            IssueArea::General
        }
    }
}

/// One parsed clang-tidy diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClangIssue {
    pub severity: ClangSeverity,
    pub check: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub area: IssueArea,
}

/// Outcome of one clang-tidy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClangReport {
    pub available: bool,
    pub issues: Vec<ClangIssue>,
}

/// Wraps the configured clang-tidy executable
pub struct ClangTidy {
    program: String,
    include_paths: Vec<PathBuf>,
    timeout_secs: u64,
}

impl ClangTidy {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            program: tools.clang_tidy.clone(),
            include_paths: tools.include_paths.clone(),
            timeout_secs: tools.clang_timeout_secs,
        }
    }

    /// Whether the configured executable answers `--version`.
    pub fn available(&self) -> bool {
        tool_available(&self.program, "clang-tidy")
    }

    /// Analyze one source string. Unavailability and unparseable output
    /// both degrade, they never raise.
    pub fn analyze(&self, code: &str) -> ClangReport {
        if !self.available() {
            warn!("clang-tidy not available; skipping lint analysis");
            return ClangReport {
                available: false,
                issues: Vec::new(),
            };
        }

        let scratch = match TempDir::with_prefix("kerneval-tidy-") {
            Ok(dir) => dir,
            Err(e) => {
                warn!("Failed to create scratch directory for clang-tidy: {}", e);
                return ClangReport {
                    available: false,
                    issues: Vec::new(),
                };
            }
        };

        let source_path = scratch.path().join(SOURCE_FILE);
        if let Err(e) = std::fs::write(&source_path, code) {
            warn!("Failed to write lint source {}: {}", source_path.display(), e);
            return ClangReport {
                available: true,
                issues: Vec::new(),
            };
        }

        let mut cmd = vec![
            self.program.clone(),
            source_path.to_string_lossy().to_string(),
            format!("--checks={}", KERNEL_CHECKS.join(",")),
            "--header-filter=^$".to_string(),
            "--".to_string(),
        ];
        cmd.extend(
            self.include_paths
                .iter()
                .map(|p| format!("-I{}", p.display())),
        );
        cmd.extend(KERNEL_DEFINES.iter().map(|d| d.to_string()));
        cmd.push("-std=gnu89".to_string());

        let output = run_tool(&cmd, "clang-tidy", self.timeout_secs, Some(scratch.path()));
        if output.timed_out || !output.success {
            warn!(
                "clang-tidy run did not complete: {}",
                output.error.as_deref().unwrap_or("unknown")
            );
            return ClangReport {
                available: true,
                issues: Vec::new(),
            };
        }

        let issues = parse_diagnostics(&output.combined_output(), SOURCE_FILE);
        debug!("clang-tidy reported {} issue(s)", issues.len());
        ClangReport {
            available: true,
            issues,
        }
    }
}

/// Parse diagnostics, keeping only those in the analyzed source file
/// (header noise is dropped). Lines that do not match are ignored.
pub fn parse_diagnostics(output: &str, source_file: &str) -> Vec<ClangIssue> {
    let mut issues = Vec::new();

    for caps in diagnostic_pattern().captures_iter(output) {
        let file = &caps[1];
        let file_name = std::path::Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if file_name != source_file {
            continue;
        }

        let severity = match &caps[4] {
            "error" => ClangSeverity::Error,
            "warning" => ClangSeverity::Warning,
            _ => ClangSeverity::Note,
        };
        let check = caps[6].to_string();

        issues.push(ClangIssue {
            severity,
            area: IssueArea::from_check(&check),
            line: caps[2].parse().unwrap_or(0),
            column: caps[3].parse().unwrap_or(0),
            message: caps[5].trim().to_string(),
            check,
        });
    }

    issues
}
