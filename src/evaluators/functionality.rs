//! Driver functionality heuristics
//!
//! Scores whether a candidate driver implements the expected file
//! operations, returns proper kernel error codes, and guards the usual
//! edge cases. Pure text heuristics over the raw source.

use crate::models::{round2, FunctionalityReport};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const ESSENTIAL_OPS: &[&str] = &[".open", ".release", ".read", ".write"];

static RETURN_STMT: OnceLock<Regex> = OnceLock::new();
static ERROR_RETURN: OnceLock<Regex> = OnceLock::new();
static FALLIBLE_CALL: OnceLock<Regex> = OnceLock::new();
static NULL_CHECK: OnceLock<Regex> = OnceLock::new();
static NEGATION_CHECK: OnceLock<Regex> = OnceLock::new();
static LENGTH_CHECK: OnceLock<Regex> = OnceLock::new();
static GUARD_NEGATION: OnceLock<Regex> = OnceLock::new();
static GUARD_NULL_EQ: OnceLock<Regex> = OnceLock::new();

fn return_stmt() -> &'static Regex {
    RETURN_STMT.get_or_init(|| Regex::new(r"\breturn\b").expect("return pattern"))
}

fn error_return() -> &'static Regex {
    ERROR_RETURN.get_or_init(|| Regex::new(r"\breturn\s+(-E[A-Z]+)").expect("error pattern"))
}

fn fallible_call() -> &'static Regex {
    FALLIBLE_CALL.get_or_init(|| {
        Regex::new(r"(\w+)\s*=\s*(?:kmalloc|kzalloc|copy_from_user)\s*\(")
            .expect("fallible pattern")
    })
}

fn null_check() -> &'static Regex {
    NULL_CHECK.get_or_init(|| Regex::new(r"if\s*\([^)]*NULL").expect("null pattern"))
}

fn negation_check() -> &'static Regex {
    NEGATION_CHECK.get_or_init(|| Regex::new(r"if\s*\(\s*!\s*\w+").expect("negation pattern"))
}

fn length_check() -> &'static Regex {
    LENGTH_CHECK.get_or_init(|| Regex::new(r"if\s*\([^)]*(len|size|count)").expect("length pattern"))
}

fn guard_negation() -> &'static Regex {
    GUARD_NEGATION.get_or_init(|| Regex::new(r"if\s*\([^)]*!\s*(\w+)").expect("guard pattern"))
}

fn guard_null_eq() -> &'static Regex {
    GUARD_NULL_EQ.get_or_init(|| Regex::new(r"if\s*\(\s*(\w+)\s*==\s*NULL").expect("null guard pattern"))
}

#[derive(Default)]
pub struct FunctionalityAnalyzer;

impl FunctionalityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, code: &str) -> FunctionalityReport {
        FunctionalityReport {
            basic_operations: round2(basic_operations_score(code)),
            error_handling: round2(error_handling_score(code)),
            edge_cases: round2(edge_case_score(code)),
        }
    }
}

/// Fraction of the essential file operations that are wired up, with
/// `struct file_operations` itself counting as one more.
fn basic_operations_score(code: &str) -> f64 {
    let mut found = ESSENTIAL_OPS.iter().filter(|op| code.contains(*op)).count();
    let mut total = ESSENTIAL_OPS.len();
    if code.contains("struct file_operations") {
        found += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    found as f64 / total as f64
}

/// Weighted mix of checked-fallible-call ratio and error-code-return
/// ratio.
fn error_handling_score(code: &str) -> f64 {
    let total_returns = return_stmt().find_iter(code).count();
    let error_returns = error_return().find_iter(code).count();
    let error_return_ratio = if total_returns > 0 {
        error_returns as f64 / total_returns as f64
    } else {
        0.0
    };

    let calls: Vec<_> = fallible_call().captures_iter(code).collect();
    let checked = calls
        .iter()
        .filter(|caps| {
            let var = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let call_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            is_checked_after(code, call_end, var)
        })
        .count();
    let checked_ratio = if calls.is_empty() {
        1.0
    } else {
        checked as f64 / calls.len() as f64
    };

    checked_ratio * 0.4 + error_return_ratio * 0.6
}

/// Look for a NULL or negation check of `var` in the region just after a
/// fallible call.
fn is_checked_after(code: &str, from: usize, var: &str) -> bool {
    let mut end = (from + 200).min(code.len());
    while !code.is_char_boundary(end) {
        end -= 1;
    }
    let region = &code[from..end];

    guard_negation()
        .captures_iter(region)
        .any(|c| &c[1] == var)
        || guard_null_eq().captures_iter(region).any(|c| &c[1] == var)
}

/// +0.3 NULL guards, +0.3 length/size guards, +0.2 varied error codes;
/// capped at 1.0.
fn edge_case_score(code: &str) -> f64 {
    let mut score: f64 = 0.0;

    if null_check().is_match(code) || negation_check().is_match(code) {
        score += 0.3;
    }
    if length_check().is_match(code) {
        score += 0.3;
    }

    let unique_error_codes: HashSet<&str> = error_return()
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if unique_error_codes.len() > 2 {
        score += 0.2;
    }

    score.min(1.0)
}
