//! Prompt complexity estimator
//!
//! Pure function from prompt text to a bounded weight in [0, 1], used to
//! weight per-prompt scores when aggregating across a benchmark. Counts
//! four keyword classes with fixed per-class weights.

use regex::Regex;
use std::sync::OnceLock;

static TECHNICAL_TERMS: OnceLock<Regex> = OnceLock::new();
static OBLIGATIONS: OnceLock<Regex> = OnceLock::new();
static CONSTRAINTS: OnceLock<Regex> = OnceLock::new();

fn technical_terms() -> &'static Regex {
    TECHNICAL_TERMS.get_or_init(|| {
        Regex::new(r"\b(driver|kernel|module|device|interrupt|dma|mutex|spinlock)\b")
            .expect("technical pattern")
    })
}

fn obligations() -> &'static Regex {
    OBLIGATIONS.get_or_init(|| {
        Regex::new(r"\b(must|should|implement|support|handle)\b").expect("obligation pattern")
    })
}

fn constraints() -> &'static Regex {
    CONSTRAINTS.get_or_init(|| {
        Regex::new(r"\b(without|avoid|prevent|ensure|guarantee)\b").expect("constraint pattern")
    })
}

/// Heuristic complexity weight of a generation prompt.
///
/// Technical terms weigh 20, obligation words 12, constraint words 15,
/// and each word 0.8; the sum is capped at 100 and rescaled to [0, 1].
/// Monotonically non-decreasing in every class count.
pub fn prompt_weight(prompt: &str) -> f64 {
    let lower = prompt.to_lowercase();

    let technical = technical_terms().find_iter(&lower).count() as f64;
    let requirements = obligations().find_iter(&lower).count() as f64;
    let constraint_words = constraints().find_iter(&lower).count() as f64;
    let word_count = prompt.split_whitespace().count() as f64;

    let score = (technical * 20.0 + requirements * 12.0 + constraint_words * 15.0
        + word_count * 0.8)
        .min(100.0);

    score * 0.01
}
