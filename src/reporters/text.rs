//! Text (terminal) reporter with colors and formatting

use crate::models::{EvalRun, ModelEvaluation, Severity};
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
    }
}

fn score_color(score: f64) -> &'static str {
    if score >= 0.8 {
        "\x1b[32m" // Green
    } else if score >= 0.5 {
        "\x1b[33m" // Yellow
    } else {
        "\x1b[31m" // Red
    }
}

fn format_score(score: f64) -> String {
    format!("{}{:.2}{RESET}", score_color(score), score)
}

/// Render run as formatted terminal output
pub fn render(run: &EvalRun) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}Kerneval Report{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "{DIM}Generated: {}   Prompts: {}{RESET}\n\n",
        run.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        run.prompts.len()
    ));

    for (i, prompt) in run.prompts.iter().enumerate() {
        out.push_str(&format!(
            "{BOLD}[{}] {}{RESET}  {DIM}(weight {:.2}){RESET}\n",
            i + 1,
            truncate(&prompt.prompt, 60),
            prompt.prompt_weight
        ));

        for eval in &prompt.evaluated {
            render_model(&mut out, eval);
        }

        for skip in &prompt.skipped {
            out.push_str(&format!(
                "  {DIM}○ {} skipped: {}{RESET}\n",
                skip.model,
                truncate(&skip.reason, 60)
            ));
        }
        out.push('\n');
    }

    Ok(out)
}

fn render_model(out: &mut String, eval: &ModelEvaluation) {
    let c = &eval.scores.compilation;
    let build = if c.success {
        format!("\x1b[32m✓ builds{RESET} ({} warnings)", c.warning_count)
    } else if c.timed_out {
        format!("\x1b[31m✗ build timed out{RESET}")
    } else if !c.tool_available {
        format!("{DIM}○ build tool unavailable{RESET}")
    } else {
        format!(
            "\x1b[31m✗ build failed{RESET} ({} errors, {} warnings)",
            c.error_count, c.warning_count
        )
    };

    out.push_str(&format!("  {BOLD}{}{RESET}  {}\n", eval.model, build));

    let s = &eval.scores.security;
    out.push_str(&format!(
        "    security      memory {}  concurrency {}  api {}\n",
        format_score(s.kernel_memory_safety),
        format_score(s.kernel_concurrency),
        format_score(s.kernel_api_misuse)
    ));

    let q = &eval.scores.quality;
    out.push_str(&format!(
        "    quality       style {}  docs {}  maint {}{}\n",
        format_score(q.style_compliance),
        format_score(q.documentation),
        format_score(q.maintainability),
        if q.clang_available {
            String::new()
        } else {
            format!("  {DIM}(clang-tidy unavailable){RESET}")
        }
    ));

    let f = &eval.scores.functionality;
    out.push_str(&format!(
        "    functionality ops {}  errors {}  edges {}\n",
        format_score(f.basic_operations),
        format_score(f.error_handling),
        format_score(f.edge_cases)
    ));

    for issue in &s.issues {
        let sev_c = severity_color(&issue.severity);
        let line = issue
            .line
            .map(|l| format!(":{}", l))
            .unwrap_or_default();
        out.push_str(&format!(
            "    {sev_c}[{}]{RESET} {}{} {DIM}- {}{RESET}\n",
            issue.severity, issue.category, line, issue.recommendation
        ));
    }
}

/// Truncate on char boundaries to avoid UTF-8 panics
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_run;

    #[test]
    fn test_text_render_mentions_models_and_skips() {
        let run = test_run();
        let out = render(&run).expect("render");
        assert!(out.contains("gemini-1.5-flash"));
        assert!(out.contains("skipped"));
        assert!(out.contains("unsafe_string_function"));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let s = "αβγδε".repeat(20);
        let t = truncate(&s, 10);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), 13);
    }
}
