//! Markdown reporter
//!
//! GitHub-flavored Markdown, one section per prompt with a score table
//! per model variant.

use crate::models::EvalRun;
use anyhow::Result;
use std::fmt::Write;

/// Render run as Markdown
pub fn render(run: &EvalRun) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# Kerneval Report")?;
    writeln!(out)?;
    writeln!(
        out,
        "Generated: {} — {} prompt(s)",
        run.generated_at.format("%Y-%m-%d %H:%M UTC"),
        run.prompts.len()
    )?;
    writeln!(out)?;

    for (i, prompt) in run.prompts.iter().enumerate() {
        writeln!(out, "## Prompt {} (weight {:.2})", i + 1, prompt.prompt_weight)?;
        writeln!(out)?;
        writeln!(out, "> {}", prompt.prompt)?;
        writeln!(out)?;

        if !prompt.evaluated.is_empty() {
            writeln!(
                out,
                "| Model | Build | Memory | Concurrency | API | Style | Docs | Maint | Ops | Errors | Edges |"
            )?;
            writeln!(
                out,
                "|-------|-------|--------|-------------|-----|-------|------|-------|-----|--------|-------|"
            )?;

            for eval in &prompt.evaluated {
                let c = &eval.scores.compilation;
                let build = if c.success {
                    "✅".to_string()
                } else if c.timed_out {
                    "⏱ timeout".to_string()
                } else if !c.tool_available {
                    "—".to_string()
                } else {
                    format!("❌ {}e/{}w", c.error_count, c.warning_count)
                };

                let s = &eval.scores.security;
                let q = &eval.scores.quality;
                let f = &eval.scores.functionality;
                writeln!(
                    out,
                    "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
                    eval.model,
                    build,
                    s.kernel_memory_safety,
                    s.kernel_concurrency,
                    s.kernel_api_misuse,
                    q.style_compliance,
                    q.documentation,
                    q.maintainability,
                    f.basic_operations,
                    f.error_handling,
                    f.edge_cases
                )?;
            }
            writeln!(out)?;
        }

        let issues: Vec<_> = prompt
            .evaluated
            .iter()
            .flat_map(|e| e.scores.security.issues.iter().map(move |i| (e, i)))
            .collect();
        if !issues.is_empty() {
            writeln!(out, "### Security issues")?;
            writeln!(out)?;
            for (eval, issue) in issues {
                writeln!(
                    out,
                    "- **{}** ({}, {}): {}",
                    issue.category, eval.model, issue.severity, issue.recommendation
                )?;
            }
            writeln!(out)?;
        }

        if !prompt.skipped.is_empty() {
            writeln!(out, "### Skipped")?;
            writeln!(out)?;
            for skip in &prompt.skipped {
                writeln!(out, "- `{}`: {}", skip.model, skip.reason)?;
            }
            writeln!(out)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_run;

    #[test]
    fn test_markdown_has_tables_and_sections() {
        let run = test_run();
        let out = render(&run).expect("render");
        assert!(out.contains("# Kerneval Report"));
        assert!(out.contains("| gemini-1.5-flash |"));
        assert!(out.contains("### Skipped"));
        assert!(out.contains("unsafe_string_function"));
    }
}
