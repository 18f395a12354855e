//! Scan command - score a local driver source without generation

use crate::config::EvalConfig;
use crate::evaluators::{FunctionalityAnalyzer, ModuleCompiler, QualityAnalyzer, VulnScanner};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(config: &EvalConfig, file: &Path, format: &str, no_build: bool) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let security = VulnScanner::new().evaluate(&code);
    let quality = QualityAnalyzer::new(&config.tools).evaluate(&code);
    let functionality = FunctionalityAnalyzer::new().evaluate(&code);
    let compilation = if no_build {
        None
    } else {
        Some(ModuleCompiler::new(&config.tools).evaluate(&code))
    };

    if format == "json" {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "compilation": compilation,
            "security": security,
            "quality": quality,
            "functionality": functionality,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", style(format!("Scan: {}", file.display())).bold());

    if let Some(c) = &compilation {
        if c.success {
            println!(
                "  {} builds cleanly ({} warnings)",
                style("✓").green(),
                c.warning_count
            );
        } else if c.timed_out {
            println!("  {} build timed out", style("✗").red());
        } else if !c.tool_available {
            println!("  {} build tool unavailable: {}", style("○").dim(), c.raw_output);
        } else {
            println!(
                "  {} build failed ({} errors, {} warnings)",
                style("✗").red(),
                c.error_count,
                c.warning_count
            );
        }
    }

    println!(
        "  security       memory {:.2}  concurrency {:.2}  api {:.2}",
        security.kernel_memory_safety, security.kernel_concurrency, security.kernel_api_misuse
    );
    println!(
        "  quality        style {:.2}  docs {:.2}  maint {:.2}{}",
        quality.style_compliance,
        quality.documentation,
        quality.maintainability,
        if quality.clang_available {
            ""
        } else {
            "  (clang-tidy unavailable)"
        }
    );
    println!(
        "  functionality  ops {:.2}  errors {:.2}  edges {:.2}",
        functionality.basic_operations,
        functionality.error_handling,
        functionality.edge_cases
    );

    if !security.issues.is_empty() {
        println!("\n{}", style("Issues").bold());
        for issue in &security.issues {
            let line = issue.line.map(|l| format!(" (line {})", l)).unwrap_or_default();
            println!(
                "  {} {}{}: {}",
                style(format!("[{}]", issue.severity)).red(),
                issue.category,
                line,
                issue.recommendation
            );
        }
    }
    println!();

    Ok(())
}
