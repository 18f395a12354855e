//! Evaluate command - generate and score candidates for a prompt file

use crate::config::EvalConfig;
use crate::harness::Harness;
use crate::llm::GenClient;
use crate::models::EvalRun;
use crate::reporters;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub fn run(
    config: &EvalConfig,
    prompts_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let prompts = read_prompts(prompts_path)?;
    if prompts.is_empty() {
        anyhow::bail!("No prompts found in {}", prompts_path.display());
    }

    let client = GenClient::from_env(&config.generation)
        .with_context(|| "Failed to build generation client")?;

    eprintln!(
        "{} Evaluating {} prompt(s) across {} model variant(s)",
        style("▶").bold(),
        prompts.len(),
        config.generation.models.len()
    );

    let harness = Harness::new(Box::new(client), config);

    let bar = ProgressBar::new(prompts.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = Vec::with_capacity(prompts.len());
    for prompt in &prompts {
        bar.set_message(truncate(prompt, 40));
        results.push(harness.evaluate_prompt(prompt));
        bar.inc(1);
    }
    bar.finish_and_clear();

    let run = EvalRun::new(results);
    let rendered = reporters::report(&run, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Report written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// One prompt per line; blank lines and # comments are skipped.
fn read_prompts(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompts file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_prompts_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prompts.txt");
        std::fs::write(
            &path,
            "# benchmark prompts\n\nWrite a char device driver.\n  \nCreate a kernel module.\n",
        )
        .expect("write");

        let prompts = read_prompts(&path).expect("read");
        assert_eq!(
            prompts,
            vec![
                "Write a char device driver.".to_string(),
                "Create a kernel module.".to_string()
            ]
        );
    }

    #[test]
    fn test_read_prompts_missing_file() {
        assert!(read_prompts(Path::new("/nonexistent/prompts.txt")).is_err());
    }
}
