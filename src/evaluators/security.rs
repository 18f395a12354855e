//! Kernel driver vulnerability scanner
//!
//! Runs a fixed table of regex detectors over raw driver source and folds
//! the matches into severity-weighted bucket scores. This is a heuristic
//! pass, not a parse: false positives and negatives are an accepted
//! trade-off.

use crate::models::{round2, Bucket, Issue, SecurityReport, Severity};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// One entry of the pattern library: a named issue category with its
/// detection patterns, severity, scoring bucket, and remediation hint.
pub struct VulnPattern {
    pub category: &'static str,
    pub patterns: Vec<Regex>,
    pub severity: Severity,
    pub bucket: Bucket,
    pub recommendation: &'static str,
}

static PATTERN_TABLE: OnceLock<Vec<VulnPattern>> = OnceLock::new();

fn compile(patterns: &[&str]) -> Vec<Regex> {
    // Table patterns are fixed at compile time; a bad one is a programming
    // error caught by the table test below.
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid pattern {p:?}: {e}")))
        .collect()
}

/// Vulnerability patterns specific to Linux kernel drivers, built once.
pub fn pattern_table() -> &'static [VulnPattern] {
    PATTERN_TABLE.get_or_init(|| {
        vec![
            VulnPattern {
                category: "unchecked_user_copy",
                patterns: compile(&[r"copy_from_user\s*\(", r"copy_to_user\s*\("]),
                severity: Severity::Critical,
                bucket: Bucket::MemorySafety,
                recommendation:
                    "Always check the return value of copy_from_user/copy_to_user.",
            },
            VulnPattern {
                category: "unchecked_kernel_alloc",
                patterns: compile(&[r"kmalloc\s*\(", r"kzalloc\s*\("]),
                severity: Severity::High,
                bucket: Bucket::MemorySafety,
                recommendation:
                    "Always check the result of kmalloc/kzalloc for NULL to prevent kernel panic.",
            },
            VulnPattern {
                category: "kernel_format_string",
                patterns: compile(&[r"printk\s*\([^,]+\);"]),
                severity: Severity::High,
                bucket: Bucket::MemorySafety,
                recommendation:
                    "Avoid passing raw buffers to printk; use a format specifier like \"%s\".",
            },
            VulnPattern {
                category: "integer_overflow",
                patterns: compile(&[r"\w+\s*\+\s*\w+\s*>", r"size\s*\*\s*count"]),
                severity: Severity::Medium,
                bucket: Bucket::MemorySafety,
                recommendation: "Check for integer overflows before allocating memory.",
            },
            VulnPattern {
                category: "direct_jiffies_access",
                patterns: compile(&[r"\bjiffies\b"]),
                severity: Severity::Medium,
                bucket: Bucket::Concurrency,
                recommendation: "Use get_jiffies_64() to safely read the jiffies counter.",
            },
            VulnPattern {
                category: "unsafe_string_function",
                patterns: compile(&[r"\bstrcpy\s*\(", r"\bsprintf\s*\("]),
                severity: Severity::Critical,
                bucket: Bucket::ApiMisuse,
                recommendation:
                    "Replace strcpy/sprintf with safer kernel APIs like strscpy/scnprintf.",
            },
        ]
    })
}

/// Regex-based scanner over raw kernel driver source
#[derive(Default)]
pub struct VulnScanner;

impl VulnScanner {
    pub fn new() -> Self {
        Self
    }

    /// Find every category whose patterns match anywhere in the source.
    ///
    /// At most one issue is recorded per category regardless of match
    /// count; the line of the earliest match across the category's
    /// patterns is kept. Issues come back in table order.
    pub fn scan(&self, code: &str) -> Vec<Issue> {
        let mut issues = Vec::new();

        for entry in pattern_table() {
            let first_match = entry
                .patterns
                .iter()
                .filter_map(|p| p.find(code))
                .min_by_key(|m| m.start());

            if let Some(m) = first_match {
                let line = code[..m.start()].matches('\n').count() as u32 + 1;
                issues.push(Issue {
                    category: entry.category.to_string(),
                    severity: entry.severity,
                    bucket: entry.bucket,
                    line: Some(line),
                    recommendation: entry.recommendation.to_string(),
                });
            }
        }

        debug!("Vulnerability scan found {} issue(s)", issues.len());
        issues
    }

    /// Scan and aggregate into bucket scores.
    ///
    /// Each bucket starts at 1.0 and pays an additive severity penalty per
    /// issue; the result is clamped to [0, 1] and rounded to two decimals.
    pub fn evaluate(&self, code: &str) -> SecurityReport {
        let issues = self.scan(code);

        let mut memory_safety = 1.0_f64;
        let mut concurrency = 1.0_f64;
        let mut api_misuse = 1.0_f64;

        for issue in &issues {
            let slot = match issue.bucket {
                Bucket::MemorySafety => &mut memory_safety,
                Bucket::Concurrency => &mut concurrency,
                Bucket::ApiMisuse => &mut api_misuse,
            };
            *slot -= issue.severity.penalty();
        }

        SecurityReport {
            kernel_memory_safety: round2(memory_safety.clamp(0.0, 1.0)),
            kernel_concurrency: round2(concurrency.clamp(0.0, 1.0)),
            kernel_api_misuse: round2(api_misuse.clamp(0.0, 1.0)),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VULNERABLE_DRIVER: &str = r#"
    #include <linux/module.h>
    #include <linux/slab.h>
    #include <linux/uaccess.h>
    #include <linux/jiffies.h>

    static ssize_t my_write(struct file *f, const char __user *buf, size_t len, loff_t *off) {
        char *kbuf;
        unsigned long current_time;

        kbuf = kmalloc(len, GFP_KERNEL);
        copy_from_user(kbuf, buf, len);

        char temp[10];
        strcpy(temp, kbuf);
        printk(kbuf);

        current_time = jiffies;

        kfree(kbuf);
        return len;
    }
    "#;

    #[test]
    fn test_table_compiles() {
        assert_eq!(pattern_table().len(), 6);
    }

    #[test]
    fn test_strcpy_is_critical_api_misuse() {
        let scanner = VulnScanner::new();
        let issues = scanner.scan("strcpy(dst, src);");

        let issue = issues
            .iter()
            .find(|i| i.category == "unsafe_string_function")
            .expect("strcpy issue");
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.bucket, Bucket::ApiMisuse);

        let report = scanner.evaluate("strcpy(dst, src);");
        assert!(report.kernel_api_misuse <= 1.0 - 0.40);
    }

    #[test]
    fn test_clean_source_scores_all_ones() {
        let scanner = VulnScanner::new();
        let report = scanner.evaluate("static int noop(void) { return 0; }");
        assert_eq!(report.kernel_memory_safety, 1.0);
        assert_eq!(report.kernel_concurrency, 1.0);
        assert_eq!(report.kernel_api_misuse, 1.0);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_one_issue_per_category() {
        let scanner = VulnScanner::new();
        // Both patterns of unchecked_user_copy match, repeatedly
        let code = "copy_from_user(a, b, n); copy_to_user(b, a, n); copy_from_user(a, b, n);";
        let issues = scanner.scan(code);
        let copies = issues
            .iter()
            .filter(|i| i.category == "unchecked_user_copy")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn test_bucket_floor_at_zero() {
        let scanner = VulnScanner::new();
        // Every memory-safety category at once: 0.40 + 0.25 + 0.25 + 0.15 > 1.0
        let code = r#"
            kbuf = kmalloc(size * count, GFP_KERNEL);
            copy_from_user(kbuf, buf, len);
            printk(kbuf);
            if (a + b > max) { }
        "#;
        let report = scanner.evaluate(code);
        assert_eq!(report.kernel_memory_safety, 0.0);
    }

    #[test]
    fn test_vulnerable_driver_hits_all_buckets() {
        let scanner = VulnScanner::new();
        let report = scanner.evaluate(VULNERABLE_DRIVER);

        // critical user copy + high alloc + high printk
        assert!(report.kernel_memory_safety < 0.5);
        // medium jiffies access
        assert_eq!(report.kernel_concurrency, 0.85);
        // critical strcpy
        assert_eq!(report.kernel_api_misuse, 0.60);
    }

    #[test]
    fn test_issue_lines_recorded() {
        let scanner = VulnScanner::new();
        let issues = scanner.scan("int a;\nstrcpy(dst, src);\n");
        let issue = &issues[0];
        assert_eq!(issue.line, Some(2));
    }

    #[test]
    fn test_scores_never_exceed_bounds() {
        let scanner = VulnScanner::new();
        for code in ["", "x", VULNERABLE_DRIVER] {
            let report = scanner.evaluate(code);
            for bucket in Bucket::ALL {
                let score = report.bucket_score(bucket);
                assert!((0.0..=1.0).contains(&score), "{bucket} = {score}");
            }
        }
    }
}
