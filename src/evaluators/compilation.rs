//! Out-of-tree kernel module build runner
//!
//! Materializes a candidate driver source next to a minimal `obj-m`
//! Makefile in a scratch directory, runs `make` with a bounded timeout,
//! and counts `error:`/`warning:` diagnostics from the combined output.
//! The scratch directory is removed on every exit path.

use crate::config::ToolsConfig;
use crate::models::CompilationReport;
use crate::tools::{run_tool, ToolOutput};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const DRIVER_FILE: &str = "driver_under_test.c";

/// Builds candidate drivers against the installed kernel headers
pub struct ModuleCompiler {
    make_program: String,
    kernel_build_dir: Option<PathBuf>,
    timeout_secs: u64,
}

impl ModuleCompiler {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            make_program: tools.make_program.clone(),
            kernel_build_dir: tools.kernel_build_dir.clone(),
            timeout_secs: tools.build_timeout_secs,
        }
    }

    /// Compile the driver source and classify the result.
    ///
    /// Never returns an error: tool-missing, build-failure, and timeout
    /// all become a `CompilationReport` shape the caller can score.
    pub fn evaluate(&self, code: &str) -> CompilationReport {
        let scratch = match TempDir::with_prefix("kerneval-build-") {
            Ok(dir) => dir,
            Err(e) => {
                return CompilationReport::unavailable(format!(
                    "Failed to create scratch directory: {}",
                    e
                ))
            }
        };

        // TempDir removes the directory when dropped, including on the
        // early-return paths below.
        let report = self.build_in(scratch.path(), code);
        drop(scratch);
        report
    }

    fn build_in(&self, dir: &Path, code: &str) -> CompilationReport {
        if let Err(e) = std::fs::write(dir.join(DRIVER_FILE), code) {
            return CompilationReport::unavailable(format!("Failed to write driver source: {}", e));
        }
        if let Err(e) = std::fs::write(dir.join("Makefile"), makefile()) {
            return CompilationReport::unavailable(format!("Failed to write Makefile: {}", e));
        }

        let mut cmd = vec![self.make_program.clone()];
        if let Some(kdir) = &self.kernel_build_dir {
            cmd.push(format!("KDIR={}", kdir.display()));
        }

        info!("Building {} in {}", DRIVER_FILE, dir.display());
        let output = run_tool(&cmd, "make", self.timeout_secs, Some(dir));
        self.classify(output)
    }

    fn classify(&self, output: ToolOutput) -> CompilationReport {
        if output.timed_out {
            return CompilationReport::timeout(self.timeout_secs);
        }
        if !output.success {
            return CompilationReport::unavailable(
                output.error.unwrap_or_else(|| "make failed to start".to_string()),
            );
        }

        let build_output = output.combined_output();
        let error_count = build_output.matches("error:").count();
        let warning_count = build_output.matches("warning:").count();
        let success = output.exit_code == Some(0);

        debug!(
            "Build finished: success={} errors={} warnings={}",
            success, error_count, warning_count
        );

        CompilationReport {
            success,
            warning_count,
            error_count,
            raw_output: build_output.trim().to_string(),
            timed_out: false,
            tool_available: true,
        }
    }
}

/// Minimal out-of-tree module build recipe with `default` and `clean`
/// goals. KDIR can be overridden on the make command line.
fn makefile() -> String {
    [
        format!("obj-m += {}.o", DRIVER_FILE.trim_end_matches(".c")),
        String::new(),
        "KDIR ?= /lib/modules/$(shell uname -r)/build".to_string(),
        "PWD := $(shell pwd)".to_string(),
        String::new(),
        "default:".to_string(),
        "\t$(MAKE) -C $(KDIR) M=$(PWD) modules".to_string(),
        String::new(),
        "clean:".to_string(),
        "\t$(MAKE) -C $(KDIR) M=$(PWD) clean".to_string(),
        String::new(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use std::os::unix::fs::PermissionsExt;

    fn compiler_with_make(make_program: &str, timeout_secs: u64) -> ModuleCompiler {
        let tools = ToolsConfig {
            make_program: make_program.to_string(),
            build_timeout_secs: timeout_secs,
            ..ToolsConfig::default()
        };
        ModuleCompiler::new(&tools)
    }

    /// Write an executable stand-in for make into `dir` and return its path.
    fn fake_make(dir: &Path, script: &str) -> String {
        let path = dir.join("fake-make");
        std::fs::write(&path, script).expect("write script");
        let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_makefile_declares_module_target() {
        let mk = makefile();
        assert!(mk.contains("obj-m += driver_under_test.o"));
        assert!(mk.contains("default:"));
        assert!(mk.contains("clean:"));
        assert!(mk.contains("\t$(MAKE) -C $(KDIR)"));
    }

    #[test]
    fn test_missing_make_is_unavailable() {
        let compiler = compiler_with_make("/nonexistent/kerneval-make", 5);
        let report = compiler.evaluate("int x;");
        assert!(!report.success);
        assert!(!report.tool_available);
        assert_eq!(report.error_count, 1);
    }

    #[test]
    fn test_failed_build_counts_diagnostics() {
        let home = TempDir::new().expect("tempdir");
        let make = fake_make(
            home.path(),
            "#!/bin/sh\n\
             echo 'driver_under_test.c:3:5: error: expected ; before return'\n\
             echo 'driver_under_test.c:7:9: warning: unused variable x'\n\
             echo 'driver_under_test.c:9:1: error: unknown type name foo'\n\
             exit 2\n",
        );

        let compiler = compiler_with_make(&make, 10);
        let report = compiler.evaluate("int x;");
        assert!(!report.success);
        assert!(report.tool_available);
        assert_eq!(report.error_count, 2);
        assert_eq!(report.warning_count, 1);
        assert!(report.raw_output.contains("unused variable"));
    }

    #[test]
    fn test_verbose_failed_build_keeps_every_diagnostic() {
        let home = TempDir::new().expect("tempdir");
        // Far more output than one pipe buffer holds, then a quick exit
        let make = fake_make(
            home.path(),
            "#!/bin/sh\n\
             i=0\n\
             while [ $i -lt 3000 ]; do\n\
               echo \"driver_under_test.c:$i:1: error: something went wrong at this location\"\n\
               i=$((i+1))\n\
             done\n\
             exit 2\n",
        );

        let compiler = compiler_with_make(&make, 5);
        let report = compiler.evaluate("int x;");
        assert!(!report.timed_out);
        assert!(!report.success);
        assert!(report.tool_available);
        assert_eq!(report.error_count, 3000);
    }

    #[test]
    fn test_clean_build_succeeds() {
        let home = TempDir::new().expect("tempdir");
        let make = fake_make(home.path(), "#!/bin/sh\necho 'CC [M] driver_under_test.o'\nexit 0\n");

        let compiler = compiler_with_make(&make, 10);
        let report = compiler.evaluate("int x;");
        assert!(report.success);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
    }

    #[test]
    fn test_timeout_yields_synthetic_error() {
        let home = TempDir::new().expect("tempdir");
        let make = fake_make(home.path(), "#!/bin/sh\nsleep 10\n");

        let compiler = compiler_with_make(&make, 1);
        let report = compiler.evaluate("int x;");
        assert!(!report.success);
        assert!(report.timed_out);
        assert_eq!(report.error_count, 1);
        assert!(report.raw_output.contains("timed out"));
    }

    #[test]
    fn test_scratch_directory_removed_on_all_paths() {
        let home = TempDir::new().expect("tempdir");
        let cwd_marker = home.path().join("build-cwd.txt");

        // Failing build that records the scratch directory it ran in
        let make = fake_make(
            home.path(),
            &format!("#!/bin/sh\npwd > {}\nexit 2\n", cwd_marker.display()),
        );
        let compiler = compiler_with_make(&make, 10);
        let report = compiler.evaluate("int x;");
        assert!(!report.success);

        let scratch: PathBuf = std::fs::read_to_string(&cwd_marker)
            .expect("marker written")
            .trim()
            .into();
        assert!(!scratch.as_os_str().is_empty());
        assert!(
            !scratch.exists(),
            "scratch dir {} still exists",
            scratch.display()
        );

        // Same property on the success path
        let make_ok = fake_make(home.path(), &format!(
            "#!/bin/sh\npwd > {}\nexit 0\n",
            cwd_marker.display()
        ));
        let compiler = compiler_with_make(&make_ok, 10);
        let report = compiler.evaluate("int x;");
        assert!(report.success);
        let scratch: PathBuf = std::fs::read_to_string(&cwd_marker)
            .expect("marker written")
            .trim()
            .into();
        assert!(!scratch.exists());
    }
}
