//! Doctor command - check environment

use crate::config::EvalConfig;
use crate::llm::GenBackend;
use crate::tools::tool_available;
use anyhow::Result;
use std::path::Path;

pub fn run(config: &EvalConfig) -> Result<()> {
    println!("🩺 Kerneval Doctor\n");

    // Build toolchain
    if tool_available(&config.tools.make_program, "make") {
        println!("✓ make: OK ({})", config.tools.make_program);
    } else {
        println!("✗ make: not found ({})", config.tools.make_program);
        println!("  Module builds will be reported as tool-unavailable");
    }

    let kdir = config
        .tools
        .kernel_build_dir
        .clone()
        .unwrap_or_else(default_kernel_build_dir);
    if kdir.is_dir() {
        println!("✓ Kernel build tree: {}", kdir.display());
    } else {
        println!("✗ Kernel build tree: {} missing", kdir.display());
        println!("  Install kernel headers or set tools.kernel_build_dir");
    }

    // Lint
    if tool_available(&config.tools.clang_tidy, "clang-tidy") {
        println!("✓ clang-tidy: OK ({})", config.tools.clang_tidy);
    } else {
        println!("○ clang-tidy: not found ({})", config.tools.clang_tidy);
        println!("  Style/maintainability scores will default to 1.0");
    }

    // Generation backend (BYOK)
    match GenBackend::parse(&config.generation.backend) {
        Some(backend) if !backend.requires_api_key() => {
            println!("✓ Generation backend: {} (no key needed)", backend);
        }
        Some(backend) => {
            let env_key = backend.env_key();
            if std::env::var(env_key).is_ok() {
                println!("✓ Generation backend: {} ({} set)", backend, env_key);
            } else {
                println!("✗ Generation backend: {} ({} not set)", backend, env_key);
            }
        }
        None => {
            println!(
                "✗ Generation backend: unknown '{}'",
                config.generation.backend
            );
        }
    }
    println!(
        "  Model variants: {}",
        config.generation.models.join(", ")
    );

    Ok(())
}

fn default_kernel_build_dir() -> std::path::PathBuf {
    let release = std::process::Command::new("uname")
        .arg("-r")
        .output()
        .ok()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();
    Path::new("/lib/modules").join(release).join("build")
}
