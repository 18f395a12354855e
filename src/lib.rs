//! Kerneval - evaluation harness for LLM-generated Linux kernel drivers
//!
//! Sends prompts to a code-generation service, collects candidate C
//! sources per model variant, and scores each candidate: out-of-tree
//! module compilation, vulnerability-pattern scanning, style and
//! documentation quality, and driver-functionality heuristics. A
//! per-prompt complexity weight supports weighted aggregation.

pub mod cli;
pub mod config;
pub mod evaluators;
pub mod harness;
pub mod llm;
pub mod models;
pub mod reporters;
pub mod tools;
