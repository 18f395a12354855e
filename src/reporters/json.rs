//! JSON reporter
//!
//! Outputs the full EvalRun as pretty-printed JSON, suitable for piping
//! to jq or for downstream aggregation.

use crate::models::EvalRun;
use anyhow::Result;

/// Render run as JSON
pub fn render(run: &EvalRun) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}
