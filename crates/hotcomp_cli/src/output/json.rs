//! JSON output formatter

use hotcomp_core::CacheStats;
use miette::{IntoDiagnostic, Result};

use super::{RequestRecord, RequestStatus};

pub fn output_json(records: &[RequestRecord], stats: &CacheStats, cache_len: usize) -> Result<()> {
    let requests: Vec<_> = records
        .iter()
        .map(|r| {
            let mut entry = serde_json::json!({
                "path": r.path,
                "round": r.round,
                "status": r.status.label(),
            });
            match &r.status {
                RequestStatus::Compiled { warnings } if !warnings.is_empty() => {
                    entry["warnings"] = serde_json::json!(warnings);
                }
                RequestStatus::Failed(message) => {
                    entry["error"] = serde_json::json!(message);
                }
                _ => {}
            }
            entry
        })
        .collect();

    let output = serde_json::json!({
        "requests": requests,
        "cache": {
            "entries": cache_len,
            "hits": stats.hits,
            "misses": stats.misses,
            "inserts": stats.inserts,
            "evictions": stats.evictions,
            "deletions": stats.deletions,
        },
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
