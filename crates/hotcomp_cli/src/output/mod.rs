//! Output formatting module

mod json;
mod text;

use hotcomp_core::CacheStats;
use miette::Result;

use crate::cli::OutputFormat;

/// How one request was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Compiled { warnings: Vec<String> },
    Cached,
    Passthrough,
    Failed(String),
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Compiled { .. } => "compiled",
            RequestStatus::Cached => "cached",
            RequestStatus::Passthrough => "passthrough",
            RequestStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub path: String,
    pub round: usize,
    pub status: RequestStatus,
}

pub fn output_report(
    records: &[RequestRecord],
    stats: &CacheStats,
    cache_len: usize,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => json::output_json(records, stats, cache_len)?,
        OutputFormat::Text => text::output_text(records, stats, cache_len),
    }
    Ok(())
}
