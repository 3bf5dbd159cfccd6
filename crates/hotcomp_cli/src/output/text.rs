//! Text output formatter

use hotcomp_core::CacheStats;

use super::{RequestRecord, RequestStatus};

pub fn output_text(records: &[RequestRecord], stats: &CacheStats, cache_len: usize) {
    for record in records {
        match &record.status {
            RequestStatus::Compiled { warnings } => {
                println!("{}: compiled", record.path);
                for warning in warnings {
                    println!("  warning: {}", warning);
                }
            }
            RequestStatus::Failed(message) => {
                println!("{}: failed", record.path);
                println!("  {}", message);
            }
            status => println!("{}: {}", record.path, status.label()),
        }
    }

    let count = |label: &str| records.iter().filter(|r| r.status.label() == label).count();

    println!();
    println!(
        "Served {} requests ({} compiled, {} cached, {} passthrough, {} failed)",
        records.len(),
        count("compiled"),
        count("cached"),
        count("passthrough"),
        count("failed")
    );
    println!(
        "Cache: {} entries, {} hits, {} misses, {} evictions",
        cache_len, stats.hits, stats.misses, stats.evictions
    );
}
