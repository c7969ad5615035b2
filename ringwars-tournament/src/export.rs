//! Flat CSV export of match results

use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::match_play::MatchResult;

pub const CSV_HEADER: &str = "Agent1,Agent2,Winner,EndReason,Turns,Duration";

/// Write one row per result; errored matches list `Error` as the winner
pub fn write_csv<W: Write>(mut out: W, results: &[MatchResult]) -> std::io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for r in results {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            r.first,
            r.second,
            r.winner.as_deref().unwrap_or("Error"),
            r.end_reason,
            r.final_turn,
            r.duration_ms
        )?;
    }
    out.flush()
}

pub fn export_csv(path: &Path, results: &[MatchResult]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(std::io::BufWriter::new(file), results)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    tracing::info!("Exported {} results to {}", results.len(), path.display());
    Ok(())
}
