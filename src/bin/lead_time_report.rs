use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};

use ryokan_insights::{enrich, ingest, logging, Settings};

/// Positional lead-time feed: one `index,lead_time_days` line per record,
/// blank when not computable.
fn main() -> Result<()> {
    logging::init_logging("info");

    let settings = Settings::from_env().context("loading settings")?;
    let dataset = ingest::load_csv(&settings.input, &settings)
        .with_context(|| format!("reading {}", settings.input.display()))?;
    let enrichment = enrich(&dataset, settings.lead_time_order)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "index,lead_time_days")?;
    for (idx, days) in enrichment.aggregates.lead_time_days.iter().enumerate() {
        match days {
            Some(d) => writeln!(out, "{idx},{d}")?,
            None => writeln!(out, "{idx},")?,
        }
    }
    out.flush()?;

    let s = enrichment.aggregates.lead_time_summary();
    tracing::info!(
        computed = s.computed,
        not_computable = s.not_computable,
        min = ?s.min,
        max = ?s.max,
        mean = ?s.mean,
        "lead time summary"
    );
    Ok(())
}
