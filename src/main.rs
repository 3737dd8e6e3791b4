use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, Write},
};
use tracing::info;

use ryokan_insights::{
    ingest, logging,
    pipeline::{Chart, LeadTimeSummary, Metric, MetricOutput},
    EnrichedRecord, EnrichmentCache, Settings, SnapshotId,
};

#[derive(Serialize)]
struct ChartBinding {
    id: &'static str,
    title: &'static str,
    metric: Metric,
}

/// Everything the dashboard needs, keyed the way its panels ask for it.
#[derive(Serialize)]
struct DashboardBundle<'a> {
    snapshot: SnapshotId,
    record_count: usize,
    unknown_regions: usize,
    metrics: BTreeMap<&'static str, MetricOutput<'a>>,
    charts: Vec<ChartBinding>,
    lead_time_summary: LeadTimeSummary,
    records: &'a [EnrichedRecord],
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init_logging("info");
    info!("startup");

    // ─── 2) settings ─────────────────────────────────────────────────
    let settings = Settings::from_env().context("loading settings")?;
    info!(
        input = %settings.input.display(),
        header_rows_to_skip = settings.header_rows_to_skip,
        lead_time_order = ?settings.lead_time_order,
        "settings"
    );

    // ─── 3) load once, enrich through the cache ──────────────────────
    let dataset = ingest::load_csv(&settings.input, &settings)
        .with_context(|| format!("reading {}", settings.input.display()))?;
    let cache = EnrichmentCache::new();
    let enrichment = cache
        .get_or_enrich(&dataset, settings.lead_time_order)
        .context("enriching reservations")?;
    let aggregates = &enrichment.aggregates;

    let bundle = DashboardBundle {
        snapshot: enrichment.snapshot,
        record_count: enrichment.records.len(),
        unknown_regions: aggregates.unknown_region_count(),
        metrics: Metric::ALL
            .into_iter()
            .map(|m| (m.name(), aggregates.get(m)))
            .collect(),
        charts: Chart::ALL
            .into_iter()
            .map(|c| ChartBinding {
                id: c.id(),
                title: c.title(),
                metric: c.metric(),
            })
            .collect(),
        lead_time_summary: aggregates.lead_time_summary(),
        records: &enrichment.records,
    };

    // ─── 4) emit ─────────────────────────────────────────────────────
    let mut writer: Box<dyn Write> = match &settings.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    serde_json::to_writer_pretty(&mut writer, &bundle).context("writing bundle")?;
    writeln!(writer)?;
    writer.flush()?;

    info!(snapshot = %enrichment.snapshot, "all done");
    Ok(())
}
