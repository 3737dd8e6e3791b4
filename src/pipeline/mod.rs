//! Enrichment of a [`Dataset`] and the aggregate bundle fed to the dashboard.

pub mod cache;

pub use cache::EnrichmentCache;

use rayon::prelude::*;
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::{info, warn};

use crate::{
    error::PipelineError,
    frequency::{aggregate, FrequencyTable},
    lead_time::LeadTimeOrder,
    record::{Dataset, EnrichedRecord, ReservationRecord, SnapshotId},
    region::{classify, RegionCode},
};

/// Named outputs of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Prefecture counts; unclassified addresses excluded.
    RegionCounts,
    /// Channel counts with an explicit missing bucket.
    ChannelCounts,
    /// Plan-name counts; missing excluded.
    PlanCounts,
    /// Per-record lead time, aligned with the enriched records.
    LeadTimeDays,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::RegionCounts,
        Metric::ChannelCounts,
        Metric::PlanCounts,
        Metric::LeadTimeDays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::RegionCounts => "region_counts",
            Metric::ChannelCounts => "channel_counts",
            Metric::PlanCounts => "plan_counts",
            Metric::LeadTimeDays => "lead_time_days",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown metric: {s}"))
    }
}

/// Dashboard panels and the metric each one plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chart {
    PrefectureGraph,
    ChannelPieChart,
    LeadTimeBarGraph,
    LeadTimeScatterPlot,
    PlanPopularityGraph,
}

impl Chart {
    pub const ALL: [Chart; 5] = [
        Chart::PrefectureGraph,
        Chart::ChannelPieChart,
        Chart::LeadTimeBarGraph,
        Chart::LeadTimeScatterPlot,
        Chart::PlanPopularityGraph,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Chart::PrefectureGraph => "prefecture-graph",
            Chart::ChannelPieChart => "channel-pie-chart",
            Chart::LeadTimeBarGraph => "lead-time-bar-graph",
            Chart::LeadTimeScatterPlot => "lead-time-scatter-plot",
            Chart::PlanPopularityGraph => "plan-popularity-graph",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Chart::PrefectureGraph => "都道府県別住所頻度",
            Chart::ChannelPieChart => "流入経路の割合",
            Chart::LeadTimeBarGraph => "リードタイムの棒グラフ",
            Chart::LeadTimeScatterPlot => "リードタイムの散布図",
            Chart::PlanPopularityGraph => "プラン名別人気度",
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            Chart::PrefectureGraph => Metric::RegionCounts,
            Chart::ChannelPieChart => Metric::ChannelCounts,
            Chart::LeadTimeBarGraph | Chart::LeadTimeScatterPlot => Metric::LeadTimeDays,
            Chart::PlanPopularityGraph => Metric::PlanCounts,
        }
    }
}

/// Borrowed view of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricOutput<'a> {
    Regions(&'a FrequencyTable<RegionCode>),
    Categories(&'a FrequencyTable<String>),
    Series(&'a [Option<i64>]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeSummary {
    pub computed: usize,
    pub not_computable: usize,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateBundle {
    pub region_counts: FrequencyTable<RegionCode>,
    pub channel_counts: FrequencyTable<String>,
    pub plan_counts: FrequencyTable<String>,
    pub lead_time_days: Vec<Option<i64>>,
    /// Records with a non-empty address that named no prefecture.
    pub unknown_regions: usize,
}

impl AggregateBundle {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let unknown_regions = records
            .iter()
            .filter(|r| {
                r.region.is_none() && r.record.address.as_deref().is_some_and(|a| !a.is_empty())
            })
            .count();

        Self {
            region_counts: aggregate(records.iter().map(|r| r.region), false),
            channel_counts: aggregate(records.iter().map(|r| r.record.channel.clone()), true),
            plan_counts: aggregate(records.iter().map(|r| r.record.plan_name.clone()), false),
            lead_time_days: records.iter().map(|r| r.lead_time_days).collect(),
            unknown_regions,
        }
    }

    pub fn get(&self, metric: Metric) -> MetricOutput<'_> {
        match metric {
            Metric::RegionCounts => MetricOutput::Regions(&self.region_counts),
            Metric::ChannelCounts => MetricOutput::Categories(&self.channel_counts),
            Metric::PlanCounts => MetricOutput::Categories(&self.plan_counts),
            Metric::LeadTimeDays => MetricOutput::Series(&self.lead_time_days),
        }
    }

    pub fn unknown_region_count(&self) -> usize {
        self.unknown_regions
    }

    pub fn lead_time_summary(&self) -> LeadTimeSummary {
        let values: Vec<i64> = self.lead_time_days.iter().flatten().copied().collect();
        let mean = (!values.is_empty())
            .then(|| values.iter().sum::<i64>() as f64 / values.len() as f64);
        LeadTimeSummary {
            computed: values.len(),
            not_computable: self.lead_time_days.len() - values.len(),
            min: values.iter().min().copied(),
            max: values.iter().max().copied(),
            mean,
        }
    }
}

/// Result of one pipeline run over a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub snapshot: SnapshotId,
    pub lead_time_order: LeadTimeOrder,
    pub records: Vec<EnrichedRecord>,
    pub aggregates: AggregateBundle,
}

pub fn enrich_record(record: &ReservationRecord, order: LeadTimeOrder) -> EnrichedRecord {
    EnrichedRecord {
        region: classify(record.address.as_deref()),
        lead_time_days: order.lead_time(record),
        record: record.clone(),
    }
}

/// Derive regions and lead times for every record, in order, and build the
/// aggregate bundle.
///
/// Fails only when the dataset's schema lacks one of the required fields.
#[tracing::instrument(level = "info", skip(dataset), fields(records = dataset.len(), snapshot = %dataset.snapshot()))]
pub fn enrich(dataset: &Dataset, order: LeadTimeOrder) -> Result<Enrichment, PipelineError> {
    dataset.require_all()?;

    let records: Vec<EnrichedRecord> = dataset
        .records()
        .par_iter()
        .map(|r| enrich_record(r, order))
        .collect();
    let aggregates = AggregateBundle::from_records(&records);

    let summary = aggregates.lead_time_summary();
    if summary.not_computable > 0 {
        warn!(
            count = summary.not_computable,
            "lead time not computable (missing or unparsable date)"
        );
    }
    info!(
        regions = aggregates.region_counts.len(),
        unknown_regions = aggregates.unknown_regions,
        channels = aggregates.channel_counts.len(),
        plans = aggregates.plan_counts.len(),
        "enriched"
    );

    Ok(Enrichment {
        snapshot: dataset.snapshot(),
        lead_time_order: order,
        records,
        aggregates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frequency::Category,
        record::{DateField, Field},
    };
    use chrono::NaiveDate;

    fn date(s: &str) -> DateField {
        DateField::Parsed(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn rec(address: Option<&str>, channel: Option<&str>, plan: Option<&str>) -> ReservationRecord {
        ReservationRecord {
            address: address.map(str::to_string),
            channel: channel.map(str::to_string),
            plan_name: plan.map(str::to_string),
            application_date: date("2024-07-01"),
            checkin_date: date("2024-07-15"),
        }
    }

    fn sample() -> Dataset {
        let mut records = vec![
            rec(Some("東京都渋谷区1-1-1"), Some("Web"), Some("会席")),
            rec(Some("神奈川県横浜市"), None, Some("素泊まり")),
            rec(None, Some("Web"), Some("会席")),
            rec(Some("unknown city"), Some("TEL"), None),
        ];
        records[2].application_date = DateField::Unparsable("未定".into());
        records[3].checkin_date = date("2024-07-01");
        Dataset::from_records(records)
    }

    #[test]
    fn regions_and_region_counts() {
        let out = enrich(&sample(), LeadTimeOrder::default()).unwrap();
        let regions: Vec<_> = out.records.iter().map(|r| r.region).collect();
        assert_eq!(
            regions,
            vec![Some(RegionCode::Tokyo), Some(RegionCode::Kanagawa), None, None]
        );
        assert_eq!(
            out.aggregates.region_counts.entries(),
            &[
                (Category::Value(RegionCode::Tokyo), 1),
                (Category::Value(RegionCode::Kanagawa), 1)
            ]
        );
        assert_eq!(out.aggregates.unknown_region_count(), 1);
    }

    #[test]
    fn preserves_count_order_and_alignment() {
        let ds = sample();
        let out = enrich(&ds, LeadTimeOrder::default()).unwrap();
        assert_eq!(out.records.len(), ds.len());
        for (i, e) in out.records.iter().enumerate() {
            assert_eq!(e.record, ds.records()[i]);
            assert_eq!(e.lead_time_days, out.aggregates.lead_time_days[i]);
        }
        assert_eq!(
            out.aggregates.lead_time_days,
            vec![Some(-14), Some(-14), None, Some(0)]
        );
    }

    #[test]
    fn channel_and_plan_policies() {
        let b = enrich(&sample(), LeadTimeOrder::default()).unwrap().aggregates;
        assert_eq!(
            b.channel_counts.entries(),
            &[
                (Category::Value("Web".to_string()), 2),
                (Category::Missing, 1),
                (Category::Value("TEL".to_string()), 1)
            ]
        );
        assert_eq!(b.channel_counts.total(), 4);
        assert_eq!(b.plan_counts.total(), 3);
        assert_eq!(b.plan_counts.missing_count(), 0);
    }

    #[test]
    fn missing_schema_field_is_fatal() {
        let ds = Dataset::new(
            sample().records().to_vec(),
            [Field::Channel, Field::PlanName, Field::ApplicationDate, Field::CheckinDate],
        );
        match enrich(&ds, LeadTimeOrder::default()) {
            Err(PipelineError::MissingField { field }) => assert_eq!(field, Field::Address),
            other => panic!("unexpected {:?}", other.map(|e| e.records.len())),
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let ds = sample();
        let a = enrich(&ds, LeadTimeOrder::default()).unwrap();
        let b = enrich(&ds, LeadTimeOrder::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );

        let flipped = enrich(&ds, LeadTimeOrder::CheckinMinusApplication).unwrap();
        assert_eq!(flipped.aggregates.lead_time_days[0], Some(14));
    }

    #[test]
    fn metric_lookup_by_name() {
        let b = enrich(&sample(), LeadTimeOrder::default()).unwrap().aggregates;
        for m in Metric::ALL {
            assert_eq!(m.name().parse::<Metric>(), Ok(m));
        }
        assert!("lead_time".parse::<Metric>().is_err());
        assert_eq!(
            b.get(Metric::LeadTimeDays),
            MetricOutput::Series(&b.lead_time_days)
        );
        assert_eq!(
            b.get(Metric::PlanCounts),
            MetricOutput::Categories(&b.plan_counts)
        );
        assert_eq!(Chart::LeadTimeScatterPlot.metric(), Metric::LeadTimeDays);
        assert_eq!(Chart::ALL.len(), 5);
    }

    #[test]
    fn lead_time_summary_ignores_not_computable() {
        let s = enrich(&sample(), LeadTimeOrder::default())
            .unwrap()
            .aggregates
            .lead_time_summary();
        assert_eq!(s.computed, 3);
        assert_eq!(s.not_computable, 1);
        assert_eq!(s.min, Some(-14));
        assert_eq!(s.max, Some(0));
        assert!((s.mean.unwrap() - (-28.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_dataset_is_valid() {
        let out = enrich(&Dataset::from_records(Vec::new()), LeadTimeOrder::default()).unwrap();
        assert!(out.records.is_empty());
        assert!(out.aggregates.region_counts.is_empty());
        assert_eq!(out.aggregates.lead_time_summary().mean, None);
    }
}
