pub mod config;
pub mod error;
pub mod frequency;
pub mod ingest;
pub mod lead_time;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod region;

pub use config::Settings;
pub use error::{ConfigError, IngestError, PipelineError};
pub use frequency::{aggregate, Category, FrequencyTable};
pub use lead_time::{delta_days, LeadTimeOrder};
pub use pipeline::{enrich, AggregateBundle, Enrichment, EnrichmentCache, Metric, MetricOutput};
pub use record::{Dataset, DateField, EnrichedRecord, Field, ReservationRecord, SnapshotId};
pub use region::{classify, RegionCode};
