// Aggregation and period comparison for multi-channel marketing reports.
//
// Raw spreadsheet rows from each ad platform are cleaned (`normalize`),
// grouped and summed (`aggregate`), enriched with ratio metrics
// (`metrics`), optionally restricted to a date window (`period`) and
// compared against the preceding window (`compare`). A per-platform
// `platform::PlatformConfig` drives all of it through `pipeline::run`.
pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod period;
pub mod pipeline;
pub mod platform;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use pipeline::{run, DatasetStore, PlatformDataset, PlatformReport};
pub use types::{Cell, ComparisonRecord, MetricRecord, MetricValue, RawRow};
