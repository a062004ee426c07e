// Analytics aggregation for the delivery insights dashboard.
//
// Flat query rows go in; grouped, derived, client-ready reports come out.
// The row source is pluggable (`query::RowSource`); everything between the
// rows and the finished `types::Report` is pure.
pub mod coerce;
pub mod config;
pub mod error;
pub mod grouping;
pub mod loader;
pub mod logging;
pub mod mappers;
pub mod metrics;
pub mod output;
pub mod query;
pub mod reports;
pub mod service;
pub mod types;
pub mod util;
pub mod value;

pub use config::Config;
pub use error::{ConfigError, QueryError, ReportError, ReportResult};
pub use mappers::{CategoryMappers, Severity};
pub use query::{Query, QueryKind, RowSource, StaticRowSource};
pub use service::{ReportKind, ReportService, Response};
pub use types::{Report, ReportMetadata};
pub use value::{Row, Value};
