// Report service: clamps parameters, fetches rows, runs the assemblers.

use crate::config::ReportLimits;
use crate::error::{ReportError, ReportResult};
use crate::mappers::CategoryMappers;
use crate::query::{Query, QueryKind, RowSource};
use crate::reports::{self, SummaryRows};
use crate::types::{
    ClientLocation, DashboardSummary, DeliveryActivity, DriverPerformance, Report,
    ReportMetadata, RouteDeliveryTime, SupportIssues,
};
use crate::value::Row;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// The six report shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    DriverPerformance,
    SupportIssues,
    DeliveryActivity,
    ClientLocations,
    RouteDeliveryTimes,
    DashboardSummary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::DriverPerformance,
        ReportKind::SupportIssues,
        ReportKind::DeliveryActivity,
        ReportKind::ClientLocations,
        ReportKind::RouteDeliveryTimes,
        ReportKind::DashboardSummary,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::DriverPerformance => "driver-performance",
            ReportKind::SupportIssues => "support-issues",
            ReportKind::DeliveryActivity => "delivery-activity",
            ReportKind::ClientLocations => "client-locations",
            ReportKind::RouteDeliveryTimes => "route-delivery-times",
            ReportKind::DashboardSummary => "dashboard-summary",
        }
    }

    /// Message shown to dashboard clients when the report cannot be built.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ReportKind::DriverPerformance => "Failed to fetch driver performance data",
            ReportKind::SupportIssues => "Failed to fetch support issues data",
            ReportKind::DeliveryActivity => "Failed to fetch delivery activity data",
            ReportKind::ClientLocations => "Failed to fetch client locations data",
            ReportKind::RouteDeliveryTimes => "Failed to fetch route delivery times data",
            ReportKind::DashboardSummary => "Failed to fetch dashboard summary data",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Wire envelope returned to dashboard clients.
///
/// A failed fetch carries no `data`, so "no rows" and "could not fetch"
/// stay distinguishable.
#[derive(Debug, Clone, Serialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ReportMetadata,
}

impl<T> Response<T> {
    pub fn from_result(
        kind: ReportKind,
        result: ReportResult<Report<T>>,
        now: DateTime<Utc>,
    ) -> Self {
        match result {
            Ok(report) => Response {
                success: true,
                data: Some(report.data),
                error: None,
                metadata: report.metadata,
            },
            Err(e) => {
                warn!(report = %kind, error = %e, "report failed");
                Response {
                    success: false,
                    data: None,
                    error: Some(kind.failure_message().to_string()),
                    metadata: ReportMetadata::new(now),
                }
            }
        }
    }
}

/// Runs report queries against a row source.
pub struct ReportService<S> {
    source: S,
    limits: ReportLimits,
    mappers: CategoryMappers,
}

impl<S: RowSource> ReportService<S> {
    pub fn new(source: S, limits: ReportLimits, mappers: CategoryMappers) -> Self {
        ReportService {
            source,
            limits,
            mappers,
        }
    }

    pub fn limits(&self) -> &ReportLimits {
        &self.limits
    }

    fn fetch(&self, query: Query) -> ReportResult<Vec<Row>> {
        self.source.run_query(&query).map_err(|e| {
            warn!(query = query.name(), error = %e, "query failed");
            ReportError::from(e)
        })
    }

    pub fn driver_performance(
        &self,
        days: Option<i64>,
        driver_filter: Option<&str>,
    ) -> ReportResult<Report<Vec<DriverPerformance>>> {
        let days = self.limits.clamp_days(days);
        let rows = self.fetch(Query::new(QueryKind::DriverPerformance).with_param(days as i64))?;
        let report = reports::driver_performance(&rows, days, driver_filter, Utc::now());
        info!(
            rows = rows.len(),
            drivers = report.data.len(),
            days,
            "driver performance assembled"
        );
        Ok(report)
    }

    pub fn support_issues(&self, days: Option<i64>) -> ReportResult<Report<SupportIssues>> {
        let days = self.limits.clamp_days(days);
        let rows = self.fetch(Query::new(QueryKind::SupportIssues).with_param(days as i64))?;
        let report = reports::support_issues(&rows, days, &self.mappers, Utc::now());
        info!(issues = report.data.total_issues, days, "support issues assembled");
        Ok(report)
    }

    pub fn delivery_activity(&self, days: Option<i64>) -> ReportResult<Report<DeliveryActivity>> {
        let days = self.limits.clamp_days(days);
        let rows = self.fetch(Query::new(QueryKind::DeliveryActivity).with_param(days as i64))?;
        let report = reports::delivery_activity(&rows, days, Utc::now());
        info!(
            rows = rows.len(),
            day_groups = report.data.daily_data.len(),
            days,
            "delivery activity assembled"
        );
        Ok(report)
    }

    pub fn client_locations(
        &self,
        limit: Option<i64>,
    ) -> ReportResult<Report<Vec<ClientLocation>>> {
        let limit = self.limits.clamp_limit(limit);
        let rows = self.fetch(Query::new(QueryKind::ClientLocations))?;
        let report = reports::client_locations(&rows, limit, Utc::now());
        info!(
            rows = rows.len(),
            locations = report.data.len(),
            limit,
            "client locations assembled"
        );
        Ok(report)
    }

    pub fn route_delivery_times(&self) -> ReportResult<Report<Vec<RouteDeliveryTime>>> {
        let rows = self.fetch(Query::new(QueryKind::RouteDeliveryTimes))?;
        let report = reports::route_delivery_times(&rows, Utc::now());
        info!(
            rows = rows.len(),
            routes = report.data.len(),
            "route delivery times assembled"
        );
        Ok(report)
    }

    pub fn dashboard_summary(&self) -> ReportResult<Report<DashboardSummary>> {
        let days = self.limits.summary_days.max(1);
        let rows = SummaryRows {
            deliveries: self
                .fetch(Query::new(QueryKind::WeeklyDeliveries).with_param(days as i64))?,
            rating: self.fetch(Query::new(QueryKind::AverageDriverRating))?,
            support: self.fetch(Query::new(QueryKind::OpenSupportIssues))?,
            drivers: self.fetch(Query::new(QueryKind::ActiveDrivers))?,
            hours: self
                .fetch(Query::new(QueryKind::BusiestDeliveryHour).with_param(days as i64))?,
            issues: self
                .fetch(Query::new(QueryKind::TopIssueCategory).with_param(days as i64))?,
        };
        let report = reports::dashboard_summary(&rows, days, &self.mappers, Utc::now());
        info!(days, "dashboard summary assembled");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StaticRowSource;
    use crate::value::row_of;

    fn service(src: StaticRowSource) -> ReportService<StaticRowSource> {
        ReportService::new(src, ReportLimits::default(), CategoryMappers::standard().clone())
    }

    #[test]
    fn every_report_has_its_own_slug_and_message() {
        let slugs: std::collections::HashSet<_> =
            ReportKind::ALL.iter().map(|k| k.slug()).collect();
        let messages: std::collections::HashSet<_> =
            ReportKind::ALL.iter().map(|k| k.failure_message()).collect();
        assert_eq!(slugs.len(), ReportKind::ALL.len());
        assert_eq!(messages.len(), ReportKind::ALL.len());
    }

    #[test]
    fn failed_query_surfaces_as_error() {
        let svc = service(StaticRowSource::new().fail(QueryKind::SupportIssues, "down"));
        let err = svc.support_issues(None).unwrap_err();
        assert!(matches!(err, ReportError::Query(_)));
    }

    #[test]
    fn summary_fails_if_any_sub_query_fails() {
        let svc = service(
            StaticRowSource::new()
                .with_rows(QueryKind::ActiveDrivers, vec![row_of([("active_drivers", 3i64)])])
                .fail(QueryKind::OpenSupportIssues, "lock wait timeout"),
        );
        assert!(svc.dashboard_summary().is_err());
    }

    #[test]
    fn days_are_clamped_before_reaching_the_report() {
        let svc = service(StaticRowSource::new());
        let report = svc.driver_performance(Some(500), None).unwrap();
        assert_eq!(report.metadata.date_range, Some(90));
        let report = svc.support_issues(Some(0)).unwrap();
        assert_eq!(report.metadata.date_range, Some(1));
    }

    #[test]
    fn envelope_distinguishes_failure_from_empty() {
        let now = Utc::now();
        let svc = service(StaticRowSource::new().fail(QueryKind::RouteDeliveryTimes, "down"));
        let failed = Response::from_result(
            ReportKind::RouteDeliveryTimes,
            svc.route_delivery_times(),
            now,
        );
        assert!(!failed.success);
        assert!(failed.data.is_none());
        assert_eq!(
            failed.error.as_deref(),
            Some("Failed to fetch route delivery times data")
        );

        let svc = service(StaticRowSource::new());
        let empty = Response::from_result(
            ReportKind::RouteDeliveryTimes,
            svc.route_delivery_times(),
            now,
        );
        assert!(empty.success);
        assert_eq!(empty.data.map(|d| d.len()), Some(0));
        assert!(empty.error.is_none());
    }

    #[test]
    fn failed_envelope_serializes_without_data() {
        let resp: Response<Vec<RouteDeliveryTime>> = Response::from_result(
            ReportKind::ClientLocations,
            Err(ReportError::Query(crate::error::QueryError::Connection(
                "refused".into(),
            ))),
            Utc::now(),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"], "Failed to fetch client locations data");
        assert!(json["metadata"]["generated_at"].is_string());
    }
}
