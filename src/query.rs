// The queries each report needs and the seam that runs them.
use crate::error::QueryError;
use crate::value::{Row, Value};
use std::collections::HashMap;

/// Every query the reports issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    DriverPerformance,
    SupportIssues,
    DeliveryActivity,
    ClientLocations,
    RouteDeliveryTimes,
    WeeklyDeliveries,
    AverageDriverRating,
    OpenSupportIssues,
    ActiveDrivers,
    BusiestDeliveryHour,
    TopIssueCategory,
}

impl QueryKind {
    pub const ALL: [QueryKind; 11] = [
        QueryKind::DriverPerformance,
        QueryKind::SupportIssues,
        QueryKind::DeliveryActivity,
        QueryKind::ClientLocations,
        QueryKind::RouteDeliveryTimes,
        QueryKind::WeeklyDeliveries,
        QueryKind::AverageDriverRating,
        QueryKind::OpenSupportIssues,
        QueryKind::ActiveDrivers,
        QueryKind::BusiestDeliveryHour,
        QueryKind::TopIssueCategory,
    ];

    /// Stable name, also the snapshot file stem.
    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::DriverPerformance => "driver_performance",
            QueryKind::SupportIssues => "support_issues",
            QueryKind::DeliveryActivity => "delivery_activity",
            QueryKind::ClientLocations => "client_locations",
            QueryKind::RouteDeliveryTimes => "route_delivery_times",
            QueryKind::WeeklyDeliveries => "summary_deliveries",
            QueryKind::AverageDriverRating => "summary_rating",
            QueryKind::OpenSupportIssues => "summary_support",
            QueryKind::ActiveDrivers => "summary_drivers",
            QueryKind::BusiestDeliveryHour => "summary_peak_hour",
            QueryKind::TopIssueCategory => "summary_top_issue",
        }
    }

    /// MySQL template; `%s` placeholders are bound positionally.
    pub fn sql(&self) -> &'static str {
        match self {
            QueryKind::DriverPerformance => {
                "SELECT dp.full_name AS driver_name, dph.performance_date AS date, \
                 dph.daily_rating AS rating, d.id AS delivery_id, d.delivery_status \
                 FROM driver_profiles dp \
                 JOIN driver_performance_history dph ON dp.id = dph.driver_id \
                 LEFT JOIN deliveries d ON dp.id = d.driver_id \
                 AND DATE(d.created_at) = dph.performance_date \
                 WHERE dph.performance_date >= DATE_SUB(CURDATE(), INTERVAL %s DAY) \
                 ORDER BY dp.full_name, dph.performance_date"
            }
            QueryKind::SupportIssues => {
                "SELECT DATE(created_at) AS date, category AS tag, status \
                 FROM support_tickets \
                 WHERE created_at >= DATE_SUB(NOW(), INTERVAL %s DAY) \
                 ORDER BY created_at DESC"
            }
            QueryKind::DeliveryActivity => {
                "SELECT DATE(delivery_date) AS date, DAYNAME(delivery_date) AS day_name, \
                 HOUR(delivery_time) AS hour, COUNT(*) AS deliveries \
                 FROM deliveries \
                 WHERE delivery_date >= DATE_SUB(CURDATE(), INTERVAL %s DAY) \
                 GROUP BY DATE(delivery_date), HOUR(delivery_time) \
                 ORDER BY delivery_date, hour"
            }
            QueryKind::ClientLocations => {
                "SELECT delivery_location AS location, \
                 delivery_duration_minutes AS duration_minutes, delivery_status, \
                 HOUR(delivery_time) AS hour \
                 FROM deliveries"
            }
            QueryKind::RouteDeliveryTimes => {
                "SELECT ra.route_name AS route, d.id AS delivery_id, \
                 d.delivery_duration_minutes AS duration_minutes \
                 FROM route_analytics ra \
                 LEFT JOIN deliveries d ON ra.route_name = d.route_name"
            }
            QueryKind::WeeklyDeliveries => {
                "SELECT COUNT(*) AS total_deliveries FROM deliveries \
                 WHERE delivery_date >= DATE_SUB(CURDATE(), INTERVAL %s DAY)"
            }
            QueryKind::AverageDriverRating => {
                "SELECT AVG(current_rating) AS avg_rating FROM driver_profiles WHERE status = 1"
            }
            QueryKind::OpenSupportIssues => {
                "SELECT COUNT(*) AS open_issues FROM support_tickets \
                 WHERE status IN ('open', 'in_progress')"
            }
            QueryKind::ActiveDrivers => {
                "SELECT COUNT(*) AS active_drivers FROM driver_profiles WHERE status = 1"
            }
            QueryKind::BusiestDeliveryHour => {
                "SELECT HOUR(delivery_time) AS hour, COUNT(*) AS deliveries FROM deliveries \
                 WHERE delivery_date >= DATE_SUB(CURDATE(), INTERVAL %s DAY) \
                 GROUP BY HOUR(delivery_time)"
            }
            QueryKind::TopIssueCategory => {
                "SELECT category AS tag, COUNT(*) AS issues FROM support_tickets \
                 WHERE created_at >= DATE_SUB(NOW(), INTERVAL %s DAY) \
                 GROUP BY category"
            }
        }
    }
}

/// A query ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(kind: QueryKind) -> Self {
        Query {
            kind,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, v: impl Into<Value>) -> Self {
        self.params.push(v.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn sql(&self) -> &'static str {
        self.kind.sql()
    }
}

/// Anything that can execute a report query and hand back rows.
///
/// Implementations own connection handling, timeouts and retries.
pub trait RowSource: Send + Sync {
    fn run_query(&self, query: &Query) -> Result<Vec<Row>, QueryError>;
}

impl<S: RowSource + ?Sized> RowSource for &S {
    fn run_query(&self, query: &Query) -> Result<Vec<Row>, QueryError> {
        (**self).run_query(query)
    }
}

/// Fixed rows per query, for embedding and tests.
///
/// Queries with nothing registered return no rows; queries registered with
/// `fail` return an execution error.
#[derive(Debug, Default, Clone)]
pub struct StaticRowSource {
    rows: HashMap<QueryKind, Vec<Row>>,
    failures: HashMap<QueryKind, String>,
}

impl StaticRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, kind: QueryKind, rows: Vec<Row>) -> Self {
        self.rows.insert(kind, rows);
        self
    }

    pub fn fail(mut self, kind: QueryKind, message: impl Into<String>) -> Self {
        self.failures.insert(kind, message.into());
        self
    }
}

impl RowSource for StaticRowSource {
    fn run_query(&self, query: &Query) -> Result<Vec<Row>, QueryError> {
        if let Some(message) = self.failures.get(&query.kind) {
            return Err(QueryError::Execution {
                query: query.name().to_string(),
                message: message.clone(),
            });
        }
        Ok(self.rows.get(&query.kind).cloned().unwrap_or_default())
    }
}
