use crate::grouping::HourSlot;
use crate::mappers::Severity;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tabled::Tabled;

/// A finished report: the payload plus what it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub data: T,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_groups: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showing_top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl ReportMetadata {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        ReportMetadata {
            generated_at,
            date_range: None,
            total_groups: None,
            showing_top: None,
            period: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPerformance {
    pub driver_name: String,
    pub performance_data: Vec<DailyPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPerformance {
    pub date: Option<String>,
    pub rating: f64,
    pub deliveries_completed: u64,
    pub on_time_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportIssue {
    pub date: Option<String>,
    pub tag: String,
    pub severity: Severity,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportIssues {
    pub tag_distribution: IndexMap<String, u64>,
    pub severity_distribution: IndexMap<Severity, u64>,
    pub total_issues: usize,
    pub resolved_issues: usize,
    pub raw_data: Vec<SupportIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyActivity {
    pub date: Option<String>,
    pub day_name: Option<String>,
    pub total_deliveries: u64,
    pub hourly_data: Vec<HourSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryActivity {
    pub daily_data: Vec<DailyActivity>,
    pub day_averages: IndexMap<String, f64>,
    pub hourly_totals: Vec<HourSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientLocation {
    pub location: String,
    pub total_deliveries: u64,
    pub avg_delivery_time_minutes: f64,
    pub success_rate: f64,
    pub peak_hours: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDeliveryTime {
    pub route: String,
    pub avg_delivery_time_minutes: f64,
    pub sample_size: u64,
    pub fastest_time: f64,
    pub slowest_time: f64,
    pub std_deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_deliveries_week: i64,
    pub avg_driver_rating: f64,
    pub open_support_issues: i64,
    pub active_drivers: i64,
    pub peak_delivery_hour: Option<u8>,
    pub most_common_issue: Option<String>,
}

// Flat rows for console previews and CSV export.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DriverDayRow {
    #[serde(rename = "Driver")]
    #[tabled(rename = "Driver")]
    pub driver: String,
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Deliveries")]
    #[tabled(rename = "Deliveries")]
    pub deliveries: u64,
    #[serde(rename = "OnTimePct")]
    #[tabled(rename = "OnTimePct")]
    pub on_time_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistributionRow {
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ActivityDayRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub day_name: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: u64,
    #[serde(rename = "BusiestHour")]
    #[tabled(rename = "BusiestHour")]
    pub busiest_hour: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LocationRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Location")]
    #[tabled(rename = "Location")]
    pub location: String,
    #[serde(rename = "TotalDeliveries")]
    #[tabled(rename = "TotalDeliveries")]
    pub total_deliveries: String,
    #[serde(rename = "AvgMinutes")]
    #[tabled(rename = "AvgMinutes")]
    pub avg_minutes: String,
    #[serde(rename = "SuccessRate")]
    #[tabled(rename = "SuccessRate")]
    pub success_rate: String,
    #[serde(rename = "PeakHours")]
    #[tabled(rename = "PeakHours")]
    pub peak_hours: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RouteRow {
    #[serde(rename = "Route")]
    #[tabled(rename = "Route")]
    pub route: String,
    #[serde(rename = "AvgMinutes")]
    #[tabled(rename = "AvgMinutes")]
    pub avg_minutes: String,
    #[serde(rename = "SampleSize")]
    #[tabled(rename = "SampleSize")]
    pub sample_size: u64,
    #[serde(rename = "Fastest")]
    #[tabled(rename = "Fastest")]
    pub fastest: String,
    #[serde(rename = "Slowest")]
    #[tabled(rename = "Slowest")]
    pub slowest: String,
    #[serde(rename = "StdDev")]
    #[tabled(rename = "StdDev")]
    pub std_dev: String,
}
