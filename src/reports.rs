// Report assemblers.
//
// Each function turns the rows of one query (or a few, for the summary)
// into a finished `Report`. They do no I/O and read no clocks: the caller
// supplies `generated_at`, so identical input always produces identical
// output.
use crate::coerce::{as_integer, as_number, format_date, round_to, to_integer, to_key};
use crate::grouping::{fold_hours, group_by, group_by_present, hour_slots, HOURS_PER_DAY};
use crate::mappers::CategoryMappers;
use crate::metrics::{
    average, distinct_count, max, min, present_numbers, ratio_pct, sample_std_dev, tally,
    top_n_keys,
};
use crate::types::{
    ClientLocation, DailyActivity, DailyPerformance, DashboardSummary, DeliveryActivity,
    DriverPerformance, Report, ReportMetadata, RouteDeliveryTime, SupportIssue, SupportIssues,
};
use crate::util::parse_date_safe;
use crate::value::{field, Row, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// How many hours a client location lists as its peak.
pub const PEAK_HOURS_SHOWN: usize = 3;

const DELIVERED_STATUS: &str = "delivered";

fn is_delivered(row: &Row) -> bool {
    field(row, "delivery_status")
        .as_str()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(DELIVERED_STATUS))
}

fn hour_of(row: &Row) -> Option<i64> {
    as_integer(field(row, "hour")).filter(|h| (0..HOURS_PER_DAY as i64).contains(h))
}

/// Pre-counted `column` of an aggregated row. A row without the column
/// stands for one item; a null or unreadable cell counts as none.
fn count_column(row: &Row, column: &str) -> u64 {
    match row.get(column) {
        None => 1,
        Some(v) => to_integer(v, 0).max(0) as u64,
    }
}

/// Per-driver daily performance, drivers in first-seen order.
///
/// Rows are one per delivery joined to the driver's daily history entry; a
/// day without deliveries arrives as a single row with a null
/// `delivery_id`.
pub fn driver_performance(
    rows: &[Row],
    days: u32,
    driver_filter: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Report<Vec<DriverPerformance>> {
    let wanted = driver_filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);

    let mut drivers: Vec<DriverPerformance> = Vec::new();
    for driver in group_by_present(rows, |r| to_key(field(r, "driver_name"))) {
        if let Some(w) = &wanted {
            if driver.key.to_lowercase() != *w {
                continue;
            }
        }
        let performance_data = group_by(driver.rows.iter().copied(), |r| {
            format_date(field(r, "date"))
        })
        .into_iter()
        .map(|day| {
            let rating = day
                .rows
                .iter()
                .find_map(|r| as_number(field(r, "rating")))
                .unwrap_or(0.0);
            let completed =
                distinct_count(day.rows.iter().map(|r| to_key(field(r, "delivery_id"))));
            let on_time = distinct_count(
                day.rows
                    .iter()
                    .filter(|r| is_delivered(r))
                    .map(|r| to_key(field(r, "delivery_id"))),
            );
            DailyPerformance {
                date: day.key,
                rating: round_to(rating, 2),
                deliveries_completed: completed as u64,
                on_time_percentage: round_to(ratio_pct(on_time, completed), 1),
            }
        })
        .collect();
        drivers.push(DriverPerformance {
            driver_name: driver.key,
            performance_data,
        });
    }

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.total_groups = Some(drivers.len());
    metadata.date_range = Some(days);
    Report {
        data: drivers,
        metadata,
    }
}

/// Ticket list with tag and severity distributions.
pub fn support_issues(
    rows: &[Row],
    days: u32,
    mappers: &CategoryMappers,
    generated_at: DateTime<Utc>,
) -> Report<SupportIssues> {
    let raw_data: Vec<SupportIssue> = rows
        .iter()
        .map(|r| {
            let status = to_key(field(r, "status"));
            let tag = to_key(field(r, "tag"));
            SupportIssue {
                date: format_date(field(r, "date")),
                tag: mappers.tag_label(tag.as_deref()),
                severity: mappers.severity(status.as_deref()),
                resolved: mappers.is_resolved(status.as_deref()),
            }
        })
        .collect();

    let tag_distribution = tally(raw_data.iter().map(|i| i.tag.clone()));
    let severity_distribution = tally(raw_data.iter().map(|i| i.severity));
    let resolved_issues = raw_data.iter().filter(|i| i.resolved).count();

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.date_range = Some(days);
    Report {
        data: SupportIssues {
            tag_distribution,
            severity_distribution,
            total_issues: raw_data.len(),
            resolved_issues,
            raw_data,
        },
        metadata,
    }
}

/// Deliveries per day and hour, sorted by date.
///
/// Rows carry a `deliveries` count per (date, hour); a row without that
/// column counts as a single delivery. Every row counts toward its day's
/// total, but only rows with a valid hour land in an hour slot. A null date
/// is kept as its own trailing day.
pub fn delivery_activity(
    rows: &[Row],
    days: u32,
    generated_at: DateTime<Utc>,
) -> Report<DeliveryActivity> {
    let mut daily_data: Vec<DailyActivity> = group_by(rows, |r| format_date(field(r, "date")))
        .into_iter()
        .map(|day| {
            let deliveries = |r: &Row| count_column(r, "deliveries");
            let counts = fold_hours(day.rows.iter().copied(), hour_of, deliveries);
            let total = day
                .rows
                .iter()
                .copied()
                .fold(0u64, |acc, r| acc.saturating_add(deliveries(r)));
            let day_name = day
                .rows
                .iter()
                .find_map(|r| to_key(field(r, "day_name")))
                .or_else(|| weekday_name(day.key.as_deref()));
            DailyActivity {
                total_deliveries: total,
                hourly_data: hour_slots(&counts),
                date: day.key,
                day_name,
            }
        })
        .collect();

    daily_data.sort_by(|a, b| match (&a.date, &b.date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut per_weekday: IndexMap<String, Vec<f64>> = IndexMap::new();
    let mut totals = [0u64; HOURS_PER_DAY];
    for day in &daily_data {
        if let Some(name) = &day.day_name {
            per_weekday
                .entry(name.clone())
                .or_default()
                .push(day.total_deliveries as f64);
        }
        for slot in &day.hourly_data {
            let total = &mut totals[slot.hour as usize];
            *total = total.saturating_add(slot.deliveries);
        }
    }
    let day_averages = per_weekday
        .into_iter()
        .map(|(name, day_totals)| (name, round_to(average(&day_totals), 1)))
        .collect();

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.date_range = Some(days);
    metadata.total_groups = Some(daily_data.len());
    Report {
        data: DeliveryActivity {
            daily_data,
            day_averages,
            hourly_totals: hour_slots(&totals),
        },
        metadata,
    }
}

fn weekday_name(date: Option<&str>) -> Option<String> {
    parse_date_safe(date).map(|d| d.format("%A").to_string())
}

/// Busiest drop-off locations, most deliveries first, at most `limit`.
pub fn client_locations(
    rows: &[Row],
    limit: usize,
    generated_at: DateTime<Utc>,
) -> Report<Vec<ClientLocation>> {
    let mut locations: Vec<ClientLocation> =
        group_by_present(rows, |r| to_key(field(r, "location")))
            .into_iter()
            .map(|g| {
                let total = g.rows.len();
                let durations = present_numbers(g.rows.iter().copied(), "duration_minutes");
                let delivered = g.rows.iter().filter(|r| is_delivered(r)).count();
                let hours = tally(g.rows.iter().filter_map(|r| hour_of(r)).map(|h| h as u8));
                ClientLocation {
                    location: g.key,
                    total_deliveries: total as u64,
                    avg_delivery_time_minutes: round_to(average(&durations), 1),
                    success_rate: round_to(ratio_pct(delivered, total), 1),
                    peak_hours: top_n_keys(&hours, PEAK_HOURS_SHOWN),
                }
            })
            .collect();

    // Stable: equal volumes keep first-seen order.
    locations.sort_by(|a, b| b.total_deliveries.cmp(&a.total_deliveries));
    locations.truncate(limit);

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.total_groups = Some(locations.len());
    metadata.showing_top = Some(limit);
    Report {
        data: locations,
        metadata,
    }
}

/// Delivery time statistics per route, fastest average first.
pub fn route_delivery_times(
    rows: &[Row],
    generated_at: DateTime<Utc>,
) -> Report<Vec<RouteDeliveryTime>> {
    let mut scored: Vec<(f64, RouteDeliveryTime)> =
        group_by_present(rows, |r| to_key(field(r, "route")))
            .into_iter()
            .map(|g| {
                let durations = present_numbers(g.rows.iter().copied(), "duration_minutes");
                let avg = average(&durations);
                let route = RouteDeliveryTime {
                    route: g.key,
                    avg_delivery_time_minutes: round_to(avg, 1),
                    sample_size: route_sample_size(&g.rows, durations.len()),
                    fastest_time: round_to(min(&durations), 1),
                    slowest_time: round_to(max(&durations), 1),
                    std_deviation: round_to(sample_std_dev(&durations), 1),
                };
                (avg, route)
            })
            .collect();

    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let routes: Vec<RouteDeliveryTime> = scored.into_iter().map(|(_, r)| r).collect();

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.total_groups = Some(routes.len());
    Report {
        data: routes,
        metadata,
    }
}

/// Deliveries joined to a route, timed or not. Sources without a
/// `delivery_id` column only know about the timed ones.
fn route_sample_size(rows: &[&Row], timed: usize) -> u64 {
    if rows.iter().any(|r| r.contains_key("delivery_id")) {
        distinct_count(rows.iter().map(|r| to_key(field(r, "delivery_id")))) as u64
    } else {
        timed as u64
    }
}

/// Row sets of the summary queries.
#[derive(Debug, Clone, Default)]
pub struct SummaryRows {
    pub deliveries: Vec<Row>,
    pub rating: Vec<Row>,
    pub support: Vec<Row>,
    pub drivers: Vec<Row>,
    /// `hour`, `deliveries` per hour of day.
    pub hours: Vec<Row>,
    /// `tag`, `issues` per ticket category.
    pub issues: Vec<Row>,
}

fn scalar<'a>(rows: &'a [Row], column: &str) -> Option<&'a Value> {
    rows.first().map(|r| field(r, column))
}

/// Busiest hour of the day; the earlier hour wins a tie.
fn peak_hour(rows: &[Row]) -> Option<u8> {
    let counts = fold_hours(rows, hour_of, |r| count_column(r, "deliveries"));
    let busy: IndexMap<u8, u64> = counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .map(|(h, &n)| (h as u8, n))
        .collect();
    top_n_keys(&busy, 1).first().copied()
}

/// Label with the most tickets; the first-seen label wins a tie.
fn most_common_issue(rows: &[Row], mappers: &CategoryMappers) -> Option<String> {
    let mut per_label: IndexMap<String, u64> = IndexMap::new();
    for row in rows {
        let label = mappers.tag_label(to_key(field(row, "tag")).as_deref());
        let n = per_label.entry(label).or_default();
        *n = n.saturating_add(count_column(row, "issues"));
    }
    per_label
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .fold(None, |best: Option<(String, u64)>, (label, n)| match best {
            Some(b) if b.1 >= n => Some(b),
            _ => Some((label, n)),
        })
        .map(|(label, _)| label)
}

/// Headline numbers. A query that returned nothing contributes 0, or no
/// peak hour / common issue.
pub fn dashboard_summary(
    rows: &SummaryRows,
    days: u32,
    mappers: &CategoryMappers,
    generated_at: DateTime<Utc>,
) -> Report<DashboardSummary> {
    let int_of = |set: &[Row], column: &str| scalar(set, column).map_or(0, |v| to_integer(v, 0));
    let avg_rating = scalar(&rows.rating, "avg_rating").and_then(as_number).unwrap_or(0.0);

    let mut metadata = ReportMetadata::new(generated_at);
    metadata.period = Some(format!("Last {} days", days));
    Report {
        data: DashboardSummary {
            total_deliveries_week: int_of(&rows.deliveries, "total_deliveries"),
            avg_driver_rating: round_to(avg_rating, 2),
            open_support_issues: int_of(&rows.support, "open_issues"),
            active_drivers: int_of(&rows.drivers, "active_drivers"),
            peak_delivery_hour: peak_hour(&rows.hours),
            most_common_issue: most_common_issue(&rows.issues, mappers),
        },
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::Severity;
    use crate::value::row_of;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    fn delivery(driver: &str, date: &str, rating: Value, id: Value, status: &str) -> Row {
        row_of([
            ("driver_name", Value::from(driver)),
            ("date", Value::from(date)),
            ("rating", rating),
            ("delivery_id", id),
            ("delivery_status", Value::from(status)),
        ])
    }

    #[test]
    fn driver_missing_rating_becomes_zero() {
        let rows = vec![
            delivery("Ann", "2024-01-01", Value::Float(4.5), Value::Int(1), "delivered"),
            delivery("Ann", "2024-01-01", Value::Float(4.5), Value::Int(2), "delivered"),
            delivery("Ann", "2024-01-01", Value::Float(4.5), Value::Int(3), "failed"),
            delivery("Ann", "2024-01-02", Value::Null, Value::Null, ""),
        ];
        let report = driver_performance(&rows, 30, None, now());
        assert_eq!(report.data.len(), 1);
        let ann = &report.data[0];
        assert_eq!(ann.driver_name, "Ann");
        assert_eq!(ann.performance_data.len(), 2);

        let first = &ann.performance_data[0];
        assert_eq!(first.date.as_deref(), Some("2024-01-01"));
        assert_eq!(first.rating, 4.5);
        assert_eq!(first.deliveries_completed, 3);
        assert_eq!(first.on_time_percentage, 66.7);

        let second = &ann.performance_data[1];
        assert_eq!(second.rating, 0.0);
        assert_eq!(second.deliveries_completed, 0);
        assert_eq!(second.on_time_percentage, 0.0);

        assert_eq!(report.metadata.total_groups, Some(1));
        assert_eq!(report.metadata.date_range, Some(30));
    }

    #[test]
    fn duplicate_delivery_rows_count_once() {
        let rows = vec![
            delivery("Bo", "2024-01-01", Value::Float(3.0), Value::Int(7), "delivered"),
            delivery("Bo", "2024-01-01", Value::Float(3.0), Value::Int(7), "delivered"),
        ];
        let report = driver_performance(&rows, 7, None, now());
        let day = &report.data[0].performance_data[0];
        assert_eq!(day.deliveries_completed, 1);
        assert_eq!(day.on_time_percentage, 100.0);
    }

    #[test]
    fn drivers_keep_first_seen_order_and_filter_ignores_case() {
        let rows = vec![
            delivery("Zed", "2024-01-01", Value::Float(4.0), Value::Int(1), "delivered"),
            delivery("Ann", "2024-01-01", Value::Float(5.0), Value::Int(2), "delivered"),
        ];
        let all = driver_performance(&rows, 30, None, now());
        let names: Vec<&str> = all.data.iter().map(|d| d.driver_name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Ann"]);

        let only_ann = driver_performance(&rows, 30, Some("ANN"), now());
        assert_eq!(only_ann.data.len(), 1);
        assert_eq!(only_ann.data[0].driver_name, "Ann");
        assert_eq!(only_ann.metadata.total_groups, Some(1));

        let nobody = driver_performance(&rows, 30, Some("Cy"), now());
        assert!(nobody.data.is_empty());
    }

    #[test]
    fn support_issues_map_and_tally() {
        let rows = vec![
            row_of([("date", "2024-01-03"), ("tag", "delivery_issue"), ("status", "open")]),
            row_of([("date", "2024-01-02"), ("tag", "unknown_code"), ("status", "closed")]),
            row_of([("date", "2024-01-01"), ("tag", "delivery_issue"), ("status", "weird")]),
        ];
        let report = support_issues(&rows, 30, CategoryMappers::standard(), now());
        let data = &report.data;
        assert_eq!(data.total_issues, 3);
        assert_eq!(data.resolved_issues, 1);
        assert_eq!(data.raw_data[1].tag, "Unknown Code");
        assert_eq!(data.raw_data[1].severity, Severity::Low);
        assert!(data.raw_data[1].resolved);

        let tags: Vec<(&str, u64)> = data
            .tag_distribution
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(tags, vec![("Vehicle Breakdown", 2), ("Unknown Code", 1)]);

        let sev: Vec<(Severity, u64)> = data
            .severity_distribution
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect();
        assert_eq!(
            sev,
            vec![(Severity::High, 1), (Severity::Low, 1), (Severity::Medium, 1)]
        );
    }

    #[test]
    fn delivery_activity_emits_24_slots_per_day_sorted_by_date() {
        let rows = vec![
            row_of([
                ("date", Value::from("2024-01-02")),
                ("day_name", Value::from("Tuesday")),
                ("hour", Value::Int(9)),
                ("deliveries", Value::Int(4)),
            ]),
            row_of([
                ("date", Value::from("2024-01-01")),
                ("day_name", Value::from("Monday")),
                ("hour", Value::Int(14)),
                ("deliveries", Value::Int(2)),
            ]),
            row_of([
                ("date", Value::from("2024-01-08")),
                ("day_name", Value::Null),
                ("hour", Value::Int(14)),
                ("deliveries", Value::Int(5)),
            ]),
        ];
        let report = delivery_activity(&rows, 30, now());
        let data = &report.data;
        let dates: Vec<&str> = data
            .daily_data
            .iter()
            .map(|d| d.date.as_deref().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-08"]);
        for day in &data.daily_data {
            assert_eq!(day.hourly_data.len(), 24);
            let hours: Vec<u8> = day.hourly_data.iter().map(|s| s.hour).collect();
            assert_eq!(hours, (0..24).collect::<Vec<u8>>());
        }
        assert_eq!(data.daily_data[0].total_deliveries, 2);
        assert_eq!(data.daily_data[0].hourly_data[14].deliveries, 2);
        assert_eq!(data.daily_data[0].hourly_data[13].deliveries, 0);

        // 2024-01-08 is a Monday; the name is derived when the row has none.
        assert_eq!(data.daily_data[2].day_name.as_deref(), Some("Monday"));
        assert_eq!(data.day_averages.get("Monday"), Some(&3.5));
        assert_eq!(data.day_averages.get("Tuesday"), Some(&4.0));

        assert_eq!(data.hourly_totals.len(), 24);
        assert_eq!(data.hourly_totals[14].deliveries, 7);
        assert_eq!(data.hourly_totals[9].deliveries, 4);
        assert_eq!(report.metadata.total_groups, Some(3));
    }

    #[test]
    fn delivery_activity_keeps_null_date_last() {
        let rows = vec![
            row_of([("date", Value::Null), ("hour", Value::Int(3))]),
            row_of([("date", Value::from("2024-01-01")), ("hour", Value::Int(3))]),
        ];
        let report = delivery_activity(&rows, 30, now());
        let days = &report.data.daily_data;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date.as_deref(), Some("2024-01-01"));
        assert_eq!(days[1].date, None);
        assert_eq!(days[1].day_name, None);
        assert_eq!(days[1].total_deliveries, 1);
        assert_eq!(days[1].hourly_data.len(), 24);
    }

    #[test]
    fn empty_activity_has_zeroed_hour_totals() {
        let report = delivery_activity(&[], 30, now());
        assert!(report.data.daily_data.is_empty());
        assert!(report.data.day_averages.is_empty());
        assert_eq!(report.data.hourly_totals.len(), 24);
        assert!(report.data.hourly_totals.iter().all(|s| s.deliveries == 0));
    }

    fn drop_off(location: &str, minutes: Value, status: &str, hour: i64) -> Row {
        row_of([
            ("location", Value::from(location)),
            ("duration_minutes", minutes),
            ("delivery_status", Value::from(status)),
            ("hour", Value::Int(hour)),
        ])
    }

    #[test]
    fn client_locations_rank_by_volume_and_compute_peaks() {
        let rows = vec![
            drop_off("Mall", Value::Int(20), "delivered", 14),
            drop_off("Depot", Value::Int(10), "delivered", 9),
            drop_off("Depot", Value::Null, "failed", 9),
            drop_off("Depot", Value::Int(15), "delivered", 17),
            drop_off("Depot", Value::Int(11), "delivered", 12),
            row_of([("location", Value::Null), ("hour", Value::Int(1))]),
        ];
        let report = client_locations(&rows, 15, now());
        let data = &report.data;
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].location, "Depot");
        assert_eq!(data[0].total_deliveries, 4);
        assert_eq!(data[0].avg_delivery_time_minutes, 12.0);
        assert_eq!(data[0].success_rate, 75.0);
        assert_eq!(data[0].peak_hours, vec![9, 12, 17]);
        assert_eq!(data[1].peak_hours, vec![14]);
        assert_eq!(report.metadata.showing_top, Some(15));
    }

    #[test]
    fn client_locations_truncate_to_limit() {
        let rows: Vec<Row> = (0..60)
            .map(|i| drop_off(&format!("L{}", i), Value::Int(5), "delivered", 10))
            .collect();
        let report = client_locations(&rows, 50, now());
        assert_eq!(report.data.len(), 50);
        assert_eq!(report.data[0].location, "L0");
    }

    #[test]
    fn routes_sorted_by_average_with_sample_stats() {
        let rows = vec![
            row_of([("route", Value::from("North")), ("duration_minutes", Value::Int(30))]),
            row_of([("route", Value::from("North")), ("duration_minutes", Value::Int(40))]),
            row_of([("route", Value::from("South")), ("duration_minutes", Value::Int(12))]),
            row_of([("route", Value::from("East")), ("duration_minutes", Value::Null)]),
        ];
        let report = route_delivery_times(&rows, now());
        let names: Vec<&str> = report.data.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(names, vec!["East", "South", "North"]);

        let east = &report.data[0];
        assert_eq!(east.sample_size, 0);
        assert_eq!(east.avg_delivery_time_minutes, 0.0);
        assert_eq!(east.std_deviation, 0.0);

        let south = &report.data[1];
        assert_eq!(south.sample_size, 1);
        assert_eq!(south.std_deviation, 0.0);

        let north = &report.data[2];
        assert_eq!(north.avg_delivery_time_minutes, 35.0);
        assert_eq!(north.fastest_time, 30.0);
        assert_eq!(north.slowest_time, 40.0);
        assert_eq!(north.std_deviation, 7.1);
    }

    #[test]
    fn summary_defaults_to_zero_without_rows() {
        let report =
            dashboard_summary(&SummaryRows::default(), 7, CategoryMappers::standard(), now());
        assert_eq!(
            report.data,
            DashboardSummary {
                total_deliveries_week: 0,
                avg_driver_rating: 0.0,
                open_support_issues: 0,
                active_drivers: 0,
                peak_delivery_hour: None,
                most_common_issue: None,
            }
        );
        assert_eq!(report.metadata.period.as_deref(), Some("Last 7 days"));
    }

    #[test]
    fn summary_reads_scalars() {
        let rows = SummaryRows {
            deliveries: vec![row_of([("total_deliveries", 120i64)])],
            rating: vec![row_of([("avg_rating", Value::from("4.3333"))])],
            support: vec![row_of([("open_issues", 4i64)])],
            drivers: vec![row_of([("active_drivers", Value::Null)])],
            ..SummaryRows::default()
        };
        let report = dashboard_summary(&rows, 7, CategoryMappers::standard(), now());
        assert_eq!(report.data.total_deliveries_week, 120);
        assert_eq!(report.data.avg_driver_rating, 4.33);
        assert_eq!(report.data.open_support_issues, 4);
        assert_eq!(report.data.active_drivers, 0);
    }

    #[test]
    fn summary_derives_peak_hour_and_top_issue() {
        let hour = |h: Value, n: i64| row_of([("hour", h), ("deliveries", Value::Int(n))]);
        let issue = |t: Value, n: i64| row_of([("tag", t), ("issues", Value::Int(n))]);
        let rows = SummaryRows {
            hours: vec![
                hour(Value::Int(9), 12),
                hour(Value::Int(17), 30),
                hour(Value::Int(14), 30),
                hour(Value::Null, 99),
            ],
            issues: vec![
                issue(Value::from("app_bug"), 4),
                issue(Value::from("delivery_issue"), 6),
                issue(Value::Null, 2),
                issue(Value::from("other"), 4),
            ],
            ..SummaryRows::default()
        };
        let report = dashboard_summary(&rows, 7, CategoryMappers::standard(), now());
        assert_eq!(report.data.peak_delivery_hour, Some(14));
        // Null and "other" both map to "Other" and add up to 6, tying with
        // the delivery label, which was seen first.
        assert_eq!(report.data.most_common_issue.as_deref(), Some("Vehicle Breakdown"));
    }

    #[test]
    fn delivery_activity_counts_hourless_rows_in_day_total_only() {
        let rows = vec![
            row_of([
                ("date", Value::from("2024-01-01")),
                ("day_name", Value::from("Monday")),
                ("hour", Value::Int(9)),
                ("deliveries", Value::Int(3)),
            ]),
            row_of([
                ("date", Value::from("2024-01-01")),
                ("day_name", Value::from("Monday")),
                ("hour", Value::Null),
                ("deliveries", Value::Int(4)),
            ]),
        ];
        let report = delivery_activity(&rows, 30, now());
        let day = &report.data.daily_data[0];
        assert_eq!(day.total_deliveries, 7);
        assert_eq!(day.hourly_data.iter().map(|s| s.deliveries).sum::<u64>(), 3);
        assert_eq!(report.data.day_averages.get("Monday"), Some(&7.0));
        assert_eq!(report.data.hourly_totals[9].deliveries, 3);
    }

    #[test]
    fn delivery_activity_present_but_unreadable_count_is_zero() {
        let rows = vec![
            row_of([
                ("date", Value::from("2024-01-01")),
                ("hour", Value::Int(8)),
                ("deliveries", Value::Null),
            ]),
            row_of([
                ("date", Value::from("2024-01-01")),
                ("hour", Value::Int(8)),
                ("deliveries", Value::from("n/a")),
            ]),
            row_of([("date", Value::from("2024-01-01")), ("hour", Value::Int(8))]),
        ];
        let report = delivery_activity(&rows, 30, now());
        assert_eq!(report.data.daily_data[0].total_deliveries, 1);
        assert_eq!(report.data.hourly_totals[8].deliveries, 1);
    }

    #[test]
    fn delivery_activity_survives_huge_counts() {
        let rows: Vec<Row> = (0..3)
            .map(|h| {
                row_of([
                    ("date", Value::from("2024-01-01")),
                    ("hour", Value::Int(h)),
                    ("deliveries", Value::from("9223372036854775807")),
                ])
            })
            .collect();
        let report = delivery_activity(&rows, 30, now());
        assert_eq!(report.data.daily_data[0].total_deliveries, u64::MAX);
        assert_eq!(report.data.hourly_totals[0].deliveries, i64::MAX as u64);
    }

    #[test]
    fn route_sample_size_counts_untimed_joined_deliveries() {
        let leg = |id: Value, minutes: Value| {
            row_of([
                ("route", Value::from("West")),
                ("delivery_id", id),
                ("duration_minutes", minutes),
            ])
        };
        let rows = vec![
            leg(Value::Int(1), Value::Int(20)),
            leg(Value::Int(2), Value::Null),
            leg(Value::Int(3), Value::Int(30)),
            row_of([
                ("route", Value::from("Empty")),
                ("delivery_id", Value::Null),
                ("duration_minutes", Value::Null),
            ]),
        ];
        let report = route_delivery_times(&rows, now());
        let empty = &report.data[0];
        assert_eq!(empty.route, "Empty");
        assert_eq!(empty.sample_size, 0);
        let west = &report.data[1];
        assert_eq!(west.sample_size, 3);
        assert_eq!(west.avg_delivery_time_minutes, 25.0);
    }

    #[test]
    fn assembling_twice_gives_identical_reports() {
        let rows = vec![drop_off("Mall", Value::Int(20), "delivered", 14)];
        let a = client_locations(&rows, 10, now());
        let b = client_locations(&rows, 10, now());
        assert_eq!(a.data, b.data);
        assert_eq!(a.metadata, b.metadata);
    }
}
