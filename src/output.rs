use crate::grouping::HourSlot;
use crate::types::{
    ActivityDayRow, ClientLocation, DeliveryActivity, DistributionRow, DriverDayRow,
    DriverPerformance, LocationRow, RouteDeliveryTime, RouteRow, SupportIssues,
};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

pub fn driver_rows(drivers: &[DriverPerformance]) -> Vec<DriverDayRow> {
    drivers
        .iter()
        .flat_map(|d| {
            d.performance_data.iter().map(move |p| DriverDayRow {
                driver: d.driver_name.clone(),
                date: p.date.clone().unwrap_or_else(|| "-".to_string()),
                rating: format_number(p.rating, 2),
                deliveries: p.deliveries_completed,
                on_time_pct: format_number(p.on_time_percentage, 1),
            })
        })
        .collect()
}

pub fn distribution_rows(issues: &SupportIssues) -> Vec<DistributionRow> {
    let tags = issues.tag_distribution.iter().map(|(label, count)| DistributionRow {
        kind: "Tag".to_string(),
        label: label.clone(),
        count: *count,
    });
    let severities = issues
        .severity_distribution
        .iter()
        .map(|(level, count)| DistributionRow {
            kind: "Severity".to_string(),
            label: level.to_string(),
            count: *count,
        });
    tags.chain(severities).collect()
}

pub fn activity_rows(activity: &DeliveryActivity) -> Vec<ActivityDayRow> {
    activity
        .daily_data
        .iter()
        .map(|day| {
            // Earliest hour wins a tie.
            let busiest = day
                .hourly_data
                .iter()
                .filter(|s| s.deliveries > 0)
                .fold(None, |best: Option<&HourSlot>, s| match best {
                    Some(b) if b.deliveries >= s.deliveries => Some(b),
                    _ => Some(s),
                });
            ActivityDayRow {
                date: day.date.clone().unwrap_or_else(|| "-".to_string()),
                day_name: day.day_name.clone().unwrap_or_default(),
                total: day.total_deliveries,
                busiest_hour: busiest
                    .map(|s| format!("{:02}:00", s.hour))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

pub fn location_rows(locations: &[ClientLocation]) -> Vec<LocationRow> {
    locations
        .iter()
        .enumerate()
        .map(|(idx, loc)| LocationRow {
            rank: idx + 1,
            location: loc.location.clone(),
            total_deliveries: format_int(loc.total_deliveries),
            avg_minutes: format_number(loc.avg_delivery_time_minutes, 1),
            success_rate: format_number(loc.success_rate, 1),
            peak_hours: loc
                .peak_hours
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

pub fn route_rows(routes: &[RouteDeliveryTime]) -> Vec<RouteRow> {
    routes
        .iter()
        .map(|r| RouteRow {
            route: r.route.clone(),
            avg_minutes: format_number(r.avg_delivery_time_minutes, 1),
            sample_size: r.sample_size,
            fastest: format_number(r.fastest_time, 1),
            slowest: format_number(r.slowest_time, 1),
            std_dev: format_number(r.std_deviation, 1),
        })
        .collect()
}
