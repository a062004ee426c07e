// Command-line entry point.
//
// Each subcommand builds one report from the snapshot directory, prints a
// Markdown preview and writes the JSON envelope (plus CSV for the flat
// reports) to the output directory. `all` runs every report in turn.
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use insights_report::loader::SnapshotRowSource;
use insights_report::output;
use insights_report::util::format_int;
use insights_report::{
    logging, CategoryMappers, Config, Report, ReportKind, ReportResult, ReportService, Response,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "insights_report", about = "Delivery insights dashboard reports")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of captured query results; overrides the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Where JSON and CSV outputs are written.
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Window {
    /// Days to look back; clamped to the configured maximum.
    #[arg(long)]
    days: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Daily rating, deliveries and on-time rate per driver.
    DriverPerformance {
        #[command(flatten)]
        window: Window,
        /// Only this driver (case-insensitive).
        #[arg(long)]
        driver: Option<String>,
    },
    /// Ticket tag and severity distribution.
    SupportIssues {
        #[command(flatten)]
        window: Window,
    },
    /// Deliveries per day and hour.
    DeliveryActivity {
        #[command(flatten)]
        window: Window,
    },
    /// Busiest drop-off locations.
    ClientLocations {
        /// How many locations to list; clamped to the configured maximum.
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Delivery time statistics per route.
    RouteTimes,
    /// Headline numbers for the dashboard.
    Summary,
    /// Every report with default parameters.
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.snapshots.dir = dir.clone();
    }
    logging::init(&config.logging.level);

    let mappers = if config.tags.is_empty() {
        CategoryMappers::standard().clone()
    } else {
        CategoryMappers::with_extra_tags(Some(&config.tags))
    };
    let source = SnapshotRowSource::new(&config.snapshots.dir);
    tracing::info!(dir = %source.dir().display(), "reading snapshots");
    let service = ReportService::new(source, config.reports.clone(), mappers);

    if let Err(e) = std::fs::create_dir_all(&cli.out_dir) {
        eprintln!("Cannot create {}: {}", cli.out_dir.display(), e);
        return ExitCode::FAILURE;
    }

    let ok = match cli.command {
        Command::DriverPerformance { window, driver } => {
            handle_driver_performance(&service, &cli.out_dir, window.days, driver.as_deref())
        }
        Command::SupportIssues { window } => {
            handle_support_issues(&service, &cli.out_dir, window.days)
        }
        Command::DeliveryActivity { window } => {
            handle_delivery_activity(&service, &cli.out_dir, window.days)
        }
        Command::ClientLocations { limit } => {
            handle_client_locations(&service, &cli.out_dir, limit)
        }
        Command::RouteTimes => handle_route_times(&service, &cli.out_dir),
        Command::Summary => handle_summary(&service, &cli.out_dir),
        Command::All => {
            let results = [
                handle_driver_performance(&service, &cli.out_dir, None, None),
                handle_support_issues(&service, &cli.out_dir, None),
                handle_delivery_activity(&service, &cli.out_dir, None),
                handle_client_locations(&service, &cli.out_dir, None),
                handle_route_times(&service, &cli.out_dir),
                handle_summary(&service, &cli.out_dir),
            ];
            results.iter().all(|ok| *ok)
        }
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print the report heading, write the envelope, and hand the payload back
/// for a preview when the fetch succeeded.
fn finish<T: Serialize>(
    kind: ReportKind,
    title: &str,
    out_dir: &Path,
    result: ReportResult<Report<T>>,
) -> Option<T> {
    println!("Report: {}\n", title);
    let response = Response::from_result(kind, result, Utc::now());
    let file = out_dir.join(format!("{}.json", kind.slug()));
    if let Err(e) = output::write_json(&file, &response) {
        eprintln!("Write error: {}", e);
    }
    match response.data {
        Some(data) => {
            println!("(Full report exported to {})\n", file.display());
            Some(data)
        }
        None => {
            println!(
                "Error: {}\n",
                response.error.as_deref().unwrap_or("unknown error")
            );
            None
        }
    }
}

fn handle_driver_performance<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
    days: Option<i64>,
    driver: Option<&str>,
) -> bool {
    let result = service.driver_performance(days, driver);
    let Some(drivers) = finish(
        ReportKind::DriverPerformance,
        "Driver Performance Over Time",
        out_dir,
        result,
    ) else {
        return false;
    };
    println!("{} drivers\n", format_int(drivers.len()));
    output::preview_table_rows(&output::driver_rows(&drivers), PREVIEW_ROWS);
    true
}

fn handle_support_issues<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
    days: Option<i64>,
) -> bool {
    let result = service.support_issues(days);
    let Some(issues) = finish(ReportKind::SupportIssues, "Support Issues", out_dir, result) else {
        return false;
    };
    println!(
        "{} issues, {} resolved\n",
        format_int(issues.total_issues),
        format_int(issues.resolved_issues)
    );
    output::preview_table_rows(&output::distribution_rows(&issues), usize::MAX);
    true
}

fn handle_delivery_activity<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
    days: Option<i64>,
) -> bool {
    let result = service.delivery_activity(days);
    let Some(activity) = finish(
        ReportKind::DeliveryActivity,
        "Delivery Activity by Day and Hour",
        out_dir,
        result,
    ) else {
        return false;
    };
    output::preview_table_rows(&output::activity_rows(&activity), PREVIEW_ROWS);
    true
}

fn handle_client_locations<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
    limit: Option<i64>,
) -> bool {
    let result = service.client_locations(limit);
    let Some(locations) = finish(
        ReportKind::ClientLocations,
        "Frequent Client Drop-off Locations",
        out_dir,
        result,
    ) else {
        return false;
    };
    let rows = output::location_rows(&locations);
    let csv_file = out_dir.join("client_locations.csv");
    if let Err(e) = output::write_csv(&csv_file, &rows) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table_rows(&rows, PREVIEW_ROWS);
    true
}

fn handle_route_times<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
) -> bool {
    let result = service.route_delivery_times();
    let Some(routes) = finish(
        ReportKind::RouteDeliveryTimes,
        "Average Delivery Time per Route",
        out_dir,
        result,
    ) else {
        return false;
    };
    let rows = output::route_rows(&routes);
    let csv_file = out_dir.join("route_delivery_times.csv");
    if let Err(e) = output::write_csv(&csv_file, &rows) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table_rows(&rows, PREVIEW_ROWS);
    true
}

fn handle_summary<S: insights_report::RowSource>(
    service: &ReportService<S>,
    out_dir: &Path,
) -> bool {
    let result = service.dashboard_summary();
    let Some(summary) = finish(ReportKind::DashboardSummary, "Dashboard Summary", out_dir, result)
    else {
        return false;
    };
    println!(
        "Deliveries (last {} days): {}",
        service.limits().summary_days,
        format_int(summary.total_deliveries_week)
    );
    println!("Average driver rating: {:.2}", summary.avg_driver_rating);
    println!("Open support issues: {}", format_int(summary.open_support_issues));
    println!("Active drivers: {}", format_int(summary.active_drivers));
    println!(
        "Peak delivery hour: {}",
        summary
            .peak_delivery_hour
            .map(|h| format!("{:02}:00", h))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Most common issue: {}\n",
        summary.most_common_issue.as_deref().unwrap_or("-")
    );
    true
}
