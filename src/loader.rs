// Snapshot row source.
//
// Replays captured query results from a directory: `<name>.csv` or
// `<name>.json` per query, where `<name>` is `QueryKind::name()`. The
// snapshot already holds the query's output, so parameters are not
// re-applied.
use crate::error::QueryError;
use crate::query::{Query, RowSource};
use crate::util::{parse_date_safe, parse_datetime_safe, parse_i64_safe};
use crate::value::{Row, Value};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SnapshotRowSource {
    dir: PathBuf,
}

impl SnapshotRowSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotRowSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RowSource for SnapshotRowSource {
    fn run_query(&self, query: &Query) -> Result<Vec<Row>, QueryError> {
        let csv_path = self.dir.join(format!("{}.csv", query.name()));
        let json_path = self.dir.join(format!("{}.json", query.name()));
        let rows = if csv_path.is_file() {
            load_csv(&csv_path)?
        } else if json_path.is_file() {
            load_json(&json_path)?
        } else {
            return Err(QueryError::Unavailable(query.name().to_string()));
        };
        debug!(
            query = query.name(),
            rows = rows.len(),
            params = query.params.len(),
            "replayed snapshot"
        );
        Ok(rows)
    }
}

/// Read a CSV export; the header row names the columns.
pub fn load_csv(path: &Path) -> Result<Vec<Row>, QueryError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), parse_cell(record.get(i))))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Read a JSON array of objects.
pub fn load_json(path: &Path) -> Result<Vec<Row>, QueryError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Infer a typed value from a CSV cell.
///
/// Empty cells and the usual database spellings of null become `Null`;
/// numbers, dates and date-times are recognized; everything else stays text.
pub fn parse_cell(cell: Option<&str>) -> Value {
    let Some(raw) = cell else {
        return Value::Null;
    };
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s == "\\N" {
        return Value::Null;
    }
    if let Some(i) = parse_i64_safe(Some(s)) {
        return Value::Int(i);
    }
    if !s.chars().any(|c| c.is_ascii_alphabetic()) {
        if let Ok(x) = s.parse::<f64>() {
            return Value::Float(x);
        }
    }
    if let Some(d) = parse_date_safe(Some(s)) {
        return Value::Date(d);
    }
    if let Some(dt) = parse_datetime_safe(Some(s)) {
        return Value::DateTime(dt);
    }
    match s {
        "true" | "TRUE" => Value::Bool(true),
        "false" | "FALSE" => Value::Bool(false),
        _ => Value::Text(s.to_string()),
    }
}
