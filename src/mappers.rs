// Support-ticket category and severity lookups.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const TAG_LABELS: [(&str, &str); 6] = [
    ("delivery_issue", "Vehicle Breakdown"),
    ("payment_problem", "Payment Issue"),
    ("driver_complaint", "Client Complaint"),
    ("app_bug", "App Bug"),
    ("account_issue", "Documentation Problem"),
    ("general_inquiry", "Communication Issue"),
];

const SEVERITY_LEVELS: [(&str, Severity); 4] = [
    ("open", Severity::High),
    ("in_progress", Severity::Medium),
    ("resolved", Severity::Low),
    ("closed", Severity::Low),
];

const RESOLVED_STATUSES: [&str; 2] = ["resolved", "closed"];

/// Label used for tickets that carry no category at all.
pub const UNCATEGORIZED_LABEL: &str = "Other";

static STANDARD: Lazy<CategoryMappers> = Lazy::new(|| CategoryMappers::with_extra_tags(None));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        f.write_str(s)
    }
}

/// Read-only lookup tables, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct CategoryMappers {
    tags: HashMap<String, String>,
    severities: HashMap<String, Severity>,
}

impl CategoryMappers {
    /// The built-in tables.
    pub fn standard() -> &'static CategoryMappers {
        &STANDARD
    }

    /// Built-in tables with `extra` tag labels layered on top.
    pub fn with_extra_tags(extra: Option<&HashMap<String, String>>) -> Self {
        let mut tags: HashMap<String, String> = TAG_LABELS
            .iter()
            .map(|(code, label)| (code.to_string(), label.to_string()))
            .collect();
        if let Some(extra) = extra {
            for (code, label) in extra {
                tags.insert(code.clone(), label.clone());
            }
        }
        let severities = SEVERITY_LEVELS
            .iter()
            .map(|(status, level)| (status.to_string(), *level))
            .collect();
        CategoryMappers { tags, severities }
    }

    /// Display label for a raw category code.
    ///
    /// Exact match first; otherwise underscores become spaces and the result
    /// is title-cased.
    pub fn tag_label(&self, code: Option<&str>) -> String {
        let code = match code.map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => return UNCATEGORIZED_LABEL.to_string(),
        };
        match self.tags.get(code) {
            Some(label) => label.clone(),
            None => title_case(&code.replace('_', " ")),
        }
    }

    /// Severity for a raw ticket status; unknown statuses are `Medium`.
    pub fn severity(&self, status: Option<&str>) -> Severity {
        status
            .and_then(|s| self.severities.get(s.trim()))
            .copied()
            .unwrap_or(Severity::Medium)
    }

    pub fn is_resolved(&self, status: Option<&str>) -> bool {
        status.is_some_and(|s| RESOLVED_STATUSES.contains(&s.trim()))
    }
}

/// Upper-case every letter that follows a non-letter, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
