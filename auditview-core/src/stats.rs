//! Per-section statistics shown above the fixed report tables.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::format;
use crate::models::{Authentication, Backup, Finding, Incident, Pipeline, User};
use crate::panels::pie::PieSlice;

/// Count items per key, keys in first-seen order
pub fn group_counts<'a, I>(keys: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut groups: Vec<(String, usize)> = Vec::new();
    for key in keys {
        let key = key.unwrap_or("unknown");
        match groups.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, count)) => *count += 1,
            None => groups.push((key.to_string(), 1)),
        }
    }
    groups
}

/// Grouped counts as pie slices
pub fn count_slices(groups: &[(String, usize)]) -> Vec<PieSlice> {
    groups
        .iter()
        .map(|(label, count)| PieSlice::new(label.as_str(), *count as f64))
        .collect()
}

/// Explicit color map for slices whose label has a fixed category color
pub fn category_overrides(
    slices: &[PieSlice],
    lookup: fn(&str) -> Option<&'static str>,
) -> BTreeMap<String, String> {
    slices
        .iter()
        .filter_map(|slice| {
            let label = slice.label();
            lookup(&label).map(|color| (label, color.to_string()))
        })
        .collect()
}

fn is_successful(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("successful"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupStats {
    /// Mean of the parseable sizes, in GB
    pub avg_size_gb: Option<f64>,
    /// Percent of backups with status `successful`
    pub success_rate: f64,
    /// Age of the first listed backup, e.g. "3 days"
    pub last_backup_age: Option<String>,
}

/// Leading number of a size such as `"12.5 GB"`
pub fn parse_size_gb(size: &str) -> Option<f64> {
    size.split_whitespace().next()?.parse().ok()
}

/// `None` for an empty backup list
pub fn backup_stats(backups: &[Backup], now: DateTime<Utc>) -> Option<BackupStats> {
    if backups.is_empty() {
        return None;
    }

    let sizes: Vec<f64> = backups
        .iter()
        .filter_map(|b| b.size.as_deref().and_then(parse_size_gb))
        .collect();
    let avg_size_gb = (!sizes.is_empty()).then(|| sizes.iter().sum::<f64>() / sizes.len() as f64);

    let successes = backups.iter().filter(|b| is_successful(b.status.as_deref())).count();
    let success_rate = successes as f64 / backups.len() as f64 * 100.0;

    let last_backup_age = backups[0]
        .date
        .as_deref()
        .and_then(format::parse_datetime)
        .map(|at| format::distance_words(at, now));

    Some(BackupStats {
        avg_size_gb,
        success_rate,
        last_backup_age,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentStats {
    pub open_count: usize,
    /// Open incidents (no resolved date) per severity
    pub open_by_severity: Vec<(String, usize)>,
    /// Mean whole hours from `date` to `resolvedDate` over resolved incidents
    pub avg_resolution_hours: f64,
    /// All incidents per severity
    pub by_severity: Vec<PieSlice>,
}

pub fn incident_stats(incidents: &[Incident]) -> IncidentStats {
    let open: Vec<&Incident> = incidents.iter().filter(|i| i.resolved_date.is_none()).collect();

    let resolution_hours: Vec<i64> = incidents
        .iter()
        .filter_map(|i| {
            let start = format::parse_datetime(i.date.as_deref()?)?;
            let end = format::parse_datetime(i.resolved_date.as_deref()?)?;
            Some(format::hours_between(start, end))
        })
        .collect();
    let avg_resolution_hours = if resolution_hours.is_empty() {
        0.0
    } else {
        resolution_hours.iter().sum::<i64>() as f64 / resolution_hours.len() as f64
    };

    IncidentStats {
        open_count: open.len(),
        open_by_severity: group_counts(open.iter().map(|i| i.severity.as_deref())),
        avg_resolution_hours,
        by_severity: count_slices(&group_counts(incidents.iter().map(|i| i.severity.as_deref()))),
    }
}

/// Whole hours an incident lasted, open incidents measured to `now`
pub fn incident_duration_hours(incident: &Incident, now: DateTime<Utc>) -> Option<i64> {
    let start = format::parse_datetime(incident.date.as_deref()?)?;
    let end = match incident.resolved_date.as_deref() {
        Some(raw) => format::parse_datetime(raw)?,
        None => now,
    };
    Some(format::hours_between(start, end))
}

pub fn findings_by_type(findings: &[Finding]) -> Vec<PieSlice> {
    count_slices(&group_counts(findings.iter().map(|f| f.kind.as_deref())))
}

pub fn findings_by_severity(findings: &[Finding]) -> Vec<PieSlice> {
    count_slices(&group_counts(findings.iter().map(|f| f.severity.as_deref())))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStats {
    pub by_status: Vec<(String, usize)>,
    /// First listed pipeline
    pub latest: Option<Pipeline>,
    /// Mean run time in minutes over parseable durations
    pub avg_duration_minutes: Option<f64>,
}

/// Seconds in a run duration such as `"4m 30s"`, `"4m"` or `"30s"`
pub fn parse_run_duration(raw: &str) -> Option<f64> {
    let mut seconds = 0.0;
    let mut matched = false;
    for part in raw.split_whitespace() {
        if let Some(minutes) = part.strip_suffix('m') {
            seconds += minutes.parse::<f64>().ok()? * 60.0;
        } else if let Some(secs) = part.strip_suffix('s') {
            seconds += secs.parse::<f64>().ok()?;
        } else {
            return None;
        }
        matched = true;
    }
    matched.then_some(seconds)
}

pub fn pipeline_stats(pipelines: &[Pipeline]) -> PipelineStats {
    let durations: Vec<f64> = pipelines
        .iter()
        .filter_map(|p| p.duration.as_deref().and_then(parse_run_duration))
        .collect();
    let avg_duration_minutes =
        (!durations.is_empty()).then(|| durations.iter().sum::<f64>() / durations.len() as f64 / 60.0);

    PipelineStats {
        by_status: group_counts(pipelines.iter().map(|p| p.status.as_deref())),
        latest: pipelines.first().cloned(),
        avg_duration_minutes,
    }
}

/// Authentication type of a user: the first method whose domain suffixes the
/// user's email, uppercased, else `"N/A"`
pub fn auth_type(user: &User, methods: &[Authentication]) -> String {
    let Some(email) = user.email.as_deref() else {
        return "N/A".to_string();
    };
    methods
        .iter()
        .find(|m| m.domain.as_deref().is_some_and(|d| !d.is_empty() && email.ends_with(d)))
        .and_then(|m| m.kind.as_deref())
        .map_or_else(|| "N/A".to_string(), str::to_uppercase)
}

/// Outcome mix of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayHealth {
    AllSuccessful,
    /// At least half succeeded
    MostlySuccessful,
    MostlyFailed,
}

impl DayHealth {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AllSuccessful => "All successful",
            Self::MostlySuccessful => "Mostly successful",
            Self::MostlyFailed => "Mostly failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupDay {
    pub date: NaiveDate,
    pub successful: u32,
    pub failed: u32,
}

impl BackupDay {
    pub fn health(&self) -> DayHealth {
        let total = self.successful + self.failed;
        if self.failed == 0 {
            DayHealth::AllSuccessful
        } else if self.successful * 2 >= total {
            DayHealth::MostlySuccessful
        } else {
            DayHealth::MostlyFailed
        }
    }
}

/// Backups bucketed per day over the year up to `now`, oldest first
pub fn backup_calendar(backups: &[Backup], now: DateTime<Utc>) -> Vec<BackupDay> {
    let end = now.date_naive();
    let start = (now - Duration::days(365)).date_naive();
    let mut days: BTreeMap<NaiveDate, BackupDay> = BTreeMap::new();

    for backup in backups {
        let Some(date) = backup
            .date
            .as_deref()
            .and_then(|raw| raw.split('T').next())
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < start || date > end {
            continue;
        }

        let entry = days.entry(date).or_insert(BackupDay {
            date,
            successful: 0,
            failed: 0,
        });
        let succeeded = backup
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("successful") || s.eq_ignore_ascii_case("completed"));
        if succeeded {
            entry.successful += 1;
        } else {
            entry.failed += 1;
        }
    }

    days.into_values().collect()
}
