//! Application entity model
//!
//! One audited application as served by the report endpoint. Every
//! collection defaults to empty and every scalar is optional: an absent
//! section is rendered as nothing rather than treated as an error.

use serde::{Deserialize, Serialize};

use super::view_types::NamedView;

/// The audited application and all of its report sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Application {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    /// Upstream payloads spell this `dataClassication`; both are accepted.
    #[serde(alias = "dataClassication")]
    pub data_classification: Option<String>,
    pub criticality: Option<String>,
    #[serde(rename = "use")]
    pub usage: Option<String>,
    pub source: Option<String>,
    pub access_control: AccessControl,
    pub changes: Vec<Change>,
    pub incidents: Vec<Incident>,
    pub backups: Vec<Backup>,
    pub restores: Vec<Restore>,
    pub assessments: Vec<Assessment>,
    pub findings: Vec<Finding>,
    pub monitoring: Option<Monitoring>,
    pub version: Option<Version>,
    pub repositories: Vec<Repository>,
    pub pipelines: Vec<Pipeline>,
    pub locations: Vec<Location>,
    #[serde(alias = "summaries")]
    pub views: Vec<NamedView>,
}

impl Application {
    /// Heading used by renderers: `"<name> - <type>"`, or whichever half exists
    pub fn heading(&self) -> String {
        match (self.name.as_deref(), self.kind.as_deref()) {
            (Some(name), Some(kind)) => format!("{name} - {kind}"),
            (Some(name), None) => name.to_string(),
            (None, Some(kind)) => kind.to_string(),
            (None, None) => "Application".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessControl {
    pub users: Vec<User>,
    pub authentication: Vec<Authentication>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created: Option<String>,
    pub last_login: Option<String>,
    pub last_access_review: Option<String>,
}

/// An authentication method; `domain` ties users to it by email suffix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Authentication {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Change {
    pub id: Option<String>,
    pub date: Option<String>,
    pub user: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Incident {
    pub id: Option<String>,
    pub date: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub resolved_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Backup {
    pub database: Option<String>,
    pub date: Option<String>,
    /// Human size such as `"12.5 GB"`
    pub size: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Restore {
    pub database: Option<String>,
    pub date: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub completed_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Assessment {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(alias = "assesor")]
    pub assessor: Option<Assessor>,
    pub date: Option<String>,
    pub expiry: Option<String>,
    pub findings: SeverityCounts,
    pub unresolved: SeverityCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assessor {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityCounts {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Finding {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub severity: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// First observed
    pub date: Option<String>,
    pub last_observed: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Monitoring {
    pub alerts_configured: Option<f64>,
    pub alerts_fired: Option<f64>,
    /// Percentage
    pub uptime: Option<f64>,
    pub apdex: Option<f64>,
    pub tools: Vec<MonitoringTool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitoringTool {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub purpose: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Version {
    pub number: Option<String>,
    pub released: Option<String>,
    pub deployed: Option<String>,
    pub git_tag: Option<String>,
    pub repo_name: Option<String>,
    pub created_by: Option<String>,
    pub authorized_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Repository {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

impl Repository {
    /// URL without its scheme, as shown in the version section
    pub fn display_url(&self) -> Option<&str> {
        let url = self.url.as_deref()?;
        Some(
            url.strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .unwrap_or(url),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pipeline {
    pub name: Option<String>,
    pub last_run: Option<String>,
    pub last_run_by: Option<String>,
    pub git_tag: Option<String>,
    pub repository: Option<String>,
    pub environment: Option<String>,
    /// Run duration such as `"4m 30s"`
    pub duration: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub id: Option<String>,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub region: Option<String>,
    #[serde(alias = "role")]
    pub purpose: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let app: Application = serde_json::from_value(json!({"name": "billing"})).unwrap();
        assert!(app.backups.is_empty());
        assert!(app.locations.is_empty());
        assert!(app.access_control.users.is_empty());
        assert!(app.monitoring.is_none());
        assert_eq!(app.heading(), "billing");
    }

    #[test]
    fn test_upstream_spellings_are_accepted() {
        let app: Application = serde_json::from_value(json!({
            "name": "billing",
            "type": "service",
            "dataClassication": "confidential",
            "use": "internal",
            "assessments": [{"name": "pen test", "assesor": {"name": "Acme"}}],
            "locations": [{"name": "eu", "role": "primary"}]
        }))
        .unwrap();

        assert_eq!(app.heading(), "billing - service");
        assert_eq!(app.data_classification.as_deref(), Some("confidential"));
        assert_eq!(app.usage.as_deref(), Some("internal"));
        assert_eq!(
            app.assessments[0].assessor.as_ref().and_then(|a| a.name.as_deref()),
            Some("Acme")
        );
        assert_eq!(app.locations[0].purpose.as_deref(), Some("primary"));
    }

    #[test]
    fn test_repository_display_url() {
        let repo = Repository {
            kind: Some("github".to_string()),
            url: Some("https://github.com/acme/billing".to_string()),
        };
        assert_eq!(repo.display_url(), Some("github.com/acme/billing"));
    }
}
