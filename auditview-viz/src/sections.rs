//! Section builders: one per part of the application entity, plus one per
//! schema-driven view.

use auditview_core::format::{self, EMPTY};
use auditview_core::models::{Application, NamedView, SeverityCounts};
use auditview_core::panels::pie;
use auditview_core::stats;
use auditview_core::status::{finding_type_color, severity_color};
use auditview_core::{evaluate_panels, Cell, PaletteMode, PieChart, PieSlice, TableColumn, TableModel};
use chrono::{DateTime, Duration, Utc};

use crate::report::{Block, CalendarBlock, Card, Field, Section, Stat, TableBlock};

/// Number of authentication methods shown as cards
const AUTH_CARD_LIMIT: usize = 3;

/// Builds every section of one application, relative to `now`
#[derive(Debug, Clone, Copy)]
pub struct SectionBuilder<'a> {
    app: &'a Application,
    now: DateTime<Utc>,
    palette: PaletteMode,
}

impl<'a> SectionBuilder<'a> {
    /// Create a new builder
    pub const fn new(app: &'a Application, now: DateTime<Utc>, palette: PaletteMode) -> Self {
        Self { app, now, palette }
    }

    /// All sections in report order. Monitoring, version and locations are
    /// left out when the entity has none; the other tables always appear.
    pub fn build(&self) -> Vec<Section> {
        let mut sections = vec![
            self.details(),
            self.access_control(),
            self.changes(),
            self.incidents(),
            self.backups(),
            self.restores(),
            self.assessments(),
            self.findings(),
        ];
        sections.extend(self.monitoring());
        sections.extend(self.version());
        sections.push(self.pipelines());
        sections.extend(self.locations());
        sections.extend(
            self.app
                .views
                .iter()
                .enumerate()
                .map(|(index, view)| self.view(index, view)),
        );
        sections
    }

    fn date(&self, raw: Option<&str>) -> String {
        raw.map_or_else(|| EMPTY.to_string(), |raw| format::format_date(raw, self.now))
    }

    pub fn details(&self) -> Section {
        let app = self.app;
        Section::new("details", "Application Details").with(Block::Fields(vec![
            Field::new("ID", text(app.id.as_deref())),
            Field::new("Type", text(app.kind.as_deref())),
            Field::new("Description", text(app.description.as_deref())),
            Field::new("Data Classification", text(app.data_classification.as_deref())),
            Field::new("Criticality", text(app.criticality.as_deref())),
            Field::new("Use", text(app.usage.as_deref())),
            Field::new("Source", text(app.source.as_deref())),
        ]))
    }

    pub fn access_control(&self) -> Section {
        let access = &self.app.access_control;

        let cards = access
            .authentication
            .iter()
            .take(AUTH_CARD_LIMIT)
            .map(|method| Card {
                title: text(method.name.as_deref()),
                subtitle: method.kind.as_deref().map(str::to_uppercase),
                fields: vec![
                    Field::new("Domain", text(method.domain.as_deref().filter(|d| !d.is_empty()))),
                    Field::new("Description", text(method.description.as_deref())),
                ],
                link: None,
            })
            .collect();

        let mut model = TableModel::new(vec![
            TableColumn::new("Name", "name"),
            TableColumn::new("Email", "email"),
            TableColumn::new("Role", "role"),
            TableColumn::new("Auth Type", "authType"),
            TableColumn::new("Created", "created"),
            TableColumn::new("Last Login", "lastLogin"),
            TableColumn::new("Last Access Review", "lastAccessReview"),
        ]);
        for user in &access.users {
            model.push_row(vec![
                Cell::text(user.name.as_deref()),
                Cell::text(user.email.as_deref()),
                Cell::text(user.role.as_deref()),
                Cell::Text(stats::auth_type(user, &access.authentication)),
                Cell::date(user.created.as_deref()),
                Cell::date(user.last_login.as_deref()),
                Cell::date(user.last_access_review.as_deref()),
            ]);
        }

        Section::new("access-control", "Access Control")
            .with(Block::Cards(cards))
            .with(Block::Table(TableBlock::new(model).titled("Users")))
    }

    pub fn changes(&self) -> Section {
        let mut model = TableModel::new(vec![
            TableColumn::new("ID", "id"),
            TableColumn::new("Date", "date"),
            TableColumn::new("User", "user"),
            TableColumn::new("Description", "description"),
            TableColumn::badge("Status", "status"),
        ]);
        for change in &self.app.changes {
            model.push_row(vec![
                Cell::text(change.id.as_deref()),
                Cell::date(change.date.as_deref()),
                Cell::text(change.user.as_deref()),
                Cell::text(change.description.as_deref()),
                Cell::text(change.status.as_deref()),
            ]);
        }
        Section::new("changes", "Change History").with(Block::Table(TableBlock::new(model)))
    }

    pub fn incidents(&self) -> Section {
        let incidents = &self.app.incidents;
        let summary = stats::incident_stats(incidents);

        let open_detail = summary
            .open_by_severity
            .iter()
            .map(|(severity, count)| format!("{count} {severity}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut open = Stat::new("Open Incidents", summary.open_count.to_string());
        if !open_detail.is_empty() {
            open = open.detail(open_detail);
        }
        let stats_block = if incidents.is_empty() {
            Vec::new()
        } else {
            vec![
                open,
                Stat::new(
                    "Avg Resolution Time",
                    format!("{:.1}h", summary.avg_resolution_hours),
                ),
            ]
        };

        let mut model = TableModel::new(vec![
            TableColumn::new("ID", "id"),
            TableColumn::new("Date", "date"),
            TableColumn::badge("Severity", "severity"),
            TableColumn::new("Description", "description"),
            TableColumn::badge("Status", "status"),
            TableColumn::new("Resolved", "resolvedDate"),
            TableColumn::new("Duration", "duration"),
        ]);
        for incident in incidents {
            let duration = stats::incident_duration_hours(incident, self.now)
                .map_or(Cell::Null, |hours| Cell::Elapsed { hours });
            model.push_row(vec![
                Cell::text(incident.id.as_deref()),
                Cell::date(incident.date.as_deref()),
                Cell::text(incident.severity.as_deref()),
                Cell::text(incident.description.as_deref()),
                Cell::text(incident.status.as_deref()),
                Cell::date(incident.resolved_date.as_deref()),
                duration,
            ]);
        }

        Section::new("incidents", "Incidents")
            .with(Block::Stats(stats_block))
            .with(Block::Pies(vec![self.category_pie(
                "Incidents by Severity",
                summary.by_severity,
                severity_color,
            )]))
            .with(Block::Table(TableBlock::new(model)))
    }

    pub fn backups(&self) -> Section {
        let backups = &self.app.backups;

        let stats_block = stats::backup_stats(backups, self.now)
            .map(|summary| {
                vec![
                    Stat::new(
                        "Average Size",
                        summary
                            .avg_size_gb
                            .map_or_else(|| EMPTY.to_string(), |gb| format!("{gb:.1} GB")),
                    ),
                    Stat::new("Success Rate", format!("{:.1}%", summary.success_rate)),
                    Stat::new(
                        "Last Backup",
                        summary
                            .last_backup_age
                            .map_or_else(|| EMPTY.to_string(), |age| format!("{age} ago")),
                    ),
                ]
            })
            .unwrap_or_default();

        let calendar = CalendarBlock {
            start: (self.now - Duration::days(365)).date_naive(),
            end: self.now.date_naive(),
            days: stats::backup_calendar(backups, self.now),
        };

        let mut model = TableModel::new(vec![
            TableColumn::new("Database", "database"),
            TableColumn::new("Date", "date"),
            TableColumn::new("Size", "size"),
            TableColumn::badge("Status", "status"),
            TableColumn::new("Error", "error"),
        ]);
        for backup in backups {
            model.push_row(vec![
                Cell::text(backup.database.as_deref()),
                Cell::date(backup.date.as_deref()),
                Cell::text(backup.size.as_deref()),
                Cell::text(backup.status.as_deref()),
                Cell::text(backup.error.as_deref()),
            ]);
        }

        Section::new("backups", "Backups")
            .with(Block::Stats(stats_block))
            .with(Block::Calendar(calendar))
            .with(Block::Table(TableBlock::new(model)))
    }

    pub fn restores(&self) -> Section {
        let mut model = TableModel::new(vec![
            TableColumn::new("Database", "database"),
            TableColumn::new("Date", "date"),
            TableColumn::new("Source", "source"),
            TableColumn::badge("Status", "status"),
            TableColumn::new("Completed", "completedDate"),
        ]);
        for restore in &self.app.restores {
            model.push_row(vec![
                Cell::text(restore.database.as_deref()),
                Cell::date(restore.date.as_deref()),
                Cell::text(restore.source.as_deref()),
                Cell::text(restore.status.as_deref()),
                Cell::date(restore.completed_date.as_deref()),
            ]);
        }
        Section::new("restores", "Restores").with(Block::Table(TableBlock::new(model)))
    }

    pub fn assessments(&self) -> Section {
        let mut model = TableModel::new(vec![
            TableColumn::new("Name", "name"),
            TableColumn::new("Type", "type"),
            TableColumn::new("Assessor", "assessor"),
            TableColumn::new("Date", "date"),
            TableColumn::new("Expiry", "expiry"),
            TableColumn::new("Findings (H/M/L)", "findings"),
            TableColumn::new("Unresolved (H/M/L)", "unresolved"),
        ]);
        for assessment in &self.app.assessments {
            let counts = |c: &SeverityCounts| {
                Cell::Text(format!("{} / {} / {}", c.high, c.medium, c.low))
            };
            model.push_row(vec![
                Cell::text(assessment.name.as_deref()),
                Cell::text(assessment.kind.as_deref()),
                Cell::text(assessment.assessor.as_ref().and_then(|a| a.name.as_deref())),
                Cell::date(assessment.date.as_deref()),
                Cell::date(assessment.expiry.as_deref()),
                counts(&assessment.findings),
                counts(&assessment.unresolved),
            ]);
        }
        Section::new("assessments", "Assessments").with(Block::Table(TableBlock::new(model)))
    }

    pub fn findings(&self) -> Section {
        let findings = &self.app.findings;

        let mut model = TableModel::new(vec![
            TableColumn::new("ID", "id"),
            TableColumn::new("Type", "type"),
            TableColumn::badge("Severity", "severity"),
            TableColumn::new("Title", "title"),
            TableColumn::new("Description", "description"),
            TableColumn::new("Date", "date"),
            TableColumn::new("Last Observed", "lastObserved"),
            TableColumn::badge("Status", "status"),
        ]);
        for finding in findings {
            model.push_row(vec![
                Cell::text(finding.id.as_deref()),
                Cell::text(finding.kind.as_deref()),
                Cell::text(finding.severity.as_deref()),
                Cell::text(finding.title.as_deref()),
                Cell::text(finding.description.as_deref()),
                Cell::date(finding.date.as_deref()),
                Cell::date(finding.last_observed.as_deref()),
                Cell::text(finding.status.as_deref()),
            ]);
        }

        Section::new("findings", "Findings")
            .with(Block::Pies(vec![
                self.category_pie(
                    "Findings by Type",
                    stats::findings_by_type(findings),
                    finding_type_color,
                ),
                self.category_pie(
                    "Findings by Severity",
                    stats::findings_by_severity(findings),
                    severity_color,
                ),
            ]))
            .with(Block::Table(TableBlock::new(model)))
    }

    pub fn monitoring(&self) -> Option<Section> {
        let monitoring = self.app.monitoring.as_ref()?;
        let figure = |value: Option<f64>| value.map_or_else(|| EMPTY.to_string(), format::format_number);

        let tools = monitoring
            .tools
            .iter()
            .map(|tool| Card {
                title: text(tool.name.as_deref()),
                subtitle: tool.kind.clone(),
                fields: vec![Field::new("Purpose", text(tool.purpose.as_deref()))],
                link: tool.url.clone(),
            })
            .collect();

        Some(
            Section::new("monitoring", "Monitoring")
                .with(Block::Stats(vec![
                    Stat::new("Alerts Configured", figure(monitoring.alerts_configured)),
                    Stat::new("Alerts Fired", figure(monitoring.alerts_fired)),
                    Stat::new(
                        "Uptime",
                        monitoring
                            .uptime
                            .map_or_else(|| EMPTY.to_string(), |u| format!("{u:.2}%")),
                    ),
                    Stat::new(
                        "Apdex",
                        monitoring
                            .apdex
                            .map_or_else(|| EMPTY.to_string(), |a| format!("{a:.2}")),
                    ),
                ]))
                .with(Block::Cards(tools)),
        )
    }

    pub fn version(&self) -> Option<Section> {
        let app = self.app;
        if app.version.is_none() && app.repositories.is_empty() {
            return None;
        }

        let fields = app
            .version
            .as_ref()
            .map(|version| {
                vec![
                    Field::new("Version", text(version.number.as_deref())),
                    Field::new("Released", self.date(version.released.as_deref())),
                    Field::new("Deployed", self.date(version.deployed.as_deref())),
                    Field::new("Git Tag", text(version.git_tag.as_deref())),
                    Field::new("Repository", text(version.repo_name.as_deref())),
                    Field::new("Created By", text(version.created_by.as_deref())),
                    Field::new("Authorized By", text(version.authorized_by.as_deref())),
                ]
            })
            .unwrap_or_default();

        let repositories = app
            .repositories
            .iter()
            .map(|repo| Card {
                title: repo.display_url().unwrap_or(EMPTY).to_string(),
                subtitle: repo.kind.clone(),
                fields: Vec::new(),
                link: repo.url.clone(),
            })
            .collect();

        Some(
            Section::new("version", "Version")
                .with(Block::Fields(fields))
                .with(Block::Cards(repositories)),
        )
    }

    pub fn pipelines(&self) -> Section {
        let pipelines = &self.app.pipelines;
        let summary = stats::pipeline_stats(pipelines);

        let mut stats_block = Vec::new();
        if !pipelines.is_empty() {
            let by_status = summary
                .by_status
                .iter()
                .map(|(status, count)| format!("{count} {status}"))
                .collect::<Vec<_>>()
                .join(", ");
            stats_block.push(Stat::new("Pipelines", pipelines.len().to_string()).detail(by_status));
            stats_block.push(Stat::new(
                "Avg Duration",
                summary
                    .avg_duration_minutes
                    .map_or_else(|| EMPTY.to_string(), |m| format!("{m:.1} min")),
            ));
            if let Some(latest) = &summary.latest {
                stats_block.push(
                    Stat::new("Latest Run", text(latest.name.as_deref()))
                        .detail(self.date(latest.last_run.as_deref())),
                );
            }
        }

        let mut model = TableModel::new(vec![
            TableColumn::new("Name", "name"),
            TableColumn::new("Last Run", "lastRun"),
            TableColumn::new("Run By", "lastRunBy"),
            TableColumn::new("Git Tag", "gitTag"),
            TableColumn::new("Repository", "repository"),
            TableColumn::new("Environment", "environment"),
            TableColumn::new("Duration", "duration"),
            TableColumn::badge("Status", "status"),
        ]);
        for pipeline in pipelines {
            model.push_row(vec![
                Cell::text(pipeline.name.as_deref()),
                Cell::date(pipeline.last_run.as_deref()),
                Cell::text(pipeline.last_run_by.as_deref()),
                Cell::text(pipeline.git_tag.as_deref()),
                Cell::text(pipeline.repository.as_deref()),
                Cell::text(pipeline.environment.as_deref()),
                Cell::text(pipeline.duration.as_deref()),
                Cell::text(pipeline.status.as_deref()),
            ]);
        }

        Section::new("pipelines", "Pipelines")
            .with(Block::Stats(stats_block))
            .with(Block::Table(TableBlock::new(model)))
    }

    pub fn locations(&self) -> Option<Section> {
        if self.app.locations.is_empty() {
            return None;
        }

        let mut model = TableModel::new(vec![
            TableColumn::new("ID", "id"),
            TableColumn::new("Name", "name"),
            TableColumn::new("Provider", "provider"),
            TableColumn::new("Region", "region"),
            TableColumn::new("Purpose", "purpose"),
        ]);
        for location in &self.app.locations {
            model.push_row(vec![
                Cell::text(location.id.as_deref()),
                Cell::text(location.name.as_deref()),
                Cell::text(location.provider.as_deref()),
                Cell::text(location.region.as_deref()),
                Cell::text(location.purpose.as_deref()),
            ]);
        }
        Some(Section::new("locations", "Locations").with(Block::Table(TableBlock::new(model))))
    }

    /// A schema-driven view: evaluated panels, then its table if it has one
    pub fn view(&self, index: usize, named: &NamedView) -> Section {
        let view = &named.view;
        let panels = evaluate_panels(&view.panels, self.palette);

        let mut section = Section::new(format!("view-{index}"), named.title.clone())
            .with(Block::Numbers(panels.numbers))
            .with(Block::Gauges(panels.gauges))
            .with(Block::Pies(panels.pies))
            .with(Block::Breakdowns(panels.breakdowns));
        if view.has_table() {
            section = section.with(Block::Table(TableBlock::new(TableModel::from_view(
                &view.columns,
                &view.rows,
            ))));
        }
        section
    }

    fn category_pie(
        &self,
        title: &str,
        slices: Vec<PieSlice>,
        lookup: fn(&str) -> Option<&'static str>,
    ) -> PieChart {
        let overrides = stats::category_overrides(&slices, lookup);
        let colors = pie::slice_colors(&slices, Some(&overrides), self.palette);
        PieChart {
            title: title.to_string(),
            description: None,
            show_labels: true,
            slices,
            colors,
        }
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditview_core::models::{Backup, Incident};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_application_keeps_fixed_tables() {
        let app = Application::default();
        let sections = SectionBuilder::new(&app, now(), PaletteMode::LabelHash).build();
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "details",
                "access-control",
                "changes",
                "incidents",
                "backups",
                "restores",
                "assessments",
                "findings",
                "pipelines"
            ]
        );

        let incidents = &sections[3];
        assert_eq!(incidents.blocks.len(), 1);
        assert!(matches!(&incidents.blocks[0], Block::Table(t) if t.model.is_empty()));
    }

    #[test]
    fn test_incident_duration_column() {
        let app = Application {
            incidents: vec![
                Incident {
                    id: Some("INC-1".into()),
                    date: Some("2024-06-13T10:00:00Z".into()),
                    severity: Some("critical".into()),
                    ..Incident::default()
                },
                Incident {
                    id: Some("INC-2".into()),
                    date: Some("2024-06-15T07:00:00Z".into()),
                    severity: Some("high".into()),
                    resolved_date: Some("2024-06-15T09:30:00Z".into()),
                    ..Incident::default()
                },
            ],
            ..Application::default()
        };
        let section = SectionBuilder::new(&app, now(), PaletteMode::LabelHash).incidents();
        let table = section.tables().next().unwrap();

        let durations: Vec<String> = table
            .model
            .rows
            .iter()
            .map(|row| row[6].display(now()))
            .collect();
        assert_eq!(durations, vec!["2d 2h", "2h"]);

        let Block::Pies(pies) = &section.blocks[1] else {
            panic!("expected severity pie");
        };
        assert_eq!(pies[0].colors, vec!["#ef4444", "#f97316"]);
    }

    #[test]
    fn test_backup_stats_render_as_text() {
        let app = Application {
            backups: vec![Backup {
                date: Some("2024-06-14T12:00:00Z".into()),
                size: Some("10 GB".into()),
                status: Some("Successful".into()),
                ..Backup::default()
            }],
            ..Application::default()
        };
        let section = SectionBuilder::new(&app, now(), PaletteMode::LabelHash).backups();
        let Block::Stats(stats) = &section.blocks[0] else {
            panic!("expected stats");
        };
        let values: Vec<&str> = stats.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["10.0 GB", "100.0%", "1 day ago"]);
        assert!(matches!(&section.blocks[1], Block::Calendar(c) if c.days.len() == 1));
    }
}
