use auditview_core::{
    evaluate_panels, source, stats, Cell, PaletteMode, SortState, TableModel,
};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/application.json")
}

#[tokio::test]
async fn test_fixture_loads_every_section() {
    let snapshot = source::read_file(&fixture_path()).await.unwrap();
    let app = &snapshot.application;

    assert_eq!(app.heading(), "Billing Service - Web Application");
    assert_eq!(app.data_classification.as_deref(), Some("Confidential"));
    assert_eq!(app.access_control.users.len(), 3);
    assert_eq!(app.incidents.len(), 3);
    assert_eq!(app.backups.len(), 3);
    assert_eq!(app.views.len(), 1);
    assert_eq!(snapshot.raw["id"], "app-billing");
}

#[tokio::test]
async fn test_fixture_view_evaluates() {
    let snapshot = source::read_file(&fixture_path()).await.unwrap();
    let view = &snapshot.application.views[0].view;

    let panels = evaluate_panels(&view.panels, PaletteMode::LabelHash);
    assert_eq!(panels.numbers[0].value, "98.8");
    assert_eq!(panels.breakdowns[0].entries[1].label, "priority");
    assert_eq!(panels.pies[0].colors[1], "#ef4444");
    assert_eq!(panels.gauges[0].reading.color, "#f59e0b");
    assert!((panels.gauges[0].reading.percentage - 72.0).abs() < f64::EPSILON);

    let table = TableModel::from_view(&view.columns, &view.rows);
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    assert_eq!(table.rows[0][4].display(now), "7 seconds");
    assert_eq!(table.rows[1][4].display(now), "2 hours 3 minutes");
    assert_eq!(table.rows[2][4].display(now), "0s");
    assert_eq!(table.rows[2][1].display(now), "98,765");
    assert_eq!(table.rows[2][3], Cell::Null);

    let mut sort = SortState::new();
    sort.request("col_1");
    sort.request("col_1");
    assert_eq!(table.sorted_indices(&sort), vec![2, 0, 1]);
}

#[tokio::test]
async fn test_fixture_statistics() {
    let snapshot = source::read_file(&fixture_path()).await.unwrap();
    let app = &snapshot.application;
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

    let backups = stats::backup_stats(&app.backups, now).unwrap();
    assert!((backups.avg_size_gb.unwrap() - 12.4).abs() < 1e-9);
    assert_eq!(backups.last_backup_age.as_deref(), Some("1 day"));

    let incidents = stats::incident_stats(&app.incidents);
    assert_eq!(incidents.open_count, 2);
    assert!((incidents.avg_resolution_hours - 6.0).abs() < f64::EPSILON);

    let users = &app.access_control.users;
    let methods = &app.access_control.authentication;
    assert_eq!(stats::auth_type(&users[0], methods), "SAML");
    assert_eq!(stats::auth_type(&users[1], methods), "OIDC");
    assert_eq!(stats::auth_type(&users[2], methods), "TOKEN");
}
