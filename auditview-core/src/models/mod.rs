//! Data models module for auditview core
//!
//! `application` describes the audited entity as delivered by the report
//! endpoint; `view_types` describes the schema-driven views (typed columns,
//! row-major data and summary panels) an entity may carry.

pub mod application;
pub mod view_types;

pub use application::{
    AccessControl, Application, Assessment, Assessor, Authentication, Backup, Change, Finding,
    Incident, Location, Monitoring, MonitoringTool, Pipeline, Repository, Restore, SeverityCounts,
    User, Version,
};
pub use view_types::{ColumnDef, NamedView, NumberConfig, Panel, PanelKind, PieConfig, SemanticType, ViewResult};
