//! Report controller: owns the current snapshot and the load state.
//!
//! A failed fetch replaces whatever was shown with a single error state. A
//! failed file load keeps the previous state and raises a notice instead.

use tracing::warn;

use crate::source::{LoadOutcome, ReportSnapshot, ReportSource, SourceClient, SourceError, SourceKind};

#[derive(Debug, Clone, Default)]
pub enum ReportState {
    #[default]
    Idle,
    Loading,
    Ready(ReportSnapshot),
    /// Terminal for this load attempt; the user re-triggers to retry
    Failed(String),
}

impl ReportState {
    pub const fn snapshot(&self) -> Option<&ReportSnapshot> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Default)]
pub struct ReportController {
    state: ReportState,
    before_load: Option<ReportState>,
    notice: Option<String>,
}

impl ReportController {
    /// Create a new idle controller
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &ReportState {
        &self.state
    }

    /// The snapshot currently shown, if any
    pub const fn snapshot(&self) -> Option<&ReportSnapshot> {
        self.state.snapshot()
    }

    /// Non-blocking message about a rejected file load
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Mark a load as started
    pub fn begin_load(&mut self) {
        let previous = std::mem::replace(&mut self.state, ReportState::Loading);
        if !previous.is_loading() {
            self.before_load = Some(previous);
        }
    }

    /// Apply the result of a load
    pub fn finish_load(&mut self, kind: SourceKind, result: Result<ReportSnapshot, SourceError>) {
        match result {
            Ok(snapshot) => {
                self.state = ReportState::Ready(snapshot);
                self.before_load = None;
                self.notice = None;
            }
            Err(err @ (SourceError::Decode(_) | SourceError::Io { .. })) if kind == SourceKind::File => {
                warn!("Rejected report file: {err}");
                self.state = self.before_load.take().unwrap_or_default();
                self.notice = Some(err.to_string());
            }
            Err(err) => {
                warn!("Report load failed: {err}");
                self.state = ReportState::Failed(err.to_string());
                self.before_load = None;
            }
        }
    }

    /// Apply an outcome received from a background loader
    pub fn apply(&mut self, outcome: LoadOutcome) {
        self.finish_load(outcome.kind, outcome.result);
    }

    /// Load `source` in the foreground
    pub async fn load(&mut self, client: &SourceClient, source: &ReportSource) -> &ReportState {
        self.begin_load();
        let result = client.load(source).await;
        self.finish_load(source.kind(), result);
        &self.state
    }

    /// Record that there is nothing to load
    pub fn fail_unconfigured(&mut self) {
        self.state = ReportState::Failed(SourceError::NotConfigured.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn snapshot(name: &str) -> ReportSnapshot {
        ReportSnapshot::from_value(json!({"name": name}), "test").unwrap()
    }

    fn decode_error() -> SourceError {
        SourceError::Decode(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
    }

    #[test]
    fn test_file_error_keeps_previous_report() {
        let mut controller = ReportController::new();
        controller.begin_load();
        controller.finish_load(SourceKind::File, Ok(snapshot("first")));

        controller.begin_load();
        controller.finish_load(SourceKind::File, Err(decode_error()));

        let shown = controller.snapshot().unwrap();
        assert_eq!(shown.application.name.as_deref(), Some("first"));
        assert!(controller.notice().is_some());
    }

    #[test]
    fn test_fetch_error_replaces_report() {
        let mut controller = ReportController::new();
        controller.begin_load();
        controller.finish_load(SourceKind::Http, Ok(snapshot("first")));

        controller.begin_load();
        controller.finish_load(SourceKind::Http, Err(SourceError::Status(502)));

        assert!(controller.snapshot().is_none());
        match controller.state() {
            ReportState::Failed(message) => assert!(message.contains("502")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_500_renders_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = SourceClient::new(Duration::from_secs(5)).unwrap();
        let mut controller = ReportController::new();
        let source = ReportSource::Http {
            url: server.uri(),
            basic_auth: None,
        };

        let state = controller.load(&client, &source).await;
        assert!(matches!(state, ReportState::Failed(_)));
        assert!(controller.snapshot().is_none());
        assert!(controller.notice().is_none());
    }
}
