use crate::analysis::{AnalysisReport, AnalysisResult};
use crate::upload::{Notification, NotificationKind};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionDecision {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Default)]
pub struct DashboardState {
    pub toasts: Vec<Toast>,
    pub latest_report: Option<AnalysisReport>,
    pub analyses_received: usize,
    pub suggestion_decisions: HashMap<String, SuggestionDecision>,
    pub analysis_receiver: Option<Receiver<AnalysisResult>>,
}

impl DashboardState {
    pub fn new(analysis_receiver: Receiver<AnalysisResult>) -> Self {
        Self {
            analysis_receiver: Some(analysis_receiver),
            ..Default::default()
        }
    }

    pub fn push_notifications(&mut self, notifications: Vec<Notification>, now: Instant) {
        self.toasts
            .extend(notifications.into_iter().map(|n| Toast {
                kind: n.kind,
                message: n.message,
                shown_at: now,
            }));
    }

    pub fn push_error(&mut self, message: impl Into<String>, now: Instant) {
        self.push_notifications(vec![Notification::error(message)], now);
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_LIFETIME);
    }

    /// Takes every analysis the session delivered; the newest one is shown.
    pub fn receive_analysis(&mut self) -> bool {
        let Some(receiver) = &self.analysis_receiver else {
            return false;
        };

        let mut latest = None;
        while let Ok(result) = receiver.try_recv() {
            self.analyses_received += 1;
            latest = Some(result);
        }

        match latest {
            Some(result) => {
                self.latest_report = Some(result.report());
                self.suggestion_decisions.clear();
                true
            }
            None => false,
        }
    }

    pub fn decide(&mut self, suggestion_id: &str, decision: SuggestionDecision) {
        self.suggestion_decisions
            .insert(suggestion_id.to_string(), decision);
    }

    pub fn decision(&self, suggestion_id: &str) -> SuggestionDecision {
        self.suggestion_decisions
            .get(suggestion_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;

    #[test]
    fn toasts_expire_after_lifetime() {
        let mut state = DashboardState::default();
        let start = Instant::now();
        state.push_notifications(vec![Notification::success("done")], start);
        state.push_error("failed", start + Duration::from_secs(2));

        state.expire_toasts(start + Duration::from_secs(3));
        assert_eq!(state.toasts.len(), 2);

        state.expire_toasts(start + TOAST_LIFETIME);
        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.toasts[0].kind, NotificationKind::Error);
    }

    #[test]
    fn newest_analysis_replaces_report_and_resets_decisions() {
        let (tx, rx) = mpsc::channel();
        let mut state = DashboardState::new(rx);
        assert!(!state.receive_analysis());

        tx.send(AnalysisResult::new(json!({"review": {"document_type": "NDA"}})))
            .unwrap();
        assert!(state.receive_analysis());
        state.decide("suggestion-1", SuggestionDecision::Accepted);
        assert_eq!(state.decision("suggestion-1"), SuggestionDecision::Accepted);

        tx.send(AnalysisResult::new(json!({"review": {"document_type": "Lease"}})))
            .unwrap();
        tx.send(AnalysisResult::new(json!({"review": {"document_type": "Offer"}})))
            .unwrap();
        assert!(state.receive_analysis());

        assert_eq!(state.analyses_received, 3);
        assert_eq!(state.latest_report.as_ref().unwrap().title(), Some("Offer"));
        assert_eq!(state.decision("suggestion-1"), SuggestionDecision::Pending);
    }
}
