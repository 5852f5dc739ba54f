use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::error::{UploadError, ValidationError};
use crate::upload::propagator::{AnalysisCallback, ResultPropagator};
use crate::upload::submitter::{AnalysisService, StageReporter};
use crate::upload::tracker::UploadTracker;
use crate::upload::types::{
    CandidateFile, FileStatus, Notification, RecordId, UploadEvent, UploadedFileRecord,
};
use crate::upload::validator::validate;

/// Owns the upload workflow for one user session.
///
/// Submissions run as independent tasks on the tokio runtime and report back
/// over a channel; the tracker is only ever touched by the thread that owns
/// the session, in [`UploadSession::poll`] or [`UploadSession::wait_idle`].
pub struct UploadSession {
    tracker: UploadTracker,
    service: Arc<dyn AnalysisService>,
    runtime: Handle,
    propagator: ResultPropagator,
    event_sender: Sender<UploadEvent>,
    event_receiver: Receiver<UploadEvent>,
    notifications: VecDeque<Notification>,
    in_flight: usize,
}

impl UploadSession {
    pub fn new(service: Arc<dyn AnalysisService>, runtime: Handle) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();
        Self {
            tracker: UploadTracker::new(),
            service,
            runtime,
            propagator: ResultPropagator::default(),
            event_sender,
            event_receiver,
            notifications: VecDeque::new(),
            in_flight: 0,
        }
    }

    pub fn with_callback(mut self, callback: AnalysisCallback) -> Self {
        self.propagator.set_callback(callback);
        self
    }

    /// Validates the file and, if accepted, starts its upload.
    pub fn submit(&mut self, candidate: CandidateFile) -> Result<RecordId, ValidationError> {
        let accepted = match validate(candidate) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Rejected file: {}", e);
                self.notifications.push_back(Notification::error(e.to_string()));
                return Err(e);
            }
        };

        let id = self.tracker.add_record(&accepted);
        info!(
            "Uploading {} ({} bytes) as {}",
            accepted.name(),
            accepted.size_bytes(),
            id
        );

        self.in_flight += 1;
        let service = Arc::clone(&self.service);
        let sender = self.event_sender.clone();
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let stage = StageReporter::new(id, sender.clone());
            // Run the upload as its own task so a panic still ends in `Finished`.
            let upload =
                runtime.spawn(async move { service.analyze(&accepted, stage).await });
            let outcome = match upload.await {
                Ok(outcome) => outcome,
                Err(e) => Err(UploadError::TaskFailed(e.to_string())),
            };
            sender
                .send(UploadEvent::Finished { id, outcome })
                .unwrap_or_default();
        });

        Ok(id)
    }

    /// Applies every event that has arrived so far. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Blocks until every started upload has finished or the timeout passes.
    /// Must not be called from inside the session's runtime.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();

        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_receiver.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false
                }
            }
        }
        true
    }

    fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Processing(id) => {
                self.tracker.update_status(id, FileStatus::Processing);
            }
            UploadEvent::Finished { id, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let name = self
                    .tracker
                    .get(id)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| id.to_string());

                match outcome {
                    Ok(result) => {
                        self.tracker.update_status(id, FileStatus::Complete);
                        let delivered = match result {
                            Some(result) => self.propagator.propagate(result),
                            None => false,
                        };
                        info!("Analysis of {} complete (delivered: {})", name, delivered);
                        self.notifications.push_back(Notification::success(format!(
                            "{} uploaded and analyzed successfully!",
                            name
                        )));
                    }
                    Err(e) => {
                        warn!("Upload of {} failed: {}", name, e);
                        self.tracker
                            .update_status(id, FileStatus::Error(e.to_string()));
                        self.notifications.push_back(Notification::error(format!(
                            "Failed to upload {}. Please try again. ({})",
                            name, e
                        )));
                    }
                }
            }
        }
    }

    pub fn remove_record(&mut self, id: RecordId) -> Option<UploadedFileRecord> {
        self.tracker.remove_record(id)
    }

    pub fn clear_all(&mut self) {
        self.tracker.clear_all();
    }

    pub fn tracker(&self) -> &UploadTracker {
        &self.tracker
    }

    pub fn records(&self) -> &[UploadedFileRecord] {
        self.tracker.records()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::upload::types::NotificationKind;
    use crate::upload::validator::{AcceptedFile, MAX_UPLOAD_BYTES};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::runtime::Runtime;
    use tokio::sync::Semaphore;

    type Respond =
        Box<dyn Fn(&AcceptedFile) -> Result<Option<AnalysisResult>, UploadError> + Send + Sync>;

    struct FakeService {
        calls: AtomicUsize,
        report_processing: bool,
        gate: Option<Arc<Semaphore>>,
        respond: Respond,
    }

    impl FakeService {
        fn new(respond: Respond) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                report_processing: false,
                gate: None,
                respond,
            }
        }

        fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl AnalysisService for FakeService {
        async fn analyze(
            &self,
            file: &AcceptedFile,
            stage: StageReporter,
        ) -> Result<Option<AnalysisResult>, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.report_processing {
                stage.processing();
            }
            // Only gate documents named `slow*` so tests can hold them back.
            if let Some(gate) = &self.gate {
                if file.name().starts_with("slow") {
                    gate.acquire().await.unwrap().forget();
                }
            }
            if file.name().starts_with("panic") {
                panic!("analysis service blew up on {}", file.name());
            }
            (self.respond)(file)
        }
    }

    fn candidate(name: &str) -> CandidateFile {
        CandidateFile::new(name, name, 2048)
    }

    fn collecting_session(
        rt: &Runtime,
        service: Arc<FakeService>,
    ) -> (UploadSession, Arc<Mutex<Vec<AnalysisResult>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let session = UploadSession::new(service, rt.handle().clone()).with_callback(Box::new(
            move |result| sink.lock().unwrap().push(result),
        ));
        (session, seen)
    }

    fn poll_until(session: &mut UploadSession, done: impl Fn(&UploadSession) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            session.poll();
            if done(session) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn status_of(session: &UploadSession, id: RecordId) -> Option<FileStatus> {
        session.tracker().get(id).map(|r| r.status.clone())
    }

    #[test]
    fn rejected_files_leave_tracker_untouched() {
        let rt = Runtime::new().unwrap();
        let service = Arc::new(FakeService::new(Box::new(|_| Ok(None))));
        let (mut session, _) = collecting_session(&rt, service.clone());

        assert!(matches!(
            session.submit(candidate("notes.txt")),
            Err(ValidationError::UnsupportedType { .. })
        ));
        assert!(matches!(
            session.submit(CandidateFile::new("big.pdf", "big.pdf", MAX_UPLOAD_BYTES + 1)),
            Err(ValidationError::TooLarge { .. })
        ));

        assert!(session.records().is_empty());
        assert_eq!(session.in_flight(), 0);
        assert!(session.wait_idle(Duration::from_millis(50)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.kind == NotificationKind::Error));
    }

    #[test]
    fn results_are_propagated_once_and_record_completes() {
        let rt = Runtime::new().unwrap();
        let service = Arc::new(FakeService::new(Box::new(|_| {
            Ok(Some(AnalysisResult::new(json!({"summary": {"title": "NDA"}}))))
        })));
        let (mut session, seen) = collecting_session(&rt, service.clone());

        let id = session.submit(candidate("nda.pdf")).unwrap();
        assert_eq!(session.records().len(), 1);
        assert_eq!(status_of(&session, id), Some(FileStatus::Uploading));

        assert!(session.wait_idle(Duration::from_secs(5)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(status_of(&session, id), Some(FileStatus::Complete));
        assert_eq!(session.tracker().get(id).unwrap().progress, 100);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_value(), &json!({"summary": {"title": "NDA"}}));

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
    }

    #[test]
    fn missing_results_complete_without_callback() {
        let rt = Runtime::new().unwrap();
        let service = Arc::new(FakeService::new(Box::new(|_| Ok(None))));
        let (mut session, seen) = collecting_session(&rt, service);

        let id = session.submit(candidate("lease.docx")).unwrap();
        assert!(session.wait_idle(Duration::from_secs(5)));

        assert_eq!(status_of(&session, id), Some(FileStatus::Complete));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn failures_mark_record_error_without_callback() {
        let rt = Runtime::new().unwrap();
        let service = Arc::new(FakeService::new(Box::new(|file| {
            if file.name().starts_with("down") {
                Err(UploadError::Transport("connection refused".into()))
            } else {
                Err(UploadError::UploadFailed("502 Bad Gateway".into()))
            }
        })));
        let (mut session, seen) = collecting_session(&rt, service);

        let failed = session.submit(candidate("offer.pdf")).unwrap();
        let down = session.submit(candidate("down.doc")).unwrap();
        assert!(session.wait_idle(Duration::from_secs(5)));

        for id in [failed, down] {
            let record = session.tracker().get(id).unwrap();
            assert_eq!(record.status.label(), "error");
            assert!(!record.error_message().unwrap().is_empty());
        }
        assert!(session
            .tracker()
            .get(failed)
            .unwrap()
            .error_message()
            .unwrap()
            .contains("502 Bad Gateway"));
        assert!(seen.lock().unwrap().is_empty());

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n.kind == NotificationKind::Error));

        // Session stays usable after failures.
        assert!(session.submit(candidate("next.pdf")).is_ok());
    }

    #[test]
    fn clear_all_is_not_undone_by_late_completion() {
        let rt = Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let service = Arc::new(
            FakeService::new(Box::new(|_| Ok(Some(AnalysisResult::new(json!({}))))))
                .gated(gate.clone()),
        );
        let (mut session, _) = collecting_session(&rt, service);

        session.submit(candidate("slow-1.pdf")).unwrap();
        session.submit(candidate("slow-2.pdf")).unwrap();
        session.clear_all();
        assert!(session.records().is_empty());
        assert_eq!(session.in_flight(), 2);

        gate.add_permits(2);
        assert!(session.wait_idle(Duration::from_secs(5)));
        assert!(session.records().is_empty());
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn removed_record_stays_removed() {
        let rt = Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let service =
            Arc::new(FakeService::new(Box::new(|_| Ok(None))).gated(gate.clone()));
        let (mut session, _) = collecting_session(&rt, service);

        let slow = session.submit(candidate("slow.pdf")).unwrap();
        let kept = session.submit(candidate("kept.pdf")).unwrap();
        assert!(session.remove_record(slow).is_some());
        assert!(session.remove_record(RecordId(4242)).is_none());

        gate.add_permits(1);
        assert!(session.wait_idle(Duration::from_secs(5)));
        let ids: Vec<_> = session.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, [kept]);
    }

    #[test]
    fn uploads_run_independently() {
        let rt = Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let service = Arc::new(
            FakeService::new(Box::new(|_| Ok(None))).gated(gate.clone()),
        );
        let (mut session, _) = collecting_session(&rt, service);

        let slow = session.submit(candidate("slow.pdf")).unwrap();
        let fast = session.submit(candidate("fast.pdf")).unwrap();

        assert!(poll_until(&mut session, |s| {
            status_of(s, fast) == Some(FileStatus::Complete)
        }));
        assert_eq!(status_of(&session, slow), Some(FileStatus::Uploading));
        assert_eq!(session.in_flight(), 1);

        gate.add_permits(1);
        assert!(session.wait_idle(Duration::from_secs(5)));
        assert_eq!(status_of(&session, slow), Some(FileStatus::Complete));
    }

    #[test]
    fn processing_is_reported_while_response_is_read() {
        let rt = Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let mut service = FakeService::new(Box::new(|_| Ok(None))).gated(gate.clone());
        service.report_processing = true;
        let (mut session, _) = collecting_session(&rt, Arc::new(service));

        let id = session.submit(candidate("slow.pdf")).unwrap();
        assert!(poll_until(&mut session, |s| {
            status_of(s, id) == Some(FileStatus::Processing)
        }));
        assert_eq!(session.tracker().get(id).unwrap().progress, 0);

        gate.add_permits(1);
        assert!(session.wait_idle(Duration::from_secs(5)));
        assert_eq!(status_of(&session, id), Some(FileStatus::Complete));
    }

    #[test]
    fn wait_idle_times_out_on_stuck_upload() {
        let rt = Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let service =
            Arc::new(FakeService::new(Box::new(|_| Ok(None))).gated(gate.clone()));
        let (mut session, _) = collecting_session(&rt, service);

        session.submit(candidate("slow.pdf")).unwrap();
        assert!(!session.wait_idle(Duration::from_millis(50)));
        assert_eq!(session.in_flight(), 1);

        gate.add_permits(1);
        assert!(session.wait_idle(Duration::from_secs(5)));
    }

    #[test]
    fn panicking_upload_still_finishes_with_error() {
        let rt = Runtime::new().unwrap();
        let service = Arc::new(FakeService::new(Box::new(|_| Ok(None))));
        let (mut session, seen) = collecting_session(&rt, service);

        let broken = session.submit(candidate("panic.pdf")).unwrap();
        let fine = session.submit(candidate("fine.pdf")).unwrap();

        assert!(session.wait_idle(Duration::from_secs(5)));
        assert_eq!(session.in_flight(), 0);
        assert_eq!(status_of(&session, fine), Some(FileStatus::Complete));

        let record = session.tracker().get(broken).unwrap();
        assert_eq!(record.status.label(), "error");
        assert!(record.error_message().unwrap().contains("Upload task failed"));
        assert!(seen.lock().unwrap().is_empty());
    }
}
